//! Palisade CLI - enroll a client certificate from the CA.
//!
//! Thin wrapper over `palisade-enroll`: parses arguments, runs one
//! enrollment attempt and reports the outcome. Fatal failures (broken
//! entropy source, unwritable key file) exit with status 2; per-attempt
//! failures exit with status 1.

mod args;

use args::Args;
use clap::Parser;
use palisade_enroll::{enroll, EnrollmentConfig, EnrollmentRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let request = EnrollmentRequest::new(args.common_name.clone(), &args.sans)
        .with_organization(args.org.clone())
        .with_validity_days(args.days);
    let config = EnrollmentConfig {
        ca_addr: args.ca.clone(),
        key_path: args.key.clone(),
        cert_path: args.cert.clone(),
        ca_cert_path: args.ca_cert.clone(),
        timeout: args.timeout(),
    };

    match enroll(&request, &config).await {
        Ok(enrollment) => {
            tracing::info!(fingerprint = %enrollment.fingerprint, "certificate issued");
            println!("enrolled {} ({})", args.common_name, enrollment.fingerprint);
            println!("  key:     {}", args.key.display());
            println!("  cert:    {}", args.cert.display());
            println!("  ca cert: {}", args.ca_cert.display());
        }
        Err(e) => {
            let code = if e.is_fatal() { 2 } else { 1 };
            tracing::error!("enrollment failed: {:#}", anyhow::Error::new(e));
            std::process::exit(code);
        }
    }
}
