//! CLI argument parsing.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Palisade enrollment client - obtain a client certificate from the CA.
#[derive(Parser, Debug)]
#[command(name = "palisade", version, about)]
pub struct Args {
    /// Subject common name for the certificate
    #[arg(long, value_name = "NAME")]
    pub common_name: String,

    /// Subject identifier (IP literal or DNS name), can be repeated
    #[arg(long = "san", value_name = "IP|DNS")]
    pub sans: Vec<String>,

    /// CA endpoint address
    #[arg(long, value_name = "HOST:PORT")]
    pub ca: String,

    /// Private key output path
    #[arg(long, value_name = "PATH")]
    pub key: PathBuf,

    /// Certificate output path
    #[arg(long, value_name = "PATH")]
    pub cert: PathBuf,

    /// CA certificate output path
    #[arg(long, value_name = "PATH")]
    pub ca_cert: PathBuf,

    /// Subject organization
    #[arg(long, default_value = palisade_enroll::DEFAULT_ORGANIZATION)]
    pub org: String,

    /// Requested certificate validity in days (the CA decides the final window)
    #[arg(long, default_value = "365")]
    pub days: u32,

    /// Network deadline per protocol phase in seconds (0 disables it)
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

impl Args {
    /// The per-phase deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(args)
    }

    const REQUIRED: &[&str] = &[
        "palisade",
        "--common-name",
        "client-01",
        "--ca",
        "ca.internal:5100",
        "--key",
        "/tmp/client.key",
        "--cert",
        "/tmp/client.crt",
        "--ca-cert",
        "/tmp/ca.crt",
    ];

    #[test]
    fn test_basic_args() {
        let args = parse_args(REQUIRED).unwrap();

        assert_eq!(args.common_name, "client-01");
        assert_eq!(args.ca, "ca.internal:5100");
        assert_eq!(args.org, palisade_enroll::DEFAULT_ORGANIZATION);
        assert_eq!(args.days, 365);
        assert!(args.sans.is_empty());
        assert_eq!(args.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_repeated_sans_keep_order() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--san", "10.0.0.5", "--san", "client-01.internal"]);
        let args = parse_args(&argv).unwrap();

        assert_eq!(args.sans, vec!["10.0.0.5", "client-01.internal"]);
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--timeout-secs", "0"]);
        let args = parse_args(&argv).unwrap();

        assert_eq!(args.timeout(), None);
    }

    #[test]
    fn test_missing_required_args_fails() {
        // Missing --ca
        let result = parse_args(&[
            "palisade",
            "--common-name",
            "client-01",
            "--key",
            "/tmp/client.key",
            "--cert",
            "/tmp/client.crt",
            "--ca-cert",
            "/tmp/ca.crt",
        ]);
        assert!(result.is_err());
    }
}
