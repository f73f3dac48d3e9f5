//! Enrollment protocol client.
//!
//! Owns the TCP session with the CA: one connect/exchange/close cycle per
//! attempt, strictly sequential, no retries. The connection is dropped on
//! every exit path. On a validated exchange the credentials are handed to
//! [`crate::persist`] as the final step.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use tokio::net::TcpStream;
use x509_parser::prelude::*;

use crate::error::EnrollError;
use crate::keys::KeyPair;
use crate::request::EnrollmentRequest;
use crate::{framing, persist, validate};

/// Where to enroll and where to put the results.
#[derive(Debug, Clone)]
pub struct EnrollmentConfig {
    /// CA endpoint address (`host:port`).
    pub ca_addr: String,
    /// Private key output path (written mode 0o600).
    pub key_path: PathBuf,
    /// Leaf certificate output path.
    pub cert_path: PathBuf,
    /// CA certificate output path.
    pub ca_cert_path: PathBuf,
    /// Deadline applied to each network phase. `None` means blocking reads
    /// and writes with no deadline: a stalled CA stalls the attempt.
    pub timeout: Option<Duration>,
}

/// Summary of a successful enrollment.
#[derive(Debug, Clone)]
pub struct Enrollment {
    /// `SHA256:{base64url}` fingerprint of the issued certificate's
    /// public key.
    pub fingerprint: String,
}

/// Run one enrollment attempt against the configured CA.
///
/// Sequence: generate key pair, encode CSR, connect, send the CSR frame,
/// receive the leaf and CA certificate frames, parse, validate the chain,
/// persist. Any failure aborts the attempt with nothing written to disk;
/// see [`EnrollError::is_fatal`] for which failures are worth retrying.
pub async fn enroll(
    request: &EnrollmentRequest,
    config: &EnrollmentConfig,
) -> Result<Enrollment, EnrollError> {
    let key = KeyPair::generate()?;
    let csr_der = request.encode_csr(&key)?;
    tracing::debug!(bytes = csr_der.len(), "encoded certificate signing request");

    let mut stream = bounded(config.timeout, "connect", TcpStream::connect(&config.ca_addr))
        .await?
        .map_err(|source| EnrollError::Connect {
            addr: config.ca_addr.clone(),
            source,
        })?;
    tracing::debug!(addr = %config.ca_addr, "connected to certificate authority");

    bounded(
        config.timeout,
        "send certificate request",
        framing::write_frame(&mut stream, &csr_der),
    )
    .await??;

    let leaf_der = bounded(
        config.timeout,
        "receive leaf certificate",
        framing::read_frame(&mut stream),
    )
    .await??;
    let ca_der = bounded(
        config.timeout,
        "receive CA certificate",
        framing::read_frame(&mut stream),
    )
    .await??;
    drop(stream);

    let leaf_public_key = public_key_from_cert(&leaf_der, "leaf")?;
    public_key_from_cert(&ca_der, "CA")?;

    validate::verify_chain(&leaf_der, &ca_der)?;
    tracing::debug!("verified chain of trust");

    let key_der = key.to_sec1_der()?;
    persist::write_credentials(
        &key_der,
        &leaf_der,
        &ca_der,
        &config.key_path,
        &config.cert_path,
        &config.ca_cert_path,
    )?;

    let hash: [u8; 32] = Sha256::digest(&leaf_public_key).into();
    let fingerprint = format!("SHA256:{}", URL_SAFE_NO_PAD.encode(hash));
    tracing::info!(%fingerprint, "enrollment complete");

    Ok(Enrollment { fingerprint })
}

/// Extract the raw public key bytes from a DER-encoded certificate.
fn public_key_from_cert(der: &[u8], what: &'static str) -> Result<Vec<u8>, EnrollError> {
    let (_, cert) = X509Certificate::from_der(der).map_err(|e| EnrollError::CertParse {
        what,
        detail: format!("{:?}", e),
    })?;
    Ok(cert.public_key().subject_public_key.data.to_vec())
}

/// Run an I/O future under the configured deadline for one protocol phase.
async fn bounded<F, T>(
    timeout: Option<Duration>,
    phase: &'static str,
    fut: F,
) -> Result<io::Result<T>, EnrollError>
where
    F: Future<Output = io::Result<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| EnrollError::TimedOut { phase }),
        None => Ok(fut.await),
    }
}
