//! Enrollment error types.

use std::path::PathBuf;

use crate::validate::TrustError;

/// Errors that can occur during an enrollment attempt.
///
/// Two classes matter to callers: fatal errors (no retry in the same
/// environment can succeed, see [`EnrollError::is_fatal`]) and per-attempt
/// failures that leave no side effects behind.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EnrollError {
    /// The secure random source failed while generating the key pair.
    #[error("key generation failed: {0}")]
    KeyGeneration(#[source] rcgen::Error),

    /// The CSR could not be built or DER-encoded.
    #[error("failed to encode certificate request: {0}")]
    Csr(#[source] rcgen::Error),

    /// The private key could not be re-encoded into SEC1 form.
    #[error("failed to encode private key: {0}")]
    KeyEncoding(String),

    /// Could not open a TCP connection to the CA endpoint.
    #[error("failed to connect to CA at {addr}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Network or framing I/O failure. A frame truncated before its
    /// declared length surfaces here as `UnexpectedEof`.
    #[error("wire protocol error")]
    Io(#[from] std::io::Error),

    /// A deadline expired during the named protocol phase.
    #[error("timed out during {phase}")]
    TimedOut { phase: &'static str },

    /// A received frame did not decode as an X.509 certificate.
    #[error("failed to parse {what} certificate: {detail}")]
    CertParse { what: &'static str, detail: String },

    /// The returned leaf does not chain to the returned CA under the
    /// client-authentication usage constraint.
    #[error("chain of trust verification failed")]
    Trust(#[from] TrustError),

    /// A credential file could not be written.
    #[error("failed to write {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EnrollError {
    /// Whether this failure is unrecoverable for the current environment.
    ///
    /// Retrying key generation against a broken entropy source, or writing
    /// credentials to an unwritable location, can never succeed; callers
    /// should terminate rather than retry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EnrollError::KeyGeneration(_)
                | EnrollError::KeyEncoding(_)
                | EnrollError::Persist { .. }
        )
    }
}
