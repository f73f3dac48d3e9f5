//! Chain-of-trust validation for issued certificates.
//!
//! The supplied CA certificate is the sole trust anchor; no system trust
//! store is consulted. A leaf is accepted only if the CA signed it, it is
//! inside its validity window, and its extended key usage permits client
//! authentication.

use x509_parser::prelude::*;

/// Reasons a returned certificate chain can be rejected.
///
/// Kept separate from [`crate::EnrollError`]'s network and encoding
/// variants: a trust failure means the CA issued a certificate it cannot
/// vouch for, or the channel was tampered with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TrustError {
    /// A certificate did not parse as X.509 DER.
    #[error("failed to parse {0} certificate")]
    Parse(&'static str),

    /// The supplied anchor does not assert the CA basic constraint.
    #[error("supplied anchor is not a certificate authority")]
    NotACertificateAuthority,

    /// Verification time is before the anchor's notBefore.
    #[error("supplied CA certificate is not yet valid")]
    AnchorNotYetValid,

    /// Verification time is after the anchor's notAfter.
    #[error("supplied CA certificate has expired")]
    AnchorExpired,

    /// The leaf names a different issuer than the supplied CA.
    #[error("leaf certificate was not issued by the supplied CA")]
    IssuerMismatch,

    /// The CA's signature over the leaf does not verify.
    #[error("CA signature over the leaf certificate is invalid")]
    BadSignature,

    /// Verification time is before the leaf's notBefore.
    #[error("leaf certificate is not yet valid")]
    NotYetValid,

    /// Verification time is after the leaf's notAfter.
    #[error("leaf certificate has expired")]
    Expired,

    /// The leaf carries an EKU extension without clientAuth.
    #[error("leaf certificate is not authorized for client authentication")]
    UsageNotPermitted,
}

/// Verify `leaf_der` against `ca_der` at the current system time.
pub fn verify_chain(leaf_der: &[u8], ca_der: &[u8]) -> Result<(), TrustError> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    verify_chain_at(leaf_der, ca_der, now)
}

/// Verify `leaf_der` against `ca_der` at the given Unix timestamp.
///
/// Checks, in order: both certificates parse, the anchor is a CA inside its
/// own validity window, the leaf was issued by the anchor, the anchor's
/// signature over the leaf verifies, the leaf is within its validity window,
/// and the leaf's extended key usage permits client authentication. An absent EKU extension places no
/// restriction on usage; a present one must include clientAuth (or
/// anyExtendedKeyUsage).
pub fn verify_chain_at(leaf_der: &[u8], ca_der: &[u8], now: i64) -> Result<(), TrustError> {
    let (_, leaf) = X509Certificate::from_der(leaf_der).map_err(|_| TrustError::Parse("leaf"))?;
    let (_, ca) = X509Certificate::from_der(ca_der).map_err(|_| TrustError::Parse("CA"))?;

    let is_ca = ca
        .basic_constraints()
        .map_err(|_| TrustError::Parse("CA"))?
        .map(|bc| bc.value.ca)
        .unwrap_or(false);
    if !is_ca {
        return Err(TrustError::NotACertificateAuthority);
    }

    // An anchor outside its own validity window cannot vouch for anything.
    let ca_validity = ca.validity();
    if now < ca_validity.not_before.timestamp() {
        return Err(TrustError::AnchorNotYetValid);
    }
    if now > ca_validity.not_after.timestamp() {
        return Err(TrustError::AnchorExpired);
    }

    if leaf.issuer().as_raw() != ca.subject().as_raw() {
        return Err(TrustError::IssuerMismatch);
    }

    leaf.verify_signature(Some(ca.public_key()))
        .map_err(|_| TrustError::BadSignature)?;

    let validity = leaf.validity();
    if now < validity.not_before.timestamp() {
        return Err(TrustError::NotYetValid);
    }
    if now > validity.not_after.timestamp() {
        return Err(TrustError::Expired);
    }

    if let Some(eku) = leaf
        .extended_key_usage()
        .map_err(|_| TrustError::Parse("leaf"))?
    {
        if !eku.value.client_auth && !eku.value.any {
            return Err(TrustError::UsageNotPermitted);
        }
    }

    Ok(())
}
