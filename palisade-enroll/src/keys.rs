//! P-256 ECDSA key pair generation and encoding.
//!
//! Keys are generated fresh for every enrollment attempt and never leave the
//! process except as the SEC1-encoded private key written to disk at the end
//! of a successful run. Secret buffers are zeroized on drop.

use p256::pkcs8::DecodePrivateKey;
use rcgen::PKCS_ECDSA_P256_SHA256;
use zeroize::Zeroizing;

use crate::error::EnrollError;

/// A freshly generated P-256 ECDSA key pair.
pub struct KeyPair {
    inner: rcgen::KeyPair,
}

impl KeyPair {
    /// Generate a new key pair from the system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::KeyGeneration`] if the random source fails.
    /// This is the fatal error class: enrollment must not proceed with a
    /// degraded key.
    pub fn generate() -> Result<Self, EnrollError> {
        let inner = rcgen::KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256)
            .map_err(EnrollError::KeyGeneration)?;
        Ok(Self { inner })
    }

    /// The underlying signing key, for CSR serialization.
    pub(crate) fn signing_key(&self) -> &rcgen::KeyPair {
        &self.inner
    }

    /// Export the private key in SEC1 `ECPrivateKey` DER form.
    ///
    /// This is the payload of the `EC PRIVATE KEY` PEM block written during
    /// persistence. Both the intermediate PKCS#8 buffer and the returned
    /// DER are zeroized on drop.
    pub fn to_sec1_der(&self) -> Result<Zeroizing<Vec<u8>>, EnrollError> {
        let pkcs8 = Zeroizing::new(self.inner.serialize_der());
        let secret = p256::SecretKey::from_pkcs8_der(&pkcs8)
            .map_err(|e| EnrollError::KeyEncoding(e.to_string()))?;
        secret
            .to_sec1_der()
            .map_err(|e| EnrollError::KeyEncoding(e.to_string()))
    }
}
