//! Client-side certificate enrollment for Palisade.
//!
//! One call to [`client::enroll`] performs a full enrollment attempt:
//! - generate a fresh P-256 ECDSA key pair
//! - build and self-sign a CSR from a common name and subject identifiers
//! - exchange it with the CA over a length-prefixed TCP protocol
//! - verify the returned leaf chains to the returned CA certificate and is
//!   authorized for client authentication
//! - persist key, leaf and CA certificate as PEM files
//!
//! Nothing is written to disk unless the whole chain validates; the private
//! key never leaves the process.

pub mod client;
pub mod error;
pub mod framing;
pub mod keys;
pub mod persist;
pub mod request;
pub mod validate;

pub use client::{enroll, Enrollment, EnrollmentConfig};
pub use error::EnrollError;
pub use keys::KeyPair;
pub use request::{EnrollmentRequest, DEFAULT_ORGANIZATION};
pub use validate::TrustError;
