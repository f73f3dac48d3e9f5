//! CSR template construction.
//!
//! The request builder is pure data transformation: it classifies subject
//! identifiers by syntax and fixes the subject and signature algorithm.
//! Network and disk I/O live in [`crate::client`].

use std::net::IpAddr;

use rcgen::string::Ia5String;
use rcgen::{CertificateParams, DistinguishedName, DnType, DnValue, SanType};

use crate::error::EnrollError;
use crate::keys::KeyPair;

/// Subject organization used when the caller does not supply one.
pub const DEFAULT_ORGANIZATION: &str = "Palisade";

/// An unsigned CSR template for one enrollment attempt.
///
/// Identifiers passed to [`EnrollmentRequest::new`] are classified in input
/// order: strings that parse as an IPv4 or IPv6 literal become IP subject
/// alternative names, everything else is carried verbatim as a DNS name.
/// Duplicates pass through untouched.
#[derive(Debug, Clone)]
pub struct EnrollmentRequest {
    /// Subject common name, taken verbatim from the caller.
    pub common_name: String,
    /// Subject organization.
    pub organization: String,
    /// Requested validity in days. A hint only; the CA decides the actual
    /// validity window of the issued certificate.
    pub validity_days: u32,
    /// Identifiers that parsed as IP literals.
    pub ip_addresses: Vec<IpAddr>,
    /// Remaining identifiers, kept as DNS names.
    pub dns_names: Vec<String>,
}

impl EnrollmentRequest {
    /// Build a request template from a common name and subject identifiers.
    pub fn new(common_name: impl Into<String>, identifiers: &[String]) -> Self {
        let mut ip_addresses = Vec::new();
        let mut dns_names = Vec::new();

        for identifier in identifiers {
            match identifier.parse::<IpAddr>() {
                Ok(ip) => ip_addresses.push(ip),
                Err(_) => dns_names.push(identifier.clone()),
            }
        }

        Self {
            common_name: common_name.into(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            validity_days: 365,
            ip_addresses,
            dns_names,
        }
    }

    /// Override the subject organization.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    /// Set the requested validity hint.
    #[must_use]
    pub fn with_validity_days(mut self, days: u32) -> Self {
        self.validity_days = days;
        self
    }

    /// Self-sign the template with `key` and return the CSR as DER bytes.
    ///
    /// The signature algorithm is fixed to ECDSA with SHA-256 by the key's
    /// algorithm; there is no negotiation.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::Csr`] if a DNS name is not a valid IA5 string
    /// or the request fails to serialize. Both abort the attempt without
    /// touching the network.
    pub fn encode_csr(&self, key: &KeyPair) -> Result<Vec<u8>, EnrollError> {
        let mut params = CertificateParams::default();

        let mut dn = DistinguishedName::new();
        dn.push(
            DnType::OrganizationName,
            DnValue::Utf8String(self.organization.clone()),
        );
        dn.push(
            DnType::CommonName,
            DnValue::Utf8String(self.common_name.clone()),
        );
        params.distinguished_name = dn;

        for ip in &self.ip_addresses {
            params.subject_alt_names.push(SanType::IpAddress(*ip));
        }
        for name in &self.dns_names {
            let name = Ia5String::try_from(name.clone()).map_err(EnrollError::Csr)?;
            params.subject_alt_names.push(SanType::DnsName(name));
        }

        let csr = params
            .serialize_request(key.signing_key())
            .map_err(EnrollError::Csr)?;
        Ok(csr.der().as_ref().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x509_parser::certification_request::X509CertificationRequest;
    use x509_parser::extensions::{GeneralName, ParsedExtension};
    use x509_parser::oid_registry::OID_SIG_ECDSA_WITH_SHA256;
    use x509_parser::prelude::FromDer;

    #[test]
    fn test_ip_literals_classified_as_ips() {
        let ids = vec![
            "10.0.0.5".to_string(),
            "192.168.1.255".to_string(),
            "::1".to_string(),
            "fe80::2".to_string(),
        ];
        let request = EnrollmentRequest::new("client-01", &ids);

        assert_eq!(request.ip_addresses.len(), 4);
        assert!(request.dns_names.is_empty());
    }

    #[test]
    fn test_non_ips_fall_through_to_dns() {
        let ids = vec![
            "client-01.internal".to_string(),
            "localhost".to_string(),
            // Syntactically invalid as an IP, passes through as a DNS name.
            "10.0.0.256".to_string(),
            "10.0.0".to_string(),
        ];
        let request = EnrollmentRequest::new("client-01", &ids);

        assert!(request.ip_addresses.is_empty());
        assert_eq!(
            request.dns_names,
            vec!["client-01.internal", "localhost", "10.0.0.256", "10.0.0"]
        );
    }

    #[test]
    fn test_order_preserved_and_duplicates_kept() {
        let ids = vec![
            "b.example".to_string(),
            "a.example".to_string(),
            "b.example".to_string(),
        ];
        let request = EnrollmentRequest::new("cn", &ids);
        assert_eq!(request.dns_names, vec!["b.example", "a.example", "b.example"]);
    }

    #[test]
    fn test_default_subject_and_overrides() {
        let request = EnrollmentRequest::new("client-01", &[]);
        assert_eq!(request.organization, DEFAULT_ORGANIZATION);
        assert_eq!(request.validity_days, 365);

        let request = request.with_organization("Acme").with_validity_days(30);
        assert_eq!(request.organization, "Acme");
        assert_eq!(request.validity_days, 30);
    }

    #[test]
    fn test_csr_der_content() {
        let ids = vec!["10.0.0.5".to_string(), "client-01.internal".to_string()];
        let request = EnrollmentRequest::new("client-01", &ids);
        let key = KeyPair::generate().unwrap();
        let der = request.encode_csr(&key).unwrap();

        let (_, csr) = X509CertificationRequest::from_der(&der).unwrap();
        csr.verify_signature().expect("CSR should be self-signed");
        assert_eq!(csr.signature_algorithm.algorithm, OID_SIG_ECDSA_WITH_SHA256);

        let subject = &csr.certification_request_info.subject;
        let cn = subject
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .unwrap();
        assert_eq!(cn, "client-01");
        let org = subject
            .iter_organization()
            .next()
            .and_then(|o| o.as_str().ok())
            .unwrap();
        assert_eq!(org, DEFAULT_ORGANIZATION);

        let mut dns_names = Vec::new();
        let mut ips = Vec::new();
        for ext in csr.requested_extensions().expect("CSR should request SANs") {
            if let ParsedExtension::SubjectAlternativeName(san) = ext {
                for name in &san.general_names {
                    match name {
                        GeneralName::DNSName(dns) => dns_names.push(dns.to_string()),
                        GeneralName::IPAddress(raw) => ips.push(raw.to_vec()),
                        _ => {}
                    }
                }
            }
        }
        assert_eq!(dns_names, vec!["client-01.internal"]);
        assert_eq!(ips, vec![vec![10, 0, 0, 5]]);
    }

    #[test]
    fn test_non_ia5_dns_name_fails_at_encode() {
        let ids = vec!["bücher.example".to_string()];
        let request = EnrollmentRequest::new("client-01", &ids);
        // Classification itself has no failure path.
        assert_eq!(request.dns_names.len(), 1);

        let key = KeyPair::generate().unwrap();
        let result = request.encode_csr(&key);
        assert!(matches!(result, Err(EnrollError::Csr(_))));
    }
}
