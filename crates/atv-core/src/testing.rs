//! In-memory container for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::certificate::{Certificate, CertificateInfo};
use crate::container::{Container, ContainerError, ContainerSignature};

/// Certificate with a deterministic key derived from `seed`.
pub fn test_certificate(subject: &str, seed: u8) -> Certificate {
    let info = CertificateInfo::new(subject, "CN=Test Root", format!("{:02x}", seed), &[seed; 32]);
    Certificate::from_info(&info).unwrap()
}

pub fn signature(certificate: &Certificate, members: &[&str], value: &[u8]) -> ContainerSignature {
    ContainerSignature {
        certificate: certificate.clone(),
        signed_members: members.iter().map(|m| m.to_string()).collect(),
        value: value.to_vec(),
    }
}

pub fn delegation_xml(delegator: &str, proxy: &str, certificate: &Certificate) -> String {
    format!(
        "<delegation><format>delegation</format><delegator>{}</delegator><proxy>{}</proxy>\
         <valid_until>2030-01-01</valid_until><certificate>{}</certificate></delegation>",
        delegator,
        proxy,
        certificate.to_base64()
    )
}

/// Container with scripted signature outcomes. Every signature verifies
/// unless an outcome was set for its value.
#[derive(Default)]
pub struct MemoryContainer {
    members: BTreeMap<String, String>,
    order: Vec<String>,
    signing_certificate: Option<Certificate>,
    signatures: Vec<ContainerSignature>,
    outcomes: HashMap<Vec<u8>, Result<bool, ContainerError>>,
    verify_calls: AtomicUsize,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, name: &str, text: impl Into<String>) -> Self {
        if self.members.insert(name.to_string(), text.into()).is_none() {
            self.order.push(name.to_string());
        }
        self
    }

    /// Override the signing certificate independently of the signatures.
    pub fn with_signing_certificate(mut self, certificate: Certificate) -> Self {
        self.signing_certificate = Some(certificate);
        self
    }

    pub fn with_signature(mut self, signature: ContainerSignature) -> Self {
        self.signatures.push(signature);
        self
    }

    pub fn with_outcome(mut self, value: &[u8], outcome: Result<bool, ContainerError>) -> Self {
        self.outcomes.insert(value.to_vec(), outcome);
        self
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl Container for MemoryContainer {
    fn extract_member_text(&self, name: &str) -> Option<String> {
        self.members.get(name).cloned()
    }

    fn list_members(&self) -> Vec<String> {
        self.order.clone()
    }

    fn signing_certificate(&self) -> Option<Certificate> {
        self.signing_certificate
            .clone()
            .or_else(|| self.signatures.first().map(|s| s.certificate.clone()))
    }

    fn signatures(&self) -> Vec<ContainerSignature> {
        self.signatures.clone()
    }

    fn verify_signature(
        &self,
        certificate: &Certificate,
        signature: &ContainerSignature,
    ) -> Result<bool, ContainerError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if &signature.certificate != certificate {
            return Err(ContainerError::CertificateMismatch {
                subject: certificate.subject().to_string(),
            });
        }
        self.outcomes
            .get(&signature.value)
            .cloned()
            .unwrap_or(Ok(true))
    }
}
