//! Boundary to the transaction container.
//!
//! The engine never reads archive bytes itself. Everything it knows about a
//! transaction comes through [`Container`]: member texts, the member list, the
//! signatures and the byte-level signature check.

use crate::certificate::Certificate;

/// Container errors (transport, parsing, missing data).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("member not found in container: {name}")]
    MissingMember { name: String },

    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: String },

    #[error("signature was not produced by certificate {subject}")]
    CertificateMismatch { subject: String },
}

/// One signature carried by a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSignature {
    /// Certificate embedded with the signature.
    pub certificate: Certificate,
    /// Members covered by the signature, in signing order.
    pub signed_members: Vec<String>,
    /// Raw signature bytes.
    pub value: Vec<u8>,
}

impl ContainerSignature {
    pub fn covers(&self, member: &str) -> bool {
        self.signed_members.iter().any(|m| m == member)
    }
}

/// An opened transaction.
pub trait Container: Send + Sync {
    /// Extract a member as UTF-8 text. `None` if absent or not text.
    fn extract_member_text(&self, name: &str) -> Option<String>;

    /// Member names in archive order.
    fn list_members(&self) -> Vec<String>;

    /// Certificate of the transaction's primary signature.
    fn signing_certificate(&self) -> Option<Certificate>;

    /// All signatures carried by the container.
    fn signatures(&self) -> Vec<ContainerSignature>;

    /// Cryptographically verify `signature` against `certificate`.
    fn verify_signature(
        &self,
        certificate: &Certificate,
        signature: &ContainerSignature,
    ) -> Result<bool, ContainerError>;
}
