//! Signing certificates.
//!
//! A certificate is an immutable handle over its encoded bytes. The encoding is
//! a JSON document naming the subject, issuer, serial and Ed25519 public key:
//!
//! ```text
//! {"version":1,"subject":"CN=Alice","issuer":"CN=TrustRoot","serial":"01","public_key":"<base64>"}
//! ```
//!
//! Identity is the full encoded byte string. Two certificates with the same
//! subject but different bytes are different certificates.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Current certificate encoding version.
pub const CERTIFICATE_VERSION: u32 = 1;

/// Length of an Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Certificate decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertificateError {
    #[error("malformed certificate: {reason}")]
    Malformed { reason: String },

    #[error("unsupported certificate version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("invalid public key: {reason}")]
    InvalidPublicKey { reason: String },
}

/// Parsed certificate fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateInfo {
    pub version: u32,
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    /// Base64 (standard alphabet) Ed25519 public key.
    pub public_key: String,
}

impl CertificateInfo {
    pub fn new(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        serial: impl Into<String>,
        public_key: &[u8; PUBLIC_KEY_LEN],
    ) -> Self {
        Self {
            version: CERTIFICATE_VERSION,
            subject: subject.into(),
            issuer: issuer.into(),
            serial: serial.into(),
            public_key: BASE64.encode(public_key),
        }
    }
}

/// An immutable certificate handle.
#[derive(Clone)]
pub struct Certificate {
    encoded: Arc<[u8]>,
    info: Arc<CertificateInfo>,
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl Certificate {
    /// Decode a certificate from its encoded bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CertificateError> {
        let info: CertificateInfo =
            serde_json::from_slice(bytes).map_err(|e| CertificateError::Malformed {
                reason: e.to_string(),
            })?;

        if info.version != CERTIFICATE_VERSION {
            return Err(CertificateError::UnsupportedVersion {
                version: info.version,
            });
        }

        let key_bytes =
            BASE64
                .decode(&info.public_key)
                .map_err(|e| CertificateError::InvalidPublicKey {
                    reason: e.to_string(),
                })?;
        let public_key: [u8; PUBLIC_KEY_LEN] =
            key_bytes
                .as_slice()
                .try_into()
                .map_err(|_| CertificateError::InvalidPublicKey {
                    reason: format!(
                        "expected {} bytes, got {}",
                        PUBLIC_KEY_LEN,
                        key_bytes.len()
                    ),
                })?;

        Ok(Self {
            encoded: Arc::from(bytes),
            info: Arc::new(info),
            public_key,
        })
    }

    /// Decode a certificate carried as base64 text (e.g. embedded in XML).
    pub fn from_base64(text: &str) -> Result<Self, CertificateError> {
        let bytes = BASE64
            .decode(text.trim())
            .map_err(|e| CertificateError::Malformed {
                reason: format!("invalid base64: {}", e),
            })?;
        Self::from_bytes(&bytes)
    }

    /// Encode certificate fields into a new certificate.
    pub fn from_info(info: &CertificateInfo) -> Result<Self, CertificateError> {
        let bytes = serde_json::to_vec(info).map_err(|e| CertificateError::Malformed {
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.encoded)
    }

    pub fn info(&self) -> &CertificateInfo {
        &self.info
    }

    pub fn subject(&self) -> &str {
        &self.info.subject
    }

    pub fn issuer(&self) -> &str {
        &self.info.issuer
    }

    pub fn serial(&self) -> &str {
        &self.info.serial
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// `sha256:<hex>` over the encoded bytes.
    pub fn fingerprint(&self) -> String {
        format!("sha256:{}", hex::encode(Sha256::digest(&self.encoded)))
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl Eq for Certificate {}

impl Hash for Certificate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoded.hash(state);
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.info.subject)
            .field("issuer", &self.info.issuer)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(subject: &str, key: u8) -> CertificateInfo {
        CertificateInfo::new(subject, "CN=TrustRoot", "01", &[key; PUBLIC_KEY_LEN])
    }

    #[test]
    fn decode_encoded_certificate() {
        let cert = Certificate::from_info(&info("CN=Alice", 7)).unwrap();
        assert_eq!(cert.subject(), "CN=Alice");
        assert_eq!(cert.issuer(), "CN=TrustRoot");
        assert_eq!(cert.public_key(), &[7u8; PUBLIC_KEY_LEN]);
        assert!(cert.fingerprint().starts_with("sha256:"));

        let again = Certificate::from_base64(&cert.to_base64()).unwrap();
        assert_eq!(again, cert);
    }

    #[test]
    fn equality_is_bytewise_not_by_subject() {
        // Same subject, different key: an impersonation attempt must not compare equal.
        let genuine = Certificate::from_info(&info("CN=Alice", 1)).unwrap();
        let impostor = Certificate::from_info(&info("CN=Alice", 2)).unwrap();
        assert_eq!(genuine.subject(), impostor.subject());
        assert_ne!(genuine, impostor);
    }

    #[test]
    fn rejects_short_public_key() {
        let mut bad = info("CN=Alice", 1);
        bad.public_key = BASE64.encode([1u8; 16]);
        let bytes = serde_json::to_vec(&bad).unwrap();
        assert!(matches!(
            Certificate::from_bytes(&bytes),
            Err(CertificateError::InvalidPublicKey { .. })
        ));
    }

    #[test]
    fn rejects_unknown_version_and_fields() {
        let mut future = info("CN=Alice", 1);
        future.version = 2;
        let bytes = serde_json::to_vec(&future).unwrap();
        assert!(matches!(
            Certificate::from_bytes(&bytes),
            Err(CertificateError::UnsupportedVersion { version: 2 })
        ));

        let extra = br#"{"version":1,"subject":"a","issuer":"b","serial":"1","public_key":"AA==","admin":true}"#;
        assert!(matches!(
            Certificate::from_bytes(extra),
            Err(CertificateError::Malformed { .. })
        ));
    }
}
