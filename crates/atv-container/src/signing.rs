//! Ed25519 keys and certificates for sealing transactions.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use atv_core::{Certificate, CertificateError, CertificateInfo};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

/// Issues certificates in the verifier's encoding for an Ed25519 key.
#[derive(Debug, Clone)]
pub struct CertificateBuilder {
    subject: String,
    issuer: Option<String>,
    serial: Option<String>,
}

impl CertificateBuilder {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            issuer: None,
            serial: None,
        }
    }

    /// Issuer name. Defaults to the subject (self-issued).
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Serial number. Defaults to the first 8 bytes of the key's SHA-256, in hex.
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn build(self, key: &VerifyingKey) -> Result<Certificate, CertificateError> {
        let public_key = key.to_bytes();
        let serial = self.serial.unwrap_or_else(|| {
            let digest = Sha256::digest(public_key);
            hex::encode(&digest.as_slice()[..8])
        });
        let issuer = self.issuer.unwrap_or_else(|| self.subject.clone());

        let info = CertificateInfo::new(self.subject, issuer, serial, &public_key);
        Certificate::from_info(&info)
    }
}

/// Whether `certificate` carries the public half of `key`.
pub fn certificate_matches_key(certificate: &Certificate, key: &SigningKey) -> bool {
    certificate.public_key() == key.verifying_key().as_bytes()
}

pub(crate) fn sign_payload(key: &SigningKey, payload: &[u8]) -> Vec<u8> {
    key.sign(payload).to_bytes().to_vec()
}

/// Verify an Ed25519 signature over `payload` with the certificate's key.
pub(crate) fn verify_payload(
    certificate: &Certificate,
    payload: &[u8],
    signature: &[u8],
) -> Result<bool, String> {
    let key = VerifyingKey::from_bytes(certificate.public_key())
        .map_err(|e| format!("invalid public key in certificate: {}", e))?;
    let signature =
        Signature::from_slice(signature).map_err(|e| format!("invalid signature bytes: {}", e))?;
    Ok(key.verify(payload, &signature).is_ok())
}

/// Load a signing key from a PKCS#8 PEM file.
pub fn load_signing_key_pem(path: &Path) -> Result<SigningKey> {
    use pkcs8::DecodePrivateKey;

    let pem = fs::read_to_string(path)
        .with_context(|| format!("failed to read private key: {}", path.display()))?;

    SigningKey::from_pkcs8_pem(&pem)
        .with_context(|| format!("failed to parse private key PEM: {}", path.display()))
}

/// Load a verifying key from an SPKI PEM file.
pub fn load_verifying_key_pem(path: &Path) -> Result<VerifyingKey> {
    use pkcs8::DecodePublicKey;

    let pem = fs::read_to_string(path)
        .with_context(|| format!("failed to read public key: {}", path.display()))?;

    VerifyingKey::from_public_key_pem(&pem)
        .with_context(|| format!("failed to parse public key PEM: {}", path.display()))
}

/// Load a certificate from its encoded form.
pub fn load_certificate(path: &Path) -> Result<Certificate> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read certificate: {}", path.display()))?;
    Certificate::from_bytes(&bytes)
        .with_context(|| format!("failed to parse certificate: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn builds_self_issued_certificate() {
        let key = key(1);
        let cert = CertificateBuilder::new("CN=Alice")
            .build(&key.verifying_key())
            .unwrap();
        assert_eq!(cert.subject(), "CN=Alice");
        assert_eq!(cert.issuer(), "CN=Alice");
        assert_eq!(cert.serial().len(), 16);
        assert!(certificate_matches_key(&cert, &key));

        let same = CertificateBuilder::new("CN=Alice")
            .build(&key.verifying_key())
            .unwrap();
        assert_eq!(cert, same);
    }

    #[test]
    fn explicit_issuer_and_serial() {
        let cert = CertificateBuilder::new("CN=Bob")
            .issuer("CN=Auction House CA")
            .serial("2a")
            .build(&key(2).verifying_key())
            .unwrap();
        assert_eq!(cert.issuer(), "CN=Auction House CA");
        assert_eq!(cert.serial(), "2a");
        assert!(!certificate_matches_key(&cert, &key(3)));
    }

    #[test]
    fn sign_and_verify_payload() {
        let key = key(4);
        let cert = CertificateBuilder::new("CN=Carol")
            .build(&key.verifying_key())
            .unwrap();
        let signature = sign_payload(&key, b"payload");

        assert_eq!(verify_payload(&cert, b"payload", &signature), Ok(true));
        assert_eq!(verify_payload(&cert, b"tampered", &signature), Ok(false));
        assert!(verify_payload(&cert, b"payload", &signature[..10]).is_err());
    }

    #[test]
    fn pem_roundtrip() {
        use pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

        let dir = tempfile::tempdir().unwrap();
        let key = SigningKey::generate(&mut rand::thread_rng());
        let private_path = dir.path().join("private_key.pem");
        let public_path = dir.path().join("public_key.pem");
        fs::write(
            &private_path,
            key.to_pkcs8_pem(LineEnding::LF).unwrap().as_bytes(),
        )
        .unwrap();
        fs::write(
            &public_path,
            key.verifying_key().to_public_key_pem(LineEnding::LF).unwrap(),
        )
        .unwrap();

        assert_eq!(
            load_signing_key_pem(&private_path).unwrap().to_bytes(),
            key.to_bytes()
        );
        assert_eq!(load_verifying_key_pem(&public_path).unwrap(), key.verifying_key());

        let err = load_signing_key_pem(&dir.path().join("missing.pem")).unwrap_err();
        assert!(err.to_string().contains("failed to read private key"));
    }

    #[test]
    fn load_certificate_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let cert = CertificateBuilder::new("CN=Dave")
            .build(&key(5).verifying_key())
            .unwrap();
        let path = dir.path().join("certificate.json");
        fs::write(&path, cert.encoded()).unwrap();
        assert_eq!(load_certificate(&path).unwrap(), cert);

        fs::write(&path, b"not a certificate").unwrap();
        let err = load_certificate(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse certificate"));
    }
}
