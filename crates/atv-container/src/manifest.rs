//! `META-INF/signatures.json`: the signatures carried by a transaction.
//!
//! ```json
//! [
//!   {
//!     "certificate": "<base64 certificate>",
//!     "members": ["bid.xml"],
//!     "signature": "<base64 ed25519 signature>"
//!   }
//! ]
//! ```

use atv_core::{Certificate, ContainerSignature};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};

/// Archive path of the signature manifest.
pub const SIGNATURES_MEMBER: &str = "META-INF/signatures.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SignatureRecord {
    certificate: String,
    members: Vec<String>,
    signature: String,
}

impl SignatureRecord {
    fn from_signature(signature: &ContainerSignature) -> Self {
        Self {
            certificate: signature.certificate.to_base64(),
            members: signature.signed_members.clone(),
            signature: BASE64.encode(&signature.value),
        }
    }

    fn into_signature(self, index: usize) -> ArchiveResult<ContainerSignature> {
        let malformed = |reason: String| ArchiveError::MalformedSignatures {
            reason: format!("signature {}: {}", index, reason),
        };

        let certificate =
            Certificate::from_base64(&self.certificate).map_err(|e| malformed(e.to_string()))?;
        let value = BASE64
            .decode(&self.signature)
            .map_err(|e| malformed(format!("invalid base64 signature: {}", e)))?;
        if self.members.is_empty() {
            return Err(malformed("no signed members".to_string()));
        }

        Ok(ContainerSignature {
            certificate,
            signed_members: self.members,
            value,
        })
    }
}

pub(crate) fn parse_manifest(bytes: &[u8]) -> ArchiveResult<Vec<ContainerSignature>> {
    let records: Vec<SignatureRecord> =
        serde_json::from_slice(bytes).map_err(|e| ArchiveError::MalformedSignatures {
            reason: e.to_string(),
        })?;

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_signature(i))
        .collect()
}

pub(crate) fn encode_manifest(signatures: &[ContainerSignature]) -> ArchiveResult<Vec<u8>> {
    let records: Vec<SignatureRecord> = signatures
        .iter()
        .map(SignatureRecord::from_signature)
        .collect();
    serde_json::to_vec_pretty(&records).map_err(|e| ArchiveError::MalformedSignatures {
        reason: e.to_string(),
    })
}
