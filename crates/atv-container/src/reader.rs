//! Opening transaction archives.
//!
//! The whole archive is read into memory. Member paths are validated, sizes
//! and counts are bounded by [`ArchiveLimits`], and the signature manifest is
//! parsed strictly.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use atv_core::{Certificate, Container, ContainerError, ContainerSignature};
use flate2::read::GzDecoder;

use crate::error::{ArchiveError, ArchiveResult};
use crate::limits::ArchiveLimits;
use crate::manifest::{parse_manifest, SIGNATURES_MEMBER};
use crate::payload::signed_payload;
use crate::signing::verify_payload;

/// An opened, in-memory transaction.
#[derive(Debug, Clone)]
pub struct TransactionContainer {
    /// Member names in archive order, signature manifest excluded.
    order: Vec<String>,
    members: HashMap<String, Vec<u8>>,
    signatures: Vec<ContainerSignature>,
}

impl TransactionContainer {
    /// Open an archive with default limits.
    pub fn open<R: Read>(reader: R) -> ArchiveResult<Self> {
        Self::open_with_limits(reader, ArchiveLimits::default())
    }

    pub fn open_path(path: &Path) -> ArchiveResult<Self> {
        let file = File::open(path).map_err(|e| ArchiveError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::open(file)
    }

    pub fn open_with_limits<R: Read>(reader: R, limits: ArchiveLimits) -> ArchiveResult<Self> {
        let mut buffer = Vec::new();
        reader
            .take(limits.max_archive_bytes.saturating_add(1))
            .read_to_end(&mut buffer)?;
        if buffer.len() as u64 > limits.max_archive_bytes {
            return Err(ArchiveError::ArchiveTooLarge {
                limit: limits.max_archive_bytes,
            });
        }

        let mut archive = tar::Archive::new(GzDecoder::new(Cursor::new(&buffer)));
        let mut order = Vec::new();
        let mut members = HashMap::new();
        let mut manifest = None;

        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let raw = entry.path()?.to_string_lossy().to_string();
            let name = validate_member_path(&raw)?;

            let size = entry.header().size()?;
            if size > limits.max_member_bytes {
                return Err(ArchiveError::MemberTooLarge {
                    name,
                    size,
                    limit: limits.max_member_bytes,
                });
            }

            let mut data = Vec::new();
            entry
                .by_ref()
                .take(limits.max_member_bytes)
                .read_to_end(&mut data)?;

            if name == SIGNATURES_MEMBER {
                if manifest.replace(data).is_some() {
                    return Err(ArchiveError::DuplicateMember { name });
                }
                continue;
            }

            if members.contains_key(&name) {
                return Err(ArchiveError::DuplicateMember { name });
            }
            if members.len() >= limits.max_members {
                return Err(ArchiveError::TooManyMembers {
                    limit: limits.max_members,
                });
            }
            order.push(name.clone());
            members.insert(name, data);
        }

        let signatures = match manifest {
            Some(bytes) => parse_manifest(&bytes)?,
            None => Vec::new(),
        };

        tracing::debug!(
            members = order.len(),
            signatures = signatures.len(),
            "opened transaction"
        );

        Ok(Self {
            order,
            members,
            signatures,
        })
    }

    /// Raw member bytes.
    pub fn member(&self, name: &str) -> Option<&[u8]> {
        self.members.get(name).map(Vec::as_slice)
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }
}

impl Container for TransactionContainer {
    fn extract_member_text(&self, name: &str) -> Option<String> {
        let bytes = self.members.get(name)?;
        match String::from_utf8(bytes.clone()) {
            Ok(text) => Some(text),
            Err(_) => {
                tracing::warn!(member = %name, "member is not UTF-8 text");
                None
            }
        }
    }

    fn list_members(&self) -> Vec<String> {
        self.order.clone()
    }

    fn signing_certificate(&self) -> Option<Certificate> {
        self.signatures.first().map(|s| s.certificate.clone())
    }

    fn signatures(&self) -> Vec<ContainerSignature> {
        self.signatures.clone()
    }

    fn verify_signature(
        &self,
        certificate: &Certificate,
        signature: &ContainerSignature,
    ) -> Result<bool, ContainerError> {
        if &signature.certificate != certificate {
            return Err(ContainerError::CertificateMismatch {
                subject: certificate.subject().to_string(),
            });
        }

        let mut range = Vec::with_capacity(signature.signed_members.len());
        for name in &signature.signed_members {
            let content = self
                .members
                .get(name)
                .ok_or_else(|| ContainerError::MissingMember { name: name.clone() })?;
            range.push((name.as_str(), content.as_slice()));
        }

        let payload = signed_payload(range);
        let valid = verify_payload(certificate, &payload, &signature.value)
            .map_err(|reason| ContainerError::MalformedSignature { reason })?;

        tracing::debug!(
            signer = %certificate.subject(),
            members = signature.signed_members.len(),
            valid,
            "checked container signature"
        );
        Ok(valid)
    }
}

/// Normalize a member path to POSIX relative form, rejecting anything that
/// could escape the archive root.
pub(crate) fn validate_member_path(path: &str) -> ArchiveResult<String> {
    let invalid = || ArchiveError::InvalidPath {
        path: path.to_string(),
    };

    if path.starts_with('/') || path.contains('\\') {
        return Err(invalid());
    }
    let normalized = path.trim_start_matches("./");
    if normalized.is_empty()
        || normalized
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid());
    }
    Ok(normalized.to_string())
}
