//! Writing signed transaction archives.
//!
//! Output is a deterministic `.tar.gz`: gzip mtime 0, fixed tar headers
//! (mode 0644, uid/gid 0, mtime 0), the signature manifest first and members
//! in sorted order.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use atv_core::{Certificate, ContainerSignature};
use ed25519_dalek::SigningKey;
use flate2::{Compression, GzBuilder};
use tar::{Builder, EntryType, Header};

use crate::error::{ArchiveError, ArchiveResult};
use crate::manifest::{encode_manifest, SIGNATURES_MEMBER};
use crate::payload::signed_payload;
use crate::reader::validate_member_path;
use crate::signing::{certificate_matches_key, sign_payload};

/// Builds a transaction archive in memory.
#[derive(Debug, Default)]
pub struct TransactionWriter {
    members: BTreeMap<String, Vec<u8>>,
    signatures: Vec<ContainerSignature>,
}

impl TransactionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a member.
    pub fn add_member(&mut self, name: &str, data: impl Into<Vec<u8>>) -> ArchiveResult<()> {
        let name = validate_member_path(name)?;
        if name == SIGNATURES_MEMBER {
            return Err(ArchiveError::InvalidPath { path: name });
        }
        self.members.insert(name, data.into());
        Ok(())
    }

    /// Sign `members` with `key`, embedding `certificate`. The members must
    /// already be added; their current contents are what gets signed.
    pub fn sign(
        &mut self,
        key: &SigningKey,
        certificate: &Certificate,
        members: &[&str],
    ) -> ArchiveResult<()> {
        if !certificate_matches_key(certificate, key) {
            return Err(ArchiveError::KeyMismatch {
                subject: certificate.subject().to_string(),
            });
        }
        if members.is_empty() {
            return Err(ArchiveError::MalformedSignatures {
                reason: "no signed members".to_string(),
            });
        }

        let mut range = Vec::with_capacity(members.len());
        for name in members {
            let content = self
                .members
                .get(*name)
                .ok_or_else(|| ArchiveError::UnknownMember {
                    name: name.to_string(),
                })?;
            range.push((*name, content.as_slice()));
        }

        let value = sign_payload(key, &signed_payload(range));
        tracing::debug!(signer = %certificate.subject(), members = members.len(), "signed members");

        self.signatures.push(ContainerSignature {
            certificate: certificate.clone(),
            signed_members: members.iter().map(|m| m.to_string()).collect(),
            value,
        });
        Ok(())
    }

    /// Sign every member added so far.
    pub fn sign_all(&mut self, key: &SigningKey, certificate: &Certificate) -> ArchiveResult<()> {
        let names: Vec<String> = self.members.keys().cloned().collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        self.sign(key, certificate, &names)
    }

    /// Write the archive to `w`.
    pub fn finish<W: Write>(&self, w: W) -> ArchiveResult<()> {
        let gz = GzBuilder::new().mtime(0).write(w, Compression::default());
        let mut tar = Builder::new(gz);
        tar.mode(tar::HeaderMode::Deterministic);

        if !self.signatures.is_empty() {
            write_tar_entry(&mut tar, SIGNATURES_MEMBER, &encode_manifest(&self.signatures)?)?;
        }
        for (name, data) in &self.members {
            write_tar_entry(&mut tar, name, data)?;
        }

        let gz = tar.into_inner()?;
        gz.finish()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> ArchiveResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.finish(&mut buf)?;
        Ok(buf)
    }

    pub fn write_to_path(&self, path: &Path) -> ArchiveResult<()> {
        let file = File::create(path).map_err(|e| ArchiveError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        self.finish(file)
    }
}

fn write_tar_entry<T: Write>(tar: &mut Builder<T>, path: &str, data: &[u8]) -> ArchiveResult<()> {
    let mut header = Header::new_gnu();
    header.set_path(path)?;
    header.set_entry_type(EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    header.set_cksum();
    tar.append(&header, data)?;
    Ok(())
}
