//! Signed transaction containers.
//!
//! A transaction is a deterministic `.tar.gz` holding member documents and a
//! signature manifest (`META-INF/signatures.json`). Each signature names the
//! members it covers and embeds the signer's certificate. Signatures are
//! Ed25519 over a length-prefixed encoding of the members' SHA-256 digests
//! (see [`payload`]).
//!
//! [`TransactionContainer`] implements [`atv_core::Container`];
//! [`TransactionWriter`] seals new transactions.
//!
//! ```no_run
//! use atv_container::{CertificateBuilder, TransactionContainer, TransactionWriter};
//! use ed25519_dalek::SigningKey;
//!
//! # fn example() -> anyhow::Result<()> {
//! let key = SigningKey::from_bytes(&[1; 32]);
//! let cert = CertificateBuilder::new("CN=Alice").build(&key.verifying_key())?;
//!
//! let mut writer = TransactionWriter::new();
//! writer.add_member("contract.txt", "Hello")?;
//! writer.sign_all(&key, &cert)?;
//! let bytes = writer.to_bytes()?;
//!
//! let container = TransactionContainer::open(bytes.as_slice())?;
//! assert!(container.is_signed());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod limits;
pub mod manifest;
pub mod payload;
pub mod reader;
pub mod signing;
pub mod writer;

pub use error::{ArchiveError, ArchiveResult};
pub use limits::ArchiveLimits;
pub use manifest::SIGNATURES_MEMBER;
pub use payload::signed_payload;
pub use reader::TransactionContainer;
pub use signing::{
    certificate_matches_key, load_certificate, load_signing_key_pem, load_verifying_key_pem,
    CertificateBuilder,
};
pub use writer::TransactionWriter;
