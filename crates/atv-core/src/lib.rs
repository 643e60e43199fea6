//! Path-addressed resolution and verification over signed trust transactions.
//!
//! A transaction container bundles member documents (contracts, bids,
//! delegation proofs, certificates). This crate addresses any value in that
//! nested structure by a dotted path and provides four operations:
//!
//! - **exists**: whether a query names a value below a path
//! - **resolve**: the typed value at a path ([`ResolvedValue`])
//! - **print**: report lines rendering a path
//! - **verify_signature**: whether the document at one path is signed by the
//!   certificate found at another
//!
//! ```text
//! bid                            -> INT        theAuctionHouse2019
//! certificate.subject            -> STRING     certificate
//! delegation.certificate         -> X509CERT   delegation
//! delegation.certificate.format  -> STRING     certificate
//! ```
//!
//! The container itself is reached only through the [`Container`] trait.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `ATV_REQUIRE_MATCHING_SIGNATURE` | Fail bindings without a signature by the certificate |
//! | `ATV_MAX_PATH_DEPTH` | Maximum path depth (default: 32) |
//! | `ATV_ROOT_FORMAT` | Root format; detected when unset |

pub mod binder;
pub mod certificate;
pub mod config;
pub mod container;
pub mod decode;
pub mod error;
pub mod format;
pub mod handler;
pub mod path;
pub mod report;
pub mod resolver;
pub mod session;
pub mod value;

#[cfg(test)]
mod testing;

pub use binder::{BindingOutcome, SignatureBinder};
pub use certificate::{Certificate, CertificateError, CertificateInfo};
pub use config::{UnmatchedSignaturePolicy, VerifierConfig};
pub use container::{Container, ContainerError, ContainerSignature};
pub use decode::{decode_xml, DecodeError};
pub use error::{EngineError, ErrorKind, InitError};
pub use format::{FormatInput, FormatRegistry, ParsedDocument, SignatureScope, QUERY_FORMAT};
pub use handler::{ChildError, FormatHandler, HandlerContext, HandlerRegistry};
pub use path::{Path, PathError};
pub use report::{Report, ReportLine, ReportObserver, ReportStatus};
pub use resolver::{Rendered, Resolver};
pub use session::VerificationSession;
pub use value::{OpaqueDocument, ResolvedValue, ValueKind};
