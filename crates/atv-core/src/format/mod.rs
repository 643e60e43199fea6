//! Document formats.
//!
//! Each supported format is one variant of [`ParsedDocument`] and implements
//! [`DocumentFormat`], which only covers the local cases: the fields it owns,
//! how to render them, which segments name child documents and which
//! signatures cover it. Path traversal is shared (see [`crate::resolver`]).
//!
//! [`FormatRegistry`] maps format identifiers to constructors. Root-capable
//! formats take part in format detection, in registration order.

pub mod auction_house;
pub mod certificate;
pub mod delegation;
pub mod simple_contract;

use std::fmt;

use crate::certificate::Certificate;
use crate::container::Container;
use crate::error::InitError;
use crate::value::ResolvedValue;

pub use auction_house::AuctionBid;
pub use certificate::CertificateDocument;
pub use delegation::Delegation;
pub use simple_contract::SimpleContract;

/// Reserved query every handler answers with its own format identifier.
pub const QUERY_FORMAT: &str = "format";

/// What a handler is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatInput {
    /// The transaction itself.
    Container,
    /// A named member document.
    Member(String),
    /// A certificate found elsewhere in the tree.
    Certificate(Certificate),
}

impl fmt::Display for FormatInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => f.write_str("container"),
            Self::Member(name) => write!(f, "member {}", name),
            Self::Certificate(c) => write!(f, "certificate {}", c.subject()),
        }
    }
}

/// How to construct the child handler behind a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildBinding {
    pub format: &'static str,
    pub input: FormatInput,
}

impl ChildBinding {
    pub fn new(format: &'static str, input: FormatInput) -> Self {
        Self { format, input }
    }
}

/// Which container signatures sign a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureScope {
    /// Signatures whose signed members include this member.
    Member(String),
    /// Not a signed artifact.
    Unsigned,
}

/// Local behaviour of one document format.
pub trait DocumentFormat {
    fn format_id(&self) -> &'static str;

    /// One-segment fields owned by this format, excluding [`QUERY_FORMAT`].
    fn fields(&self) -> &'static [&'static str];

    fn resolve_field(&self, field: &str, container: &dyn Container) -> Option<ResolvedValue>;

    /// Report line for a field, `None` if the field is not printable here.
    fn render_field(&self, field: &str, container: &dyn Container) -> Option<String>;

    /// Child document behind `segment`, if any.
    fn child(&self, segment: &str, container: &dyn Container) -> Option<ChildBinding>;

    fn signature_scope(&self) -> SignatureScope;
}

/// A parsed document of one of the supported formats.
#[derive(Debug, Clone)]
pub enum ParsedDocument {
    SimpleContract(SimpleContract),
    AuctionBid(AuctionBid),
    Certificate(CertificateDocument),
    Delegation(Delegation),
}

impl ParsedDocument {
    pub fn as_format(&self) -> &dyn DocumentFormat {
        match self {
            Self::SimpleContract(d) => d as &dyn DocumentFormat,
            Self::AuctionBid(d) => d,
            Self::Certificate(d) => d,
            Self::Delegation(d) => d,
        }
    }

    pub fn format_id(&self) -> &'static str {
        self.as_format().format_id()
    }
}

/// Builds a parsed document from its input.
pub type Constructor = fn(&dyn Container, &FormatInput) -> Result<ParsedDocument, InitError>;

#[derive(Clone)]
struct FormatEntry {
    id: String,
    constructor: Constructor,
    root: bool,
}

/// Format identifier to constructor table.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    entries: Vec<FormatEntry>,
}

impl FormatRegistry {
    /// Registry without formats.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with all built-in formats.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        let builtin: [(&str, Constructor, bool); 4] = [
            (simple_contract::FORMAT_ID, simple_contract::construct, true),
            (auction_house::FORMAT_ID, auction_house::construct, true),
            (certificate::FORMAT_ID, certificate::construct, false),
            (delegation::FORMAT_ID, delegation::construct, false),
        ];
        for (id, constructor, root) in builtin {
            registry.entries.push(FormatEntry {
                id: id.to_string(),
                constructor,
                root,
            });
        }
        registry
    }

    /// Register a constructor under `id`. `root` formats take part in detection.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        constructor: Constructor,
        root: bool,
    ) -> anyhow::Result<()> {
        let id = id.into();
        if self.entries.iter().any(|e| e.id == id) {
            anyhow::bail!("format id already registered: {id}");
        }
        self.entries.push(FormatEntry {
            id,
            constructor,
            root,
        });
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Registered identifiers in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    /// Root-capable identifiers in detection order.
    pub fn root_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.root)
            .map(|e| e.id.as_str())
            .collect()
    }

    /// Parse a document of format `id`.
    pub fn build(
        &self,
        id: &str,
        container: &dyn Container,
        input: &FormatInput,
    ) -> Result<ParsedDocument, InitError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| InitError::UnknownFormat {
                format: id.to_string(),
            })?;

        tracing::debug!(format = %id, input = %input, "initializing handler");
        (entry.constructor)(container, input)
    }

    /// Try each root format in order; the first that initializes wins.
    pub fn detect(&self, container: &dyn Container) -> Result<ParsedDocument, InitError> {
        let mut attempts = Vec::new();
        for entry in self.entries.iter().filter(|e| e.root) {
            match (entry.constructor)(container, &FormatInput::Container) {
                Ok(document) => {
                    tracing::info!(format = %entry.id, "detected transaction format");
                    return Ok(document);
                }
                Err(e) => {
                    tracing::debug!(format = %entry.id, error = %e, "format rejected container");
                    attempts.push(format!("{}: {}", entry.id, e));
                }
            }
        }
        Err(InitError::Undetected { attempts })
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.ids())
            .finish()
    }
}

/// Extract a required member or fail initialization.
pub(crate) fn require_member(
    container: &dyn Container,
    format: &str,
    member: &str,
) -> Result<String, InitError> {
    container
        .extract_member_text(member)
        .ok_or_else(|| InitError::MissingMember {
            format: format.to_string(),
            member: member.to_string(),
        })
}

/// Check the identifier a document declares about itself.
pub(crate) fn check_declared_format(
    member: &str,
    expected: &str,
    declared: &str,
) -> Result<(), InitError> {
    if declared.trim() != expected {
        return Err(InitError::WrongFormat {
            member: member.to_string(),
            expected: expected.to_string(),
            found: declared.trim().to_string(),
        });
    }
    Ok(())
}

pub(crate) fn unsupported_input(format: &str, input: &FormatInput) -> InitError {
    InitError::UnsupportedInput {
        format: format.to_string(),
        input: input.to_string(),
    }
}
