//! Typed results of path resolution.

use std::fmt;

use crate::certificate::Certificate;

/// The closed set of value kinds a path can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    String,
    Certificate,
    Document,
}

impl ValueKind {
    /// Stable type tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Integer => "INT",
            Self::String => "STRING",
            Self::Certificate => "X509CERT",
            Self::Document => "DOCUMENT",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A member document handed out without interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueDocument {
    /// Format identifier of the document (e.g. `delegation`).
    pub document_type: String,
    /// Container member the text was taken from.
    pub member: String,
    pub content: String,
}

/// Result of resolving one path. The variant is the type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    Integer(i64),
    String(String),
    Certificate(Certificate),
    Document(OpaqueDocument),
}

impl ResolvedValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::String(_) => ValueKind::String,
            Self::Certificate(_) => ValueKind::Certificate,
            Self::Document(_) => ValueKind::Document,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind().tag()
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_certificate(&self) -> Option<&Certificate> {
        match self {
            Self::Certificate(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&OpaqueDocument> {
        match self {
            Self::Document(d) => Some(d),
            _ => None,
        }
    }
}

impl From<i64> for ResolvedValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<String> for ResolvedValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for ResolvedValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Certificate> for ResolvedValue {
    fn from(c: Certificate) -> Self {
        Self::Certificate(c)
    }
}

/// Human-readable form used by the CLI.
impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
            Self::Certificate(c) => write!(f, "{} ({})", c.subject(), c.fingerprint()),
            Self::Document(d) => write!(f, "{} document from {}", d.document_type, d.member),
        }
    }
}
