//! Dotted paths addressing values inside a transaction.
//!
//! A path is an ordered sequence of opaque segments. Segments are chosen by the
//! format handlers (field names, child document names) and compared by exact,
//! case-sensitive string equality.

use std::fmt;
use std::str::FromStr;

/// Separator used by the textual form of a path.
pub const SEPARATOR: char = '.';

/// Path parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty segment in path '{input}'")]
    EmptySegment { input: String },
}

/// An ordered sequence of path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Build a path from already separated segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The empty path (addresses the handler itself).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a dotted path. The empty string parses to the empty path.
    pub fn parse(dotted: &str) -> Result<Self, PathError> {
        if dotted.is_empty() {
            return Ok(Self::empty());
        }

        let mut segments = Vec::new();
        for segment in dotted.split(SEPARATOR) {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    input: dotted.to_string(),
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Leading segment, if any.
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Split into the leading segment and the remaining path.
    pub fn split_first(&self) -> Option<(&str, Path)> {
        let (head, tail) = self.segments.split_first()?;
        Some((head.as_str(), Path::new(tail.iter().cloned())))
    }

    /// Returns a new path with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> Path {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Path { segments }
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    pub fn ends_with(&self, suffix: &Path) -> bool {
        self.segments.ends_with(&suffix.segments)
    }
}

/// Render a segment slice in dotted form.
pub(crate) fn display_segments(segments: &[String]) -> String {
    segments.join(".")
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_segments(&self.segments))
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&[&str]> for Path {
    fn from(segments: &[&str]) -> Self {
        Path::new(segments.iter().copied())
    }
}

impl AsRef<[String]> for Path {
    fn as_ref(&self) -> &[String] {
        &self.segments
    }
}
