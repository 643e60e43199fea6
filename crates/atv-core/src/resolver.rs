//! Path traversal for Exists, Resolve and Render.
//!
//! Each operation is satisfied at the current handler when the path names a
//! local value, otherwise the leading segment selects a child handler and the
//! operation recurses with the tail.

use crate::config::DEFAULT_MAX_PATH_DEPTH;
use crate::error::{EngineError, ErrorKind};
use crate::handler::{ChildError, FormatHandler};
use crate::path::{display_segments, Path};
use crate::value::ResolvedValue;

/// Output of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Number of path segments consumed, delegation included.
    pub consumed: usize,
    pub lines: Vec<String>,
}

impl Rendered {
    fn line(line: String) -> Self {
        Self {
            consumed: 1,
            lines: vec![line],
        }
    }

    fn delegated(mut self) -> Self {
        self.consumed += 1;
        self
    }
}

impl From<ChildError> for EngineError {
    fn from(err: ChildError) -> Self {
        match &err {
            ChildError::Unknown { .. } => EngineError::path_not_found(err.to_string()),
            ChildError::Failed { .. } => {
                EngineError::new(ErrorKind::InitializationFailure, err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    max_depth: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PATH_DEPTH)
    }
}

impl Resolver {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn check_depth(&self, path: &Path) -> Result<(), EngineError> {
        if path.len() > self.max_depth {
            return Err(EngineError::path_not_found(format!(
                "path {} exceeds maximum depth {}",
                path, self.max_depth
            )));
        }
        Ok(())
    }

    /// Whether `query` exists below `path`. Never fails.
    pub fn exists(&self, handler: &FormatHandler, path: &Path, query: &str) -> bool {
        if self.check_depth(path).is_err() {
            return false;
        }
        let found = exists_at(handler, path.segments(), query);
        tracing::debug!(path = %path, query = %query, found, "exists");
        found
    }

    /// Typed value at `path`, `None` when absent. Never fails.
    pub fn resolve(&self, handler: &FormatHandler, path: &Path) -> Option<ResolvedValue> {
        if self.check_depth(path).is_err() {
            return None;
        }
        let value = resolve_at(handler, path.segments());
        tracing::debug!(
            path = %path,
            kind = value.as_ref().map(|v| v.type_tag()).unwrap_or("absent"),
            "resolve"
        );
        value
    }

    /// Report lines for `path`.
    pub fn render(&self, handler: &FormatHandler, path: &Path) -> Result<Rendered, EngineError> {
        self.check_depth(path)?;
        render_at(handler, path.segments())
    }

    /// Render `path` into the handler's report: PRINT lines on success, one
    /// FAILED line otherwise.
    pub fn print(&self, handler: &FormatHandler, path: &Path) -> bool {
        match self.render(handler, path) {
            Ok(rendered) => {
                for line in rendered.lines {
                    handler.report().print(line);
                }
                true
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "path not printable");
                handler
                    .report()
                    .failed(format!("Path {} not available: {}", path, e.message));
                false
            }
        }
    }
}

fn exists_at(handler: &FormatHandler, path: &[String], query: &str) -> bool {
    match path.split_first() {
        None => handler.has_local(query),
        Some((segment, rest)) => match handler.child(segment) {
            Ok(child) => exists_at(&child, rest, query),
            Err(e) => {
                tracing::debug!(segment = %segment, error = %e, "exists: no child");
                false
            }
        },
    }
}

fn resolve_at(handler: &FormatHandler, path: &[String]) -> Option<ResolvedValue> {
    match path {
        [] => None,
        [field] => handler.resolve_local(field),
        [segment, rest @ ..] => match handler.child(segment) {
            Ok(child) => resolve_at(&child, rest),
            Err(e) => {
                tracing::debug!(segment = %segment, error = %e, "resolve: no child");
                None
            }
        },
    }
}

fn render_at(handler: &FormatHandler, path: &[String]) -> Result<Rendered, EngineError> {
    if let [field] = path {
        if let Some(line) = handler.render_local(field) {
            return Ok(Rendered::line(line));
        }
    }

    let (segment, rest) = path.split_first().ok_or_else(|| {
        EngineError::path_not_found(format!("nothing printable in {}", handler.format_id()))
    })?;

    let child = handler.child(segment).map_err(EngineError::from)?;
    tracing::debug!(
        segment = %segment,
        rest = %display_segments(rest),
        format = %child.format_id(),
        "render: delegating"
    );
    render_at(&child, rest).map(Rendered::delegated)
}
