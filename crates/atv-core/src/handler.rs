//! Format handlers and their child registries.
//!
//! A [`FormatHandler`] owns one parsed document and a [`HandlerRegistry`] of
//! child handlers keyed by path segment. Children are built on first use and
//! kept for the life of the handler, failures included.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::container::Container;
use crate::error::InitError;
use crate::format::{
    DocumentFormat, FormatInput, FormatRegistry, ParsedDocument, SignatureScope, QUERY_FORMAT,
};
use crate::report::Report;
use crate::value::ResolvedValue;

/// Everything a handler shares with its descendants.
#[derive(Clone)]
pub struct HandlerContext {
    container: Arc<dyn Container>,
    report: Report,
    formats: Arc<FormatRegistry>,
}

impl HandlerContext {
    pub fn new(container: Arc<dyn Container>, report: Report, formats: Arc<FormatRegistry>) -> Self {
        Self {
            container,
            report,
            formats,
        }
    }

    pub fn container(&self) -> &dyn Container {
        self.container.as_ref()
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}

/// Failure to obtain a child handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChildError {
    #[error("{format} has no document at '{segment}'")]
    Unknown {
        format: &'static str,
        segment: String,
    },

    #[error("document at '{segment}' failed to initialize: {source}")]
    Failed { segment: String, source: InitError },
}

type Slot = Result<Arc<FormatHandler>, InitError>;

/// Segment to child handler map with at-most-once construction.
#[derive(Default)]
pub struct HandlerRegistry {
    slots: Mutex<HashMap<String, Slot>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handler for `segment`, constructing it with `init` if this is
    /// the first request. The lock is held while `init` runs, so concurrent
    /// callers never construct twice. A failed construction is stored and
    /// returned to every later caller.
    pub fn get_or_init<F>(&self, segment: &str, init: F) -> Slot
    where
        F: FnOnce() -> Result<FormatHandler, InitError>,
    {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(segment) {
            return slot.clone();
        }

        let slot = init().map(Arc::new);
        if let Err(e) = &slot {
            tracing::warn!(segment = %segment, error = %e, "child handler failed to initialize");
        }
        slots.insert(segment.to_string(), slot.clone());
        slot
    }

    /// Previously constructed entry, if any.
    pub fn get(&self, segment: &str) -> Option<Slot> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(segment)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut segments: Vec<&String> = slots.keys().collect();
        segments.sort();
        f.debug_struct("HandlerRegistry")
            .field("segments", &segments)
            .finish()
    }
}

/// A parsed document bound to its container.
pub struct FormatHandler {
    document: ParsedDocument,
    children: HandlerRegistry,
    ctx: HandlerContext,
}

impl FormatHandler {
    /// Initialize a handler of format `format` from `input`.
    pub fn initialize(
        ctx: HandlerContext,
        format: &str,
        input: &FormatInput,
    ) -> Result<Self, InitError> {
        let document = ctx.formats().build(format, ctx.container(), input)?;
        Ok(Self::from_document(ctx, document))
    }

    /// Initialize the root handler with the first root format that accepts the
    /// container.
    pub fn detect(ctx: HandlerContext) -> Result<Self, InitError> {
        let document = ctx.formats().detect(ctx.container())?;
        Ok(Self::from_document(ctx, document))
    }

    fn from_document(ctx: HandlerContext, document: ParsedDocument) -> Self {
        Self {
            document,
            children: HandlerRegistry::new(),
            ctx,
        }
    }

    pub fn format_id(&self) -> &'static str {
        self.document.format_id()
    }

    pub fn document(&self) -> &ParsedDocument {
        &self.document
    }

    pub fn container(&self) -> &dyn Container {
        self.ctx.container()
    }

    pub fn report(&self) -> &Report {
        self.ctx.report()
    }

    pub fn children(&self) -> &HandlerRegistry {
        &self.children
    }

    pub fn signature_scope(&self) -> SignatureScope {
        self.format().signature_scope()
    }

    fn format(&self) -> &dyn DocumentFormat {
        self.document.as_format()
    }

    /// Whether `query` names one of this handler's own values.
    pub fn has_local(&self, query: &str) -> bool {
        query == QUERY_FORMAT || self.format().fields().contains(&query)
    }

    pub fn resolve_local(&self, field: &str) -> Option<ResolvedValue> {
        if field == QUERY_FORMAT {
            return Some(ResolvedValue::String(self.format_id().to_string()));
        }
        self.format().resolve_field(field, self.container())
    }

    pub fn render_local(&self, field: &str) -> Option<String> {
        if field == QUERY_FORMAT {
            return Some(format!("Format: {}", self.format_id()));
        }
        self.format().render_field(field, self.container())
    }

    /// Child handler behind `segment`, built on first use.
    pub fn child(&self, segment: &str) -> Result<Arc<FormatHandler>, ChildError> {
        if let Some(slot) = self.children.get(segment) {
            return slot.map_err(|source| ChildError::Failed {
                segment: segment.to_string(),
                source,
            });
        }

        let binding = self
            .format()
            .child(segment, self.container())
            .ok_or_else(|| ChildError::Unknown {
                format: self.format_id(),
                segment: segment.to_string(),
            })?;

        tracing::debug!(
            parent = %self.format_id(),
            segment = %segment,
            format = %binding.format,
            "resolving child handler"
        );

        self.children
            .get_or_init(segment, || {
                FormatHandler::initialize(self.ctx.clone(), binding.format, &binding.input)
            })
            .map_err(|source| ChildError::Failed {
                segment: segment.to_string(),
                source,
            })
    }
}

impl fmt::Debug for FormatHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatHandler")
            .field("format", &self.format_id())
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_certificate, MemoryContainer};

    fn context(container: MemoryContainer) -> HandlerContext {
        HandlerContext::new(
            Arc::new(container),
            Report::new(),
            Arc::new(FormatRegistry::builtin()),
        )
    }

    fn auction() -> FormatHandler {
        let container = MemoryContainer::new()
            .with_member(
                "bid.xml",
                "<form><format>theAuctionHouse2019</format><bid>42</bid><lot_number>7</lot_number></form>",
            )
            .with_signing_certificate(test_certificate("CN=Alice", 1));
        FormatHandler::initialize(context(container), "theAuctionHouse2019", &FormatInput::Container)
            .unwrap()
    }

    #[test]
    fn local_values_include_format_query() {
        let handler = auction();
        assert!(handler.has_local("bid"));
        assert!(handler.has_local("format"));
        assert!(!handler.has_local("unknown"));
        assert_eq!(
            handler.resolve_local("format"),
            Some(ResolvedValue::String("theAuctionHouse2019".into()))
        );
        assert_eq!(
            handler.render_local("format").as_deref(),
            Some("Format: theAuctionHouse2019")
        );
    }

    #[test]
    fn child_is_memoized() {
        let handler = auction();
        let first = handler.child("certificate").unwrap();
        let second = handler.child("certificate").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(handler.children().len(), 1);
    }

    #[test]
    fn unknown_child_is_not_cached() {
        let handler = auction();
        let err = handler.child("lot_number").unwrap_err();
        assert!(matches!(err, ChildError::Unknown { .. }));
        assert!(handler.children().is_empty());
    }

    #[test]
    fn failed_child_is_cached() {
        let container = MemoryContainer::new().with_member("contract.txt", "Hello");
        let handler =
            FormatHandler::initialize(context(container), "simpleContract", &FormatInput::Container)
                .unwrap();

        let err = handler.child("certificate").unwrap_err();
        assert!(matches!(
            err,
            ChildError::Failed {
                source: InitError::MissingCertificate { .. },
                ..
            }
        ));
        assert!(matches!(handler.children().get("certificate"), Some(Err(_))));
        assert_eq!(handler.child("certificate").unwrap_err(), err);
    }

    #[test]
    fn registry_constructs_at_most_once() {
        let registry = HandlerRegistry::new();
        let handler = auction();
        let ctx = handler.ctx.clone();
        let mut calls = 0;

        for _ in 0..3 {
            registry
                .get_or_init("c", || {
                    calls += 1;
                    FormatHandler::initialize(ctx.clone(), "certificate", &FormatInput::Container)
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn concurrent_lookups_share_one_child() {
        let handler = Arc::new(auction());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handler = Arc::clone(&handler);
                std::thread::spawn(move || handler.child("certificate").unwrap())
            })
            .collect();
        let children: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();
        for child in &children[1..] {
            assert!(Arc::ptr_eq(&children[0], child));
        }
    }
}
