//! One verification session per transaction.

use std::sync::Arc;

use crate::binder::{BindingOutcome, SignatureBinder};
use crate::config::VerifierConfig;
use crate::container::Container;
use crate::error::{EngineError, InitError};
use crate::format::{FormatInput, FormatRegistry};
use crate::handler::{FormatHandler, HandlerContext};
use crate::path::Path;
use crate::report::Report;
use crate::resolver::{Rendered, Resolver};
use crate::value::ResolvedValue;

/// Entry point: owns the root handler for one container.
#[derive(Debug)]
pub struct VerificationSession {
    root: FormatHandler,
    config: VerifierConfig,
}

impl VerificationSession {
    /// Open a session with the built-in formats. The root format is
    /// `config.root_format`, or detected when unset.
    pub fn open(
        container: Arc<dyn Container>,
        report: Report,
        config: VerifierConfig,
    ) -> Result<Self, InitError> {
        Self::open_with_formats(container, report, config, FormatRegistry::builtin())
    }

    /// Open a session with a caller-supplied format registry.
    pub fn open_with_formats(
        container: Arc<dyn Container>,
        report: Report,
        config: VerifierConfig,
        formats: FormatRegistry,
    ) -> Result<Self, InitError> {
        let ctx = HandlerContext::new(container, report.clone(), Arc::new(formats));
        let root = match config.root_format.as_deref() {
            Some(format) => FormatHandler::initialize(ctx, format, &FormatInput::Container),
            None => FormatHandler::detect(ctx),
        };

        match root {
            Ok(root) => {
                tracing::info!(format = %root.format_id(), "session opened");
                Ok(Self { root, config })
            }
            Err(e) => {
                tracing::error!(error = %e, "root handler failed to initialize");
                report.failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Open a session over a container with a fixed root format.
    pub fn open_as(
        container: Arc<dyn Container>,
        report: Report,
        config: VerifierConfig,
        format: &str,
    ) -> Result<Self, InitError> {
        Self::open(container, report, config.with_root_format(format))
    }

    pub fn root(&self) -> &FormatHandler {
        &self.root
    }

    pub fn format_id(&self) -> &'static str {
        self.root.format_id()
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn report(&self) -> &Report {
        self.root.report()
    }

    fn resolver(&self) -> Resolver {
        Resolver::new(self.config.max_path_depth)
    }

    fn binder(&self) -> SignatureBinder<'_> {
        SignatureBinder::new(&self.root, self.resolver(), self.config.unmatched_signature)
    }

    pub fn exists(&self, path: &Path, query: &str) -> bool {
        self.resolver().exists(&self.root, path, query)
    }

    pub fn resolve(&self, path: &Path) -> Option<ResolvedValue> {
        self.resolver().resolve(&self.root, path)
    }

    /// Render without touching the report.
    pub fn render(&self, path: &Path) -> Result<Rendered, EngineError> {
        self.resolver().render(&self.root, path)
    }

    /// Render into the report.
    pub fn print(&self, path: &Path) -> bool {
        self.resolver().print(&self.root, path)
    }

    /// Check a signature binding without touching the report.
    pub fn check_signature(
        &self,
        subject: &Path,
        cert: &Path,
    ) -> Result<BindingOutcome, EngineError> {
        self.binder().check(subject, cert)
    }

    /// Verify a signature binding, reporting one OK or FAILED line.
    pub fn verify_signature(&self, subject: &Path, cert: &Path) -> bool {
        self.binder().verify_signature(subject, cert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnmatchedSignaturePolicy;
    use crate::report::ReportStatus;
    use crate::testing::{signature, test_certificate, MemoryContainer};

    const FORM: &str =
        "<form><format>theAuctionHouse2019</format><bid>42</bid><lot_number>7</lot_number></form>";

    fn open(container: MemoryContainer) -> (Result<VerificationSession, InitError>, Report) {
        let report = Report::new();
        let session =
            VerificationSession::open(Arc::new(container), report.clone(), VerifierConfig::default());
        (session, report)
    }

    #[test]
    fn detects_simple_contract() {
        let (session, report) = open(MemoryContainer::new().with_member("contract.txt", "Hello"));
        let session = session.unwrap();
        assert_eq!(session.format_id(), "simpleContract");
        assert_eq!(
            session.resolve(&Path::parse("contract").unwrap()),
            Some(ResolvedValue::String("Hello".into()))
        );
        assert!(session.exists(&Path::empty(), "contract"));
        assert!(!session.exists(&Path::empty(), "unknown"));
        assert!(report.is_empty());
    }

    #[test]
    fn missing_bid_form_fails_open() {
        let report = Report::new();
        let err = VerificationSession::open_as(
            Arc::new(MemoryContainer::new()),
            report.clone(),
            VerifierConfig::default(),
            "theAuctionHouse2019",
        )
        .unwrap_err();
        assert!(matches!(err, InitError::MissingMember { .. }));

        let lines = report.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].status, ReportStatus::Failed);
        assert!(lines[0].line.contains("bid.xml"));
    }

    #[test]
    fn undetectable_container_reports_once() {
        let (session, report) = open(MemoryContainer::new().with_member("readme.txt", "hi"));
        assert!(matches!(session.unwrap_err(), InitError::Undetected { .. }));
        assert_eq!(report.len(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn print_and_verify_share_the_report() {
        let alice = test_certificate("CN=Alice", 1);
        let (session, report) = open(
            MemoryContainer::new()
                .with_member("bid.xml", FORM)
                .with_signature(signature(&alice, &["bid.xml"], b"sig")),
        );
        let session = session.unwrap();

        assert!(session.print(&Path::parse("bid").unwrap()));
        assert!(session.verify_signature(&Path::empty(), &Path::parse("certificate").unwrap()));

        let lines = report.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "[PRINT] Bid: 42");
        assert_eq!(lines[1].status, ReportStatus::Ok);
    }

    #[test]
    fn policy_comes_from_config() {
        let alice = test_certificate("CN=Alice", 1);
        let other = test_certificate("CN=Other", 3);
        let container = Arc::new(
            MemoryContainer::new()
                .with_member("bid.xml", FORM)
                .with_signing_certificate(other)
                .with_signature(signature(&alice, &["bid.xml"], b"sig")),
        );
        let cert = Path::parse("certificate").unwrap();

        let lenient =
            VerificationSession::open(container.clone(), Report::new(), VerifierConfig::default())
                .unwrap();
        assert!(lenient.verify_signature(&Path::empty(), &cert));

        let strict = VerificationSession::open(
            container,
            Report::new(),
            VerifierConfig::default().with_unmatched_signature(UnmatchedSignaturePolicy::Fail),
        )
        .unwrap();
        assert!(!strict.verify_signature(&Path::empty(), &cert));
        assert_eq!(strict.report().count(ReportStatus::Failed), 1);
    }
}
