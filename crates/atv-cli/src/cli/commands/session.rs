//! Opening a verification session from command-line options.

use std::sync::Arc;

use anyhow::{Context, Result};
use atv_container::TransactionContainer;
use atv_core::{
    Path, Report, ReportLine, ReportObserver, UnmatchedSignaturePolicy, VerificationSession,
    VerifierConfig,
};

use crate::cli::args::SessionArgs;
use crate::exit_codes;

/// Prints report lines to stdout as they are added.
struct StdoutObserver;

impl ReportObserver for StdoutObserver {
    fn on_line(&self, line: &ReportLine) {
        println!("{}", line);
    }
}

pub fn load_config(args: &SessionArgs) -> Result<VerifierConfig> {
    let mut config = match &args.config {
        Some(path) => VerifierConfig::from_file(path)?,
        None => VerifierConfig::from_env(),
    };
    if args.require_matching_signature {
        config = config.with_unmatched_signature(UnmatchedSignaturePolicy::Fail);
    }
    if let Some(format) = &args.format {
        config = config.with_root_format(format);
    }
    Ok(config)
}

pub fn parse_path(path: &str) -> Result<Path> {
    Path::parse(path).with_context(|| format!("invalid path: {:?}", path))
}

/// Open the transaction and its session, or return the exit code to stop with.
pub fn open_session(args: &SessionArgs) -> Result<VerificationSession, i32> {
    let config = load_config(args).map_err(|e| {
        eprintln!("error: {e:#}");
        exit_codes::CONFIG_ERROR
    })?;

    let container = TransactionContainer::open_path(&args.container).map_err(|e| {
        eprintln!("error: cannot open {}: {}", args.container.display(), e);
        e.exit_code()
    })?;
    tracing::debug!(container = %args.container.display(), "opened container");

    let report = Report::new();
    report.add_observer(Arc::new(StdoutObserver));

    // the report already carries the FAILED line
    VerificationSession::open(Arc::new(container), report, config).map_err(|e| e.exit_code())
}
