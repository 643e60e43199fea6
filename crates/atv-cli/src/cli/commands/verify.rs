//! `atv verify-signature`

use super::session::{open_session, parse_path};
use crate::cli::args::VerifySignatureArgs;
use crate::exit_codes;

pub fn cmd_verify_signature(args: VerifySignatureArgs) -> i32 {
    let (subject, cert) = match (parse_path(&args.subject), parse_path(&args.cert)) {
        (Ok(subject), Ok(cert)) => (subject, cert),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("error: {e:#}");
            return exit_codes::CONFIG_ERROR;
        }
    };
    let session = match open_session(&args.session) {
        Ok(s) => s,
        Err(code) => return code,
    };

    tracing::info!(
        format = %session.format_id(),
        subject = %subject,
        cert = %cert,
        "verify-signature"
    );
    if session.verify_signature(&subject, &cert) {
        exit_codes::SUCCESS
    } else {
        exit_codes::NEGATIVE
    }
}
