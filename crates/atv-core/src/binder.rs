//! Cross-path signature verification.
//!
//! The certificate is resolved from the root handler. The subject path is then
//! walked from the starting handler down to the signed document. Only
//! signatures that cover the document's own member and whose embedded
//! certificate is byte-identical to the resolved one are verified. A signature
//! over other members of the same transaction says nothing about the document.

use std::sync::Arc;

use crate::certificate::Certificate;
use crate::config::UnmatchedSignaturePolicy;
use crate::error::EngineError;
use crate::format::SignatureScope;
use crate::handler::FormatHandler;
use crate::path::{display_segments, Path};
use crate::resolver::Resolver;
use crate::value::ResolvedValue;

const CERTIFICATE_ERROR: &str = "Signature Verification failed: Certificate error.";
const VERIFICATION_FAILED: &str = "Signature Verification failed.";

/// A successful binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOutcome {
    /// Format of the signed document.
    pub subject_format: &'static str,
    /// Subject of the resolved certificate.
    pub signer: String,
    /// Signatures by the certificate that were verified.
    pub verified: usize,
}

impl BindingOutcome {
    /// Report line for this outcome.
    pub fn message(&self) -> String {
        if self.verified == 0 {
            format!(
                "{} Signature Verification successful (no signature by {}).",
                self.subject_format, self.signer
            )
        } else {
            format!(
                "{} Signature Verification successful ({} signature(s) by {}).",
                self.subject_format, self.verified, self.signer
            )
        }
    }
}

pub struct SignatureBinder<'a> {
    root: &'a FormatHandler,
    resolver: Resolver,
    policy: UnmatchedSignaturePolicy,
}

impl<'a> SignatureBinder<'a> {
    pub fn new(
        root: &'a FormatHandler,
        resolver: Resolver,
        policy: UnmatchedSignaturePolicy,
    ) -> Self {
        Self {
            root,
            resolver,
            policy,
        }
    }

    /// Verify that the document at `subject` is signed by the certificate at
    /// `cert`, both starting from the root. Writes nothing to the report.
    pub fn check(&self, subject: &Path, cert: &Path) -> Result<BindingOutcome, EngineError> {
        self.check_from(self.root, subject, cert)
    }

    /// Like [`check`](Self::check), but walks `subject` from `start`. The
    /// certificate is still resolved from the root.
    pub fn check_from(
        &self,
        start: &FormatHandler,
        subject: &Path,
        cert: &Path,
    ) -> Result<BindingOutcome, EngineError> {
        self.resolver.check_depth(subject)?;
        let certificate = self.resolve_certificate(cert)?;

        tracing::info!(
            subject = %subject,
            cert = %cert,
            signer = %certificate.subject(),
            "verifying signature binding"
        );
        self.walk(start, subject.segments(), &certificate)
    }

    /// Run [`check`](Self::check) and write exactly one OK or FAILED line.
    pub fn verify_signature(&self, subject: &Path, cert: &Path) -> bool {
        match self.check(subject, cert) {
            Ok(outcome) => {
                self.root.report().ok(outcome.message());
                true
            }
            Err(e) => {
                tracing::error!(subject = %subject, cert = %cert, kind = %e.kind, "{}", e.message);
                self.root.report().failed(e.message);
                false
            }
        }
    }

    fn resolve_certificate(&self, cert: &Path) -> Result<Certificate, EngineError> {
        match self.resolver.resolve(self.root, cert) {
            Some(ResolvedValue::Certificate(c)) => Ok(c),
            Some(other) => Err(EngineError::format_mismatch(format!(
                "{} ({} resolves to {}, not X509CERT)",
                CERTIFICATE_ERROR,
                cert,
                other.type_tag()
            ))),
            None => Err(EngineError::path_not_found(format!(
                "{} (could not resolve certificate from {})",
                CERTIFICATE_ERROR, cert
            ))),
        }
    }

    fn walk(
        &self,
        handler: &FormatHandler,
        subject: &[String],
        certificate: &Certificate,
    ) -> Result<BindingOutcome, EngineError> {
        let Some((segment, rest)) = subject.split_first() else {
            return self.verify_leaf(handler, certificate);
        };

        let child: Arc<FormatHandler> = handler.child(segment).map_err(|e| {
            EngineError::delegation(format!("{} ({})", VERIFICATION_FAILED, e))
        })?;
        tracing::debug!(
            segment = %segment,
            rest = %display_segments(rest),
            format = %child.format_id(),
            "signature binding: delegating"
        );
        self.walk(&child, rest, certificate)
    }

    fn verify_leaf(
        &self,
        handler: &FormatHandler,
        certificate: &Certificate,
    ) -> Result<BindingOutcome, EngineError> {
        let container = handler.container();
        let signatures = container.signatures();
        let in_scope: Vec<_> = match handler.signature_scope() {
            SignatureScope::Member(member) => {
                signatures.iter().filter(|s| s.covers(&member)).collect()
            }
            SignatureScope::Unsigned => {
                return Err(EngineError::format_mismatch(format!(
                    "{} ({} is not a signed document)",
                    VERIFICATION_FAILED,
                    handler.format_id()
                )))
            }
        };

        let mut verified = 0;
        for signature in in_scope {
            if &signature.certificate != certificate {
                continue;
            }
            tracing::info!(signer = %certificate.subject(), "found signature for certificate");
            match container.verify_signature(certificate, signature) {
                Ok(true) => verified += 1,
                Ok(false) => {
                    return Err(EngineError::crypto(format!(
                        "{} (signature by {} does not verify)",
                        VERIFICATION_FAILED,
                        certificate.subject()
                    )))
                }
                Err(e) => {
                    return Err(EngineError::crypto(format!(
                        "{} ({})",
                        VERIFICATION_FAILED, e
                    )))
                }
            }
        }

        if verified == 0 {
            tracing::warn!(
                format = %handler.format_id(),
                signer = %certificate.subject(),
                policy = ?self.policy,
                "no signature by certificate"
            );
            if self.policy == UnmatchedSignaturePolicy::Fail {
                return Err(EngineError::crypto(format!(
                    "{} (no signature by {} on {})",
                    VERIFICATION_FAILED,
                    certificate.subject(),
                    handler.format_id()
                )));
            }
        }

        Ok(BindingOutcome {
            subject_format: handler.format_id(),
            signer: certificate.subject().to_string(),
            verified,
        })
    }
}
