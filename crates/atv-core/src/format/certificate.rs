//! `certificate`: a signing certificate viewed as a document.
//!
//! Built either from the container's signing certificate or from a
//! certificate found elsewhere in the tree (e.g. the proxy certificate of a
//! delegation). A certificate is not itself a signed artifact.

use super::{
    unsupported_input, ChildBinding, DocumentFormat, FormatInput, ParsedDocument, SignatureScope,
};
use crate::certificate::Certificate;
use crate::container::Container;
use crate::error::InitError;
use crate::value::ResolvedValue;

pub const FORMAT_ID: &str = "certificate";

pub const PATH_SUBJECT: &str = "subject";
pub const PATH_ISSUER: &str = "issuer";
pub const PATH_SERIAL: &str = "serial";
pub const PATH_FINGERPRINT: &str = "fingerprint";
/// The certificate itself.
pub const PATH_CERTIFICATE: &str = "certificate";

#[derive(Debug, Clone)]
pub struct CertificateDocument {
    certificate: Certificate,
}

impl CertificateDocument {
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }
}

pub(crate) fn construct(
    container: &dyn Container,
    input: &FormatInput,
) -> Result<ParsedDocument, InitError> {
    let certificate = match input {
        FormatInput::Certificate(c) => c.clone(),
        FormatInput::Container => {
            container
                .signing_certificate()
                .ok_or_else(|| InitError::MissingCertificate {
                    format: FORMAT_ID.to_string(),
                })?
        }
        FormatInput::Member(_) => return Err(unsupported_input(FORMAT_ID, input)),
    };
    Ok(ParsedDocument::Certificate(CertificateDocument {
        certificate,
    }))
}

impl DocumentFormat for CertificateDocument {
    fn format_id(&self) -> &'static str {
        FORMAT_ID
    }

    fn fields(&self) -> &'static [&'static str] {
        &[
            PATH_SUBJECT,
            PATH_ISSUER,
            PATH_SERIAL,
            PATH_FINGERPRINT,
            PATH_CERTIFICATE,
        ]
    }

    fn resolve_field(&self, field: &str, _container: &dyn Container) -> Option<ResolvedValue> {
        let c = &self.certificate;
        match field {
            PATH_SUBJECT => Some(c.subject().into()),
            PATH_ISSUER => Some(c.issuer().into()),
            PATH_SERIAL => Some(c.serial().into()),
            PATH_FINGERPRINT => Some(ResolvedValue::String(c.fingerprint())),
            PATH_CERTIFICATE => Some(ResolvedValue::Certificate(c.clone())),
            _ => None,
        }
    }

    fn render_field(&self, field: &str, _container: &dyn Container) -> Option<String> {
        let c = &self.certificate;
        match field {
            PATH_SUBJECT => Some(format!("Subject: {}", c.subject())),
            PATH_ISSUER => Some(format!("Issuer: {}", c.issuer())),
            PATH_SERIAL => Some(format!("Serial: {}", c.serial())),
            PATH_FINGERPRINT => Some(format!("Fingerprint: {}", c.fingerprint())),
            _ => None,
        }
    }

    fn child(&self, _segment: &str, _container: &dyn Container) -> Option<ChildBinding> {
        None
    }

    fn signature_scope(&self) -> SignatureScope {
        SignatureScope::Unsigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_certificate, MemoryContainer};

    #[test]
    fn built_from_signing_certificate() {
        let cert = test_certificate("CN=Alice", 1);
        let container = MemoryContainer::new().with_signing_certificate(cert.clone());
        let ParsedDocument::Certificate(doc) =
            construct(&container, &FormatInput::Container).unwrap()
        else {
            panic!("expected certificate document");
        };
        assert_eq!(doc.certificate(), &cert);
        assert_eq!(
            doc.resolve_field(PATH_SUBJECT, &container),
            Some(ResolvedValue::String("CN=Alice".into()))
        );
        assert_eq!(
            doc.resolve_field(PATH_CERTIFICATE, &container),
            Some(ResolvedValue::Certificate(cert))
        );
        assert_eq!(
            doc.render_field(PATH_SUBJECT, &container).as_deref(),
            Some("Subject: CN=Alice")
        );
        assert!(doc.render_field(PATH_CERTIFICATE, &container).is_none());
    }

    #[test]
    fn unsigned_container_has_no_certificate() {
        let err = construct(&MemoryContainer::new(), &FormatInput::Container).unwrap_err();
        assert!(matches!(err, InitError::MissingCertificate { .. }));
    }

    #[test]
    fn built_from_embedded_certificate() {
        let cert = test_certificate("CN=Proxy", 2);
        let container = MemoryContainer::new();
        let doc = construct(&container, &FormatInput::Certificate(cert.clone())).unwrap();
        assert_eq!(doc.format_id(), FORMAT_ID);
        assert_eq!(doc.as_format().signature_scope(), SignatureScope::Unsigned);
        assert!(doc.as_format().child("subject", &container).is_none());
    }
}
