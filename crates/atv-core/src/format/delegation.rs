//! `delegation`: a delegation proof carried as a container member.
//!
//! ```xml
//! <delegation>
//!   <format>delegation</format>
//!   <delegator>CN=Alice</delegator>
//!   <proxy>CN=Bob</proxy>
//!   <valid_until>2030-01-01</valid_until>
//!   <certificate>base64 proxy certificate</certificate>
//! </delegation>
//! ```
//!
//! The proof is signed by the signatures that list its member.

use serde::Deserialize;

use super::{
    certificate, check_declared_format, require_member, unsupported_input, ChildBinding,
    DocumentFormat, FormatInput, ParsedDocument, SignatureScope,
};
use crate::certificate::Certificate;
use crate::container::Container;
use crate::decode::decode_xml;
use crate::error::InitError;
use crate::value::ResolvedValue;

pub const FORMAT_ID: &str = "delegation";

/// Member name fragment identifying a delegation proof.
pub const MEMBER_SUFFIX: &str = "delegation.xml";

pub const PATH_DELEGATOR: &str = "delegator";
pub const PATH_PROXY: &str = "proxy";
pub const PATH_VALID_UNTIL: &str = "valid_until";
pub const PATH_CERT: &str = "certificate";

#[derive(Debug, Clone, Deserialize)]
struct Proof {
    format: String,
    delegator: String,
    proxy: String,
    valid_until: String,
    certificate: String,
}

#[derive(Debug, Clone)]
pub struct Delegation {
    member: String,
    delegator: String,
    proxy: String,
    valid_until: String,
    proxy_certificate: Certificate,
}

impl Delegation {
    /// Container member the proof was read from.
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn delegator(&self) -> &str {
        &self.delegator
    }

    pub fn proxy(&self) -> &str {
        &self.proxy
    }

    pub fn valid_until(&self) -> &str {
        &self.valid_until
    }

    pub fn proxy_certificate(&self) -> &Certificate {
        &self.proxy_certificate
    }
}

/// First member whose name contains `delegation.xml`.
pub fn find_member(container: &dyn Container) -> Option<String> {
    container
        .list_members()
        .into_iter()
        .find(|name| name.contains(MEMBER_SUFFIX))
}

pub(crate) fn construct(
    container: &dyn Container,
    input: &FormatInput,
) -> Result<ParsedDocument, InitError> {
    let member = match input {
        FormatInput::Member(name) => name.clone(),
        FormatInput::Container => {
            find_member(container).ok_or_else(|| InitError::MissingMember {
                format: FORMAT_ID.to_string(),
                member: MEMBER_SUFFIX.to_string(),
            })?
        }
        FormatInput::Certificate(_) => return Err(unsupported_input(FORMAT_ID, input)),
    };

    let xml = require_member(container, FORMAT_ID, &member)?;
    let decode_failed = |reason: String| InitError::Decode {
        format: FORMAT_ID.to_string(),
        member: member.clone(),
        reason,
    };

    let proof: Proof = decode_xml(&member, &xml).map_err(|e| decode_failed(e.reason))?;
    check_declared_format(&member, FORMAT_ID, &proof.format)?;

    let proxy_certificate = Certificate::from_base64(&proof.certificate)
        .map_err(|e| decode_failed(format!("proxy certificate: {}", e)))?;

    Ok(ParsedDocument::Delegation(Delegation {
        member,
        delegator: proof.delegator,
        proxy: proof.proxy,
        valid_until: proof.valid_until,
        proxy_certificate,
    }))
}

impl DocumentFormat for Delegation {
    fn format_id(&self) -> &'static str {
        FORMAT_ID
    }

    fn fields(&self) -> &'static [&'static str] {
        &[PATH_DELEGATOR, PATH_PROXY, PATH_VALID_UNTIL, PATH_CERT]
    }

    fn resolve_field(&self, field: &str, _container: &dyn Container) -> Option<ResolvedValue> {
        match field {
            PATH_DELEGATOR => Some(self.delegator.as_str().into()),
            PATH_PROXY => Some(self.proxy.as_str().into()),
            PATH_VALID_UNTIL => Some(self.valid_until.as_str().into()),
            PATH_CERT => Some(ResolvedValue::Certificate(self.proxy_certificate.clone())),
            _ => None,
        }
    }

    fn render_field(&self, field: &str, _container: &dyn Container) -> Option<String> {
        match field {
            PATH_DELEGATOR => Some(format!("Delegator: {}", self.delegator)),
            PATH_PROXY => Some(format!("Proxy: {}", self.proxy)),
            PATH_VALID_UNTIL => Some(format!("Valid until: {}", self.valid_until)),
            _ => None,
        }
    }

    fn child(&self, segment: &str, _container: &dyn Container) -> Option<ChildBinding> {
        match segment {
            PATH_CERT => Some(ChildBinding::new(
                certificate::FORMAT_ID,
                FormatInput::Certificate(self.proxy_certificate.clone()),
            )),
            _ => None,
        }
    }

    fn signature_scope(&self) -> SignatureScope {
        SignatureScope::Member(self.member.clone())
    }
}
