//! `simpleContract`: a plain-text contract in `contract.txt`.

use super::{
    certificate, require_member, unsupported_input, ChildBinding, DocumentFormat, FormatInput,
    ParsedDocument, SignatureScope,
};
use crate::container::Container;
use crate::error::InitError;
use crate::value::ResolvedValue;

pub const FORMAT_ID: &str = "simpleContract";

/// Path of the contract value.
pub const PATH_CONTRACT: &str = "contract";
/// Path of the signing certificate document.
pub const PATH_CERT: &str = "certificate";
/// Member holding the contract text.
pub const MEMBER_CONTRACT: &str = "contract.txt";

#[derive(Debug, Clone)]
pub struct SimpleContract {
    contract: String,
}

impl SimpleContract {
    pub fn contract(&self) -> &str {
        &self.contract
    }
}

pub(crate) fn construct(
    container: &dyn Container,
    input: &FormatInput,
) -> Result<ParsedDocument, InitError> {
    if *input != FormatInput::Container {
        return Err(unsupported_input(FORMAT_ID, input));
    }
    let contract = require_member(container, FORMAT_ID, MEMBER_CONTRACT)?;
    Ok(ParsedDocument::SimpleContract(SimpleContract { contract }))
}

impl DocumentFormat for SimpleContract {
    fn format_id(&self) -> &'static str {
        FORMAT_ID
    }

    fn fields(&self) -> &'static [&'static str] {
        &[PATH_CONTRACT]
    }

    fn resolve_field(&self, field: &str, _container: &dyn Container) -> Option<ResolvedValue> {
        match field {
            PATH_CONTRACT => Some(ResolvedValue::String(self.contract.clone())),
            _ => None,
        }
    }

    fn render_field(&self, field: &str, _container: &dyn Container) -> Option<String> {
        match field {
            PATH_CONTRACT => Some(format!("Contract: {}", self.contract)),
            _ => None,
        }
    }

    fn child(&self, segment: &str, _container: &dyn Container) -> Option<ChildBinding> {
        match segment {
            PATH_CERT => Some(ChildBinding::new(
                certificate::FORMAT_ID,
                FormatInput::Container,
            )),
            _ => None,
        }
    }

    fn signature_scope(&self) -> SignatureScope {
        SignatureScope::Member(MEMBER_CONTRACT.to_string())
    }
}
