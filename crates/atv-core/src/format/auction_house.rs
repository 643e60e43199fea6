//! `theAuctionHouse2019`: an auction bid form in `bid.xml`.
//!
//! ```xml
//! <form>
//!   <format>theAuctionHouse2019</format>
//!   <bid>42</bid>
//!   <lot_number>7</lot_number>
//! </form>
//! ```
//!
//! The transaction may also carry a delegation proof (any member whose name
//! contains `delegation.xml`) when the bid is placed on someone's behalf.

use serde::Deserialize;

use super::{
    certificate, check_declared_format, delegation, require_member, unsupported_input,
    ChildBinding, DocumentFormat, FormatInput, ParsedDocument, SignatureScope,
};
use crate::container::Container;
use crate::decode::decode_xml;
use crate::error::InitError;
use crate::value::{OpaqueDocument, ResolvedValue};

pub const FORMAT_ID: &str = "theAuctionHouse2019";

pub const PATH_BID: &str = "bid";
pub const PATH_LOT: &str = "lot";
pub const PATH_CERT: &str = "certificate";
pub const PATH_DELEGATION: &str = "delegation";

/// Member holding the bid form.
pub const MEMBER_FORM: &str = "bid.xml";

#[derive(Debug, Clone, Deserialize)]
struct Form {
    format: String,
    bid: i64,
    lot_number: i64,
}

#[derive(Debug, Clone)]
pub struct AuctionBid {
    bid: i64,
    lot_number: i64,
}

impl AuctionBid {
    pub fn bid(&self) -> i64 {
        self.bid
    }

    pub fn lot_number(&self) -> i64 {
        self.lot_number
    }
}

pub(crate) fn construct(
    container: &dyn Container,
    input: &FormatInput,
) -> Result<ParsedDocument, InitError> {
    if *input != FormatInput::Container {
        return Err(unsupported_input(FORMAT_ID, input));
    }

    let xml = require_member(container, FORMAT_ID, MEMBER_FORM)?;
    let form: Form = decode_xml(MEMBER_FORM, &xml).map_err(|e| InitError::Decode {
        format: FORMAT_ID.to_string(),
        member: MEMBER_FORM.to_string(),
        reason: e.reason,
    })?;
    check_declared_format(MEMBER_FORM, FORMAT_ID, &form.format)?;

    Ok(ParsedDocument::AuctionBid(AuctionBid {
        bid: form.bid,
        lot_number: form.lot_number,
    }))
}

impl DocumentFormat for AuctionBid {
    fn format_id(&self) -> &'static str {
        FORMAT_ID
    }

    fn fields(&self) -> &'static [&'static str] {
        &[PATH_BID, PATH_LOT, PATH_CERT, PATH_DELEGATION]
    }

    fn resolve_field(&self, field: &str, container: &dyn Container) -> Option<ResolvedValue> {
        match field {
            PATH_BID => Some(ResolvedValue::Integer(self.bid)),
            PATH_LOT => Some(ResolvedValue::Integer(self.lot_number)),
            PATH_CERT => container
                .signing_certificate()
                .map(ResolvedValue::Certificate),
            PATH_DELEGATION => {
                let member = delegation::find_member(container)?;
                let content = container.extract_member_text(&member)?;
                Some(ResolvedValue::Document(OpaqueDocument {
                    document_type: delegation::FORMAT_ID.to_string(),
                    member,
                    content,
                }))
            }
            _ => None,
        }
    }

    fn render_field(&self, field: &str, container: &dyn Container) -> Option<String> {
        match field {
            PATH_BID => Some(format!("Bid: {}", self.bid)),
            PATH_LOT => Some(format!("Lot: {}", self.lot_number)),
            PATH_CERT => container
                .signing_certificate()
                .map(|c| format!("Certificate: {}", c.subject())),
            _ => None,
        }
    }

    fn child(&self, segment: &str, container: &dyn Container) -> Option<ChildBinding> {
        match segment {
            PATH_CERT => Some(ChildBinding::new(
                certificate::FORMAT_ID,
                FormatInput::Container,
            )),
            PATH_DELEGATION => delegation::find_member(container)
                .map(|member| ChildBinding::new(delegation::FORMAT_ID, FormatInput::Member(member))),
            _ => None,
        }
    }

    fn signature_scope(&self) -> SignatureScope {
        SignatureScope::Member(MEMBER_FORM.to_string())
    }
}
