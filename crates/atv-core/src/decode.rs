//! Structured-document decoding for member files.

use serde::de::DeserializeOwned;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to decode {member}: {reason}")]
pub struct DecodeError {
    pub member: String,
    pub reason: String,
}

/// Decode an XML member into `T`.
pub fn decode_xml<T: DeserializeOwned>(member: &str, text: &str) -> Result<T, DecodeError> {
    quick_xml::de::from_str(text).map_err(|e| DecodeError {
        member: member.to_string(),
        reason: e.to_string(),
    })
}
