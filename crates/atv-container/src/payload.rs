//! Signed range encoding.
//!
//! A signature covers a list of members. The bytes actually signed are a
//! length-prefixed encoding of the member names and their SHA-256 digests:
//!
//! ```text
//! "ATVv1" SP count SP ( len(name) SP name SP sha256hex(content) SP )*
//! ```
//!
//! Members are encoded in the order the signature lists them.

use sha2::{Digest, Sha256};

const PAYLOAD_PREFIX: &[u8] = b"ATVv1 ";

/// Encode the signed payload over `(name, content)` pairs.
pub fn signed_payload<'a, I>(members: I) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
    I::IntoIter: ExactSizeIterator,
{
    let members = members.into_iter();

    let mut payload = Vec::new();
    payload.extend_from_slice(PAYLOAD_PREFIX);
    payload.extend_from_slice(members.len().to_string().as_bytes());
    payload.push(b' ');

    for (name, content) in members {
        payload.extend_from_slice(name.len().to_string().as_bytes());
        payload.push(b' ');
        payload.extend_from_slice(name.as_bytes());
        payload.push(b' ');
        payload.extend_from_slice(hex::encode(Sha256::digest(content)).as_bytes());
        payload.push(b' ');
    }
    payload
}
