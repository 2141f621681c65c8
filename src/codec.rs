//! Binary/transport codec for ceremony artifacts.
//!
//! Every binary identifier crossing the relying-party boundary (challenges,
//! credential ids, attestation and assertion payloads) travels as base64url
//! text. Encoding strips padding; decoding tolerates padded and unpadded
//! input alike. Attestation payloads can reach tens of kilobytes, so both
//! directions go through the `base64` engine rather than any per-byte
//! string building.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::{DecodePaddingMode, Engine as _};
use thiserror::Error;

/// Input contained characters outside the base64url alphabet, or had an
/// impossible length. This indicates a misbehaving server or a programming
/// error, never a user action, and is propagated unchanged to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed base64url input: {0}")]
pub struct MalformedEncoding(String);

const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes raw bytes as unpadded base64url text.
pub fn encode(input: &[u8]) -> String {
    BASE64URL.encode(input)
}

/// Decodes base64url text back into raw bytes.
pub fn decode(input: &str) -> Result<Vec<u8>, MalformedEncoding> {
    BASE64URL
        .decode(input)
        .map_err(|e| MalformedEncoding(e.to_string()))
}
