// ── Wire codec ──
//
// JSON serialization with optional raw deflate (no zlib or gzip header),
// decodable by any inflater configured for a bare 15-bit window.

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;
use serde::Serialize;

/// Errors from encoding a reply payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("deflate failed: {0}")]
    Deflate(#[from] std::io::Error),
}

/// Serialize `value` to UTF-8 JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(value)?)
}

/// Raw-deflate an already serialized payload.
pub fn deflate(payload: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = DeflateEncoder::new(
        Vec::with_capacity(payload.len() / 2),
        Compression::default(),
    );
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}

/// Serialize and, when `compress` is set, deflate.
pub fn encode<T: Serialize + ?Sized>(value: &T, compress: bool) -> Result<Vec<u8>, CodecError> {
    let json = to_json(value)?;
    if compress { deflate(&json) } else { Ok(json) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flate2::read::DeflateDecoder;
    use serde_json::{Value, json};
    use std::io::Read;

    fn inflate(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        DeflateDecoder::new(bytes).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn uncompressed_is_plain_json() {
        let value = json!({ "nodeinfo": { "hostname": "ap" } });
        let bytes = encode(&value, false).unwrap();
        assert_eq!(bytes, br#"{"nodeinfo":{"hostname":"ap"}}"#);
    }

    #[test]
    fn compressed_inflates_to_same_object() {
        let value = json!({
            "statistics": { "uptime": 3600, "loadavg": 0.2, "gateway": null },
            "nodeinfo": { "hostname": "AP-Lobby", "location": { "latitude": 48.1 } }
        });
        let bytes = encode(&value, true).unwrap();
        let back: Value = serde_json::from_slice(&inflate(&bytes)).unwrap();
        assert_eq!(back, value);
    }
}
