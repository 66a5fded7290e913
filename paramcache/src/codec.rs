//! Payload serialization.
//!
//! The cache stores opaque string payloads. Callers that want structured
//! values serialized on the way in and out go through a [`PayloadCodec`];
//! [`JsonCodec`] is the default. Distinct from param-value stringification
//! ([`paramcache_core::ParamValue::render`]), which only normalizes lookup
//! arguments.

use paramcache_core::{CacheError, CacheResult};
use serde::{de::DeserializeOwned, Serialize};

/// Pluggable encoder/decoder for opaque payloads.
pub trait PayloadCodec: Send + Sync {
    /// Serialize a value to its stored string form.
    fn encode<T: Serialize>(&self, value: &T) -> CacheResult<String>;

    /// Deserialize a stored payload.
    ///
    /// Malformed input must surface as [`CacheError::Decode`], never a panic.
    fn decode<T: DeserializeOwned>(&self, raw: &str) -> CacheResult<T>;
}

/// JSON codec over serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> CacheResult<String> {
        serde_json::to_string(value).map_err(|e| CacheError::Encode {
            reason: e.to_string(),
        })
    }

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> CacheResult<T> {
        serde_json::from_str(raw).map_err(|e| CacheError::Decode {
            reason: e.to_string(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    #[test]
    fn test_json_roundtrip() {
        let codec = JsonCodec;
        let original = Payload {
            name: "widget".to_string(),
            count: 3,
        };
        let encoded = codec.encode(&original).unwrap();
        let decoded: Payload = codec.decode(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_malformed_is_error_not_panic() {
        let codec = JsonCodec;
        let result: CacheResult<Payload> = codec.decode("{ definitely not json");
        assert!(matches!(result, Err(CacheError::Decode { .. })));
    }
}
