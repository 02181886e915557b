//! Value Codec
//!
//! JSON encoding of cached values.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

/// Stored text used when a row carries no value.
pub const NULL_VALUE: &str = "null";

// == Encode ==
/// Serializes a value to its stored JSON text.
pub fn encode<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(value).map_err(CacheError::Serialization)
}

// == Decode ==
/// Parses stored JSON text back into the caller's expected type.
///
/// `key` is only used to give the error some context.
pub fn decode<T>(key: &str, text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(text).map_err(|source| CacheError::Deserialization {
        key: key.to_string(),
        source,
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        age: u32,
        tags: Vec<String>,
    }

    #[test]
    fn test_encode_struct() {
        let profile = Profile {
            name: "Ada".to_string(),
            age: 36,
            tags: vec!["math".to_string()],
        };

        let text = encode(&profile).unwrap();
        assert_eq!(text, r#"{"name":"Ada","age":36,"tags":["math"]}"#);

        let back: Profile = decode("k", &text).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_encode_primitives_and_null() {
        assert_eq!(encode(&false).unwrap(), "false");
        assert_eq!(encode(&Value::Null).unwrap(), "null");
        assert_eq!(encode("text").unwrap(), r#""text""#);
    }

    #[test]
    fn test_decode_false_is_a_value() {
        let value: Value = decode("k", "false").unwrap();
        assert_eq!(value, json!(false));
    }

    #[test]
    fn test_encode_unsupported_map_key_fails() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], "v");

        let result = encode(&map);
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_decode_malformed_fails() {
        let result: Result<Value> = decode("broken", "{not json");
        match result {
            Err(CacheError::Deserialization { key, .. }) => assert_eq!(key, "broken"),
            other => panic!("expected deserialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        let result: Result<Profile> = decode("k", "[1,2,3]");
        assert!(matches!(result, Err(CacheError::Deserialization { .. })));
    }
}
