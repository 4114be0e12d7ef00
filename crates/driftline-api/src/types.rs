// Wire types for the Driftline listing endpoints.
//
// Every paginated endpoint answers with the same envelope:
//   { "status": "success", "entities": [...], "load-next": "<token>" }
// Older messenger deployments spell the pagination token "offset";
// both spellings are accepted.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One page of raw entities plus the token for the next page.
///
/// An absent or empty `load-next` token means the collection is exhausted
/// for the requested context.
#[derive(Debug, Clone, Deserialize)]
pub struct PageEnvelope {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub entities: Vec<RawEntity>,

    /// Token to pass as `offset` on the next request. Empty = exhausted.
    #[serde(rename = "load-next", alias = "offset", default)]
    pub load_next: String,
}

impl PageEnvelope {
    /// `true` when the envelope's status field signals success.
    /// Endpoints that omit the field are treated as successful --
    /// they signal failure through the HTTP status instead.
    pub fn is_success(&self) -> bool {
        self.status.as_deref().is_none_or(|s| s == "success")
    }
}

/// A single entity as it appears on the wire.
///
/// Only the identity fields are typed; everything else stays in the
/// flattened `fields` map for core-side normalizers to pull from.
/// Unknown entity shapes survive deserialization instead of failing
/// the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    pub guid: String,

    #[serde(rename = "type", default)]
    pub entity_type: Option<String>,

    #[serde(default)]
    pub subtype: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawEntity {
    /// Fetch a string-valued field from the loose attribute map.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Fetch a boolean field, accepting the platform's `"1"`/`1`/`true`
    /// spellings interchangeably.
    pub fn bool_field(&self, key: &str) -> Option<bool> {
        match self.fields.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(n.as_i64() == Some(1)),
            Value::String(s) => Some(s == "1" || s == "true"),
            _ => None,
        }
    }

    /// Fetch a numeric field, accepting both JSON numbers and the
    /// stringified integers some endpoints emit.
    pub fn u64_field(&self, key: &str) -> Option<u64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Response envelope of the messenger key-unlock endpoint.
#[derive(Debug, Deserialize)]
pub struct KeysEnvelope {
    #[serde(default)]
    pub status: Option<String>,

    /// Armored private key, present only on a successful unlock.
    #[serde(default)]
    pub key: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_accepts_load_next_and_offset_spellings() {
        let a: PageEnvelope =
            serde_json::from_value(json!({"entities": [], "load-next": "abc"})).unwrap();
        assert_eq!(a.load_next, "abc");

        let b: PageEnvelope =
            serde_json::from_value(json!({"entities": [], "offset": "xyz"})).unwrap();
        assert_eq!(b.load_next, "xyz");
    }

    #[test]
    fn envelope_defaults_to_exhausted_token() {
        let env: PageEnvelope = serde_json::from_value(json!({"entities": []})).unwrap();
        assert!(env.load_next.is_empty());
        assert!(env.is_success());
    }

    #[test]
    fn raw_entity_keeps_unknown_fields() {
        let raw: RawEntity = serde_json::from_value(json!({
            "guid": "123",
            "type": "activity",
            "message": "hello",
            "paywall": "1",
            "time_created": "1716931200"
        }))
        .unwrap();

        assert_eq!(raw.str_field("message"), Some("hello"));
        assert_eq!(raw.bool_field("paywall"), Some(true));
        assert_eq!(raw.u64_field("time_created"), Some(1_716_931_200));
        assert!(raw.str_field("missing").is_none());
    }
}
