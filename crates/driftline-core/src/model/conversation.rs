use chrono::{DateTime, Utc};
use driftline_api::RawEntity;

use super::{Entity, Guid};

/// A direct-message conversation as it appears in the messenger list.
///
/// Message bodies are never held here -- the list only needs enough to
/// render a row and track the unread marker flipped by push events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub guid: Guid,
    /// Display names of the other participants.
    pub participants: Vec<String>,
    pub unread: bool,
    pub online: bool,
    pub last_active: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn from_raw(raw: &RawEntity) -> Option<Self> {
        if raw.guid.is_empty() {
            return None;
        }
        let participants = raw
            .fields
            .get("participants")
            .and_then(serde_json::Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|p| {
                        p.get("username")
                            .or_else(|| p.get("name"))
                            .and_then(serde_json::Value::as_str)
                            .map(str::to_owned)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            guid: Guid::from(raw.guid.as_str()),
            participants,
            unread: raw.bool_field("unread").unwrap_or(false),
            online: raw.bool_field("online").unwrap_or(false),
            last_active: raw
                .u64_field("last_active")
                .and_then(|secs| DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)),
        })
    }
}

impl Entity for Conversation {
    fn guid(&self) -> &Guid {
        &self.guid
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conversation_from_raw() {
        let raw: RawEntity = serde_json::from_value(json!({
            "guid": "c1",
            "participants": [{"username": "alice"}, {"name": "Bob"}],
            "unread": 1,
            "online": false
        }))
        .unwrap();

        let conv = Conversation::from_raw(&raw).unwrap();
        assert_eq!(conv.participants, vec!["alice", "Bob"]);
        assert!(conv.unread);
        assert!(!conv.online);
    }
}
