// ── Feed entity types ──
//
// The four content shapes that appear in feed and discovery lists,
// plus the `FeedEntity` sum over them for mixed-type lists.

use chrono::{DateTime, Utc};
use driftline_api::RawEntity;

use super::{Entity, Guid};

/// A feed post: status update, image, or video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub guid: Guid,
    pub owner_guid: Option<Guid>,
    pub message: Option<String>,
    /// Thumbnail URL for image/video posts.
    pub thumbnail: Option<String>,
    pub time_created: Option<DateTime<Utc>>,
    pub paywalled: bool,
}

impl Activity {
    /// Build from a raw wire entity. `None` when the guid is missing
    /// or empty -- the platform occasionally emits placeholder rows.
    pub fn from_raw(raw: &RawEntity) -> Option<Self> {
        if raw.guid.is_empty() {
            return None;
        }
        Some(Self {
            guid: Guid::from(raw.guid.as_str()),
            owner_guid: raw.str_field("owner_guid").map(Guid::from),
            message: raw.str_field("message").map(str::to_owned),
            thumbnail: raw.str_field("thumbnail_src").map(str::to_owned),
            time_created: parse_timestamp(raw),
            paywalled: raw.bool_field("paywall").unwrap_or(false),
        })
    }
}

/// A long-form blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    pub guid: Guid,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub thumbnail: Option<String>,
    pub time_created: Option<DateTime<Utc>>,
}

impl Blog {
    pub fn from_raw(raw: &RawEntity) -> Option<Self> {
        if raw.guid.is_empty() {
            return None;
        }
        Some(Self {
            guid: Guid::from(raw.guid.as_str()),
            title: raw.str_field("title").map(str::to_owned),
            excerpt: raw.str_field("excerpt").map(str::to_owned),
            thumbnail: raw.str_field("thumbnail_src").map(str::to_owned),
            time_created: parse_timestamp(raw),
        })
    }
}

/// A channel (user profile).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub guid: Guid,
    pub username: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub subscriber_count: Option<u64>,
}

impl User {
    pub fn from_raw(raw: &RawEntity) -> Option<Self> {
        if raw.guid.is_empty() {
            return None;
        }
        Some(Self {
            guid: Guid::from(raw.guid.as_str()),
            username: raw.str_field("username").map(str::to_owned),
            name: raw.str_field("name").map(str::to_owned),
            avatar: raw.str_field("avatar_url").map(str::to_owned),
            subscriber_count: raw.u64_field("subscribers_count"),
        })
    }
}

/// A group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub guid: Guid,
    pub name: Option<String>,
    pub member_count: Option<u64>,
}

impl Group {
    pub fn from_raw(raw: &RawEntity) -> Option<Self> {
        if raw.guid.is_empty() {
            return None;
        }
        Some(Self {
            guid: Guid::from(raw.guid.as_str()),
            name: raw.str_field("name").map(str::to_owned),
            member_count: raw.u64_field("members:count"),
        })
    }
}

/// Sum over the content shapes a mixed discovery list can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEntity {
    Activity(Activity),
    Blog(Blog),
    User(User),
    Group(Group),
}

impl FeedEntity {
    /// Thumbnail URL, when the underlying shape carries one.
    /// Used by the preload hook.
    pub fn thumbnail(&self) -> Option<&str> {
        match self {
            Self::Activity(a) => a.thumbnail.as_deref(),
            Self::Blog(b) => b.thumbnail.as_deref(),
            Self::User(u) => u.avatar.as_deref(),
            Self::Group(_) => None,
        }
    }
}

impl Entity for Activity {
    fn guid(&self) -> &Guid {
        &self.guid
    }
}

impl Entity for Blog {
    fn guid(&self) -> &Guid {
        &self.guid
    }
}

impl Entity for User {
    fn guid(&self) -> &Guid {
        &self.guid
    }
}

impl Entity for Group {
    fn guid(&self) -> &Guid {
        &self.guid
    }
}

impl Entity for FeedEntity {
    fn guid(&self) -> &Guid {
        match self {
            Self::Activity(a) => &a.guid,
            Self::Blog(b) => &b.guid,
            Self::User(u) => &u.guid,
            Self::Group(g) => &g.guid,
        }
    }
}

/// `time_created` arrives as epoch seconds, sometimes stringified.
fn parse_timestamp(raw: &RawEntity) -> Option<DateTime<Utc>> {
    let secs = raw.u64_field("time_created")?;
    DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawEntity {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn activity_from_raw_maps_fields() {
        let a = Activity::from_raw(&raw(json!({
            "guid": "9001",
            "type": "activity",
            "owner_guid": "42",
            "message": "hello",
            "thumbnail_src": "https://cdn/th.jpg",
            "time_created": "1716931200",
            "paywall": "1"
        })))
        .unwrap();

        assert_eq!(a.guid.as_str(), "9001");
        assert_eq!(a.owner_guid.as_ref().unwrap().as_str(), "42");
        assert_eq!(a.message.as_deref(), Some("hello"));
        assert!(a.paywalled);
        assert!(a.time_created.is_some());
    }

    #[test]
    fn empty_guid_is_rejected() {
        assert!(Activity::from_raw(&raw(json!({"guid": ""}))).is_none());
        assert!(User::from_raw(&raw(json!({"guid": ""}))).is_none());
    }

    #[test]
    fn feed_entity_thumbnail_follows_shape() {
        let user = FeedEntity::User(
            User::from_raw(&raw(json!({"guid": "1", "avatar_url": "https://cdn/a.png"}))).unwrap(),
        );
        assert_eq!(user.thumbnail(), Some("https://cdn/a.png"));

        let group =
            FeedEntity::Group(Group::from_raw(&raw(json!({"guid": "2", "name": "g"}))).unwrap());
        assert!(group.thumbnail().is_none());
    }
}
