// ── Domain model ──
//
// Typed records produced by the normalizers from raw wire entities.
// Every list-displayable type implements `Entity` so the paged list
// can derive stable row keys from its guid.

mod conversation;
mod entity;
mod guid;

pub use conversation::Conversation;
pub use entity::{Activity, Blog, FeedEntity, Group, User};
pub use guid::Guid;

/// Anything the paged list can hold: identified by a platform guid.
///
/// Guids are stable but not globally unique across pages, so display
/// keys are derived from (guid, batch index, list length) -- see
/// `list::Row`.
pub trait Entity {
    fn guid(&self) -> &Guid;
}
