// ── Paginated list infrastructure ──
//
// Cursor + PagedList are the shared skeleton of every store: cursor-based
// pagination, single-flight load guarding, epoch-checked stale discard.
// ListSet coordinates one PagedList per list kind for multi-category
// screens.

mod coordinator;
mod cursor;
mod paged;

pub use coordinator::{ListKind, ListSet};
pub use cursor::Cursor;
pub use paged::{ListSnapshot, LoadOutcome, Page, PagedList, Row};
