//! The watched collection - the user's durable set of rated movies.
//!
//! Entries are keyed by catalog id, unique within the collection, and
//! immutable once added; re-rating requires delete and re-add. Every
//! mutation rewrites the durable store in full.

mod collection;
mod types;

pub use collection::WatchedCollection;
pub use types::*;
