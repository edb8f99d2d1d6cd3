//! Redis adapter.
//!
//! Stores every document as a JSON string under its own key and keeps, per
//! collection, a sorted set of ids ordered by insertion. Unique indexes are
//! claimed on one key per index entry, holding the id of the claiming
//! document. Reference fields the views filter on get one sorted set of ids
//! per value, scored like the collection set, so those reads only load the
//! documents they can match.
//!
//! Inserts and deletes run as single Lua scripts: the claims, the document
//! and every index entry appear and disappear together.

use crate::ports::store::Collection;

mod error;
mod pool;
mod store;

pub use error::RedisStoreError;
pub use pool::RedisPool;

/// Redis key constants
const KEY_PREFIX: &str = "reelbase";

fn doc_key(collection: &str, id: &str) -> String {
    format!("{}:{}:doc:{}", KEY_PREFIX, collection, id)
}

fn ids_key(collection: &str) -> String {
    format!("{}:{}:ids", KEY_PREFIX, collection)
}

fn seq_key(collection: &str) -> String {
    format!("{}:{}:seq", KEY_PREFIX, collection)
}

fn unique_key(collection: &str, index_key: &str) -> String {
    format!("{}:{}:unique:{}", KEY_PREFIX, collection, index_key)
}

fn ref_key(collection: &str, field: &str, value: &str) -> String {
    format!("{}:{}:ref:{}:{}", KEY_PREFIX, collection, field, value)
}

/// Reference fields indexed per value.
fn reference_fields(collection: Collection) -> &'static [&'static str] {
    match collection {
        Collection::Users => &[],
        Collection::Videos | Collection::Tweets | Collection::Playlists => &["owner"],
        Collection::Comments => &["owner", "video"],
        Collection::Likes => &["likedBy", "video", "comment", "tweet"],
        Collection::Subscriptions => &["subscriber", "channel"],
    }
}
