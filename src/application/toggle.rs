//! Insert-or-delete on a join record.
//!
//! The presence check is the store's unique index: the insert either lands
//! (`Added`) or collides, in which case the existing pair is deleted
//! (`Removed`). Application code never reads before it writes, so two
//! concurrent toggles can never leave two records for the same pair. A
//! collision whose pair is already gone reports a conflict rather than a
//! removal that did not happen.

use crate::error::ApiResult;
use crate::ports::store::{to_document, Collection, DocumentStore, Filter, StoreError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum Toggled<T> {
    Added(T),
    Removed,
}

impl<T> Toggled<T> {
    pub fn is_added(&self) -> bool {
        matches!(self, Toggled::Added(_))
    }
}

/// `pair` must select exactly the record that collides with `record` on the
/// collection's unique index.
pub async fn toggle<S, T>(store: &S, collection: Collection, record: T, pair: Filter) -> ApiResult<Toggled<T>>
where
    S: DocumentStore + ?Sized,
    T: Serialize,
{
    match store.insert(collection, to_document(&record)?).await {
        Ok(_) => Ok(Toggled::Added(record)),
        Err(StoreError::Duplicate { index, .. }) => {
            tracing::debug!(%collection, %index, "pair exists, removing");
            match store.delete_one(collection, &pair).await? {
                Some(_) => Ok(Toggled::Removed),
                None => {
                    tracing::warn!(%collection, %index, "collided pair vanished before delete");
                    Err(StoreError::Conflict(collection).into())
                }
            }
        }
        Err(err) => Err(err.into()),
    }
}
