//! In-process document store.
//!
//! Used by the tests and by the monolith when `STORE=memory`. All writes go
//! through one `RwLock` write guard, so the unique-index check and the insert
//! are a single step.

use crate::ports::store::{
    index_key, Collection, Document, DocumentStore, Filter, Query, StoreError, StoreResult, Update,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Document>>>>,
    operations: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls served so far.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

fn position(docs: &[Document], filter: &Filter) -> Option<usize> {
    docs.iter().position(|doc| filter.matches(doc))
}

/// Checks `doc` against every stored document except the one at `skip`.
fn check_unique(
    collection: Collection,
    docs: &[Document],
    skip: Option<usize>,
    doc: &Document,
) -> StoreResult<()> {
    let others = || {
        docs.iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != skip)
            .map(|(_, d)| d)
    };

    let id = doc.get("_id").ok_or(StoreError::MissingId(collection))?;
    if others().any(|d| d.get("_id") == Some(id)) {
        return Err(StoreError::Duplicate {
            collection,
            index: "_id".to_string(),
        });
    }

    for index in collection.unique_indexes() {
        let Some(key) = index_key(doc, index) else {
            continue;
        };
        if others().any(|d| index_key(d, index).as_deref() == Some(key.as_str())) {
            return Err(StoreError::Duplicate {
                collection,
                index: index.join(","),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document> {
        self.record();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        check_unique(collection, docs, None, &doc)?;
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Option<Document>> {
        self.record();
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)).cloned()))
    }

    async fn find(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>> {
        self.record();
        let collections = self.collections.read().await;
        let docs = collections.get(&collection).cloned().unwrap_or_default();
        Ok(query.apply(docs))
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        self.record();
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).count() as u64)
            .unwrap_or(0))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<Option<Document>> {
        self.record();
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(None);
        };
        let Some(pos) = position(docs, filter) else {
            return Ok(None);
        };

        let mut updated = docs[pos].clone();
        update.apply(&mut updated);

        check_unique(collection, docs, Some(pos), &updated)?;

        docs[pos] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Option<Document>> {
        self.record();
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(None);
        };
        Ok(position(docs, filter).map(|pos| docs.remove(pos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_unique_index_rejects_second_like() {
        let store = MemoryStore::new();
        store
            .insert(
                Collection::Likes,
                doc(json!({"_id": "l1", "likedBy": "u", "video": "v"})),
            )
            .await
            .unwrap();

        let err = store
            .insert(
                Collection::Likes,
                doc(json!({"_id": "l2", "likedBy": "u", "video": "v"})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        // same liker, different kind of target
        store
            .insert(
                Collection::Likes,
                doc(json!({"_id": "l3", "likedBy": "u", "tweet": "v"})),
            )
            .await
            .unwrap();

        assert_eq!(store.count(Collection::Likes, &Filter::All).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_leave_one_record() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert(
                        Collection::Subscriptions,
                        doc(json!({"_id": format!("s{}", i), "subscriber": "a", "channel": "b"})),
                    )
                    .await
                    .is_ok()
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(
            store
                .count(Collection::Subscriptions, &Filter::All)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_return_documents() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Videos, doc(json!({"_id": "v", "views": 0})))
            .await
            .unwrap();

        let updated = store
            .update_one(Collection::Videos, &Filter::id("v"), &Update::new().inc("views", 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["views"], 1);

        let missing = store
            .update_one(Collection::Videos, &Filter::id("nope"), &Update::new().inc("views", 1))
            .await
            .unwrap();
        assert!(missing.is_none());

        let deleted = store
            .delete_one(Collection::Videos, &Filter::id("v"))
            .await
            .unwrap();
        assert!(deleted.is_some());
        assert!(store
            .find_one(Collection::Videos, &Filter::id("v"))
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.operations(), 5);
    }

    #[tokio::test]
    async fn test_update_checks_unique_indexes_against_other_documents() {
        let store = MemoryStore::new();
        for (id, name) in [("u1", "alice"), ("u2", "bob")] {
            store
                .insert(
                    Collection::Users,
                    doc(json!({"_id": id, "username": name, "email": format!("{}@x.io", name)})),
                )
                .await
                .unwrap();
        }

        let renamed = store
            .update_one(
                Collection::Users,
                &Filter::id("u1"),
                &Update::new().set("fullName", "Alice A"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed["username"], "alice");

        let err = store
            .update_one(
                Collection::Users,
                &Filter::id("u2"),
                &Update::new().set("username", "alice"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        let bob = store
            .find_one(Collection::Users, &Filter::id("u2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bob["username"], "bob");
    }
}
