//! Redis DocumentStore implementation.

use super::error::RedisStoreError;
use super::pool::RedisPool;
use super::{doc_key, ids_key, ref_key, reference_fields, seq_key, unique_key};
use crate::ports::store::{
    index_key, Collection, Document, DocumentStore, Filter, Query, StoreError, StoreResult, Update,
};
use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands};
use deadpool_redis::Connection;
use serde_json::Value;

/// KEYS: doc, seq, ids, then ARGV[3] unique claims, then reference sets.
/// ARGV: json, id, claim count. Returns the colliding key, or nil once written.
const INSERT_SCRIPT: &str = r#"
local claims = tonumber(ARGV[3])
if redis.call('EXISTS', KEYS[1]) == 1 then return '_id' end
for i = 4, 3 + claims do
  if redis.call('EXISTS', KEYS[i]) == 1 then return KEYS[i] end
end
for i = 4, 3 + claims do redis.call('SET', KEYS[i], ARGV[2]) end
redis.call('SET', KEYS[1], ARGV[1])
local seq = redis.call('INCR', KEYS[2])
redis.call('ZADD', KEYS[3], seq, ARGV[2])
for i = 4 + claims, #KEYS do redis.call('ZADD', KEYS[i], seq, ARGV[2]) end
return false
"#;

/// KEYS: doc, ids, then ARGV[2] unique claims, then reference sets.
/// ARGV: id, claim count. Returns 0 when the document was already gone.
const DELETE_SCRIPT: &str = r#"
if redis.call('DEL', KEYS[1]) == 0 then return 0 end
redis.call('ZREM', KEYS[2], ARGV[1])
local claims = tonumber(ARGV[2])
for i = 3, 2 + claims do
  if redis.call('GET', KEYS[i]) == ARGV[1] then redis.call('DEL', KEYS[i]) end
end
for i = 3 + claims, #KEYS do redis.call('ZREM', KEYS[i], ARGV[1]) end
return 1
"#;

fn parse_doc(key: &str, raw: &str) -> Result<Document, RedisStoreError> {
    match serde_json::from_str(raw)? {
        Value::Object(doc) => Ok(doc),
        _ => Err(RedisStoreError::Corrupt(key.to_string())),
    }
}

fn doc_id(collection: Collection, doc: &Document) -> StoreResult<String> {
    match doc.get("_id") {
        Some(Value::String(id)) => Ok(id.clone()),
        _ => Err(StoreError::MissingId(collection)),
    }
}

/// Unique-index keys a document currently holds.
fn claimed_keys(collection: Collection, doc: &Document) -> Vec<String> {
    collection
        .unique_indexes()
        .iter()
        .filter_map(|index| index_key(doc, index))
        .map(|key| unique_key(collection.name(), &key))
        .collect()
}

/// Reference sets a document belongs to.
fn reference_keys(collection: Collection, doc: &Document) -> Vec<String> {
    reference_fields(collection)
        .iter()
        .filter_map(|field| match doc.get(*field) {
            Some(Value::String(value)) => Some(ref_key(collection.name(), field, value)),
            _ => None,
        })
        .collect()
}

/// Where the documents a filter can match are found.
#[derive(Debug, PartialEq)]
enum Lookup {
    Ids(Vec<String>),
    /// Unique claim key holding the only possible match.
    Unique(String),
    /// Reference set holding every possible match.
    Reference(String),
    Scan,
}

fn plan(collection: Collection, filter: &Filter) -> Lookup {
    let terms: Vec<&Filter> = match filter {
        Filter::And(terms) => terms.iter().collect(),
        other => vec![other],
    };

    for term in &terms {
        match term {
            Filter::Eq(field, Value::String(id)) if field == "_id" => {
                return Lookup::Ids(vec![id.clone()]);
            }
            Filter::In(field, values) if field == "_id" => {
                let mut ids: Vec<String> = Vec::with_capacity(values.len());
                for id in values.iter().filter_map(Value::as_str) {
                    if !ids.iter().any(|seen| seen == id) {
                        ids.push(id.to_string());
                    }
                }
                return Lookup::Ids(ids);
            }
            _ => {}
        }
    }

    let pinned: Document = terms
        .iter()
        .filter_map(|term| match term {
            Filter::Eq(field, value) => Some((field.clone(), value.clone())),
            _ => None,
        })
        .collect();

    for index in collection.unique_indexes() {
        if let Some(key) = index_key(&pinned, index) {
            return Lookup::Unique(unique_key(collection.name(), &key));
        }
    }
    for field in reference_fields(collection) {
        if let Some(Value::String(value)) = pinned.get(*field) {
            return Lookup::Reference(ref_key(collection.name(), field, value));
        }
    }
    Lookup::Scan
}

impl RedisPool {
    async fn load_ids(
        &self,
        conn: &mut Connection,
        collection: Collection,
        ids: &[String],
    ) -> Result<Vec<Document>, RedisStoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids
            .iter()
            .map(|id| doc_key(collection.name(), id))
            .collect();
        let raws: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(conn).await?;

        keys.iter()
            .zip(raws)
            .filter_map(|(key, raw)| raw.map(|raw| parse_doc(key, &raw)))
            .collect()
    }

    /// Documents that may match `filter`, in insertion order unless looked
    /// up by id. Callers still apply the filter.
    async fn candidates(
        &self,
        conn: &mut Connection,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, RedisStoreError> {
        let ids: Vec<String> = match plan(collection, filter) {
            Lookup::Ids(ids) => ids,
            Lookup::Unique(key) => {
                let owner: Option<String> = conn.get(&key).await?;
                owner.into_iter().collect()
            }
            Lookup::Reference(key) => conn.zrange(&key, 0, -1).await?,
            Lookup::Scan => conn.zrange(ids_key(collection.name()), 0, -1).await?,
        };
        self.load_ids(conn, collection, &ids).await
    }

    async fn first_match(
        &self,
        conn: &mut Connection,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, RedisStoreError> {
        Ok(self
            .candidates(conn, collection, filter)
            .await?
            .into_iter()
            .find(|doc| filter.matches(doc)))
    }

    /// Claim each key with `SET NX`; on the first collision release what was
    /// claimed and report the index that collided.
    async fn claim(
        &self,
        conn: &mut Connection,
        collection: Collection,
        keys: &[String],
        owner: &str,
    ) -> StoreResult<()> {
        let mut claimed: Vec<&String> = Vec::new();
        for key in keys {
            let ok: Option<String> = redis::cmd("SET")
                .arg(key)
                .arg(owner)
                .arg("NX")
                .query_async(conn)
                .await
                .map_err(RedisStoreError::from)?;
            if ok.is_none() {
                if !claimed.is_empty() {
                    conn.del::<_, ()>(&claimed)
                        .await
                        .map_err(RedisStoreError::from)?;
                }
                return Err(StoreError::Duplicate {
                    collection,
                    index: key.clone(),
                });
            }
            claimed.push(key);
        }
        Ok(())
    }

    async fn release(&self, conn: &mut Connection, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(e) = conn.del::<_, ()>(keys).await {
            tracing::warn!(error = %e, ?keys, "failed to release unique claims");
        }
    }

    async fn unwatch(&self, conn: &mut Connection) -> Result<(), RedisStoreError> {
        redis::cmd("UNWATCH").query_async::<_, ()>(conn).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RedisPool {
    async fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document> {
        let mut conn = self.conn().await?;
        let id = doc_id(collection, &doc)?;
        let json = serde_json::to_string(&doc)?;
        let name = collection.name();

        let unique = claimed_keys(collection, &doc);
        let mut keys = vec![doc_key(name, &id), seq_key(name), ids_key(name)];
        keys.extend(unique.iter().cloned());
        keys.extend(reference_keys(collection, &doc));

        let collided: Option<String> = redis::cmd("EVAL")
            .arg(INSERT_SCRIPT)
            .arg(keys.len())
            .arg(&keys)
            .arg(&json)
            .arg(&id)
            .arg(unique.len())
            .query_async(&mut conn)
            .await
            .map_err(RedisStoreError::from)?;

        match collided {
            Some(index) => Err(StoreError::Duplicate { collection, index }),
            None => Ok(doc),
        }
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Option<Document>> {
        let mut conn = self.conn().await?;
        Ok(self.first_match(&mut conn, collection, filter).await?)
    }

    async fn find(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>> {
        let mut conn = self.conn().await?;
        let docs = self.candidates(&mut conn, collection, &query.filter).await?;
        Ok(query.apply(docs))
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        if let Some(id) = filter.as_id() {
            let exists: bool = conn
                .exists(doc_key(collection.name(), id))
                .await
                .map_err(RedisStoreError::from)?;
            return Ok(u64::from(exists));
        }
        if matches!(filter, Filter::All) {
            let n: u64 = conn
                .zcard(ids_key(collection.name()))
                .await
                .map_err(RedisStoreError::from)?;
            return Ok(n);
        }
        let docs = self.candidates(&mut conn, collection, filter).await?;
        Ok(docs.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }

    /// Optimistic single-document write: the document key is watched between
    /// read and write, the filter is checked again on the watched copy, and a
    /// concurrent writer makes this call fail with [`StoreError::Conflict`].
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<Option<Document>> {
        let mut conn = self.conn().await?;
        let Some(current) = self.first_match(&mut conn, collection, filter).await? else {
            return Ok(None);
        };
        let id = doc_id(collection, &current)?;
        let name = collection.name();
        let key = doc_key(name, &id);

        redis::cmd("WATCH")
            .arg(&key)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(RedisStoreError::from)?;

        let raw: Option<String> = conn.get(&key).await.map_err(RedisStoreError::from)?;
        let before = match raw {
            Some(raw) => parse_doc(&key, &raw)?,
            None => {
                self.unwatch(&mut conn).await?;
                return Ok(None);
            }
        };
        if !filter.matches(&before) {
            self.unwatch(&mut conn).await?;
            return Ok(None);
        }
        let mut after = before.clone();
        update.apply(&mut after);

        let old_keys = claimed_keys(collection, &before);
        let new_keys: Vec<String> = claimed_keys(collection, &after)
            .into_iter()
            .filter(|k| !old_keys.contains(k))
            .collect();
        if let Err(err) = self.claim(&mut conn, collection, &new_keys, &id).await {
            self.unwatch(&mut conn).await?;
            return Err(err);
        }

        let old_refs = reference_keys(collection, &before);
        let new_refs = reference_keys(collection, &after);
        let joined: Vec<&String> = new_refs.iter().filter(|k| !old_refs.contains(k)).collect();
        let left: Vec<&String> = old_refs.iter().filter(|k| !new_refs.contains(k)).collect();
        let seq: Option<f64> = if joined.is_empty() {
            None
        } else {
            match conn.zscore::<_, _, Option<f64>>(ids_key(name), &id).await {
                Ok(seq) => seq,
                Err(e) => {
                    self.release(&mut conn, &new_keys).await;
                    return Err(RedisStoreError::from(e).into());
                }
            }
        };

        let json = serde_json::to_string(&after)?;
        let mut pipe = redis::pipe();
        pipe.atomic().set(&key, &json).ignore();
        for set in &left {
            pipe.zrem(*set, &id).ignore();
        }
        if let Some(seq) = seq {
            for set in &joined {
                pipe.zadd(*set, &id, seq).ignore();
            }
        }
        pipe.get(&key);

        let written: Option<(String,)> = match pipe.query_async(&mut conn).await {
            Ok(written) => written,
            Err(e) => {
                self.release(&mut conn, &new_keys).await;
                return Err(RedisStoreError::from(e).into());
            }
        };
        if written.is_none() {
            self.release(&mut conn, &new_keys).await;
            return Err(StoreError::Conflict(collection));
        }

        let kept = claimed_keys(collection, &after);
        let released: Vec<String> = old_keys.into_iter().filter(|k| !kept.contains(k)).collect();
        self.release(&mut conn, &released).await;

        Ok(Some(after))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Option<Document>> {
        let mut conn = self.conn().await?;
        let Some(doc) = self.first_match(&mut conn, collection, filter).await? else {
            return Ok(None);
        };
        let id = doc_id(collection, &doc)?;
        let name = collection.name();

        let unique = claimed_keys(collection, &doc);
        let mut keys = vec![doc_key(name, &id), ids_key(name)];
        keys.extend(unique.iter().cloned());
        keys.extend(reference_keys(collection, &doc));

        let deleted: i64 = redis::cmd("EVAL")
            .arg(DELETE_SCRIPT)
            .arg(keys.len())
            .arg(&keys)
            .arg(&id)
            .arg(unique.len())
            .query_async(&mut conn)
            .await
            .map_err(RedisStoreError::from)?;

        Ok((deleted == 1).then_some(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_id_filters_read_only_their_documents() {
        assert_eq!(
            plan(Collection::Videos, &Filter::id("v1")),
            Lookup::Ids(vec!["v1".to_string()])
        );
        let conditional = Filter::id("v1").and(Filter::eq("isPublished", true));
        assert_eq!(
            plan(Collection::Videos, &conditional),
            Lookup::Ids(vec!["v1".to_string()])
        );
        assert_eq!(
            plan(Collection::Users, &Filter::any_of("_id", ["a", "b", "a"])),
            Lookup::Ids(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_pair_filters_resolve_through_the_unique_claim() {
        let pair = Filter::eq("likedBy", "u1").and(Filter::eq("video", "v1"));
        let expected = unique_key(
            "likes",
            &index_key(&doc(json!({"likedBy": "u1", "video": "v1"})), &["likedBy", "video"])
                .unwrap(),
        );
        assert_eq!(plan(Collection::Likes, &pair), Lookup::Unique(expected));

        let sub = Filter::eq("subscriber", "a").and(Filter::eq("channel", "b"));
        assert!(matches!(plan(Collection::Subscriptions, &sub), Lookup::Unique(_)));
    }

    #[test]
    fn test_reference_filters_use_the_reference_set() {
        let liked = Filter::eq("likedBy", "u1").and(Filter::exists("video"));
        assert_eq!(
            plan(Collection::Likes, &liked),
            Lookup::Reference(ref_key("likes", "likedBy", "u1"))
        );
        assert_eq!(
            plan(Collection::Videos, &Filter::eq("owner", "u1")),
            Lookup::Reference(ref_key("videos", "owner", "u1"))
        );
        assert_eq!(
            plan(Collection::Videos, &Filter::eq("isPublished", true)),
            Lookup::Scan
        );
        assert_eq!(plan(Collection::Users, &Filter::All), Lookup::Scan);
    }

    #[test]
    fn test_document_index_entries() {
        let like = doc(json!({"_id": "l1", "likedBy": "u1", "tweet": "t1"}));
        assert_eq!(
            reference_keys(Collection::Likes, &like),
            vec![ref_key("likes", "likedBy", "u1"), ref_key("likes", "tweet", "t1")]
        );
        assert_eq!(claimed_keys(Collection::Likes, &like).len(), 1);

        let user = doc(json!({"_id": "u1", "username": "a", "email": "a@x"}));
        assert!(reference_keys(Collection::Users, &user).is_empty());
        assert_eq!(claimed_keys(Collection::Users, &user).len(), 2);
    }
}
