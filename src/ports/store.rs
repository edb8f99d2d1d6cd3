//! Document store port.
//!
//! Documents are JSON objects keyed by `_id`. Adapters only need to provide
//! storage and the unique-index guarantee; filter evaluation, sorting,
//! projection and update application are shared and live here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;

pub type Document = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate key in {collection}: {index}")]
    Duplicate { collection: Collection, index: String },

    #[error("Document in {0} is missing an _id")]
    MissingId(Collection),

    #[error("Write conflict on {0}")]
    Conflict(Collection),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Videos,
    Tweets,
    Comments,
    Likes,
    Subscriptions,
    Playlists,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Users,
        Collection::Videos,
        Collection::Tweets,
        Collection::Comments,
        Collection::Likes,
        Collection::Subscriptions,
        Collection::Playlists,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Videos => "videos",
            Collection::Tweets => "tweets",
            Collection::Comments => "comments",
            Collection::Likes => "likes",
            Collection::Subscriptions => "subscriptions",
            Collection::Playlists => "playlists",
        }
    }

    /// Sparse unique indexes: a document takes part in an index only when
    /// every field of that index is present and non-null.
    pub fn unique_indexes(&self) -> &'static [&'static [&'static str]] {
        match self {
            Collection::Users => &[&["username"], &["email"]],
            Collection::Likes => &[
                &["likedBy", "video"],
                &["likedBy", "comment"],
                &["likedBy", "tweet"],
            ],
            Collection::Subscriptions => &[&["subscriber", "channel"]],
            _ => &[],
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Key of `doc` under `index`, or `None` when the document is not covered.
pub fn index_key(doc: &Document, index: &[&str]) -> Option<String> {
    let mut parts = Vec::with_capacity(index.len());
    for field in index {
        match doc.get(*field) {
            None | Some(Value::Null) => return None,
            Some(value) => parts.push(format!("{}={}", field, value)),
        }
    }
    Some(parts.join("|"))
}

#[derive(Debug, Clone, Default)]
pub enum Filter {
    #[default]
    All,
    Eq(String, Value),
    In(String, Vec<Value>),
    Exists(String, bool),
    /// Case-insensitive regex match on a string field.
    Matches(String, Regex),
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn id(id: impl Into<Value>) -> Self {
        Filter::eq("_id", id)
    }

    pub fn any_of<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(field.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn exists(field: &str) -> Self {
        Filter::Exists(field.to_string(), true)
    }

    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), f) => {
                left.push(f);
                Filter::And(left)
            }
            (f, Filter::And(mut right)) => {
                right.insert(0, f);
                Filter::And(right)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    /// `_id` the filter pins down, if it is a plain id lookup.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            Filter::Eq(field, Value::String(id)) if field == "_id" => Some(id),
            _ => None,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => doc.get(field) == Some(value),
            Filter::In(field, values) => doc
                .get(field)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            Filter::Exists(field, wanted) => {
                let present = !matches!(doc.get(field), None | Some(Value::Null));
                present == *wanted
            }
            Filter::Matches(field, re) => doc
                .get(field)
                .and_then(Value::as_str)
                .map(|s| re.is_match(s))
                .unwrap_or(false),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default)]
pub enum Projection {
    #[default]
    All,
    /// Keep only these fields (plus `_id`).
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Projection {
    pub fn include(fields: &[&str]) -> Self {
        Projection::Include(fields.iter().map(|f| f.to_string()).collect())
    }

    pub fn exclude(fields: &[&str]) -> Self {
        Projection::Exclude(fields.iter().map(|f| f.to_string()).collect())
    }

    pub fn apply(&self, mut doc: Document) -> Document {
        match self {
            Projection::All => doc,
            Projection::Include(fields) => {
                doc.retain(|k, _| k == "_id" || fields.iter().any(|f| f == k));
                doc
            }
            Projection::Exclude(fields) => {
                doc.retain(|k, _| !fields.iter().any(|f| f == k));
                doc
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Filter,
    pub sort: Option<(String, SortOrder)>,
    pub skip: u64,
    pub limit: Option<u64>,
    pub projection: Projection,
}

impl Query {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some((field.to_string(), order));
        self
    }

    pub fn newest_first(self) -> Self {
        self.sort("createdAt", SortOrder::Desc)
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Runs the query over documents given in insertion order.
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = docs
            .into_iter()
            .filter(|doc| self.filter.matches(doc))
            .collect();

        if let Some((field, order)) = &self.sort {
            // stable: ties keep insertion order, reversed for descending sorts
            if *order == SortOrder::Desc {
                matched.reverse();
            }
            matched.sort_by(|a, b| {
                let ord = compare_values(a.get(field), b.get(field));
                match order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = self
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| self.projection.apply(doc))
            .collect()
    }
}

/// Ordering used by sorts. Missing and null sort first, RFC 3339 timestamps
/// compare chronologically, numbers numerically, strings case-sensitively.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Single-document update in the style of `$set` / `$inc` / `$addToSet` /
/// `$pull`. `updatedAt` is stamped on every applied update.
#[derive(Debug, Clone, Default)]
pub struct Update {
    pub set: Vec<(String, Value)>,
    pub inc: Vec<(String, i64)>,
    pub add_to_set: Vec<(String, Value)>,
    pub pull: Vec<(String, Value)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set.push((field.to_string(), value.into()));
        self
    }

    pub fn inc(mut self, field: &str, by: i64) -> Self {
        self.inc.push((field.to_string(), by));
        self
    }

    pub fn add_to_set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.add_to_set.push((field.to_string(), value.into()));
        self
    }

    pub fn pull(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.pull.push((field.to_string(), value.into()));
        self
    }

    pub fn apply(&self, doc: &mut Document) {
        self.apply_at(doc, Utc::now());
    }

    pub fn apply_at(&self, doc: &mut Document, now: DateTime<Utc>) {
        for (field, value) in &self.set {
            doc.insert(field.clone(), value.clone());
        }

        for (field, by) in &self.inc {
            let current = doc.get(field).and_then(Value::as_i64).unwrap_or(0);
            doc.insert(field.clone(), Value::from(current + by));
        }

        for (field, value) in &self.add_to_set {
            let entry = doc
                .entry(field.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !entry.is_array() {
                *entry = Value::Array(Vec::new());
            }
            if let Value::Array(items) = entry {
                if !items.contains(value) {
                    items.push(value.clone());
                }
            }
        }

        for (field, value) in &self.pull {
            if let Some(Value::Array(items)) = doc.get_mut(field) {
                items.retain(|item| item != value);
            }
        }

        doc.insert(
            "updatedAt".to_string(),
            Value::String(now.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)),
        );
    }
}

/// Persistence port. Every call is one logical round-trip against the
/// backing store; no call spans more than one document except reads.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Fails with [`StoreError::Duplicate`] when the
    /// document collides on `_id` or on any of the collection's unique indexes.
    async fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document>;

    async fn find_one(&self, collection: Collection, filter: &Filter)
        -> StoreResult<Option<Document>>;

    async fn find(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>>;

    async fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<u64>;

    /// Apply `update` to the first match and return the updated document.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<Option<Document>>;

    /// Remove the first match and return it.
    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Option<Document>>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document> {
        (**self).insert(collection, doc).await
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Option<Document>> {
        (**self).find_one(collection, filter).await
    }

    async fn find(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>> {
        (**self).find(collection, query).await
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        (**self).count(collection, filter).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<Option<Document>> {
        (**self).update_one(collection, filter, update).await
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Option<Document>> {
        (**self).delete_one(collection, filter).await
    }
}

pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(doc) => Ok(doc),
        other => Err(StoreError::Backend(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}
