mod http;
mod memory;

pub use http::RestStore;
pub use memory::MemoryStore;

use crate::errors::StoreResult;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

pub type StoreFuture<T> = LocalBoxFuture<'static, StoreResult<T>>;

/// Receives the complete, ordered result set of a live query on every change.
pub type SnapshotCallback = Rc<dyn Fn(StoreResult<Vec<Document>>)>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: serde_json::Value,
}

/// Equality filter on a top-level document field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QueryFilter {
    pub field: String,
    pub equals: serde_json::Value,
}

impl QueryFilter {
    pub fn field_eq(field: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.to_string(),
            equals: value.into(),
        }
    }

    pub fn matches(&self, data: &serde_json::Value) -> bool {
        data.get(&self.field) == Some(&self.equals)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

/// Remote authoritative document store.
///
/// Writes are asynchronous and return boxed futures so callers on a
/// single-threaded executor can hold them across `spawn_local`.
pub trait DocumentStore {
    /// Opens a live query. The callback receives an initial snapshot and one
    /// more after every change to the matching set, until `unsubscribe`.
    fn query(
        &self,
        collection: &str,
        filter: QueryFilter,
        on_snapshot: SnapshotCallback,
    ) -> SubscriptionId;

    /// Unknown or already-released ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    /// Returns the store-assigned document id.
    fn create_document(&self, collection: &str, data: serde_json::Value) -> StoreFuture<String>;

    fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> StoreFuture<Option<serde_json::Value>>;

    fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> StoreFuture<()>;

    fn delete_document(&self, collection: &str, id: &str) -> StoreFuture<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_top_level_field() {
        let f = QueryFilter::field_eq("ownerId", "u1");
        assert!(f.matches(&json!({"ownerId": "u1", "label": "a"})));
        assert!(!f.matches(&json!({"ownerId": "u2"})));
        assert!(!f.matches(&json!({"label": "a"})));
    }
}
