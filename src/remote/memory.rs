use super::{Document, DocumentStore, QueryFilter, SnapshotCallback, StoreFuture, SubscriptionId};
use crate::errors::{StoreError, StoreResult};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

struct Subscription {
    collection: String,
    filter: QueryFilter,
    callback: SnapshotCallback,
}

#[derive(Default)]
struct MemoryInner {
    next_doc_id: u64,
    next_sub_id: u64,

    /// collection -> documents in creation order
    collections: BTreeMap<String, Vec<Document>>,
    subscriptions: BTreeMap<u64, Subscription>,

    /// Injected failure for the next write (create/update/delete).
    fail_next_write: Option<StoreError>,

    updates: usize,
}

impl MemoryInner {
    fn snapshot(&self, collection: &str, filter: &QueryFilter) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(&d.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn pending_deliveries(&self, collection: &str) -> Vec<(SnapshotCallback, Vec<Document>)> {
        self.subscriptions
            .values()
            .filter(|s| s.collection == collection)
            .map(|s| (s.callback.clone(), self.snapshot(collection, &s.filter)))
            .collect()
    }
}

/// In-process document store.
///
/// Pushes a fresh snapshot to every matching live query after each write.
/// Every async operation yields once to the executor before touching state,
/// which is enough to interleave concurrent read-modify-write sequences the
/// way a real network round-trip would.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document synchronously and notifies subscribers.
    pub fn seed(&self, collection: &str, data: serde_json::Value) -> String {
        let id = self.insert(collection, data);
        self.notify(collection);
        id
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<serde_json::Value> {
        self.inner
            .borrow()
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .map(|d| d.data.clone())
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.inner
            .borrow()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    pub fn update_count(&self) -> usize {
        self.inner.borrow().updates
    }

    pub fn fail_next_write(&self, err: StoreError) {
        self.inner.borrow_mut().fail_next_write = Some(err);
    }

    /// Re-sends the current result set to every subscriber of `collection`,
    /// as happens when another client touches the collection.
    pub fn push_current(&self, collection: &str) {
        self.notify(collection);
    }

    /// Breaks every live query on `collection` with `err`.
    pub fn break_subscriptions(&self, collection: &str, err: StoreError) {
        let callbacks: Vec<SnapshotCallback> = self
            .inner
            .borrow()
            .subscriptions
            .values()
            .filter(|s| s.collection == collection)
            .map(|s| s.callback.clone())
            .collect();
        for cb in callbacks {
            cb(Err(err.clone()));
        }
    }

    fn insert(&self, collection: &str, data: serde_json::Value) -> String {
        let mut inner = self.inner.borrow_mut();
        inner.next_doc_id += 1;
        let id = format!("doc-{}", inner.next_doc_id);
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                data,
            });
        id
    }

    fn take_injected_failure(&self) -> StoreResult<()> {
        match self.inner.borrow_mut().fail_next_write.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // Callbacks run with no borrow held; they may call back into the store.
    fn notify(&self, collection: &str) {
        let deliveries = self.inner.borrow().pending_deliveries(collection);
        for (cb, docs) in deliveries {
            cb(Ok(docs));
        }
    }
}

impl DocumentStore for MemoryStore {
    fn query(
        &self,
        collection: &str,
        filter: QueryFilter,
        on_snapshot: SnapshotCallback,
    ) -> SubscriptionId {
        let (id, initial) = {
            let mut inner = self.inner.borrow_mut();
            inner.next_sub_id += 1;
            let id = inner.next_sub_id;
            let initial = inner.snapshot(collection, &filter);
            inner.subscriptions.insert(
                id,
                Subscription {
                    collection: collection.to_string(),
                    filter,
                    callback: on_snapshot.clone(),
                },
            );
            (id, initial)
        };

        on_snapshot(Ok(initial));
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.borrow_mut().subscriptions.remove(&id.0);
    }

    fn create_document(&self, collection: &str, data: serde_json::Value) -> StoreFuture<String> {
        let store = self.clone();
        let collection = collection.to_string();
        Box::pin(async move {
            YieldNow::default().await;
            store.take_injected_failure()?;
            let id = store.insert(&collection, data);
            store.notify(&collection);
            Ok(id)
        })
    }

    fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> StoreFuture<Option<serde_json::Value>> {
        let store = self.clone();
        let collection = collection.to_string();
        let id = id.to_string();
        Box::pin(async move {
            YieldNow::default().await;
            Ok(store.document(&collection, &id))
        })
    }

    fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> StoreFuture<()> {
        let store = self.clone();
        let collection = collection.to_string();
        let id = id.to_string();
        Box::pin(async move {
            YieldNow::default().await;
            store.take_injected_failure()?;
            {
                let mut inner = store.inner.borrow_mut();
                let doc = inner
                    .collections
                    .get_mut(&collection)
                    .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                    .ok_or_else(|| StoreError::not_found("Document"))?;
                doc.data = data;
                inner.updates += 1;
            }
            store.notify(&collection);
            Ok(())
        })
    }

    fn delete_document(&self, collection: &str, id: &str) -> StoreFuture<()> {
        let store = self.clone();
        let collection = collection.to_string();
        let id = id.to_string();
        Box::pin(async move {
            YieldNow::default().await;
            store.take_injected_failure()?;
            {
                let mut inner = store.inner.borrow_mut();
                if let Some(docs) = inner.collections.get_mut(&collection) {
                    docs.retain(|d| d.id != id);
                }
            }
            store.notify(&collection);
            Ok(())
        })
    }
}

#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    fn recorder() -> (SnapshotCallback, Rc<RefCell<Vec<Vec<String>>>>) {
        let seen: Rc<RefCell<Vec<Vec<String>>>> = Rc::new(RefCell::new(vec![]));
        let seen2 = seen.clone();
        let cb: SnapshotCallback = Rc::new(move |snap: StoreResult<Vec<Document>>| {
            let ids: Vec<String> = snap
                .map(|docs| docs.into_iter().map(|d| d.id).collect())
                .unwrap_or_default();
            seen2.borrow_mut().push(ids);
        });
        (cb, seen)
    }

    #[test]
    fn test_query_delivers_initial_and_filtered_snapshots() {
        let store = MemoryStore::new();
        let mine = store.seed("c", json!({"ownerId": "u1"}));
        store.seed("c", json!({"ownerId": "u2"}));

        let (cb, seen) = recorder();
        store.query("c", QueryFilter::field_eq("ownerId", "u1"), cb);
        assert_eq!(seen.borrow().as_slice(), &[vec![mine.clone()]]);

        let second = block_on(store.create_document("c", json!({"ownerId": "u1"})))
            .expect("create should succeed");
        assert_eq!(seen.borrow().last(), Some(&vec![mine, second]));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let store = MemoryStore::new();
        let (cb, seen) = recorder();
        let sub = store.query("c", QueryFilter::field_eq("ownerId", "u1"), cb);
        store.unsubscribe(sub);
        store.unsubscribe(sub);
        store.seed("c", json!({"ownerId": "u1"}));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(store.subscription_count(), 0);
    }

    #[test]
    fn test_update_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = block_on(store.update_document("c", "nope", json!({})))
            .expect_err("update of a missing document should fail");
        assert_eq!(err.kind, crate::errors::StoreErrorKind::NotFound);
    }

    #[test]
    fn test_injected_failure_applies_to_one_write() {
        let store = MemoryStore::new();
        let id = store.seed("c", json!({"n": 1}));
        store.fail_next_write(StoreError::network("offline"));
        assert!(block_on(store.update_document("c", &id, json!({"n": 2}))).is_err());
        assert!(block_on(store.update_document("c", &id, json!({"n": 3}))).is_ok());
        assert_eq!(store.document("c", &id), Some(json!({"n": 3})));
    }

    #[test]
    fn test_get_and_delete() {
        let store = MemoryStore::new();
        let id = store.seed("c", json!({"n": 1}));
        assert_eq!(
            block_on(store.get_document("c", &id)).expect("get"),
            Some(json!({"n": 1}))
        );
        block_on(store.delete_document("c", &id)).expect("delete");
        assert_eq!(block_on(store.get_document("c", &id)).expect("get"), None);
    }
}
