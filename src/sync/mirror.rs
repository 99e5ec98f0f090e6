use crate::errors::StoreResult;
use crate::models::{Identity, LISTS_COLLECTION, OWNER_FIELD};
use crate::remote::{Document, DocumentStore, QueryFilter, SnapshotCallback, SubscriptionId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// The live, owner-scoped query feeding the cache.
///
/// At most one query is open. Every `open` and `close` bumps the instance
/// counter, and a snapshot is only forwarded while the instance it was
/// opened under is still current, so a push racing a close never lands.
pub(crate) struct MirrorSubscription {
    store: Rc<dyn DocumentStore>,
    active: RefCell<Option<SubscriptionId>>,
    instance: Rc<Cell<u64>>,
}

impl MirrorSubscription {
    pub fn new(store: Rc<dyn DocumentStore>) -> Self {
        Self {
            store,
            active: RefCell::new(None),
            instance: Rc::new(Cell::new(0)),
        }
    }

    pub fn open(
        &self,
        identity: &Identity,
        on_snapshot: impl Fn(StoreResult<Vec<Document>>) + 'static,
    ) {
        self.close();

        let instance = self.instance.get() + 1;
        self.instance.set(instance);

        let current = self.instance.clone();
        let callback: SnapshotCallback = Rc::new(move |snap: StoreResult<Vec<Document>>| {
            if current.get() != instance {
                log::debug!("dropping snapshot from closed subscription #{instance}");
                return;
            }
            on_snapshot(snap);
        });

        let id = self.store.query(
            LISTS_COLLECTION,
            QueryFilter::field_eq(OWNER_FIELD, identity.uid.clone()),
            callback,
        );

        // The initial snapshot may already have triggered a close.
        if self.instance.get() != instance {
            self.store.unsubscribe(id);
            return;
        }

        log::debug!("opened list subscription #{instance} for {}", identity.uid);
        *self.active.borrow_mut() = Some(id);
    }

    /// Idempotent; safe before any `open`.
    pub fn close(&self) {
        self.instance.set(self.instance.get() + 1);
        let id = self.active.borrow_mut().take();
        if let Some(id) = id {
            self.store.unsubscribe(id);
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryStore, StoreFuture};
    use serde_json::json;

    fn counting() -> (Rc<Cell<usize>>, impl Fn(StoreResult<Vec<Document>>) + 'static) {
        let n = Rc::new(Cell::new(0));
        let n2 = n.clone();
        (n, move |_snap: StoreResult<Vec<Document>>| n2.set(n2.get() + 1))
    }

    #[test]
    fn test_close_is_idempotent_and_safe_unopened() {
        let store = MemoryStore::new();
        let mirror = MirrorSubscription::new(Rc::new(store.clone()));
        mirror.close();
        mirror.close();
        assert!(!mirror.is_open());
        assert_eq!(store.subscription_count(), 0);
    }

    #[test]
    fn test_reopen_closes_previous_subscription() {
        let store = MemoryStore::new();
        let mirror = MirrorSubscription::new(Rc::new(store.clone()));

        let (first, on_first) = counting();
        mirror.open(&Identity::new("u1"), on_first);
        let (second, on_second) = counting();
        mirror.open(&Identity::new("u2"), on_second);

        assert_eq!(store.subscription_count(), 1);
        store.seed(LISTS_COLLECTION, json!({"ownerId": "u1", "label": "a"}));
        store.seed(LISTS_COLLECTION, json!({"ownerId": "u2", "label": "b"}));

        // initial only for the first, initial + two pushes for the second
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 3);
    }

    // Holds on to the snapshot callback the way an in-flight network
    // response would.
    struct Spy {
        inner: MemoryStore,
        captured: Rc<RefCell<Option<SnapshotCallback>>>,
    }

    impl DocumentStore for Spy {
        fn query(&self, c: &str, f: QueryFilter, cb: SnapshotCallback) -> SubscriptionId {
            *self.captured.borrow_mut() = Some(cb.clone());
            self.inner.query(c, f, cb)
        }
        fn unsubscribe(&self, id: SubscriptionId) {
            self.inner.unsubscribe(id)
        }
        fn create_document(&self, c: &str, d: serde_json::Value) -> StoreFuture<String> {
            self.inner.create_document(c, d)
        }
        fn get_document(&self, c: &str, id: &str) -> StoreFuture<Option<serde_json::Value>> {
            self.inner.get_document(c, id)
        }
        fn update_document(&self, c: &str, id: &str, d: serde_json::Value) -> StoreFuture<()> {
            self.inner.update_document(c, id, d)
        }
        fn delete_document(&self, c: &str, id: &str) -> StoreFuture<()> {
            self.inner.delete_document(c, id)
        }
    }

    #[test]
    fn test_snapshot_after_close_is_dropped() {
        let captured: Rc<RefCell<Option<SnapshotCallback>>> = Rc::new(RefCell::new(None));
        let mirror = MirrorSubscription::new(Rc::new(Spy {
            inner: MemoryStore::new(),
            captured: captured.clone(),
        }));

        let (count, on_snapshot) = counting();
        mirror.open(&Identity::new("u1"), on_snapshot);
        assert_eq!(count.get(), 1);

        mirror.close();
        let late = captured.borrow().clone().expect("callback captured");
        late(Ok(vec![]));
        assert_eq!(count.get(), 1);
    }
}
