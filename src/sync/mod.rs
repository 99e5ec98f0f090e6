//! The synchronized list store.
//!
//! Owns the local cache and keeps it in step with the signed-in identity:
//! identity transitions open/close the live query, snapshots flow through
//! the reconciliation policy, and user intents (see `mutations`) patch the
//! cache optimistically before writing through to the remote store.

mod mirror;
mod mutations;
mod reconcile;


pub use mutations::WriteFuture;
pub use reconcile::ReconcilePolicy;

use crate::cache::LocalListCache;
use crate::errors::{StoreError, StoreResult};
use crate::models::{AuthState, Identity, ListDocument, TodoList};
use crate::projection::{project, ListView, ViewFilters};
use crate::remote::{Document, DocumentStore};
use crate::session::{SessionWatcher, WatchToken};
use crate::util::LocalIdGen;
use mirror::MirrorSubscription;
use reconcile::{reconcile, PendingOverlay};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type ChangeCallback = Rc<dyn Fn()>;

struct StoreInner {
    remote: Rc<dyn DocumentStore>,
    policy: ReconcilePolicy,
    mirror: MirrorSubscription,

    cache: RefCell<LocalListCache>,
    identity: RefCell<Option<Identity>>,

    /// Bumped on every identity transition. Async results carry the epoch
    /// they started under and are dropped if it moved.
    epoch: Cell<u64>,

    pending: RefCell<PendingOverlay>,
    ids: RefCell<LocalIdGen>,

    /// Last subscription failure; cleared by the next good snapshot.
    sync_error: RefCell<Option<StoreError>>,

    listeners: RefCell<Vec<ChangeCallback>>,
}

#[derive(Clone)]
pub struct ListStore {
    inner: Rc<StoreInner>,
}

impl ListStore {
    pub fn new(remote: Rc<dyn DocumentStore>, policy: ReconcilePolicy) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                mirror: MirrorSubscription::new(remote.clone()),
                remote,
                policy,
                cache: RefCell::new(LocalListCache::new()),
                identity: RefCell::new(None),
                epoch: Cell::new(0),
                pending: RefCell::new(PendingOverlay::default()),
                ids: RefCell::new(LocalIdGen::default()),
                sync_error: RefCell::new(None),
                listeners: RefCell::new(vec![]),
            }),
        }
    }

    /// Follows `watcher` for the lifetime of the store. The watcher's
    /// initial event is applied immediately.
    pub fn attach(&self, watcher: &SessionWatcher) -> WatchToken {
        let weak = Rc::downgrade(&self.inner);
        watcher.observe(Rc::new(move |state: &AuthState| {
            if let Some(inner) = weak.upgrade() {
                ListStore { inner }.set_auth_state(state);
            }
        }))
    }

    pub fn set_auth_state(&self, state: &AuthState) {
        let next = state.identity().cloned();
        if *self.inner.identity.borrow() == next {
            return;
        }

        let previous = self.inner.identity.replace(next.clone());

        // Tear down before anything for the next identity can arrive.
        self.inner.mirror.close();
        if previous.is_some() {
            self.inner.cache.borrow_mut().clear();
        }
        self.inner.pending.borrow_mut().clear();
        self.inner.sync_error.replace(None);
        self.inner.epoch.set(self.inner.epoch.get() + 1);

        if let Some(identity) = next {
            let epoch = self.inner.epoch.get();
            let owner = identity.uid.clone();
            let weak = Rc::downgrade(&self.inner);
            self.inner.mirror.open(&identity, move |snap| {
                if let Some(inner) = weak.upgrade() {
                    ListStore { inner }.apply_snapshot(epoch, &owner, snap);
                }
            });
        }

        self.notify_changed();
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.identity.borrow().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.inner.epoch.get()
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.inner.policy
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.mirror.is_open()
    }

    pub fn sync_error(&self) -> Option<StoreError> {
        self.inner.sync_error.borrow().clone()
    }

    pub fn lists(&self) -> Vec<TodoList> {
        self.inner.cache.borrow().lists().to_vec()
    }

    pub fn with_cache<R>(&self, f: impl FnOnce(&LocalListCache) -> R) -> R {
        f(&self.inner.cache.borrow())
    }

    pub fn project(&self, filters: &ViewFilters) -> Vec<ListView> {
        project(&self.inner.cache.borrow(), filters)
    }

    /// Optimistic changes whose writes have not settled.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Called after every cache change, with no borrow held.
    pub fn on_change(&self, callback: ChangeCallback) {
        self.inner.listeners.borrow_mut().push(callback);
    }

    fn notify_changed(&self) {
        let listeners: Vec<ChangeCallback> = self.inner.listeners.borrow().clone();
        for cb in listeners {
            cb();
        }
    }

    fn apply_snapshot(&self, epoch: u64, owner: &str, result: StoreResult<Vec<Document>>) {
        if self.inner.epoch.get() != epoch {
            return;
        }

        match result {
            Ok(docs) => {
                let lists = decode_lists(docs, owner);
                log::debug!("snapshot: {} lists for {owner}", lists.len());
                reconcile(
                    self.inner.policy,
                    &mut self.inner.cache.borrow_mut(),
                    lists,
                    &self.inner.pending.borrow(),
                );
                self.inner.sync_error.replace(None);
            }
            Err(e) => {
                // Keep the last good state on screen.
                log::warn!("list subscription failed: {e}");
                self.inner.sync_error.replace(Some(e));
            }
        }

        self.notify_changed();
    }
}

/// Decodes snapshot documents, skipping malformed ones and any list not
/// owned by `owner`.
fn decode_lists(docs: Vec<Document>, owner: &str) -> Vec<TodoList> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value::<ListDocument>(doc.data) {
            Ok(data) if data.owner_id == owner => Some(TodoList::from_document(&doc.id, data)),
            Ok(data) => {
                log::warn!("skipping list {} owned by {}", doc.id, data.owner_id);
                None
            }
            Err(e) => {
                log::warn!("skipping malformed list {}: {e}", doc.id);
                None
            }
        })
        .collect()
}
