use super::reconcile::PendingChange;
use super::ListStore;
use crate::errors::{StoreError, SyncError, SyncResult};
use crate::models::{ListDocument, TodoItem, TodoList, LISTS_COLLECTION};
use crate::validate::{validate_item_text, validate_label};
use futures::future::LocalBoxFuture;

/// The remote half of an intent. Resolves once the write settles; the
/// optimistic half has already been applied when this is handed out.
pub type WriteFuture = LocalBoxFuture<'static, SyncResult<()>>;

/// An item-level change, applied once to the cached list and once more to
/// the freshly read remote document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ItemEdit {
    Append(TodoItem),
    SetCompleted { item_id: String, completed: bool },
    Remove(String),
}

impl ItemEdit {
    /// Returns whether `items` changed.
    pub fn apply(&self, list_id: &str, items: &mut Vec<TodoItem>) -> SyncResult<bool> {
        match self {
            ItemEdit::Append(item) => {
                if items.iter().any(|i| i.id == item.id) {
                    return Ok(false);
                }
                items.push(item.clone());
                Ok(true)
            }
            ItemEdit::SetCompleted { item_id, completed } => {
                let item = items.iter_mut().find(|i| &i.id == item_id).ok_or_else(|| {
                    SyncError::UnknownItem {
                        list_id: list_id.to_string(),
                        item_id: item_id.clone(),
                    }
                })?;
                let changed = item.completed != *completed;
                item.completed = *completed;
                Ok(changed)
            }
            ItemEdit::Remove(item_id) => {
                let before = items.len();
                items.retain(|i| &i.id != item_id);
                Ok(items.len() != before)
            }
        }
    }
}

impl ListStore {
    /// Creates a list for the signed-in identity. Nothing is shown until the
    /// remote store has assigned an id.
    pub fn add_list(&self, label: &str) -> SyncResult<WriteFuture> {
        let label = validate_label(label)?;
        let identity = self.identity().ok_or(SyncError::NotAuthenticated)?;

        let doc = ListDocument {
            label,
            owner_id: identity.uid,
            items: vec![],
        };
        let epoch = self.epoch();
        let store = self.clone();

        Ok(Box::pin(async move {
            let data = serde_json::to_value(&doc).map_err(StoreError::parse)?;
            let created = store
                .inner
                .remote
                .create_document(LISTS_COLLECTION, data)
                .await;
            let (id, doc) = store.finish(epoch, "create list", created.map(|id| (id, doc)))?;
            store.insert_created(id, doc);
            Ok(())
        }))
    }

    pub fn delete_list(&self, list_id: &str) -> SyncResult<WriteFuture> {
        self.require_list(list_id)?;

        self.inner.cache.borrow_mut().remove_list(list_id);
        let ticket = self
            .inner
            .pending
            .borrow_mut()
            .record(list_id, PendingChange::Removed);
        self.notify_changed();

        let epoch = self.epoch();
        let store = self.clone();
        let list_id = list_id.to_string();

        Ok(Box::pin(async move {
            let deleted = store
                .inner
                .remote
                .delete_document(LISTS_COLLECTION, &list_id)
                .await;
            store.settle(epoch, &list_id, ticket);
            store.finish(epoch, "delete list", deleted)
        }))
    }

    pub fn add_item(&self, list_id: &str, text: &str) -> SyncResult<WriteFuture> {
        let text = validate_item_text(text)?;
        self.require_list(list_id)?;

        let id = self.inner.ids.borrow_mut().next();
        self.edit_items(list_id, ItemEdit::Append(TodoItem::new(id, text)))
    }

    /// Flips the cached value and writes that exact value remotely, so a
    /// concurrent toggle elsewhere is overwritten rather than undone.
    pub fn toggle_item(&self, list_id: &str, item_id: &str) -> SyncResult<WriteFuture> {
        let completed = {
            let cache = self.inner.cache.borrow();
            let list = cache
                .get(list_id)
                .ok_or_else(|| SyncError::UnknownList(list_id.to_string()))?;
            let item = list.item(item_id).ok_or_else(|| SyncError::UnknownItem {
                list_id: list_id.to_string(),
                item_id: item_id.to_string(),
            })?;
            !item.completed
        };

        self.edit_items(
            list_id,
            ItemEdit::SetCompleted {
                item_id: item_id.to_string(),
                completed,
            },
        )
    }

    pub fn delete_item(&self, list_id: &str, item_id: &str) -> SyncResult<WriteFuture> {
        let known = self
            .require_list(list_id)?
            .item(item_id)
            .is_some();
        if !known {
            return Err(SyncError::UnknownItem {
                list_id: list_id.to_string(),
                item_id: item_id.to_string(),
            });
        }

        self.edit_items(list_id, ItemEdit::Remove(item_id.to_string()))
    }

    fn require_list(&self, list_id: &str) -> SyncResult<TodoList> {
        self.inner
            .cache
            .borrow()
            .get(list_id)
            .cloned()
            .ok_or_else(|| SyncError::UnknownList(list_id.to_string()))
    }

    fn edit_items(&self, list_id: &str, edit: ItemEdit) -> SyncResult<WriteFuture> {
        let mut items = self.require_list(list_id)?.items;
        edit.apply(list_id, &mut items)?;

        self.inner.cache.borrow_mut().patch_items(list_id, items);
        let ticket = self
            .inner
            .pending
            .borrow_mut()
            .record(list_id, PendingChange::Items(edit.clone()));
        self.notify_changed();

        let epoch = self.epoch();
        let store = self.clone();
        let list_id = list_id.to_string();

        Ok(Box::pin(async move {
            let written = store.read_modify_write(&list_id, &edit).await;
            store.settle(epoch, &list_id, ticket);
            store.finish(epoch, "update items", written)
        }))
    }

    /// Re-reads the whole document, applies `edit` to its items and writes
    /// the result back. Two of these racing on one list lose the earlier
    /// write; the final snapshot shows whichever landed last.
    async fn read_modify_write(&self, list_id: &str, edit: &ItemEdit) -> SyncResult<()> {
        let remote = self.inner.remote.clone();

        let data = remote
            .get_document(LISTS_COLLECTION, list_id)
            .await?
            .ok_or_else(|| StoreError::not_found("List"))?;
        let mut doc: ListDocument = serde_json::from_value(data).map_err(StoreError::parse)?;

        if !edit.apply(list_id, &mut doc.items)? {
            log::debug!("{list_id}: nothing to write");
            return Ok(());
        }

        let data = serde_json::to_value(&doc).map_err(StoreError::parse)?;
        remote
            .update_document(LISTS_COLLECTION, list_id, data)
            .await?;
        Ok(())
    }

    fn settle(&self, epoch: u64, list_id: &str, ticket: u64) {
        if self.epoch() == epoch {
            self.inner.pending.borrow_mut().settle(list_id, ticket);
        }
    }

    /// Drops results that outlived their identity. Failures are logged and
    /// handed back; the optimistic change is not rolled back.
    fn finish<T, E>(&self, epoch: u64, what: &str, result: Result<T, E>) -> SyncResult<T>
    where
        E: Into<SyncError>,
    {
        if self.epoch() != epoch {
            log::debug!("{what}: identity changed, dropping result");
            return Err(SyncError::StaleEpoch);
        }
        result.map_err(|e| {
            let e = e.into();
            log::warn!("{what} failed: {e}");
            e
        })
    }

    fn insert_created(&self, id: String, doc: ListDocument) {
        let inserted = {
            let mut cache = self.inner.cache.borrow_mut();
            if cache.get(&id).is_some() {
                false
            } else {
                cache.upsert_list(TodoList::from_document(&id, doc));
                true
            }
        };
        if inserted {
            self.notify_changed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(pairs: &[(&str, bool)]) -> Vec<TodoItem> {
        pairs
            .iter()
            .map(|(id, done)| TodoItem {
                id: id.to_string(),
                text: format!("task {id}"),
                completed: *done,
            })
            .collect()
    }

    #[test]
    fn test_set_completed_reports_change() {
        let mut v = items(&[("1", false)]);
        let edit = ItemEdit::SetCompleted {
            item_id: "1".to_string(),
            completed: true,
        };
        assert_eq!(edit.apply("l1", &mut v), Ok(true));
        assert_eq!(edit.apply("l1", &mut v), Ok(false));
        assert!(v[0].completed);
    }

    #[test]
    fn test_set_completed_on_missing_item_fails() {
        let mut v = items(&[("1", false)]);
        let edit = ItemEdit::SetCompleted {
            item_id: "9".to_string(),
            completed: true,
        };
        assert_eq!(
            edit.apply("l1", &mut v),
            Err(SyncError::UnknownItem {
                list_id: "l1".to_string(),
                item_id: "9".to_string()
            })
        );
    }

    #[test]
    fn test_append_skips_known_id() {
        let mut v = items(&[("1", false)]);
        let edit = ItemEdit::Append(TodoItem::new("1", "task 1"));
        assert_eq!(edit.apply("l1", &mut v), Ok(false));
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_remove_missing_item_is_a_no_op() {
        let mut v = items(&[("1", false), ("2", true)]);
        assert_eq!(ItemEdit::Remove("3".to_string()).apply("l1", &mut v), Ok(false));
        assert_eq!(ItemEdit::Remove("1".to_string()).apply("l1", &mut v), Ok(true));
        assert_eq!(v, items(&[("2", true)]));
    }
}
