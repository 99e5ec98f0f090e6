use super::mutations::ItemEdit;
use crate::cache::LocalListCache;
use crate::models::TodoList;
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumString};

/// What an inbound snapshot does to optimistic changes that have not been
/// confirmed yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ReconcilePolicy {
    /// The snapshot wins outright. An optimistic change the snapshot does not
    /// contain yet vanishes until the snapshot produced by its own write
    /// arrives.
    #[default]
    ReplaceAll,

    /// The snapshot replaces the cache, then every unsettled optimistic
    /// change is re-applied on top.
    MergePending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PendingChange {
    Items(ItemEdit),
    Removed,
}

/// Optimistic changes whose remote writes have not settled yet, in the
/// order they were made, per list.
#[derive(Clone, Debug, Default)]
pub(crate) struct PendingOverlay {
    next_ticket: u64,
    entries: BTreeMap<String, Vec<(u64, PendingChange)>>,
}

impl PendingOverlay {
    pub fn record(&mut self, list_id: &str, change: PendingChange) -> u64 {
        self.next_ticket += 1;
        self.entries
            .entry(list_id.to_string())
            .or_default()
            .push((self.next_ticket, change));
        self.next_ticket
    }

    /// Drops the change for `ticket`; other changes on the list stay.
    pub fn settle(&mut self, list_id: &str, ticket: u64) {
        if let Some(changes) = self.entries.get_mut(list_id) {
            changes.retain(|(t, _)| *t != ticket);
            if changes.is_empty() {
                self.entries.remove(list_id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Edits that no longer fit the snapshot (an item removed elsewhere)
    /// are skipped.
    fn apply_to(&self, cache: &mut LocalListCache) {
        for (list_id, changes) in &self.entries {
            for (_, change) in changes {
                match change {
                    PendingChange::Items(edit) => {
                        let Some(list) = cache.get(list_id) else {
                            continue;
                        };
                        let mut items = list.items.clone();
                        if let Ok(true) = edit.apply(list_id, &mut items) {
                            cache.patch_items(list_id, items);
                        }
                    }
                    PendingChange::Removed => cache.remove_list(list_id),
                }
            }
        }
    }
}

pub(crate) fn reconcile(
    policy: ReconcilePolicy,
    cache: &mut LocalListCache,
    snapshot: Vec<TodoList>,
    pending: &PendingOverlay,
) {
    cache.replace_all(snapshot);
    if policy == ReconcilePolicy::MergePending {
        pending.apply_to(cache);
    }
}
