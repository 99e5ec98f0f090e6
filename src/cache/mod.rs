use crate::models::{TodoItem, TodoList};

/// Render-ready copy of every list owned by the signed-in identity.
///
/// Lists keep the order they arrived in (snapshot order, then appends).
/// Every operation is total: unknown ids are ignored rather than reported,
/// callers validate before they write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalListCache {
    lists: Vec<TodoList>,
    clears: u64,
}

impl LocalListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lists(&self) -> &[TodoList] {
        &self.lists
    }

    pub fn get(&self, id: &str) -> Option<&TodoList> {
        self.lists.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// How many times `clear` ran; one per sign-out or identity switch.
    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    pub fn replace_all(&mut self, lists: Vec<TodoList>) {
        self.lists = lists;
    }

    /// Replaces in place when the id is known, appends otherwise.
    pub fn upsert_list(&mut self, list: TodoList) {
        match self.lists.iter_mut().find(|l| l.id == list.id) {
            Some(existing) => *existing = list,
            None => self.lists.push(list),
        }
    }

    pub fn remove_list(&mut self, id: &str) {
        self.lists.retain(|l| l.id != id);
    }

    pub fn patch_items(&mut self, list_id: &str, items: Vec<TodoItem>) {
        if let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) {
            list.items = items;
        }
    }

    pub fn clear(&mut self) {
        self.lists.clear();
        self.clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: &str, label: &str, items: Vec<TodoItem>) -> TodoList {
        TodoList {
            id: id.to_string(),
            label: label.to_string(),
            owner_id: "u1".to_string(),
            items,
        }
    }

    #[test]
    fn test_replace_all_is_idempotent() {
        let snapshot = vec![
            list("l1", "Groceries", vec![TodoItem::new("1", "milk")]),
            list("l2", "Chores", vec![]),
        ];

        let mut once = LocalListCache::new();
        once.replace_all(snapshot.clone());

        let mut twice = LocalListCache::new();
        twice.replace_all(snapshot.clone());
        twice.replace_all(snapshot);

        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn test_upsert_keeps_position_of_known_list() {
        let mut cache = LocalListCache::new();
        cache.replace_all(vec![list("l1", "a", vec![]), list("l2", "b", vec![])]);

        cache.upsert_list(list("l1", "renamed", vec![]));
        cache.upsert_list(list("l3", "c", vec![]));

        let labels: Vec<&str> = cache.lists().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["renamed", "b", "c"]);
    }

    #[test]
    fn test_patch_and_remove_ignore_unknown_ids() {
        let mut cache = LocalListCache::new();
        cache.replace_all(vec![list("l1", "a", vec![])]);

        cache.patch_items("nope", vec![TodoItem::new("1", "x")]);
        cache.remove_list("nope");
        assert_eq!(cache.get("l1").map(|l| l.items.len()), Some(0));

        cache.patch_items("l1", vec![TodoItem::new("1", "x")]);
        assert_eq!(cache.get("l1").map(|l| l.items.len()), Some(1));

        cache.remove_list("l1");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_empties_and_counts() {
        let mut cache = LocalListCache::new();
        cache.replace_all(vec![list("l1", "a", vec![])]);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.clear_count(), 1);
    }
}
