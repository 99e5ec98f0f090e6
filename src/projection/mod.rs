use crate::cache::LocalListCache;
use crate::models::TodoItem;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewFilters {
    pub show_completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListView {
    pub id: String,
    pub label: String,
    pub items: Vec<TodoItem>,
    pub total: usize,
    pub completed: usize,
}

/// Derives what the UI renders from the cache. Never mutates it.
///
/// List and item order are kept as stored. With `show_completed` off, a list
/// whose items are all done disappears and the rest show only open items.
/// A list with no items at all is always shown so it can receive its first
/// task.
pub fn project(cache: &LocalListCache, filters: &ViewFilters) -> Vec<ListView> {
    cache
        .lists()
        .iter()
        .filter_map(|list| {
            let total = list.items.len();
            let completed = list.items.iter().filter(|i| i.completed).count();

            if !filters.show_completed && total > 0 && completed == total {
                return None;
            }

            let items = list
                .items
                .iter()
                .filter(|i| filters.show_completed || !i.completed)
                .cloned()
                .collect();

            Some(ListView {
                id: list.id.clone(),
                label: list.label.clone(),
                items,
                total,
                completed,
            })
        })
        .collect()
}
