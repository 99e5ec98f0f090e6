use serde::{Deserialize, Serialize};

/// Remote collection holding one document per task list.
pub(crate) const LISTS_COLLECTION: &str = "todoLists";

/// Field used to scope the live query to the signed-in principal.
pub(crate) const OWNER_FIELD: &str = "ownerId";

/// The signed-in principal.
///
/// `uid` is the stable identifier every list is scoped to; `email` is carried
/// for display only and takes no part in equality.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Identity {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Identity {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated(Identity),
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            AuthState::Unauthenticated => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoList {
    /// Assigned by the remote store; never generated locally.
    pub id: String,
    pub label: String,
    pub owner_id: String,
    pub items: Vec<TodoItem>,
}

impl TodoList {
    pub(crate) fn from_document(id: &str, doc: ListDocument) -> Self {
        Self {
            id: id.to_string(),
            label: doc.label,
            owner_id: doc.owner_id,
            items: doc.items,
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|i| i.id == item_id)
    }
}

/// Wire shape of a list document in the remote store.
///
/// Items are embedded, so every item-level change rewrites this whole payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ListDocument {
    pub label: String,

    #[serde(rename = "ownerId")]
    pub owner_id: String,

    #[serde(default)]
    pub items: Vec<TodoItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_document_contract_deserialize() {
        let json = r#"{
            "label": "Groceries",
            "ownerId": "u1",
            "items": [{"id": "1700000000000", "text": "milk", "completed": true}]
        }"#;
        let doc: ListDocument = serde_json::from_str(json).expect("list document should parse");
        assert_eq!(doc.owner_id, "u1");
        assert_eq!(doc.items.len(), 1);
        assert!(doc.items[0].completed);
    }

    #[test]
    fn test_list_document_missing_items_defaults_empty() {
        let json = r#"{"label": "Chores", "ownerId": "u1"}"#;
        let doc: ListDocument = serde_json::from_str(json).expect("list document should parse");
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_list_document_serializes_owner_as_camel_case() {
        let doc = ListDocument {
            label: "Groceries".to_string(),
            owner_id: "u1".to_string(),
            items: vec![],
        };
        let v = serde_json::to_value(doc).expect("should serialize");
        assert_eq!(v["ownerId"], "u1");
        assert!(v.get("id").is_none());
    }

    #[test]
    fn test_auth_state_identity() {
        let u = Identity::new("u1").with_email("u@example.com");
        assert_eq!(
            AuthState::Authenticated(u.clone()).identity(),
            Some(&u)
        );
        assert!(AuthState::Unauthenticated.identity().is_none());
    }

    #[test]
    fn test_identity_equality_ignores_email() {
        let with = Identity::new("u1").with_email("u@example.com");
        assert_eq!(with, Identity::new("u1"));
        assert_ne!(with, Identity::new("u2").with_email("u@example.com"));
    }
}
