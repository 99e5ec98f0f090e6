use thiserror::Error;

/// Input rejected before anything touches the cache or the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task text cannot be empty.")]
    EmptyText,
    #[error("List name cannot be empty.")]
    EmptyLabel,
    #[error("Email is required.")]
    MissingEmail,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("Password is required.")]
    MissingPassword,
    #[error("Password is too weak.")]
    WeakPassword,
    #[error("Please confirm your password.")]
    MissingConfirmation,
    #[error("Passwords do not match.")]
    PasswordMismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub(crate) fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn network(e: impl std::fmt::Display) -> Self {
        Self::new(StoreErrorKind::Network, e.to_string())
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self::new(StoreErrorKind::Parse, e.to_string())
    }

    pub(crate) fn unauthorized() -> Self {
        Self::new(StoreErrorKind::Unauthorized, "Unauthorized")
    }

    pub(crate) fn not_found(what: &str) -> Self {
        Self::new(StoreErrorKind::NotFound, format!("{what} not found"))
    }

    pub(crate) fn http(status: impl std::fmt::Display, body: String, ctx: &str) -> Self {
        Self::new(StoreErrorKind::Http, format!("{ctx} ({status}): {body}"))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not signed in.")]
    NotAuthenticated,

    #[error("List {0} does not exist.")]
    UnknownList(String),

    #[error("Task {item_id} does not exist in list {list_id}.")]
    UnknownItem { list_id: String, item_id: String },

    /// The optimistic change stays visible; the next snapshot settles it.
    #[error("Could not save your change: {0}")]
    RemoteWrite(#[from] StoreError),

    /// Identity changed while the write was in flight; its result was dropped.
    #[error("Write result discarded after sign-out.")]
    StaleEpoch,
}

impl SyncError {
    /// Errors the UI should not show to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, SyncError::StaleEpoch)
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_match_form_copy() {
        assert_eq!(ValidationError::MissingEmail.to_string(), "Email is required.");
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "Passwords do not match."
        );
    }

    #[test]
    fn test_store_error_http_message() {
        let e = StoreError::http(500, "boom".to_string(), "Update failed");
        assert_eq!(e.kind, StoreErrorKind::Http);
        assert_eq!(e.to_string(), "Update failed (500): boom");
    }

    #[test]
    fn test_only_stale_epoch_is_silent() {
        assert!(SyncError::StaleEpoch.is_silent());
        assert!(!SyncError::NotAuthenticated.is_silent());
        assert!(!SyncError::from(StoreError::network("offline")).is_silent());
    }
}
