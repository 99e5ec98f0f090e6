use crate::errors::{StoreError, StoreResult};
use crate::models::{AuthState, Identity};
use crate::storage::{
    load_string_from_storage, load_user_from_storage, remove_from_storage, save_string_to_storage,
    save_user_to_storage, TOKEN_KEY, USER_KEY,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AuthResponse {
    pub token: String,
    pub user: Identity,
}

/// REST identity provider.
///
/// Holds the bearer token for the current session and mirrors it (plus the
/// account) into localStorage so a reload restores the session.
#[derive(Clone, Debug)]
pub(crate) struct AuthClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl AuthClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn load_from_storage(base_url: String) -> Self {
        Self {
            token: load_string_from_storage(TOKEN_KEY),
            ..Self::new(base_url)
        }
    }

    fn save_to_storage(&self, user: &Identity) {
        if let Some(token) = &self.token {
            save_string_to_storage(TOKEN_KEY, token);
        }
        save_user_to_storage(user);
    }

    pub fn clear_storage() {
        remove_from_storage(&[TOKEN_KEY, USER_KEY]);
    }

    pub fn token(&self) -> Option<String> {
        self.token.clone()
    }

    /// What the session watcher should start from after a reload.
    pub fn restore_session(&self) -> AuthState {
        session_from(self.token.as_deref(), load_user_from_storage())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> StoreResult<Identity> {
        self.authenticate("/auth/sign-in", email, password).await
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> StoreResult<Identity> {
        self.authenticate("/auth/sign-up", email, password).await
    }

    /// Forgets the session locally, storage included, and hands back the
    /// token the backend should revoke.
    pub fn sign_out(&mut self) -> Option<String> {
        Self::clear_storage();
        self.token.take()
    }

    /// Best effort; the local session is already gone.
    pub async fn revoke(&self, token: String) {
        let req = reqwest::Client::new()
            .post(self.url("/auth/sign-out"))
            .header("Authorization", format!("Bearer {}", token));
        if let Err(e) = req.send().await {
            log::warn!("sign-out request failed: {e}");
        }
    }

    async fn authenticate(
        &mut self,
        path: &str,
        email: &str,
        password: &str,
    ) -> StoreResult<Identity> {
        let body = CredentialsRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let res = reqwest::Client::new()
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(StoreError::network)?;

        let status = res.status();
        if status.as_u16() == 401 {
            return Err(StoreError::unauthorized());
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::http(status, body, "Authentication failed"));
        }

        let auth: AuthResponse = res.json().await.map_err(StoreError::parse)?;
        self.token = Some(auth.token);
        self.save_to_storage(&auth.user);
        log::debug!("signed in as {}", auth.user.uid);
        Ok(auth.user)
    }
}

/// A session survives a reload only with both a token and an account.
pub(crate) fn session_from(token: Option<&str>, user: Option<Identity>) -> AuthState {
    match (token, user) {
        (Some(t), Some(user)) if !t.trim().is_empty() && !user.uid.is_empty() => {
            AuthState::Authenticated(user)
        }
        _ => AuthState::Unauthenticated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_contract_deserialize() {
        let json = r#"{
            "token": "abc",
            "user": { "uid": "u-1", "email": "ada@example.com" }
        }"#;

        let res: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(res.token, "abc");
        assert_eq!(res.user, Identity::new("u-1"));
        assert_eq!(res.user.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_auth_response_without_email() {
        let res: AuthResponse =
            serde_json::from_str(r#"{"token": "t", "user": {"uid": "u-2"}}"#).unwrap();
        assert_eq!(res.user.email, None);
    }

    #[test]
    fn test_credentials_request_shape() {
        let body = serde_json::to_value(CredentialsRequest {
            email: "a@b.co".to_string(),
            password: "pw".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@b.co", "password": "pw"}));
    }

    #[test]
    fn test_url_ignores_trailing_slash() {
        let client = AuthClient::new("http://localhost:6689/".to_string());
        assert_eq!(client.url("/auth/sign-in"), "http://localhost:6689/auth/sign-in");
    }

    #[test]
    fn test_session_requires_token_and_user() {
        let user = Identity::new("u1");
        assert_eq!(
            session_from(Some("tok"), Some(user.clone())),
            AuthState::Authenticated(user.clone())
        );
        assert_eq!(session_from(None, Some(user.clone())), AuthState::Unauthenticated);
        assert_eq!(session_from(Some("  "), Some(user)), AuthState::Unauthenticated);
        assert_eq!(session_from(Some("tok"), None), AuthState::Unauthenticated);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_sign_out_clears_storage_before_revoking() {
        let user = Identity::new("u1");
        let mut old = AuthClient::new("http://localhost".to_string());
        old.token = Some("old".to_string());
        old.save_to_storage(&user);

        let revoked = old.sign_out();
        assert_eq!(revoked.as_deref(), Some("old"));
        assert!(old.token().is_none());
        assert!(load_string_from_storage(TOKEN_KEY).is_none());

        // A new session saved while the revoke is in flight stays put.
        let mut next = AuthClient::new("http://localhost".to_string());
        next.token = Some("new".to_string());
        next.save_to_storage(&user);

        let restored = AuthClient::load_from_storage("http://localhost".to_string());
        assert_eq!(restored.token().as_deref(), Some("new"));
        assert_eq!(restored.restore_session(), AuthState::Authenticated(user));

        AuthClient::clear_storage();
    }
}
