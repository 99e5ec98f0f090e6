use crate::auth::AuthClient;
use crate::config::AppConfig;
use crate::errors::{StoreErrorKind, SyncError, SyncResult};
use crate::models::{AuthState, Identity};
use crate::projection::{ListView, ViewFilters};
use crate::remote::RestStore;
use crate::session::SessionWatcher;
use crate::storage::{load_flag, save_flag, LIGHT_THEME_KEY, SHOW_COMPLETED_KEY};
use crate::sync::{ListStore, WriteFuture};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::rc::Rc;

/// Everything the pages share. The sync core is plain `Rc` state, so it is
/// kept in local stored values; the UI only ever reads signals.
#[derive(Clone)]
pub(crate) struct AppState {
    pub auth_client: RwSignal<AuthClient>,

    session: StoredValue<SessionWatcher, LocalStorage>,
    lists: StoredValue<ListStore, LocalStorage>,
    remote: StoredValue<RestStore, LocalStorage>,

    /// Mirrors the session watcher for rendering.
    pub auth_state: RwSignal<AuthState>,

    /// Bumped on every cache change; views re-project when it moves.
    pub lists_version: RwSignal<u64>,

    pub show_completed: RwSignal<bool>,
    pub light_theme: RwSignal<bool>,

    /// Last rejected or failed intent, shown above the lists.
    pub action_error: RwSignal<Option<String>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let auth_client = AuthClient::load_from_storage(config.api_url.clone());

        let remote = RestStore::new(config.api_url.clone(), config.poll_interval_ms);
        remote.set_token(auth_client.token());

        let store = ListStore::new(Rc::new(remote.clone()), config.reconcile_policy);
        let lists_version = RwSignal::new(0u64);
        store.on_change(Rc::new(move || lists_version.update(|v| *v += 1)));

        let session = SessionWatcher::new();
        let auth_state = RwSignal::new(AuthState::Unauthenticated);
        session.observe(Rc::new(move |state: &AuthState| auth_state.set(state.clone())));
        store.attach(&session);
        session.publish(auth_client.restore_session());

        let light_theme = load_flag(LIGHT_THEME_KEY);
        apply_theme(light_theme);

        log::info!(
            "tasklists started (api {}, policy {})",
            config.api_url,
            config.reconcile_policy
        );

        Self {
            auth_client: RwSignal::new(auth_client),
            session: StoredValue::new_local(session),
            lists: StoredValue::new_local(store),
            remote: StoredValue::new_local(remote),
            auth_state,
            lists_version,
            show_completed: RwSignal::new(load_flag(SHOW_COMPLETED_KEY)),
            light_theme: RwSignal::new(light_theme),
            action_error: RwSignal::new(None),
        }
    }

    pub fn list_store(&self) -> ListStore {
        self.lists.get_value()
    }

    /// Tracks both the cache version and the filter.
    pub fn views(&self) -> Vec<ListView> {
        self.lists_version.track();
        let filters = ViewFilters {
            show_completed: self.show_completed.get(),
        };
        self.list_store().project(&filters)
    }

    pub fn sync_error(&self) -> Option<String> {
        self.lists_version.track();
        self.list_store().sync_error().map(|e| e.to_string())
    }

    /// Runs the remote half of an intent in the background. Rejections and
    /// failures land in `action_error`; a rejected token signs the user out.
    pub fn dispatch(&self, intent: SyncResult<WriteFuture>) {
        let write = match intent {
            Ok(write) => write,
            Err(e) => {
                self.action_error.set(Some(e.to_string()));
                return;
            }
        };

        self.action_error.set(None);
        let state = self.clone();
        spawn_local(async move {
            match write.await {
                Ok(()) => {}
                Err(e) if e.is_silent() => {}
                Err(SyncError::RemoteWrite(e)) if e.kind == StoreErrorKind::Unauthorized => {
                    log::warn!("session rejected by the store, signing out");
                    state.sign_out();
                }
                Err(e) => state.action_error.set(Some(e.to_string())),
            }
        });
    }

    /// Installs a freshly authenticated client and announces the identity.
    pub fn complete_sign_in(&self, client: AuthClient, identity: Identity) {
        self.remote.get_value().set_token(client.token());
        self.auth_client.set(client);
        self.action_error.set(None);
        self.session
            .get_value()
            .publish(AuthState::Authenticated(identity));
    }

    /// Local state goes synchronously; only the backend revoke is deferred.
    pub fn sign_out(&self) {
        let mut client = self.auth_client.get_untracked();
        let revoked = client.sign_out();
        self.auth_client.set(client.clone());
        self.remote.get_value().set_token(None);
        self.action_error.set(None);
        self.session.get_value().publish(AuthState::Unauthenticated);

        if let Some(token) = revoked {
            spawn_local(async move {
                client.revoke(token).await;
            });
        }
    }

    pub fn set_show_completed(&self, show: bool) {
        self.show_completed.set(show);
        save_flag(SHOW_COMPLETED_KEY, show);
    }

    pub fn toggle_theme(&self) {
        let light = !self.light_theme.get_untracked();
        self.light_theme.set(light);
        save_flag(LIGHT_THEME_KEY, light);
        apply_theme(light);
    }
}

fn apply_theme(light: bool) {
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element());
    if let Some(root) = root {
        let _ = root.class_list().toggle_with_force("dark", !light);
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
