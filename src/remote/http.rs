use super::{Document, DocumentStore, QueryFilter, SnapshotCallback, StoreFuture, SubscriptionId};
use crate::errors::{StoreError, StoreResult};
use leptos::task::spawn_local;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct QueryResponse {
    pub documents: Vec<Document>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CreateResponse {
    pub id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct GetResponse {
    pub data: serde_json::Value,
}

/// One polling live query. Dropping it stops the timer callback.
struct ActivePoll {
    interval_id: i32,
    alive: Rc<Cell<bool>>,
    _tick: Closure<dyn FnMut()>,
}

#[derive(Default)]
struct PollState {
    in_flight: bool,
    last: Option<Vec<Document>>,
    failing: bool,
}

/// JSON-over-HTTP document store.
///
/// The backend has no push channel, so a live query is emulated by polling:
/// each tick re-runs the query and the callback only fires when the result
/// set changed (or the query starts/stops failing).
#[derive(Clone)]
pub struct RestStore {
    pub(crate) base_url: String,
    token: Rc<RefCell<Option<String>>>,
    poll_interval_ms: i32,
    next_sub_id: Rc<Cell<u64>>,
    polls: Rc<RefCell<BTreeMap<u64, ActivePoll>>>,
}

impl RestStore {
    pub fn new(base_url: String, poll_interval_ms: i32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Rc::new(RefCell::new(None)),
            poll_interval_ms,
            next_sub_id: Rc::new(Cell::new(0)),
            polls: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    /// Shared by every clone, so requests already built keep working after
    /// the session token changes.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    fn auth_header(&self) -> Option<String> {
        self.token.borrow().as_ref().map(|t| format!("Bearer {}", t))
    }

    pub(crate) fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/store/{}",
            self.base_url,
            urlencoding::encode(collection)
        )
    }

    pub(crate) fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    async fn send(
        req: reqwest::RequestBuilder,
        auth_header: Option<String>,
        ctx: &str,
    ) -> StoreResult<reqwest::Response> {
        let req = match auth_header {
            Some(h) => req.header("Authorization", h),
            None => req,
        };

        let res = req.send().await.map_err(StoreError::network)?;
        let status = res.status();

        if status.is_success() {
            Ok(res)
        } else if status.as_u16() == 401 {
            Err(StoreError::unauthorized())
        } else if status.as_u16() == 404 {
            Err(StoreError::not_found(ctx))
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(StoreError::http(status, body, ctx))
        }
    }

    async fn run_query(
        url: String,
        auth_header: Option<String>,
        filter: QueryFilter,
    ) -> StoreResult<Vec<Document>> {
        let req = reqwest::Client::new().post(format!("{url}/query")).json(&filter);
        let res = Self::send(req, auth_header, "Query").await?;
        let body: QueryResponse = res.json().await.map_err(StoreError::parse)?;
        Ok(body.documents)
    }

    fn poll_once(
        &self,
        url: String,
        filter: QueryFilter,
        state: Rc<RefCell<PollState>>,
        alive: Rc<Cell<bool>>,
        on_snapshot: SnapshotCallback,
    ) {
        {
            let mut st = state.borrow_mut();
            if st.in_flight {
                return;
            }
            st.in_flight = true;
        }

        let auth_header = self.auth_header();
        spawn_local(async move {
            let result = Self::run_query(url, auth_header, filter).await;
            state.borrow_mut().in_flight = false;

            // Unsubscribed while the request was out.
            if !alive.get() {
                return;
            }

            let deliver = {
                let mut st = state.borrow_mut();
                match &result {
                    Ok(docs) => {
                        let changed = st.failing || st.last.as_ref() != Some(docs);
                        st.failing = false;
                        st.last = Some(docs.clone());
                        changed
                    }
                    Err(_) => {
                        let first_failure = !st.failing;
                        st.failing = true;
                        first_failure
                    }
                }
            };

            if deliver {
                on_snapshot(result);
            }
        });
    }
}

impl DocumentStore for RestStore {
    fn query(
        &self,
        collection: &str,
        filter: QueryFilter,
        on_snapshot: SnapshotCallback,
    ) -> SubscriptionId {
        let sub_id = self.next_sub_id.get() + 1;
        self.next_sub_id.set(sub_id);

        let url = self.collection_url(collection);
        let state = Rc::new(RefCell::new(PollState::default()));
        let alive = Rc::new(Cell::new(true));

        self.poll_once(
            url.clone(),
            filter.clone(),
            state.clone(),
            alive.clone(),
            on_snapshot.clone(),
        );

        let Some(win) = web_sys::window() else {
            return SubscriptionId(sub_id);
        };

        let s2 = self.clone();
        let alive2 = alive.clone();
        let tick = Closure::wrap(Box::new(move || {
            s2.poll_once(
                url.clone(),
                filter.clone(),
                state.clone(),
                alive2.clone(),
                on_snapshot.clone(),
            );
        }) as Box<dyn FnMut()>);

        let interval_id = win
            .set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                self.poll_interval_ms,
            )
            .unwrap_or(0);

        self.polls.borrow_mut().insert(
            sub_id,
            ActivePoll {
                interval_id,
                alive,
                _tick: tick,
            },
        );

        SubscriptionId(sub_id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let Some(poll) = self.polls.borrow_mut().remove(&id.0) else {
            return;
        };
        poll.alive.set(false);
        if let Some(win) = web_sys::window() {
            win.clear_interval_with_handle(poll.interval_id);
        }
    }

    fn create_document(&self, collection: &str, data: serde_json::Value) -> StoreFuture<String> {
        let url = self.collection_url(collection);
        let auth_header = self.auth_header();
        Box::pin(async move {
            let req = reqwest::Client::new().post(url).json(&data);
            let res = Self::send(req, auth_header, "Create").await?;
            let body: CreateResponse = res.json().await.map_err(StoreError::parse)?;
            if body.id.trim().is_empty() {
                return Err(StoreError::parse("Create succeeded but response is missing id"));
            }
            Ok(body.id)
        })
    }

    fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> StoreFuture<Option<serde_json::Value>> {
        let url = self.document_url(collection, id);
        let auth_header = self.auth_header();
        Box::pin(async move {
            let req = reqwest::Client::new().get(url);
            match Self::send(req, auth_header, "Document").await {
                Ok(res) => {
                    let body: GetResponse = res.json().await.map_err(StoreError::parse)?;
                    Ok(Some(body.data))
                }
                Err(e) if e.kind == crate::errors::StoreErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> StoreFuture<()> {
        let url = self.document_url(collection, id);
        let auth_header = self.auth_header();
        Box::pin(async move {
            let req = reqwest::Client::new().put(url).json(&data);
            Self::send(req, auth_header, "Update").await?;
            Ok(())
        })
    }

    fn delete_document(&self, collection: &str, id: &str) -> StoreFuture<()> {
        let url = self.document_url(collection, id);
        let auth_header = self.auth_header();
        Box::pin(async move {
            let req = reqwest::Client::new().delete(url);
            Self::send(req, auth_header, "Delete").await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_store_urls_are_encoded() {
        let store = RestStore::new("http://localhost:6689/".to_string(), 2000);
        assert_eq!(store.base_url, "http://localhost:6689");
        assert_eq!(
            store.collection_url("todoLists"),
            "http://localhost:6689/store/todoLists"
        );
        assert_eq!(
            store.document_url("todoLists", "a/b"),
            "http://localhost:6689/store/todoLists/a%2Fb"
        );
    }

    #[test]
    fn test_rest_store_auth_header_follows_shared_token() {
        let store = RestStore::new("http://localhost:6689".to_string(), 2000);
        let clone = store.clone();
        assert!(clone.auth_header().is_none());
        store.set_token(Some("jwt".to_string()));
        assert_eq!(clone.auth_header().as_deref(), Some("Bearer jwt"));
        store.set_token(None);
        assert!(clone.auth_header().is_none());
    }

    #[test]
    fn test_query_response_contract_deserialize() {
        let json = r#"{"documents": [{"id": "l1", "data": {"label": "a", "ownerId": "u1"}}]}"#;
        let parsed: QueryResponse = serde_json::from_str(json).expect("query response should parse");
        assert_eq!(parsed.documents[0].id, "l1");
        assert_eq!(parsed.documents[0].data["ownerId"], "u1");
    }

    #[test]
    fn test_unsubscribe_unknown_id_is_ignored() {
        let store = RestStore::new("http://localhost:6689".to_string(), 2000);
        store.unsubscribe(SubscriptionId(42));
    }
}
