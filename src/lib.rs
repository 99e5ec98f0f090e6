mod app;
mod auth;
mod cache;
mod components;
mod config;
mod errors;
mod logging;
mod models;
mod pages;
mod projection;
mod remote;
mod session;
mod state;
mod storage;
mod sync;
mod util;
mod validate;

pub use cache::LocalListCache;
pub use errors::{StoreError, StoreErrorKind, SyncError, SyncResult, ValidationError};
pub use models::{AuthState, Identity, TodoItem, TodoList};
pub use projection::{project, ListView, ViewFilters};
pub use remote::{DocumentStore, MemoryStore, RestStore};
pub use session::SessionWatcher;
pub use sync::{ListStore, ReconcilePolicy, WriteFuture};

use app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    mount_to_body(App);
}
