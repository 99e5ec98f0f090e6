use crate::sync::ReconcilePolicy;
use std::str::FromStr;

pub(crate) const DEFAULT_API_URL: &str = "http://localhost:6689";
pub(crate) const DEFAULT_POLL_INTERVAL_MS: i32 = 2000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub poll_interval_ms: i32,
    pub reconcile_policy: ReconcilePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            reconcile_policy: ReconcilePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Builds a config from a key lookup. Unknown or malformed values fall
    /// back to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        // Both `API_URL` (documented) and `api_url` (legacy) are accepted.
        if let Some(url) = lookup("API_URL").or_else(|| lookup("api_url")) {
            if !url.trim().is_empty() {
                cfg.api_url = url.trim().to_string();
            }
        }

        if let Some(raw) = lookup("POLL_INTERVAL_MS") {
            match raw.trim().parse::<i32>() {
                Ok(ms) if ms >= 250 => cfg.poll_interval_ms = ms,
                _ => log::warn!("ignoring POLL_INTERVAL_MS={raw:?}"),
            }
        }

        if let Some(raw) = lookup("RECONCILE_POLICY") {
            match ReconcilePolicy::from_str(raw.trim()) {
                Ok(policy) => cfg.reconcile_policy = policy,
                Err(_) => log::warn!("ignoring RECONCILE_POLICY={raw:?}"),
            }
        }

        cfg
    }

    /// Reads `window.ENV` (injected by the host page).
    pub fn load() -> Self {
        let env = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object());

        let Some(env) = env else {
            return Self::default();
        };

        Self::from_lookup(|key| {
            let v = js_sys::Reflect::get(&env, &key.into()).ok()?;
            v.as_string().or_else(|| v.as_f64().map(|n| n.to_string()))
        })
    }
}
