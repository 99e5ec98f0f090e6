use crate::models::Identity;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "tasklists_token";
pub(crate) const USER_KEY: &str = "tasklists_user";
pub(crate) const SHOW_COMPLETED_KEY: &str = "tasklists_show_completed";
pub(crate) const LIGHT_THEME_KEY: &str = "tasklists_light_theme";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn save_user_to_storage(user: &Identity) {
    save_json_to_storage(USER_KEY, user);
}

pub(crate) fn load_user_from_storage() -> Option<Identity> {
    load_json_from_storage(USER_KEY)
}

pub(crate) fn load_string_from_storage(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub(crate) fn save_string_to_storage(key: &str, value: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(key, value);
    }
}

pub(crate) fn remove_from_storage(keys: &[&str]) {
    if let Some(storage) = local_storage() {
        for key in keys {
            let _ = storage.remove_item(key);
        }
    }
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = load_string_from_storage(key)?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        save_string_to_storage(key, &json);
    }
}

pub(crate) fn parse_flag(v: &str) -> bool {
    v == "1" || v == "true"
}

pub(crate) fn load_flag(key: &str) -> bool {
    load_string_from_storage(key)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

pub(crate) fn save_flag(key: &str, value: bool) {
    save_string_to_storage(key, if value { "1" } else { "0" });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_accepts_legacy_true() {
        assert!(parse_flag("1"));
        assert!(parse_flag("true"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_user_storage_roundtrip() {
        let user = Identity::new("u1").with_email("u@example.com");
        save_user_to_storage(&user);
        let loaded = load_user_from_storage().expect("should load user from localStorage");
        assert_eq!(loaded, user);
        assert_eq!(loaded.email, user.email);

        remove_from_storage(&[USER_KEY]);
        assert!(load_user_from_storage().is_none());
    }

    #[wasm_bindgen_test]
    fn test_flag_storage_roundtrip() {
        save_flag(SHOW_COMPLETED_KEY, true);
        assert!(load_flag(SHOW_COMPLETED_KEY));
        save_flag(SHOW_COMPLETED_KEY, false);
        assert!(!load_flag(SHOW_COMPLETED_KEY));
    }
}
