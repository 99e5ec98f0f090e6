#[cfg(target_arch = "wasm32")]
pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Time-based item ids, unique within one session.
///
/// Two items added within the same millisecond (or after the clock stepped
/// backwards) get `last + 1` instead of a duplicate.
#[derive(Clone, Debug, Default)]
pub(crate) struct LocalIdGen {
    last: i64,
}

impl LocalIdGen {
    pub fn next_at(&mut self, now_ms: i64) -> String {
        let id = if now_ms > self.last {
            now_ms
        } else {
            self.last.saturating_add(1)
        };
        self.last = id;
        id.to_string()
    }

    pub fn next(&mut self) -> String {
        self.next_at(now_ms())
    }
}

pub(crate) fn trimmed_non_empty(s: &str) -> Option<&str> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}
