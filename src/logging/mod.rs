use log::{Level, LevelFilter, Log, Metadata, Record};

/// Routes `log` records to the browser console at the matching severity.
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(record.level(), record.target(), &record.args().to_string());
        let msg = wasm_bindgen::JsValue::from_str(&line);
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            Level::Info => web_sys::console::info_1(&msg),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

fn format_line(level: Level, target: &str, msg: &str) -> String {
    // Drop the crate prefix; every record comes from here anyway.
    let target = target.split_once("::").map(|(_, rest)| rest).unwrap_or(target);
    format!("[{level}] {target}: {msg}")
}

/// Installs the console logger. Debug builds log at debug, release at info.
pub fn init() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_strips_crate_prefix() {
        assert_eq!(
            format_line(Level::Warn, "tasklists_app::sync", "list subscription failed"),
            "[WARN] sync: list subscription failed"
        );
        assert_eq!(format_line(Level::Debug, "main", "hi"), "[DEBUG] main: hi");
    }
}
