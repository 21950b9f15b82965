//! JSON-lines logging on top of the `log` facade.
//!
//! Only startup loading and the batch worker pool log. The per-call scoring
//! paths stay silent and report through their return values.

use std::io::Write;

use log::{Level, LevelFilter};
use serde_json::json;

/// Install an `env_logger` backend that renders every record as one JSON line.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            let line = json!({
                "ts": crate::common::time::now_ms() as u64,
                "level": record.level().as_str(),
                "mod": record.target(),
                "msg": record.args().to_string(),
            });
            writeln!(buf, "{line}")
        })
        .try_init();
}

/// Emit a structured event line matching the documented schema.
pub fn log_event(level: Level, module: &str, event: &str, code: u32, dur_ms: u128) {
    log::log!(
        target: module,
        level,
        "{}",
        json!({ "ev": event, "code": code, "dur_ms": dur_ms as u64 })
    );
}
