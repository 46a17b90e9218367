use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

/// Window used for warnings that fire on every session check, e.g. a
/// malformed cookie that is re-read each time a guard or poller runs.
pub const REPEATED_WARNING_WINDOW: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    suppressed: u64,
}

static WINDOWS: OnceLock<Mutex<HashMap<&'static str, Window>>> = OnceLock::new();

/// Returns `Some(suppressed)` when the event for `key` should be logged now,
/// `None` when it falls inside the current window and was counted instead.
pub fn should_emit(key: &'static str, interval: Duration) -> Option<u64> {
    let windows = WINDOWS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let now = Instant::now();

    let Some(window) = map.get_mut(key) else {
        map.insert(
            key,
            Window {
                opened_at: now,
                suppressed: 0,
            },
        );
        return Some(0);
    };

    if now.duration_since(window.opened_at) >= interval {
        let suppressed = window.suppressed;
        window.opened_at = now;
        window.suppressed = 0;
        Some(suppressed)
    } else {
        window.suppressed += 1;
        None
    }
}
