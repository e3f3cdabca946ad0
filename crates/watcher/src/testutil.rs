//! Shared helpers for this crate's unit tests

use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Run `f` with `dir` as the process working directory, restoring the
/// previous one afterwards. Watch paths are cwd-relative, so tests
/// that touch the filesystem pin the cwd; the lock serializes them
/// because the cwd is process-wide.
pub fn in_dir<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
    static CWD_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard = CWD_LOCK
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir).unwrap();
    let result = f();
    std::env::set_current_dir(previous).unwrap();
    result
}
