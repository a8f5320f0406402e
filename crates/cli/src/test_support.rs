use std::ffi::OsString;
use std::sync::{Mutex, OnceLock, PoisonError};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Restores captured variables when dropped, even if the test body panics.
struct SavedEnv(Vec<(String, Option<OsString>)>);

impl Drop for SavedEnv {
    fn drop(&mut self) {
        for (key, value) in self.0.drain(..) {
            match value {
                Some(value) => set_env_var(&key, &value.to_string_lossy()),
                None => remove_env_var(&key),
            }
        }
    }
}

/// Runs `run` with `keys` cleared, holding the process-wide env lock.
///
/// Every key is put back to its previous value afterwards.
pub(crate) fn with_scoped_env<R>(keys: &[&str], run: impl FnOnce() -> R) -> R {
    let _guard = env_lock().lock().unwrap_or_else(PoisonError::into_inner);
    let _saved = SavedEnv(
        keys.iter()
            .map(|key| (key.to_string(), std::env::var_os(key)))
            .collect(),
    );
    for key in keys {
        remove_env_var(key);
    }
    run()
}

/// Set an environment variable in test contexts.
///
/// # Safety
/// These calls remain unsafe in this toolchain. Call sites should use
/// `with_scoped_env` to avoid data races between parallel tests.
pub(crate) fn set_env_var(key: &str, value: &str) {
    // SAFETY: required for this toolchain's `std::env` API.
    unsafe {
        std::env::set_var(key, value);
    }
}

/// Remove an environment variable in test contexts.
pub(crate) fn remove_env_var(key: &str) {
    // SAFETY: required for this toolchain's `std::env` API.
    unsafe {
        std::env::remove_var(key);
    }
}
