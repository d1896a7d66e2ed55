use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const WATCHED: [&str; 2] = ["IRIS_PREDICTOR_CONFIG_HOME", "IRIS_PREDICTOR_BASE_URL"];

/// Serializes environment edits and restores the previous values on drop.
pub struct PredictorEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl PredictorEnvGuard {
    pub fn set_config_home(path: PathBuf) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = WATCHED
            .iter()
            .map(|key| (*key, std::env::var(key).ok()))
            .collect();
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var("IRIS_PREDICTOR_CONFIG_HOME", path);
            std::env::remove_var("IRIS_PREDICTOR_BASE_URL");
        }
        Self {
            previous,
            _lock: lock,
        }
    }

    pub fn set_base_url(&self, url: &str) {
        // SAFETY: the guard holds the global env lock.
        unsafe {
            std::env::set_var("IRIS_PREDICTOR_BASE_URL", url);
        }
    }
}

impl Drop for PredictorEnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
