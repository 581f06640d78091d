use std::collections::HashMap;

use parking_lot::Mutex;

/// Keys the on-road UI reads or writes.
pub mod keys {
    pub const CALIBRATION_PARAMS: &str = "CalibrationParams";
    pub const LIVE_PARAMETERS: &str = "LiveParameters";
    pub const SOFT_RESTART_TRIGGERED: &str = "SoftRestartTriggered";
    pub const ENABLE_WIDE_CAMERA: &str = "EnableWideCamera";
    pub const PRIME_REDIRECTED: &str = "PrimeRedirected";
    pub const IS_METRIC: &str = "IsMetric";
}

/// Flat key -> value store shared with the rest of the system.
pub trait ParamStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    fn get_bool(&self, key: &str) -> bool {
        self.get(key).map(|v| v == "1").unwrap_or(false)
    }

    fn put_bool(&self, key: &str, value: bool) {
        self.put(key, if value { "1" } else { "0" });
    }
}

#[derive(Default)]
pub struct MemoryParams {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(pairs: &[(&str, &str)]) -> Self {
        let p = Self::new();
        for (k, v) in pairs {
            p.put(k, v);
        }
        p
    }
}

impl ParamStore for MemoryParams {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        self.inner.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.inner.lock().remove(key);
    }
}
