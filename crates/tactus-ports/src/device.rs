use std::collections::BTreeMap;

/// Key token -> note name, the payload the glove firmware understands,
/// e.g. `{"W": "C5", "E": "D5"}`.
pub type DeviceKeyMap = BTreeMap<String, String>;

#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("device answered with status {0}")]
    Status(u16),
    #[error("invalid device payload: {0}")]
    Protocol(String),
}

/// Best-effort configuration sync with the glove. Calls may block on the
/// network, so the core only invokes them from worker threads.
pub trait DevicePort: Send + Sync {
    fn push_config(&self, mapping: &DeviceKeyMap) -> Result<(), DeviceError>;

    /// `Ok(None)` when the device has no stored configuration.
    fn fetch_config(&self) -> Result<Option<DeviceKeyMap>, DeviceError>;
}
