use serde::de::DeserializeOwned;
use serde::Serialize;
use tactus_ports::storage::KeyValueStorePort;

pub(crate) fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStorePort, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(err) => {
            log::warn!("failed to read {key}: {err}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("ignoring malformed {key}: {err}");
            None
        }
    }
}

pub(crate) fn save_json<T: Serialize>(store: &dyn KeyValueStorePort, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            log::warn!("failed to encode {key}: {err}");
            return;
        }
    };
    if let Err(err) = store.set(key, &raw) {
        log::warn!("failed to persist {key}: {err}");
    }
}
