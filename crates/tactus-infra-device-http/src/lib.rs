use std::time::Duration;
use tactus_ports::device::{DeviceError, DeviceKeyMap, DevicePort};

pub const DEFAULT_ENDPOINT: &str = "http://192.168.4.1";
const TIMEOUT: Duration = Duration::from_secs(3);

/// Talks to the glove's configuration web server.
///
/// - `POST {endpoint}/config` with the key map as a JSON object
/// - `GET {endpoint}/ultimaConfig` returns the last stored map, 404 if none
pub struct HttpDevicePort {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpDevicePort {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(TIMEOUT).build();
        Self {
            endpoint: normalize_endpoint(&endpoint.into()),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn config_url(&self) -> String {
        format!("{}/config", self.endpoint)
    }

    pub fn last_config_url(&self) -> String {
        format!("{}/ultimaConfig", self.endpoint)
    }
}

impl Default for HttpDevicePort {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl DevicePort for HttpDevicePort {
    fn push_config(&self, mapping: &DeviceKeyMap) -> Result<(), DeviceError> {
        let url = self.config_url();
        log::debug!("pushing {} bindings to {url}", mapping.len());
        self.agent
            .post(&url)
            .send_json(mapping)
            .map_err(map_error)?;
        Ok(())
    }

    fn fetch_config(&self) -> Result<Option<DeviceKeyMap>, DeviceError> {
        let url = self.last_config_url();
        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(err) => return Err(map_error(err)),
        };
        let body = response
            .into_string()
            .map_err(|e| DeviceError::Protocol(e.to_string()))?;
        parse_key_map(&body)
    }
}

fn map_error(err: ureq::Error) -> DeviceError {
    match err {
        ureq::Error::Status(code, _) => DeviceError::Status(code),
        ureq::Error::Transport(transport) => DeviceError::Unreachable(transport.to_string()),
    }
}

fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

/// Accepts a flat `{"KEY": "NOTE"}` object. Non-string values are skipped;
/// an empty body or `null` means the glove has nothing stored.
pub fn parse_key_map(body: &str) -> Result<Option<DeviceKeyMap>, DeviceError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| DeviceError::Protocol(e.to_string()))?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(entries) => {
            let map: DeviceKeyMap = entries
                .into_iter()
                .filter_map(|(key, note)| note.as_str().map(|note| (key, note.to_string())))
                .collect();
            Ok(Some(map))
        }
        other => Err(DeviceError::Protocol(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
