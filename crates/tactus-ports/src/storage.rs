use crate::types::*;
use serde::{Deserialize, Serialize};

pub const KEY_FINGER_MAPPING: &str = "fingerMapping";
pub const KEY_SELECTED_SCALE: &str = "selectedScale";
pub const KEY_CONFIG_MODE: &str = "configMode";
pub const KEY_SETTINGS: &str = "settings";

fn default_device_endpoint() -> Option<String> {
    Some("http://192.168.4.1".to_string())
}

fn default_sustain_ms() -> u64 {
    1200
}

fn default_step_unit_ms() -> u64 {
    420
}

fn default_success_hold_ms() -> u64 {
    1500
}

fn default_show_lead_in_ms() -> u64 {
    200
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    #[serde(default = "default_device_endpoint")]
    pub device_endpoint: Option<String>,
    pub selected_audio_out: Option<DeviceId>,
    pub master_volume_db: VolumeDb,
    #[serde(default = "default_sustain_ms")]
    pub sustain_ms: u64,
    #[serde(default = "default_step_unit_ms")]
    pub step_unit_ms: u64,
    #[serde(default = "default_success_hold_ms")]
    pub success_hold_ms: u64,
    #[serde(default = "default_show_lead_in_ms")]
    pub show_lead_in_ms: u64,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            device_endpoint: default_device_endpoint(),
            selected_audio_out: None,
            master_volume_db: VolumeDb::default(),
            sustain_ms: default_sustain_ms(),
            step_unit_ms: default_step_unit_ms(),
            success_hold_ms: default_success_hold_ms(),
            show_lead_in_ms: default_show_lead_in_ms(),
        }
    }
}

/// String-keyed storage holding JSON-encoded values.
pub trait KeyValueStorePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
