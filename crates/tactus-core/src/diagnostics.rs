use crate::glove_config::GloveSnapshot;
use crate::ipc::InputRecord;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tactus_ports::storage::{SettingsDto, StorageError};

#[derive(Serialize)]
struct AppVersion {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
struct RecentInputs<'a> {
    inputs: &'a [InputRecord],
}

pub fn export_diagnostics(
    dir: &Path,
    settings: &SettingsDto,
    glove: &GloveSnapshot,
    recent_inputs: &[InputRecord],
) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;

    let app_version = AppVersion {
        name: "Tactus Glove".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let platform = PlatformInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    };

    write_json(&dir.join("app_version.json"), &app_version)?;
    write_json(&dir.join("platform.json"), &platform)?;
    write_json(&dir.join("settings.json"), settings)?;
    write_json(&dir.join("glove.json"), glove)?;
    write_json(
        &dir.join("recent_inputs.json"),
        &RecentInputs {
            inputs: recent_inputs,
        },
    )?;

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
    fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
}
