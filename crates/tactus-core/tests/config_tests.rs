mod common;

use common::{statuses, Harness, ScriptedDevice};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tactus_core::{Command, Event, GloveSnapshot};
use tactus_domain_notes::{
    ConfigMode, Finger, FingerMapping, KeyToken, Note, PitchClass, ScalePreset, SelectedScale,
};
use tactus_infra_storage_fs::MemoryStorage;
use tactus_ports::device::DeviceError;
use tactus_ports::storage::{KeyValueStorePort, KEY_FINGER_MAPPING, KEY_SETTINGS};
use tactus_ports::types::VolumeDb;

fn preset_mapping(name: &str) -> FingerMapping {
    FingerMapping::from_scale(&ScalePreset::find(name).unwrap().notes())
}

fn config_update(events: &[Event]) -> Option<GloveSnapshot> {
    events.iter().rev().find_map(|event| match event {
        Event::GloveConfigUpdated { config } => Some(config.clone()),
        _ => None,
    })
}

#[test]
fn starts_from_the_default_mapping() {
    let h = Harness::new();
    assert_eq!(h.core.glove().mapping(), &FingerMapping::default());
    assert_eq!(h.core.glove().selected(), &SelectedScale::Preset("C Major".to_string()));
    assert_eq!(h.core.glove().mode(), ConfigMode::Preset);
}

#[test]
fn config_updates_carry_piano_key_hints() {
    let mut h = Harness::new();
    let events = h.send(Command::SelectCustom, 0);
    let hints = config_update(&events).expect("config update").key_hints;

    assert_eq!(hints.len(), 24);
    assert_eq!(hints.get(&Note::new(PitchClass::C, 5)), Some(&KeyToken::from('A')));
    assert_eq!(hints.get(&Note::new(PitchClass::CSharp, 5)), Some(&KeyToken::from('W')));
    assert_eq!(hints.get(&Note::new(PitchClass::E, 6)), Some(&KeyToken::from(';')));
    assert_eq!(hints.get(&Note::new(PitchClass::B, 6)), Some(&KeyToken::from('M')));
}

#[test]
fn applying_a_preset_maps_fingers_and_persists() {
    let storage = Arc::new(MemoryStorage::new());
    let mut h = Harness::with_storage(storage.clone());

    let events = h.send(
        Command::ApplyPreset {
            name: "D Major".to_string(),
        },
        0,
    );
    let config = config_update(&events).expect("config update");
    assert_eq!(config.mapping, preset_mapping("D Major"));
    assert_eq!(config.mode, ConfigMode::Preset);
    assert_eq!(config.selected_scale, SelectedScale::Preset("D Major".to_string()));
    assert_eq!(config.scale_notes.len(), 10);

    let reloaded = Harness::with_storage(storage);
    assert_eq!(reloaded.core.glove().mapping(), &preset_mapping("D Major"));
    assert_eq!(
        reloaded.core.glove().selected(),
        &SelectedScale::Preset("D Major".to_string())
    );
    assert_eq!(reloaded.core.glove().mode(), ConfigMode::Preset);
}

#[test]
fn applying_the_same_preset_twice_is_idempotent() {
    let mut h = Harness::new();
    let first = h.send(
        Command::ApplyPreset {
            name: "A Minor".to_string(),
        },
        0,
    );
    let second = h.send(
        Command::ApplyPreset {
            name: "A Minor".to_string(),
        },
        10,
    );
    assert_eq!(config_update(&first), config_update(&second));
}

#[test]
fn unknown_preset_changes_nothing() {
    let mut h = Harness::new();
    let events = h.send(
        Command::ApplyPreset {
            name: "H Major".to_string(),
        },
        0,
    );
    assert!(events.is_empty());
    assert_eq!(h.core.glove().mapping(), &FingerMapping::default());
}

#[test]
fn finger_edit_switches_to_custom_and_a_preset_overrides_it() {
    let mut h = Harness::new();
    let events = h.send(
        Command::UpdateFingerNote {
            finger: Finger::RightPinky,
            note: Some("a6".to_string()),
        },
        0,
    );
    let config = config_update(&events).unwrap();
    assert_eq!(config.mode, ConfigMode::Custom);
    assert_eq!(config.mapping.right_pinky, Some(Note::new(PitchClass::A, 6)));
    assert_eq!(
        config.bindings.get(&Finger::RightPinky.key_token()),
        Some(Note::new(PitchClass::A, 6))
    );

    h.send(
        Command::ApplyPreset {
            name: "G Major".to_string(),
        },
        10,
    );
    assert_eq!(h.core.glove().mapping(), &preset_mapping("G Major"));
    assert_eq!(h.core.glove().mode(), ConfigMode::Preset);
}

#[test]
fn unparseable_finger_note_is_ignored() {
    let mut h = Harness::new();
    let events = h.send(
        Command::UpdateFingerNote {
            finger: Finger::LeftIndex,
            note: Some("H9".to_string()),
        },
        0,
    );
    assert!(events.is_empty());
    assert_eq!(h.core.glove().mapping(), &FingerMapping::default());
    assert_eq!(h.core.glove().mode(), ConfigMode::Preset);
}

#[test]
fn selecting_custom_keeps_the_mapping() {
    let mut h = Harness::new();
    h.send(
        Command::ApplyPreset {
            name: "E Minor".to_string(),
        },
        0,
    );
    h.send(Command::SelectCustom, 10);
    assert_eq!(h.core.glove().mapping(), &preset_mapping("E Minor"));
    assert_eq!(h.core.glove().selected(), &SelectedScale::Custom);
    assert_eq!(h.core.glove().mode(), ConfigMode::Custom);
    assert_eq!(h.core.glove().scale_notes(), Vec::new());
}

#[test]
fn malformed_stored_notes_load_as_empty_fingers() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(KEY_FINGER_MAPPING, r#"{"leftThumb":"X#9","leftIndex":"Eb5"}"#)
        .unwrap();
    storage.set(KEY_SETTINGS, "not json").unwrap();

    let h = Harness::with_storage(storage);
    let mapping = h.core.glove().mapping();
    assert_eq!(mapping.left_thumb, None);
    assert_eq!(mapping.left_index, Some(Note::new(PitchClass::DSharp, 5)));
    // Fields missing from the stored object keep their defaults.
    assert_eq!(mapping.right_pinky, Some(Note::new(PitchClass::C, 6)));
    assert_eq!(h.core.settings().sustain_ms, 1200);
}

#[test]
fn scales_are_listed_in_display_order() {
    let mut h = Harness::new();
    let events = h.send(Command::ListScales, 0);
    match events.as_slice() {
        [Event::ScalesListed { names }] => {
            assert_eq!(names.len(), 24);
            assert_eq!(names[0], "C Major");
            assert_eq!(names[12], "A Minor");
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[test]
fn volume_is_clamped_and_persisted() {
    let storage = Arc::new(MemoryStorage::new());
    let mut h = Harness::with_storage(storage.clone());
    let events = h.send(Command::SetMasterVolume { db: -80.0 }, 0);
    assert_eq!(h.sink.volume(), Some(VolumeDb(-48.0)));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::SettingsUpdated { .. })));

    let reloaded = Harness::with_storage(storage);
    assert_eq!(reloaded.core.settings().master_volume_db, VolumeDb(-48.0));
    assert_eq!(reloaded.sink.volume(), Some(VolumeDb(-48.0)));
}

#[test]
fn saving_to_the_glove_sends_the_key_map() {
    let device = ScriptedDevice::empty();
    let mut h = Harness::with_device(device.clone());

    let events = h.send(Command::SaveToDevice, 0);
    assert_eq!(
        statuses(&events),
        vec!["Sending configuration to the glove...".to_string()]
    );
    h.wait_for(|event| {
        matches!(event, Event::Status { message } if message == "Configuration sent to the glove")
    });

    let pushed = device.pushed.lock().clone();
    assert_eq!(pushed.len(), 1);
    let keys: Vec<(&str, &str)> = pushed[0]
        .iter()
        .map(|(key, note)| (key.as_str(), note.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("E", "D5"),
            ("I", "A5"),
            ("O", "B5"),
            ("P", "C6"),
            ("R", "E5"),
            ("T", "F5"),
            ("U", "G5"),
            ("W", "C5"),
        ]
    );
}

#[test]
fn unreachable_glove_falls_back_to_local_save() {
    let mut h = Harness::with_device(ScriptedDevice::unreachable());
    h.send(Command::SaveToDevice, 0);
    let events = h.wait_for(|event| matches!(event, Event::Status { message } if message.contains("saved locally")));
    assert!(statuses(&events).contains(&"Glove unreachable; saved locally".to_string()));
}

#[test]
fn rejected_push_reports_the_status_code() {
    let device = ScriptedDevice::empty();
    *device.push_fails_with.lock() = Some(DeviceError::Status(500));
    let mut h = Harness::with_device(device);
    h.send(Command::SaveToDevice, 0);
    let events = h.wait_for(|event| matches!(event, Event::Status { message } if message.contains("status 500")));
    assert!(statuses(&events)
        .iter()
        .any(|message| message.ends_with("saved locally")));
}

#[test]
fn save_without_a_device_stays_local() {
    let mut h = Harness::new();
    let events = h.send(Command::SaveToDevice, 0);
    assert_eq!(
        statuses(&events),
        vec!["No device configured; saved locally".to_string()]
    );
}

#[test]
fn stored_glove_config_overrides_local_mapping_at_startup() {
    let device = ScriptedDevice::with_stored(&[("Q", "G5"), ("W", "a5"), ("Z", "C5"), ("E", "??")]);
    let mut h = Harness::with_device(device);
    h.wait_for(|event| matches!(event, Event::GloveConfigUpdated { .. }));

    let mapping = h.core.glove().mapping().clone();
    assert_eq!(mapping.left_thumb, Some(Note::new(PitchClass::G, 5)));
    assert_eq!(mapping.left_index, Some(Note::new(PitchClass::A, 5)));
    // Missing and unreadable keys leave their fingers alone.
    assert_eq!(mapping.left_middle, Some(Note::new(PitchClass::D, 5)));
    assert_eq!(h.core.glove().mode(), ConfigMode::Custom);

    h.key_down("Q", 0);
    assert_eq!(h.sink.attacks(), vec![79]);
}

#[test]
fn manual_load_reports_an_empty_glove() {
    let mut h = Harness::with_device(ScriptedDevice::empty());
    h.send(Command::LoadFromDevice, 0);
    h.wait_for(|event| {
        matches!(event, Event::Status { message } if message == "The glove has no stored configuration")
    });
    assert_eq!(h.core.glove().mapping(), &FingerMapping::default());
}
