use crate::persist::{load_json, save_json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tactus_domain_notes::{
    ConfigMode, Finger, FingerMapping, KeyNoteBinding, KeyNoteResolver, KeyToken, Note,
    NoteTable, ScalePreset, SelectedScale,
};
use tactus_ports::device::DeviceKeyMap;
use tactus_ports::storage::{
    KeyValueStorePort, KEY_CONFIG_MODE, KEY_FINGER_MAPPING, KEY_SELECTED_SCALE,
};

/// Everything a UI needs to draw the configuration panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GloveSnapshot {
    pub selected_scale: SelectedScale,
    pub mode: ConfigMode,
    pub mapping: FingerMapping,
    pub bindings: KeyNoteBinding,
    pub scale_notes: Vec<Note>,
    /// Keyboard key printed on each on-screen piano key.
    pub key_hints: BTreeMap<Note, KeyToken>,
}

/// Finger mapping store. Every mutation is written through to storage;
/// storage failures are logged and never surface to the caller.
pub struct GloveConfig {
    store: Option<Arc<dyn KeyValueStorePort>>,
    mapping: FingerMapping,
    selected: SelectedScale,
    mode: ConfigMode,
}

impl GloveConfig {
    pub fn load(store: Option<Arc<dyn KeyValueStorePort>>) -> Self {
        let mut config = Self {
            store: None,
            mapping: FingerMapping::default(),
            selected: SelectedScale::default(),
            mode: ConfigMode::Preset,
        };

        if let Some(store) = store.as_deref() {
            if let Some(mapping) = load_json::<FingerMapping>(store, KEY_FINGER_MAPPING) {
                config.mapping = mapping;
            }
            if let Some(selected) = load_json::<SelectedScale>(store, KEY_SELECTED_SCALE) {
                let known = match selected.preset_name() {
                    Some(name) => ScalePreset::find(name).is_some(),
                    None => true,
                };
                if known {
                    config.selected = selected;
                } else {
                    log::debug!("ignoring unknown stored scale {selected}");
                }
            }
            if let Some(mode) = load_json::<ConfigMode>(store, KEY_CONFIG_MODE) {
                config.mode = mode;
            }
        }

        config.store = store;
        config
    }

    pub fn mapping(&self) -> &FingerMapping {
        &self.mapping
    }

    pub fn selected(&self) -> &SelectedScale {
        &self.selected
    }

    pub fn mode(&self) -> ConfigMode {
        self.mode
    }

    /// Notes of the selected preset, empty when the selection is custom.
    pub fn scale_notes(&self) -> Vec<Note> {
        self.selected
            .preset_name()
            .and_then(ScalePreset::find)
            .map(|preset| preset.notes())
            .unwrap_or_default()
    }

    pub fn key_bindings(&self) -> KeyNoteBinding {
        self.mapping.key_bindings()
    }

    pub fn snapshot(&self, resolver: &KeyNoteResolver) -> GloveSnapshot {
        let key_hints = NoteTable::notes()
            .filter_map(|note| resolver.note_to_key(note).map(|key| (note, key.clone())))
            .collect();
        GloveSnapshot {
            selected_scale: self.selected.clone(),
            mode: self.mode,
            mapping: self.mapping.clone(),
            bindings: self.key_bindings(),
            scale_notes: self.scale_notes(),
            key_hints,
        }
    }

    /// Maps the preset's notes onto the fingers in canonical order.
    /// Unknown names leave everything untouched and return `false`.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        let Some(preset) = ScalePreset::find(name) else {
            log::debug!("unknown scale preset {name:?}");
            return false;
        };
        let notes = preset.notes();
        if notes.is_empty() {
            log::debug!("preset {name:?} produced no notes");
            return false;
        }

        self.mapping = FingerMapping::from_scale(&notes);
        self.selected = SelectedScale::Preset(preset.name.to_string());
        self.mode = ConfigMode::Preset;
        self.persist();
        true
    }

    /// Keeps the current mapping and switches to manual editing.
    pub fn select_custom(&mut self) {
        self.selected = SelectedScale::Custom;
        self.mode = ConfigMode::Custom;
        self.persist();
    }

    pub fn update_finger_note(&mut self, finger: Finger, note: Option<Note>) {
        self.mapping.set(finger, note);
        self.mode = ConfigMode::Custom;
        self.persist();
    }

    /// Adopts the keys the glove reported. Fingers whose key is missing from
    /// the map keep their note. Returns `false` if nothing usable came back.
    pub fn apply_device_bindings(&mut self, map: &DeviceKeyMap) -> bool {
        let binding = KeyNoteBinding::from_device_map(map);
        let mut touched = false;
        for finger in Finger::ALL {
            if let Some(note) = binding.get(&finger.key_token()) {
                self.mapping.set(finger, Some(note));
                touched = true;
            }
        }
        if !touched {
            return false;
        }

        self.selected = SelectedScale::Custom;
        self.mode = ConfigMode::Custom;
        self.persist();
        true
    }

    fn persist(&self) {
        let Some(store) = self.store.as_deref() else {
            return;
        };
        save_json(store, KEY_FINGER_MAPPING, &self.mapping);
        save_json(store, KEY_SELECTED_SCALE, &self.selected);
        save_json(store, KEY_CONFIG_MODE, &self.mode);
    }
}
