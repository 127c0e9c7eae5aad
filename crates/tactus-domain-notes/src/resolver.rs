use crate::key::KeyToken;
use crate::note::Note;
use crate::table::NoteTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tactus_ports::device::DeviceKeyMap;

/// Computer-keyboard layout for the on-screen piano, one key per table note.
const PIANO_KEYS: [&str; NoteTable::LEN] = [
    "A", "W", "S", "E", "D", "F", "T", "G", "Y", "H", "U", "J", //
    "K", "O", "L", "P", ";", "Z", "X", "C", "V", "B", "N", "M",
];

/// Key -> note lookup derived from a finger mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyNoteBinding(BTreeMap<KeyToken, Note>);

impl KeyNoteBinding {
    pub fn insert(&mut self, key: KeyToken, note: Note) {
        self.0.insert(key, note);
    }

    pub fn get(&self, key: &KeyToken) -> Option<Note> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyToken, Note)> {
        self.0.iter().map(|(key, note)| (key, *note))
    }

    pub fn to_device_map(&self) -> DeviceKeyMap {
        self.0
            .iter()
            .map(|(key, note)| (key.to_string(), note.to_string()))
            .collect()
    }

    /// Entries with an unusable key or note are dropped.
    pub fn from_device_map(map: &DeviceKeyMap) -> Self {
        let mut binding = Self::default();
        for (key, note) in map {
            if let (Some(key), Ok(note)) = (KeyToken::new(key), note.parse::<Note>()) {
                binding.insert(key, note);
            }
        }
        binding
    }
}

/// Resolves keys and note literals to notes. The glove binding is consulted
/// before the static piano layout, so glove keys shadow piano keys.
#[derive(Clone, Debug)]
pub struct KeyNoteResolver {
    note_to_key: BTreeMap<Note, KeyToken>,
    key_to_note: BTreeMap<KeyToken, Note>,
    glove: KeyNoteBinding,
}

impl KeyNoteResolver {
    pub fn new() -> Self {
        let mut note_to_key = BTreeMap::new();
        let mut key_to_note = BTreeMap::new();
        for (note, key) in NoteTable::notes().zip(PIANO_KEYS) {
            if let Some(key) = KeyToken::new(key) {
                note_to_key.insert(note, key.clone());
                key_to_note.insert(key, note);
            }
        }
        Self {
            note_to_key,
            key_to_note,
            glove: KeyNoteBinding::default(),
        }
    }

    pub fn set_glove_binding(&mut self, binding: KeyNoteBinding) {
        self.glove = binding;
    }

    /// Piano key printed on a note, for on-screen hints.
    pub fn note_to_key(&self, note: Note) -> Option<&KeyToken> {
        self.note_to_key.get(&note)
    }

    pub fn resolve_key(&self, key: &KeyToken) -> Option<Note> {
        self.glove
            .get(key)
            .or_else(|| self.key_to_note.get(key).copied())
    }

    /// Accepts either a note literal (`G5`, `db5`) or a key name.
    pub fn resolve(&self, input: &str) -> Option<Note> {
        let input = input.trim();
        if input.chars().count() >= 2 {
            if let Ok(note) = input.parse::<Note>() {
                return Some(note);
            }
        }
        self.resolve_key(&KeyToken::new(input)?)
    }
}

impl Default for KeyNoteResolver {
    fn default() -> Self {
        Self::new()
    }
}
