use crate::finger::Finger;
use crate::note::{Note, PitchClass};
use crate::resolver::KeyNoteBinding;
use crate::table::NoteTable;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigMode {
    Preset,
    Custom,
}

/// What the mapping was last derived from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SelectedScale {
    Preset(String),
    Custom,
}

impl SelectedScale {
    pub const CUSTOM_LABEL: &'static str = "Custom";

    pub fn preset_name(&self) -> Option<&str> {
        match self {
            SelectedScale::Preset(name) => Some(name),
            SelectedScale::Custom => None,
        }
    }
}

impl Default for SelectedScale {
    fn default() -> Self {
        SelectedScale::Preset("C Major".to_string())
    }
}

impl From<String> for SelectedScale {
    fn from(value: String) -> Self {
        if value == Self::CUSTOM_LABEL {
            SelectedScale::Custom
        } else {
            SelectedScale::Preset(value)
        }
    }
}

impl From<SelectedScale> for String {
    fn from(value: SelectedScale) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SelectedScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectedScale::Preset(name) => f.write_str(name),
            SelectedScale::Custom => f.write_str(Self::CUSTOM_LABEL),
        }
    }
}

/// Unreadable notes load as empty fingers instead of failing the whole mapping.
fn lenient_note<'de, D>(deserializer: D) -> Result<Option<Note>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|text| text.parse::<Note>().ok()))
}

/// Note assigned to every finger. `None` means the finger plays nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FingerMapping {
    #[serde(deserialize_with = "lenient_note")]
    pub left_thumb: Option<Note>,
    #[serde(deserialize_with = "lenient_note")]
    pub left_index: Option<Note>,
    #[serde(deserialize_with = "lenient_note")]
    pub left_middle: Option<Note>,
    #[serde(deserialize_with = "lenient_note")]
    pub left_ring: Option<Note>,
    #[serde(deserialize_with = "lenient_note")]
    pub left_pinky: Option<Note>,
    #[serde(deserialize_with = "lenient_note")]
    pub right_thumb: Option<Note>,
    #[serde(deserialize_with = "lenient_note")]
    pub right_index: Option<Note>,
    #[serde(deserialize_with = "lenient_note")]
    pub right_middle: Option<Note>,
    #[serde(deserialize_with = "lenient_note")]
    pub right_ring: Option<Note>,
    #[serde(deserialize_with = "lenient_note")]
    pub right_pinky: Option<Note>,
}

impl Default for FingerMapping {
    /// Thumbs idle, the other eight fingers on C5..C6 of C major.
    fn default() -> Self {
        use PitchClass::*;
        Self {
            left_thumb: None,
            left_index: Some(Note::new(C, 5)),
            left_middle: Some(Note::new(D, 5)),
            left_ring: Some(Note::new(E, 5)),
            left_pinky: Some(Note::new(F, 5)),
            right_thumb: None,
            right_index: Some(Note::new(G, 5)),
            right_middle: Some(Note::new(A, 5)),
            right_ring: Some(Note::new(B, 5)),
            right_pinky: Some(Note::new(C, 6)),
        }
    }
}

impl FingerMapping {
    pub fn empty() -> Self {
        Self {
            left_thumb: None,
            left_index: None,
            left_middle: None,
            left_ring: None,
            left_pinky: None,
            right_thumb: None,
            right_index: None,
            right_middle: None,
            right_ring: None,
            right_pinky: None,
        }
    }

    /// Lays scale notes onto the fingers in canonical order. Fingers beyond
    /// the end of `notes` keep their default assignment.
    pub fn from_scale(notes: &[Note]) -> Self {
        let mut mapping = Self::default();
        for (finger, note) in Finger::ALL.into_iter().zip(notes.iter().copied()) {
            mapping.set(finger, Some(note));
        }
        mapping
    }

    pub fn get(&self, finger: Finger) -> Option<Note> {
        *self.slot(finger)
    }

    pub fn set(&mut self, finger: Finger, note: Option<Note>) {
        *self.slot_mut(finger) = note;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Finger, Option<Note>)> + '_ {
        Finger::ALL.into_iter().map(move |finger| (finger, self.get(finger)))
    }

    /// Key -> note for every finger that has a note. Notes outside the
    /// playable range are folded into it first.
    pub fn key_bindings(&self) -> KeyNoteBinding {
        let mut binding = KeyNoteBinding::default();
        for (finger, note) in self.iter() {
            let Some(note) = note else {
                continue;
            };
            binding.insert(finger.key_token(), NoteTable::clamp(note));
        }
        binding
    }

    fn slot(&self, finger: Finger) -> &Option<Note> {
        match finger {
            Finger::LeftThumb => &self.left_thumb,
            Finger::LeftIndex => &self.left_index,
            Finger::LeftMiddle => &self.left_middle,
            Finger::LeftRing => &self.left_ring,
            Finger::LeftPinky => &self.left_pinky,
            Finger::RightThumb => &self.right_thumb,
            Finger::RightIndex => &self.right_index,
            Finger::RightMiddle => &self.right_middle,
            Finger::RightRing => &self.right_ring,
            Finger::RightPinky => &self.right_pinky,
        }
    }

    fn slot_mut(&mut self, finger: Finger) -> &mut Option<Note> {
        match finger {
            Finger::LeftThumb => &mut self.left_thumb,
            Finger::LeftIndex => &mut self.left_index,
            Finger::LeftMiddle => &mut self.left_middle,
            Finger::LeftRing => &mut self.left_ring,
            Finger::LeftPinky => &mut self.left_pinky,
            Finger::RightThumb => &mut self.right_thumb,
            Finger::RightIndex => &mut self.right_index,
            Finger::RightMiddle => &mut self.right_middle,
            Finger::RightRing => &mut self.right_ring,
            Finger::RightPinky => &mut self.right_pinky,
        }
    }
}
