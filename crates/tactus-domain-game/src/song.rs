use serde::{Deserialize, Serialize};
use tactus_domain_notes::Note;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteValue {
    #[serde(rename = "4n")]
    Quarter,
    #[serde(rename = "8n")]
    Eighth,
    #[serde(rename = "16n")]
    Sixteenth,
}

impl NoteValue {
    /// Length at 120 bpm.
    pub fn nominal_ms(self) -> u64 {
        match self {
            NoteValue::Quarter => 500,
            NoteValue::Eighth => 250,
            NoteValue::Sixteenth => 125,
        }
    }

    /// Multiplier applied to the playback step unit.
    pub fn step_factor(self) -> f64 {
        match self {
            NoteValue::Quarter => 2.0,
            NoteValue::Eighth => 1.3,
            NoteValue::Sixteenth => 0.8,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongStep {
    pub note: Note,
    pub value: NoteValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub name: String,
    pub steps: Vec<SongStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSummary {
    pub id: String,
    pub name: String,
    pub steps: usize,
}

impl Song {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn note_at(&self, index: usize) -> Option<Note> {
        self.steps.get(index).map(|step| step.note)
    }

    pub fn summary(&self) -> SongSummary {
        SongSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            steps: self.steps.len(),
        }
    }

    fn from_table(id: &str, name: &str, table: &[(&str, NoteValue)]) -> Self {
        let steps = table
            .iter()
            .filter_map(|(note, value)| {
                note.parse::<Note>().ok().map(|note| SongStep {
                    note,
                    value: *value,
                })
            })
            .collect();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            steps,
        }
    }
}

use NoteValue::{Eighth as E8, Quarter as Q4};

#[rustfmt::skip]
const CAI_CAI_BALAO: &[(&str, NoteValue)] = &[
    ("G5", E8), ("G5", E8), ("F5", E8), ("E5", Q4),
    ("G5", E8), ("G5", E8), ("F5", E8), ("E5", Q4),
    ("G5", E8), ("A5", E8), ("G5", E8),
    ("F5", E8), ("E5", E8), ("D5", Q4),
    ("D5", E8), ("E5", E8), ("F5", E8),
    ("D5", E8), ("E5", E8), ("F5", E8),
    ("D5", E8), ("E5", E8), ("F5", Q4),
    ("G5", E8), ("A5", E8), ("G5", E8),
    ("F5", E8), ("E5", E8), ("D5", E8), ("C5", Q4),
];

#[rustfmt::skip]
const C_MAJOR_WARMUP: &[(&str, NoteValue)] = &[
    ("C5", E8), ("D5", E8), ("E5", E8), ("F5", E8),
    ("G5", E8), ("A5", E8), ("B5", E8), ("C6", Q4),
];

pub fn builtin_songs() -> Vec<Song> {
    vec![
        Song::from_table("cai", "Cai Cai Balao (excerpt)", CAI_CAI_BALAO),
        Song::from_table("warmup", "C Major Warm-up", C_MAJOR_WARMUP),
    ]
}

pub fn find_song(id: &str) -> Option<Song> {
    builtin_songs().into_iter().find(|song| song.id == id)
}
