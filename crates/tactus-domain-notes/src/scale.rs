use crate::note::Note;
use crate::table::NoteTable;
use serde::{Deserialize, Serialize};

/// One note per finger.
pub const FINGER_SCALE_LEN: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Major,
    Minor,
}

impl ScaleKind {
    /// Semitone steps between consecutive degrees; the pattern repeats past the octave.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            ScaleKind::Major => [2, 2, 1, 2, 2, 2, 1],
            ScaleKind::Minor => [2, 1, 2, 2, 1, 2, 2],
        }
    }
}

/// Builds `len` degrees starting at `tonic`. Every degree is folded into
/// the note table by whole octaves, so the length never depends on the tonic.
/// An unparseable tonic, or one outside the table, yields an empty scale.
pub fn generate_scale(tonic: &str, kind: ScaleKind, len: usize) -> Vec<Note> {
    let Ok(tonic) = tonic.parse::<Note>() else {
        return Vec::new();
    };
    let Some(start) = NoteTable::index_of(tonic) else {
        return Vec::new();
    };

    let intervals = kind.intervals();
    let mut offset = start as i32;
    let mut notes = Vec::with_capacity(len);
    for degree in 0..len {
        if degree > 0 {
            offset += intervals[(degree - 1) % intervals.len()] as i32;
        }
        notes.push(NoteTable::folded(offset));
    }
    notes
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalePreset {
    pub name: &'static str,
    pub tonic: &'static str,
    pub kind: ScaleKind,
}

const fn preset(name: &'static str, tonic: &'static str, kind: ScaleKind) -> ScalePreset {
    ScalePreset { name, tonic, kind }
}

/// Display order: majors around the circle of fifths, then minors.
pub const SCALE_PRESETS: [ScalePreset; 24] = [
    preset("C Major", "C5", ScaleKind::Major),
    preset("G Major", "G5", ScaleKind::Major),
    preset("D Major", "D5", ScaleKind::Major),
    preset("A Major", "A5", ScaleKind::Major),
    preset("E Major", "E5", ScaleKind::Major),
    preset("B / Cb Major", "B5", ScaleKind::Major),
    preset("Gb / F# Major", "F#5", ScaleKind::Major),
    preset("Db / C# Major", "Db5", ScaleKind::Major),
    preset("Ab Major", "Ab5", ScaleKind::Major),
    preset("Eb Major", "Eb5", ScaleKind::Major),
    preset("Bb Major", "Bb5", ScaleKind::Major),
    preset("F Major", "F5", ScaleKind::Major),
    preset("A Minor", "A5", ScaleKind::Minor),
    preset("E Minor", "E5", ScaleKind::Minor),
    preset("B Minor", "B5", ScaleKind::Minor),
    preset("F# Minor", "F#5", ScaleKind::Minor),
    preset("C# Minor", "C#5", ScaleKind::Minor),
    preset("Ab / G# Minor", "G#5", ScaleKind::Minor),
    preset("Eb / D# Minor", "D#5", ScaleKind::Minor),
    preset("Bb / A# Minor", "A#5", ScaleKind::Minor),
    preset("F Minor", "F5", ScaleKind::Minor),
    preset("C Minor", "C5", ScaleKind::Minor),
    preset("G Minor", "G5", ScaleKind::Minor),
    preset("D Minor", "D5", ScaleKind::Minor),
];

impl ScalePreset {
    pub fn all() -> &'static [ScalePreset] {
        &SCALE_PRESETS
    }

    pub fn find(name: &str) -> Option<&'static ScalePreset> {
        SCALE_PRESETS.iter().find(|preset| preset.name == name)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        SCALE_PRESETS.iter().map(|preset| preset.name)
    }

    /// The ten finger notes of this preset.
    pub fn notes(&self) -> Vec<Note> {
        generate_scale(self.tonic, self.kind, FINGER_SCALE_LEN)
    }
}
