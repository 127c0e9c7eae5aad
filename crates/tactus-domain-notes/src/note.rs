use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tactus_ports::types::MidiNote;

/// The twelve pitch classes, always spelled with sharps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C (C = 0, B = 11).
    pub fn semitone(self) -> u8 {
        self as u8
    }

    pub fn from_semitone(semitone: u8) -> Self {
        Self::ALL[(semitone % 12) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    fn natural(letter: char) -> Option<Self> {
        match letter {
            'C' => Some(PitchClass::C),
            'D' => Some(PitchClass::D),
            'E' => Some(PitchClass::E),
            'F' => Some(PitchClass::F),
            'G' => Some(PitchClass::G),
            'A' => Some(PitchClass::A),
            'B' => Some(PitchClass::B),
            _ => None,
        }
    }

    fn sharpened(letter: char) -> Option<Self> {
        match letter {
            'C' => Some(PitchClass::CSharp),
            'D' => Some(PitchClass::DSharp),
            'F' => Some(PitchClass::FSharp),
            'G' => Some(PitchClass::GSharp),
            'A' => Some(PitchClass::ASharp),
            _ => None,
        }
    }

    /// Enharmonic table for flats. The octave digit is kept as written,
    /// so `Cb5` becomes `B5`.
    fn flattened(letter: char) -> Option<Self> {
        match letter {
            'C' => Some(PitchClass::B),
            'D' => Some(PitchClass::CSharp),
            'E' => Some(PitchClass::DSharp),
            'F' => Some(PitchClass::E),
            'G' => Some(PitchClass::FSharp),
            'A' => Some(PitchClass::GSharp),
            'B' => Some(PitchClass::ASharp),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteParseError {
    #[error("empty note")]
    Empty,
    #[error("unknown note letter in {0:?}")]
    UnknownLetter(String),
    #[error("unsupported spelling {0:?}")]
    UnsupportedSpelling(String),
    #[error("missing or invalid octave in {0:?}")]
    InvalidOctave(String),
}

/// Pitch name plus octave, e.g. `C#5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    class: PitchClass,
    octave: u8,
}

impl Note {
    pub const MAX_OCTAVE: u8 = 9;

    pub const fn new(class: PitchClass, octave: u8) -> Self {
        Self { class, octave }
    }

    pub fn class(self) -> PitchClass {
        self.class
    }

    pub fn octave(self) -> u8 {
        self.octave
    }

    pub fn midi_number(self) -> MidiNote {
        (self.octave + 1) * 12 + self.class.semitone()
    }

    /// Inverse of `midi_number`; numbers below C0 have no spelling here.
    pub fn from_midi(midi: MidiNote) -> Option<Self> {
        if midi < 12 {
            return None;
        }
        let octave = midi / 12 - 1;
        if octave > Self::MAX_OCTAVE {
            return None;
        }
        Some(Self {
            class: PitchClass::from_semitone(midi % 12),
            octave,
        })
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> Ordering {
        self.midi_number().cmp(&other.midi_number())
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Note {
    type Err = NoteParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return Err(NoteParseError::Empty);
        };
        let letter = first.to_ascii_uppercase();
        if !('A'..='G').contains(&letter) {
            return Err(NoteParseError::UnknownLetter(text.to_string()));
        }

        let rest = chars.as_str();
        let (class, digits) = if let Some(digits) = rest.strip_prefix('#') {
            let class = PitchClass::sharpened(letter)
                .ok_or_else(|| NoteParseError::UnsupportedSpelling(text.to_string()))?;
            (class, digits)
        } else if let Some(digits) = rest.strip_prefix('b') {
            let class = PitchClass::flattened(letter)
                .ok_or_else(|| NoteParseError::UnsupportedSpelling(text.to_string()))?;
            (class, digits)
        } else {
            let class = PitchClass::natural(letter)
                .ok_or_else(|| NoteParseError::UnknownLetter(text.to_string()))?;
            (class, rest)
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(NoteParseError::InvalidOctave(text.to_string()));
        }
        let octave: u8 = digits
            .parse()
            .map_err(|_| NoteParseError::InvalidOctave(text.to_string()))?;
        if octave > Self::MAX_OCTAVE {
            return Err(NoteParseError::InvalidOctave(text.to_string()));
        }

        Ok(Self { class, octave })
    }
}

impl TryFrom<String> for Note {
    type Error = NoteParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.to_string()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class.name(), self.octave)
    }
}

/// Canonical sharp spelling of any accepted note text, `None` if it is not a note.
pub fn normalize_note(text: &str) -> Option<String> {
    text.parse::<Note>().ok().map(|note| note.to_string())
}
