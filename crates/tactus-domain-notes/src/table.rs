use crate::note::{Note, PitchClass};

/// The playable range: two chromatic octaves, `C5` through `B6`.
pub struct NoteTable;

impl NoteTable {
    pub const LEN: usize = 24;
    pub const LOWEST: Note = Note::new(PitchClass::C, 5);
    pub const HIGHEST: Note = Note::new(PitchClass::B, 6);

    pub fn notes() -> impl Iterator<Item = Note> {
        (0..Self::LEN).filter_map(Self::note_at)
    }

    /// Position in the table, `None` when the note lies outside the range.
    pub fn index_of(note: Note) -> Option<usize> {
        if Self::contains(note) {
            Some((note.midi_number() - Self::LOWEST.midi_number()) as usize)
        } else {
            None
        }
    }

    pub fn note_at(index: usize) -> Option<Note> {
        if index >= Self::LEN {
            return None;
        }
        Note::from_midi(Self::LOWEST.midi_number() + index as u8)
    }

    pub fn contains(note: Note) -> bool {
        (Self::LOWEST..=Self::HIGHEST).contains(&note)
    }

    /// Moves a note by whole octaves until it lands inside the table,
    /// keeping its pitch class.
    pub fn clamp(note: Note) -> Note {
        let low = Self::LOWEST.midi_number() as i16;
        let high = Self::HIGHEST.midi_number() as i16;
        let mut midi = note.midi_number() as i16;
        while midi < low {
            midi += 12;
        }
        while midi > high {
            midi -= 12;
        }
        Note::from_midi(midi as u8).unwrap_or(Self::LOWEST)
    }

    /// Note at `offset` semitones above `LOWEST`, folded back into range.
    pub fn folded(offset: i32) -> Note {
        let midi = (Self::LOWEST.midi_number() as i32 + offset).clamp(12, 127);
        match Note::from_midi(midi as u8) {
            Some(note) => Self::clamp(note),
            None => Self::LOWEST,
        }
    }
}
