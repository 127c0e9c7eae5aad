use pretty_assertions::assert_eq;
use tactus_domain_notes::{normalize_note, Note, NoteParseError, NoteTable, PitchClass};

#[test]
fn flats_normalize_to_sharps_keeping_the_octave_digit() {
    assert_eq!(normalize_note("Db5").as_deref(), Some("C#5"));
    assert_eq!(normalize_note("Eb6").as_deref(), Some("D#6"));
    assert_eq!(normalize_note("Bb5").as_deref(), Some("A#5"));
    assert_eq!(normalize_note("Cb5").as_deref(), Some("B5"));
    assert_eq!(normalize_note("Fb5").as_deref(), Some("E5"));
}

#[test]
fn parsing_is_case_insensitive_on_the_letter() {
    let lower: Note = "c#5".parse().unwrap();
    let upper: Note = "C#5".parse().unwrap();
    assert_eq!(lower, upper);
    assert_eq!(lower, "Db5".parse::<Note>().unwrap());
}

#[test]
fn rejects_malformed_spellings() {
    assert_eq!("".parse::<Note>(), Err(NoteParseError::Empty));
    assert!(matches!("H5".parse::<Note>(), Err(NoteParseError::UnknownLetter(_))));
    assert!(matches!("E#5".parse::<Note>(), Err(NoteParseError::UnsupportedSpelling(_))));
    assert!(matches!("C".parse::<Note>(), Err(NoteParseError::InvalidOctave(_))));
    assert!(matches!("C5x".parse::<Note>(), Err(NoteParseError::InvalidOctave(_))));
}

#[test]
fn table_spans_c5_to_b6() {
    let names: Vec<String> = NoteTable::notes().map(|note| note.to_string()).collect();
    assert_eq!(names.len(), 24);
    assert_eq!(names.first().map(String::as_str), Some("C5"));
    assert_eq!(names.last().map(String::as_str), Some("B6"));
    assert_eq!(names[1], "C#5");
}

#[test]
fn index_lookup_misses_outside_the_table() {
    assert_eq!(NoteTable::index_of(Note::new(PitchClass::C, 5)), Some(0));
    assert_eq!(NoteTable::index_of(Note::new(PitchClass::B, 6)), Some(23));
    assert_eq!(NoteTable::index_of(Note::new(PitchClass::B, 4)), None);
    assert_eq!(NoteTable::index_of(Note::new(PitchClass::C, 7)), None);
}

#[test]
fn clamp_keeps_pitch_class() {
    assert_eq!(NoteTable::clamp(Note::new(PitchClass::E, 3)), Note::new(PitchClass::E, 5));
    assert_eq!(NoteTable::clamp(Note::new(PitchClass::G, 8)), Note::new(PitchClass::G, 6));
    assert_eq!(NoteTable::clamp(Note::new(PitchClass::A, 5)), Note::new(PitchClass::A, 5));
}

#[test]
fn midi_numbers_follow_c4_as_60() {
    assert_eq!(Note::new(PitchClass::C, 4).midi_number(), 60);
    assert_eq!(Note::new(PitchClass::A, 4).midi_number(), 69);
    assert_eq!(Note::from_midi(72), Some(Note::new(PitchClass::C, 5)));
}

#[test]
fn serializes_as_plain_text() {
    let note = Note::new(PitchClass::FSharp, 5);
    assert_eq!(serde_json::to_string(&note).unwrap(), "\"F#5\"");
    let parsed: Note = serde_json::from_str("\"Gb5\"").unwrap();
    assert_eq!(parsed, note);
}
