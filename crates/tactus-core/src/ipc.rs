use crate::glove_config::GloveSnapshot;
use serde::{Deserialize, Serialize};
use tactus_domain_game::{GameMode, SongSummary};
use tactus_domain_notes::{Finger, KeyToken, Note};
use tactus_ports::storage::SettingsDto;
use tactus_ports::types::{AudioConfig, AudioOutputDevice, DeviceId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    ListAudioOutputs,
    SelectAudioOutput { device_id: DeviceId, config: Option<AudioConfig> },
    SetMasterVolume { db: f32 },
    SetSustainMs { ms: u64 },
    KeyDown { key: String, code: Option<String> },
    KeyUp { key: String, code: Option<String> },
    PointerDown { note: String },
    PointerUp { note: String },
    PointerLeave { note: String },
    StopAllNotes,
    ListScales,
    ApplyPreset { name: String },
    SelectCustom,
    UpdateFingerNote { finger: Finger, note: Option<String> },
    SaveToDevice,
    LoadFromDevice,
    ListSongs,
    StartSong { song_id: String },
    StopSong,
    ExportDiagnostics { path: String },
}

/// What the player pressed, kept for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum InputRecord {
    KeyDown { key: KeyToken, note: Option<Note> },
    KeyUp { key: KeyToken },
    PointerDown { note: Note },
    PointerUp { note: Note },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    AudioOutputsUpdated { devices: Vec<AudioOutputDevice> },
    SettingsUpdated { settings: SettingsDto },
    GloveConfigUpdated { config: GloveSnapshot },
    ScalesListed { names: Vec<String> },
    SongsListed { songs: Vec<SongSummary> },
    ActiveNotesUpdated { notes: Vec<Note> },
    GameUpdated {
        mode: GameMode,
        expected_index: Option<usize>,
        expected_note: Option<Note>,
        score: u32,
    },
    GameFeedback {
        index: usize,
        correct: bool,
        expected: Note,
        played: Note,
    },
    Status { message: String },
}
