use crate::song::Song;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tactus_domain_notes::Note;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Idle,
    Showing,
    Playing,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchEvent {
    ModeChanged { mode: GameMode },
    FocusChanged { index: Option<usize> },
    Correct { index: usize, note: Note },
    Incorrect { index: usize, expected: Note, played: Note },
    Score { score: u32 },
    Completed { score: u32 },
}

/// Follow-the-song state machine.
///
/// `idle -> showing -> playing -> success -> idle`; `stop` returns to idle
/// from anywhere. A wrong note is reported but never costs progress: the
/// expected step and the score stay where they were. Timing (step playback,
/// the pause after success) is driven from outside.
pub struct SequenceMatcher {
    song: Option<Song>,
    mode: GameMode,
    expected: Option<usize>,
    score: u32,
    scored: HashSet<usize>,
}

impl SequenceMatcher {
    pub fn new() -> Self {
        Self {
            song: None,
            mode: GameMode::Idle,
            expected: None,
            score: 0,
            scored: HashSet::new(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn expected_index(&self) -> Option<usize> {
        self.expected
    }

    pub fn expected_note(&self) -> Option<Note> {
        let index = self.expected?;
        self.song.as_ref()?.note_at(index)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    /// Loads a song and enters `showing`. Empty songs are refused.
    pub fn start(&mut self, song: Song) -> Vec<MatchEvent> {
        if song.is_empty() {
            return Vec::new();
        }
        self.song = Some(song);
        self.score = 0;
        self.scored.clear();
        self.expected = None;
        self.mode = GameMode::Showing;
        vec![
            MatchEvent::ModeChanged { mode: self.mode },
            MatchEvent::FocusChanged { index: None },
            MatchEvent::Score { score: 0 },
        ]
    }

    /// Highlights the step being demonstrated.
    pub fn show_step(&mut self, index: usize) -> Vec<MatchEvent> {
        if self.mode != GameMode::Showing || index >= self.song_len() {
            return Vec::new();
        }
        self.expected = Some(index);
        vec![MatchEvent::FocusChanged {
            index: self.expected,
        }]
    }

    pub fn finish_showing(&mut self) -> Vec<MatchEvent> {
        if self.mode != GameMode::Showing {
            return Vec::new();
        }
        self.mode = GameMode::Playing;
        self.scored.clear();
        self.expected = Some(0);
        vec![
            MatchEvent::ModeChanged { mode: self.mode },
            MatchEvent::FocusChanged {
                index: self.expected,
            },
        ]
    }

    pub fn on_note(&mut self, played: Note) -> Vec<MatchEvent> {
        if self.mode != GameMode::Playing {
            return Vec::new();
        }
        let Some(index) = self.expected else {
            return Vec::new();
        };
        let Some(expected) = self.song.as_ref().and_then(|song| song.note_at(index)) else {
            return Vec::new();
        };

        if played != expected {
            return vec![MatchEvent::Incorrect {
                index,
                expected,
                played,
            }];
        }

        let mut events = Vec::new();
        if self.scored.insert(index) {
            self.score += 1;
            events.push(MatchEvent::Score { score: self.score });
        }
        events.push(MatchEvent::Correct {
            index,
            note: played,
        });

        let next = index + 1;
        if next < self.song_len() {
            self.expected = Some(next);
            events.push(MatchEvent::FocusChanged {
                index: self.expected,
            });
        } else {
            self.expected = None;
            self.mode = GameMode::Success;
            events.push(MatchEvent::FocusChanged { index: None });
            events.push(MatchEvent::ModeChanged { mode: self.mode });
            events.push(MatchEvent::Completed { score: self.score });
        }
        events
    }

    /// Leaves `success` once the celebration pause is over.
    pub fn finish_success(&mut self) -> Vec<MatchEvent> {
        if self.mode != GameMode::Success {
            return Vec::new();
        }
        self.mode = GameMode::Idle;
        vec![MatchEvent::ModeChanged { mode: self.mode }]
    }

    pub fn stop(&mut self) -> Vec<MatchEvent> {
        let was_idle = self.mode == GameMode::Idle && self.expected.is_none();
        self.mode = GameMode::Idle;
        self.expected = None;
        if was_idle {
            return Vec::new();
        }
        vec![
            MatchEvent::ModeChanged { mode: self.mode },
            MatchEvent::FocusChanged { index: None },
        ]
    }

    fn song_len(&self) -> usize {
        self.song.as_ref().map(Song::len).unwrap_or(0)
    }
}

impl Default for SequenceMatcher {
    fn default() -> Self {
        Self::new()
    }
}
