use crate::timers::TimerQueue;
use crate::voices::VoiceTracker;
use std::time::{Duration, Instant};
use tactus_domain_game::{GameMode, MatchEvent, NoteValue, SequenceMatcher, Song};
use tactus_domain_notes::Note;
use tactus_ports::storage::SettingsDto;

const MIN_STRIKE_MS: u64 = 200;
const STRIKE_HOLD_FACTOR: f64 = 1.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameTiming {
    pub lead_in: Duration,
    pub step_unit_ms: u64,
    pub success_hold: Duration,
}

impl GameTiming {
    pub fn from_settings(settings: &SettingsDto) -> Self {
        Self {
            lead_in: Duration::from_millis(settings.show_lead_in_ms),
            step_unit_ms: settings.step_unit_ms,
            success_hold: Duration::from_millis(settings.success_hold_ms),
        }
    }

    /// How long a shown note rings.
    pub fn strike_hold(value: NoteValue) -> Duration {
        let nominal = value.nominal_ms() as f64 * STRIKE_HOLD_FACTOR;
        Duration::from_millis((nominal.round() as u64).max(MIN_STRIKE_MS))
    }

    /// Pause between one shown step and the next.
    pub fn step_delay(&self, value: NoteValue) -> Duration {
        let ms = self.step_unit_ms as f64 * value.step_factor();
        Duration::from_millis(ms.round() as u64)
    }
}

impl Default for GameTiming {
    fn default() -> Self {
        Self::from_settings(&SettingsDto::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GameTimer {
    ShowStep(usize),
    FinishShowing,
    ReturnToIdle,
}

/// Drives the sequence matcher through time: plays the song back while
/// showing and leaves the success screen after a pause.
pub struct GameController {
    matcher: SequenceMatcher,
    timers: TimerQueue<GameTimer>,
    timing: GameTiming,
}

impl GameController {
    pub fn new(timing: GameTiming) -> Self {
        Self {
            matcher: SequenceMatcher::new(),
            timers: TimerQueue::new(),
            timing,
        }
    }

    pub fn set_timing(&mut self, timing: GameTiming) {
        self.timing = timing;
    }

    pub fn mode(&self) -> GameMode {
        self.matcher.mode()
    }

    pub fn matcher(&self) -> &SequenceMatcher {
        &self.matcher
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Silences everything, forgets the previous run and starts showing `song`.
    pub fn start(&mut self, song: Song, now: Instant, voices: &mut VoiceTracker) -> Vec<MatchEvent> {
        self.timers.cancel_all();
        voices.stop_all();

        let events = self.matcher.start(song);
        if self.matcher.mode() == GameMode::Showing {
            self.timers
                .schedule_after(now, self.timing.lead_in, GameTimer::ShowStep(0));
        }
        events
    }

    pub fn stop(&mut self, voices: &mut VoiceTracker) -> Vec<MatchEvent> {
        self.timers.cancel_all();
        voices.stop_all();
        self.matcher.stop()
    }

    pub fn on_note(&mut self, note: Note, now: Instant) -> Vec<MatchEvent> {
        let events = self.matcher.on_note(note);
        let completed = events
            .iter()
            .any(|event| matches!(event, MatchEvent::Completed { .. }));
        if completed {
            self.timers
                .schedule_after(now, self.timing.success_hold, GameTimer::ReturnToIdle);
        }
        events
    }

    pub fn tick(&mut self, now: Instant, voices: &mut VoiceTracker) -> Vec<MatchEvent> {
        let mut events = Vec::new();
        while let Some(fired) = self.timers.pop_next_due(now) {
            match fired.payload {
                GameTimer::ShowStep(index) => {
                    events.extend(self.show_step(index, fired.deadline, voices));
                }
                GameTimer::FinishShowing => events.extend(self.matcher.finish_showing()),
                GameTimer::ReturnToIdle => events.extend(self.matcher.finish_success()),
            }
        }
        events
    }

    fn show_step(
        &mut self,
        index: usize,
        at: Instant,
        voices: &mut VoiceTracker,
    ) -> Vec<MatchEvent> {
        let Some(step) = self
            .matcher
            .song()
            .and_then(|song| song.steps.get(index).copied())
        else {
            return Vec::new();
        };
        let len = self.matcher.song().map_or(0, Song::len);

        let events = self.matcher.show_step(index);
        voices.strike(step.note, at, GameTiming::strike_hold(step.value));

        let next_at = at + self.timing.step_delay(step.value);
        let next = if index + 1 < len {
            GameTimer::ShowStep(index + 1)
        } else {
            GameTimer::FinishShowing
        };
        self.timers.schedule_at(next_at, next);
        events
    }
}
