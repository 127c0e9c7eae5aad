use crate::timers::{TimerHandle, TimerQueue};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tactus_domain_notes::Note;
use tactus_ports::synth::NoteSinkPort;

/// Tracks which notes are sounding and owns their delayed releases.
///
/// Invariants:
/// - a note is attacked at most once while it sounds, unless `retrigger` or `strike` re-articulates it
/// - a note has at most one pending release
/// - attacking a note cancels its pending release
/// - a note tracked while the sink was not ready is articulated on its next attack
pub struct VoiceTracker {
    sink: Arc<dyn NoteSinkPort>,
    sustain: Duration,
    sounding: BTreeSet<Note>,
    unvoiced: BTreeSet<Note>,
    releases: HashMap<Note, TimerHandle>,
    timers: TimerQueue<Note>,
}

impl VoiceTracker {
    pub fn new(sink: Arc<dyn NoteSinkPort>, sustain: Duration) -> Self {
        Self {
            sink,
            sustain,
            sounding: BTreeSet::new(),
            unvoiced: BTreeSet::new(),
            releases: HashMap::new(),
            timers: TimerQueue::new(),
        }
    }

    pub fn set_sustain(&mut self, sustain: Duration) {
        self.sustain = sustain;
    }

    pub fn sustain(&self) -> Duration {
        self.sustain
    }

    /// Returns `false` when the note was already sounding on the sink.
    pub fn attack(&mut self, note: Note) -> bool {
        self.cancel_release(note);
        if !self.sounding.insert(note) && !self.unvoiced.contains(&note) {
            return false;
        }
        self.sink_attack(note);
        true
    }

    /// Attacks `note` again even when it is still ringing.
    pub fn retrigger(&mut self, note: Note) {
        self.cancel_release(note);
        if !self.sounding.insert(note) {
            self.sink_release(note);
        }
        self.sink_attack(note);
    }

    /// Playback attack: re-articulates a ringing note and releases it after `hold`.
    pub fn strike(&mut self, note: Note, at: Instant, hold: Duration) {
        self.retrigger(note);
        let handle = self.timers.schedule_after(at, hold, note);
        self.releases.insert(note, handle);
    }

    /// Releases `note` once the sustain time has passed.
    pub fn schedule_release(&mut self, note: Note, now: Instant) {
        if !self.sounding.contains(&note) {
            return;
        }
        self.cancel_release(note);
        let handle = self.timers.schedule_after(now, self.sustain, note);
        self.releases.insert(note, handle);
    }

    pub fn release_now(&mut self, note: Note) -> bool {
        self.cancel_release(note);
        if !self.sounding.remove(&note) {
            return false;
        }
        self.sink_release(note);
        true
    }

    /// Fires due releases. Returns `true` if the sounding set changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Some(fired) = self.timers.pop_next_due(now) {
            let note = fired.payload;
            if self.releases.get(&note) == Some(&fired.handle) {
                self.releases.remove(&note);
            }
            if self.sounding.remove(&note) {
                self.sink_release(note);
                changed = true;
            }
        }
        changed
    }

    /// Cancels every pending release and silences everything at once.
    pub fn stop_all(&mut self) -> bool {
        self.timers.cancel_all();
        self.releases.clear();
        let notes = std::mem::take(&mut self.sounding);
        for note in &notes {
            self.sink_release(*note);
        }
        self.unvoiced.clear();
        !notes.is_empty()
    }

    pub fn is_sounding(&self, note: Note) -> bool {
        self.sounding.contains(&note)
    }

    pub fn sounding(&self) -> Vec<Note> {
        self.sounding.iter().copied().collect()
    }

    pub fn has_pending_release(&self, note: Note) -> bool {
        self.releases
            .get(&note)
            .is_some_and(|handle| self.timers.is_pending(*handle))
    }

    fn cancel_release(&mut self, note: Note) {
        if let Some(handle) = self.releases.remove(&note) {
            self.timers.cancel(handle);
        }
    }

    fn sink_attack(&mut self, note: Note) {
        if self.sink.is_ready() {
            self.unvoiced.remove(&note);
            self.sink.attack(note.midi_number());
        } else {
            log::debug!("sink not ready, skipping attack of {note}");
            self.unvoiced.insert(note);
        }
    }

    fn sink_release(&mut self, note: Note) {
        if self.unvoiced.remove(&note) {
            return;
        }
        if self.sink.is_ready() {
            self.sink.release(note.midi_number());
        }
    }
}
