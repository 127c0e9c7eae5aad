use parking_lot::Mutex;
use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use tactus_ports::synth::NoteSinkPort;
use tactus_ports::types::{MidiNote, VolumeDb};

const ATTACK_SECONDS: f32 = 0.005;
const RELEASE_SECONDS: f32 = 0.3;
// Per-second decay of a held note, a rough plucked-string fade.
const DECAY_PER_SECOND: f32 = 0.35;
const VOICE_AMPLITUDE: f32 = 0.25;

/// Small additive sine synth used as the default note sink.
///
/// It reports ready only after the audio thread rendered at least once, so
/// notes played before an output is open are skipped by the core.
pub struct SimpleSynth {
    ready: AtomicBool,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    sample_rate_hz: f32,
    max_voices: usize,
    gain: f32,
    note_counter: u64,
    voices: Vec<Voice>,
}

#[derive(Clone, Debug)]
struct Voice {
    note: MidiNote,
    freq: f32,
    phase: f32,
    level: f32,
    attack_samples_left: u32,
    attack_total_samples: u32,
    key_down: bool,
    release_samples_left: u32,
    release_total_samples: u32,
    age: u64,
}

impl SimpleSynth {
    pub fn new(sample_rate_hz: u32, max_voices: usize) -> Self {
        Self {
            ready: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                sample_rate_hz: sample_rate_hz as f32,
                max_voices: max_voices.max(4),
                gain: VolumeDb::default().gain(),
                note_counter: 0,
                voices: Vec::new(),
            }),
        }
    }

    pub fn active_voices(&self) -> usize {
        self.inner.lock().voices.len()
    }
}

impl Default for SimpleSynth {
    fn default() -> Self {
        Self::new(48_000, 24)
    }
}

impl Inner {
    fn note_on(&mut self, note: MidiNote) {
        self.note_counter = self.note_counter.wrapping_add(1);

        if self.voices.len() >= self.max_voices {
            if let Some((idx, _)) = self
                .voices
                .iter()
                .enumerate()
                .min_by_key(|(_, voice)| voice.age)
            {
                self.voices.swap_remove(idx);
            }
        }

        let attack_total_samples = ((self.sample_rate_hz * ATTACK_SECONDS) as u32).max(1);
        let release_total_samples = ((self.sample_rate_hz * RELEASE_SECONDS) as u32).max(1);
        self.voices.push(Voice {
            note,
            freq: 440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0),
            phase: 0.0,
            level: 1.0,
            attack_samples_left: attack_total_samples,
            attack_total_samples,
            key_down: true,
            release_samples_left: 0,
            release_total_samples,
            age: self.note_counter,
        });
    }

    fn note_off(&mut self, note: MidiNote) {
        for voice in &mut self.voices {
            if voice.note == note && voice.key_down {
                voice.key_down = false;
                voice.release_samples_left = voice.release_total_samples;
            }
        }
    }

    fn render(&mut self, out_l: &mut [f32], out_r: &mut [f32]) {
        let frames = out_l.len().min(out_r.len());
        let decay = 1.0 - DECAY_PER_SECOND / self.sample_rate_hz;
        let gain = self.gain * VOICE_AMPLITUDE;

        for voice in &mut self.voices {
            let phase_step = TAU * voice.freq / self.sample_rate_hz;
            for i in 0..frames {
                let mut envelope = voice.level;
                if voice.attack_samples_left > 0 {
                    let done = voice.attack_total_samples - voice.attack_samples_left;
                    envelope *= done as f32 / voice.attack_total_samples as f32;
                    voice.attack_samples_left -= 1;
                }
                if !voice.key_down {
                    if voice.release_samples_left == 0 {
                        break;
                    }
                    envelope *=
                        voice.release_samples_left as f32 / voice.release_total_samples as f32;
                    voice.release_samples_left -= 1;
                }

                let tone = voice.phase.sin() + 0.3 * (2.0 * voice.phase).sin();
                let sample = tone * envelope * gain;
                out_l[i] += sample;
                out_r[i] += sample;

                voice.level *= decay;
                voice.phase += phase_step;
                if voice.phase >= TAU {
                    voice.phase -= TAU;
                }
            }
        }

        self.voices
            .retain(|voice| voice.key_down || voice.release_samples_left > 0);
    }
}

impl NoteSinkPort for SimpleSynth {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn attack(&self, note: MidiNote) {
        self.inner.lock().note_on(note);
    }

    fn release(&self, note: MidiNote) {
        self.inner.lock().note_off(note);
    }

    fn set_volume_db(&self, volume: VolumeDb) {
        self.inner.lock().gain = volume.gain();
    }

    fn set_sample_rate(&self, sample_rate_hz: u32) {
        self.inner.lock().sample_rate_hz = sample_rate_hz.max(1) as f32;
    }

    fn render(&self, out_l: &mut [f32], out_r: &mut [f32]) {
        self.inner.lock().render(out_l, out_r);
        self.ready.store(true, Ordering::Release);
    }
}
