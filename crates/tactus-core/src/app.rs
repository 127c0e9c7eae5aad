use crate::audio_graph::SinkRenderer;
use crate::diagnostics::export_diagnostics;
use crate::game::{GameController, GameTiming};
use crate::glove_config::GloveConfig;
use crate::ipc::{Command, Event, InputRecord};
use crate::persist::{load_json, save_json};
use crate::voices::VoiceTracker;
use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tactus_domain_game::{builtin_songs, find_song, GameMode, MatchEvent};
use tactus_domain_notes::{KeyNoteResolver, KeyToken, Note, ScalePreset};
use tactus_ports::audio::{AudioError, AudioOutputPort, AudioStreamHandle};
use tactus_ports::device::{DeviceError, DeviceKeyMap, DevicePort};
use tactus_ports::storage::{KeyValueStorePort, SettingsDto, StorageError, KEY_SETTINGS};
use tactus_ports::synth::NoteSinkPort;
use tactus_ports::types::{AudioConfig, DeviceId, VolumeDb};

const RECENT_INPUTS: usize = 20;
const DEVICE_QUEUE: usize = 16;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

enum DeviceJob {
    Push(DeviceKeyMap),
    Fetch { startup: bool },
}

enum DeviceOutcome {
    Pushed(Result<(), DeviceError>),
    Fetched {
        startup: bool,
        result: Result<Option<DeviceKeyMap>, DeviceError>,
    },
}

pub struct AppCore {
    audio_port: Box<dyn AudioOutputPort>,
    sink: Arc<dyn NoteSinkPort>,
    device: Option<Arc<dyn DevicePort>>,
    storage: Option<Arc<dyn KeyValueStorePort>>,
    settings: SettingsDto,
    glove: GloveConfig,
    resolver: KeyNoteResolver,
    voices: VoiceTracker,
    game: GameController,
    held_keys: HashMap<KeyToken, Option<Note>>,
    held_pointer: HashSet<Note>,
    note_holds: HashMap<Note, usize>,
    audio_stream: Option<Box<dyn AudioStreamHandle>>,
    device_tx: Arc<Mutex<Producer<DeviceOutcome>>>,
    device_rx: Consumer<DeviceOutcome>,
    events: VecDeque<Event>,
    recent_inputs: VecDeque<InputRecord>,
    last_sounding: Vec<Note>,
}

impl AppCore {
    /// Loads settings and the glove mapping from `storage` and, when a device
    /// is attached, starts pulling its stored configuration in the background.
    pub fn new(
        audio_port: Box<dyn AudioOutputPort>,
        sink: Arc<dyn NoteSinkPort>,
        device: Option<Arc<dyn DevicePort>>,
        storage: Option<Arc<dyn KeyValueStorePort>>,
    ) -> Result<Self, AppError> {
        let settings = storage
            .as_deref()
            .and_then(|store| load_json::<SettingsDto>(store, KEY_SETTINGS))
            .unwrap_or_default();

        sink.set_volume_db(settings.master_volume_db);

        let glove = GloveConfig::load(storage.clone());
        let mut resolver = KeyNoteResolver::new();
        resolver.set_glove_binding(glove.key_bindings());

        let voices = VoiceTracker::new(sink.clone(), Duration::from_millis(settings.sustain_ms));
        let game = GameController::new(GameTiming::from_settings(&settings));

        let (producer, consumer) = RingBuffer::new(DEVICE_QUEUE);

        let mut core = Self {
            audio_port,
            sink,
            device,
            storage,
            settings,
            glove,
            resolver,
            voices,
            game,
            held_keys: HashMap::new(),
            held_pointer: HashSet::new(),
            note_holds: HashMap::new(),
            audio_stream: None,
            device_tx: Arc::new(Mutex::new(producer)),
            device_rx: consumer,
            events: VecDeque::new(),
            recent_inputs: VecDeque::with_capacity(RECENT_INPUTS),
            last_sounding: Vec::new(),
        };

        core.emit_settings();
        core.emit_glove_config();
        core.emit_game_state();
        core.spawn_device_job(DeviceJob::Fetch { startup: true });
        log::info!("core ready");
        Ok(core)
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), AppError> {
        self.handle_command_at(cmd, Instant::now())
    }

    pub fn handle_command_at(&mut self, cmd: Command, now: Instant) -> Result<(), AppError> {
        match cmd {
            Command::ListAudioOutputs => {
                let devices = self.audio_port.list_outputs()?;
                self.events.push_back(Event::AudioOutputsUpdated { devices });
            }
            Command::SelectAudioOutput { device_id, config } => {
                self.open_audio_output(device_id, config)?;
            }
            Command::SetMasterVolume { db } => {
                self.settings.master_volume_db = VolumeDb::new(db);
                self.sink.set_volume_db(self.settings.master_volume_db);
                self.save_settings();
                self.emit_settings();
            }
            Command::SetSustainMs { ms } => {
                self.settings.sustain_ms = ms;
                self.voices.set_sustain(Duration::from_millis(ms));
                self.save_settings();
                self.emit_settings();
            }
            Command::KeyDown { key, code } => self.key_down(&key, code.as_deref(), now),
            Command::KeyUp { key, code } => self.key_up(&key, code.as_deref(), now),
            Command::PointerDown { note } => self.pointer_down(&note, now),
            Command::PointerUp { note } | Command::PointerLeave { note } => {
                self.pointer_up(&note, now)
            }
            Command::StopAllNotes => {
                self.held_keys.clear();
                self.held_pointer.clear();
                self.note_holds.clear();
                self.voices.stop_all();
            }
            Command::ListScales => {
                let names = ScalePreset::names().map(str::to_string).collect();
                self.events.push_back(Event::ScalesListed { names });
            }
            Command::ApplyPreset { name } => {
                if self.glove.apply_preset(&name) {
                    self.refresh_bindings();
                }
            }
            Command::SelectCustom => {
                self.glove.select_custom();
                self.refresh_bindings();
            }
            Command::UpdateFingerNote { finger, note } => {
                let note = match note.as_deref().map(str::trim) {
                    None | Some("") => None,
                    Some(text) => match text.parse::<Note>() {
                        Ok(note) => Some(note),
                        Err(err) => {
                            log::debug!("ignoring note {text:?} for {}: {err}", finger.name());
                            return Ok(());
                        }
                    },
                };
                self.glove.update_finger_note(finger, note);
                self.refresh_bindings();
            }
            Command::SaveToDevice => self.save_to_device(),
            Command::LoadFromDevice => {
                if self.device.is_none() {
                    self.push_status("No device configured".to_string());
                }
                self.spawn_device_job(DeviceJob::Fetch { startup: false });
            }
            Command::ListSongs => {
                let songs = builtin_songs().iter().map(|song| song.summary()).collect();
                self.events.push_back(Event::SongsListed { songs });
            }
            Command::StartSong { song_id } => {
                let Some(song) = find_song(&song_id) else {
                    log::debug!("unknown song {song_id:?}");
                    return Ok(());
                };
                let events = self.game.start(song, now, &mut self.voices);
                self.apply_match_events(events);
            }
            Command::StopSong => {
                let events = self.game.stop(&mut self.voices);
                self.apply_match_events(events);
            }
            Command::ExportDiagnostics { path } => {
                let recent: Vec<InputRecord> = self.recent_inputs.iter().cloned().collect();
                export_diagnostics(
                    Path::new(&path),
                    &self.settings,
                    &self.glove.snapshot(&self.resolver),
                    &recent,
                )?;
                self.push_status(format!("Diagnostics written to {path}"));
            }
        }

        self.emit_active_notes();
        Ok(())
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        self.process_device_outcomes();
        let events = self.game.tick(now, &mut self.voices);
        self.apply_match_events(events);
        self.voices.tick(now);
        self.emit_active_notes();
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    pub fn glove(&self) -> &GloveConfig {
        &self.glove
    }

    pub fn game(&self) -> &GameController {
        &self.game
    }

    pub fn sounding_notes(&self) -> Vec<Note> {
        self.voices.sounding()
    }

    fn open_audio_output(
        &mut self,
        device_id: DeviceId,
        config: Option<AudioConfig>,
    ) -> Result<(), AppError> {
        if let Some(stream) = self.audio_stream.take() {
            stream.close();
        }

        let config = config.unwrap_or(AudioConfig {
            sample_rate_hz: 48_000,
            channels: 2,
            buffer_size_frames: None,
        });
        self.sink.set_sample_rate(config.sample_rate_hz);

        let renderer = SinkRenderer::new(self.sink.clone());
        let stream = self
            .audio_port
            .open_output(&device_id, config, Box::new(renderer))?;

        log::info!("audio output {device_id} opened at {} Hz", config.sample_rate_hz);
        self.audio_stream = Some(stream);
        self.settings.selected_audio_out = Some(device_id);
        self.save_settings();
        self.emit_settings();
        Ok(())
    }

    fn key_down(&mut self, key: &str, code: Option<&str>, now: Instant) {
        let Some(token) = KeyToken::from_event(key, code) else {
            return;
        };
        // The song is being demonstrated; the glove stays silent meanwhile.
        if self.game.mode() == GameMode::Showing {
            return;
        }
        if self.held_keys.contains_key(&token) {
            return;
        }

        let note = self.resolver.resolve_key(&token);
        self.held_keys.insert(token.clone(), note);
        self.record_input(InputRecord::KeyDown {
            key: token,
            note,
        });

        match note {
            Some(note) => {
                self.hold(note);
                self.play_note(note, now, true);
            }
            None => self.push_status("Key not mapped to a note".to_string()),
        }
    }

    fn key_up(&mut self, key: &str, code: Option<&str>, now: Instant) {
        let Some(token) = KeyToken::from_event(key, code) else {
            return;
        };
        let Some(note) = self.held_keys.remove(&token) else {
            return;
        };
        self.record_input(InputRecord::KeyUp { key: token });
        if let Some(note) = note {
            self.unhold(note, now);
        }
    }

    fn pointer_down(&mut self, input: &str, now: Instant) {
        let Some(note) = self.resolver.resolve(input) else {
            self.push_status("Key not mapped to a note".to_string());
            return;
        };
        if !self.held_pointer.insert(note) {
            return;
        }
        self.record_input(InputRecord::PointerDown { note });
        self.hold(note);
        let matchable = self.game.mode() != GameMode::Showing;
        self.play_note(note, now, matchable);
    }

    fn pointer_up(&mut self, input: &str, now: Instant) {
        let Some(note) = self.resolver.resolve(input) else {
            return;
        };
        if !self.held_pointer.remove(&note) {
            return;
        }
        self.record_input(InputRecord::PointerUp { note });
        self.unhold(note, now);
    }

    fn hold(&mut self, note: Note) {
        *self.note_holds.entry(note).or_default() += 1;
    }

    /// Starts the sustain release once no key or pointer holds `note` any more.
    fn unhold(&mut self, note: Note, now: Instant) {
        let Some(count) = self.note_holds.get_mut(&note) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.note_holds.remove(&note);
            self.voices.schedule_release(note, now);
        }
    }

    fn play_note(&mut self, note: Note, now: Instant, matchable: bool) {
        if matchable && self.game.mode() == GameMode::Playing {
            // Matched presses re-articulate a ringing note.
            self.voices.retrigger(note);
            let events = self.game.on_note(note, now);
            self.apply_match_events(events);
        } else {
            self.voices.attack(note);
        }
    }

    fn apply_match_events(&mut self, events: Vec<MatchEvent>) {
        if events.is_empty() {
            return;
        }
        for event in events {
            match event {
                MatchEvent::ModeChanged { mode } => {
                    let message = match mode {
                        GameMode::Idle => "Ready",
                        GameMode::Showing => "Listen to the sequence",
                        GameMode::Playing => "Your turn: play the notes in order",
                        GameMode::Success => continue,
                    };
                    self.push_status(message.to_string());
                }
                MatchEvent::Correct { index, note } => {
                    self.events.push_back(Event::GameFeedback {
                        index,
                        correct: true,
                        expected: note,
                        played: note,
                    });
                    self.push_status("Correct!".to_string());
                }
                MatchEvent::Incorrect {
                    index,
                    expected,
                    played,
                } => {
                    self.events.push_back(Event::GameFeedback {
                        index,
                        correct: false,
                        expected,
                        played,
                    });
                    self.push_status(format!("Wrong, try the highlighted note ({expected})"));
                }
                MatchEvent::Completed { score } => {
                    self.push_status(format!("Song complete! Score: {score}"));
                }
                MatchEvent::FocusChanged { .. } | MatchEvent::Score { .. } => {}
            }
        }
        self.emit_game_state();
    }

    fn save_to_device(&mut self) {
        let map = self.glove.key_bindings().to_device_map();
        if self.device.is_none() {
            self.push_status("No device configured; saved locally".to_string());
            return;
        }
        self.push_status("Sending configuration to the glove...".to_string());
        self.spawn_device_job(DeviceJob::Push(map));
    }

    fn spawn_device_job(&self, job: DeviceJob) {
        let Some(device) = self.device.clone() else {
            return;
        };
        let tx = self.device_tx.clone();
        thread::spawn(move || {
            let outcome = match job {
                DeviceJob::Push(map) => DeviceOutcome::Pushed(device.push_config(&map)),
                DeviceJob::Fetch { startup } => DeviceOutcome::Fetched {
                    startup,
                    result: device.fetch_config(),
                },
            };
            if tx.lock().push(outcome).is_err() {
                log::warn!("device result dropped, queue full");
            }
        });
    }

    fn process_device_outcomes(&mut self) {
        while let Ok(outcome) = self.device_rx.pop() {
            match outcome {
                DeviceOutcome::Pushed(Ok(())) => {
                    self.push_status("Configuration sent to the glove".to_string());
                }
                DeviceOutcome::Pushed(Err(err)) => {
                    log::warn!("device push failed: {err}");
                    let message = match err {
                        DeviceError::Status(code) => {
                            format!("Glove rejected the configuration (status {code}); saved locally")
                        }
                        _ => "Glove unreachable; saved locally".to_string(),
                    };
                    self.push_status(message);
                }
                DeviceOutcome::Fetched {
                    startup,
                    result: Ok(Some(map)),
                } => {
                    if self.glove.apply_device_bindings(&map) {
                        self.refresh_bindings();
                        self.push_status("Configuration loaded from the glove".to_string());
                    } else if !startup {
                        self.push_status("The glove has no usable configuration".to_string());
                    }
                }
                DeviceOutcome::Fetched {
                    startup,
                    result: Ok(None),
                } => {
                    log::debug!("device has no stored configuration");
                    if !startup {
                        self.push_status("The glove has no stored configuration".to_string());
                    }
                }
                DeviceOutcome::Fetched {
                    startup,
                    result: Err(err),
                } => {
                    log::debug!("device fetch failed: {err}");
                    if !startup {
                        self.push_status("Glove unreachable; using local configuration".to_string());
                    }
                }
            }
        }
    }

    fn refresh_bindings(&mut self) {
        self.resolver.set_glove_binding(self.glove.key_bindings());
        self.emit_glove_config();
    }

    fn record_input(&mut self, input: InputRecord) {
        if self.recent_inputs.len() == RECENT_INPUTS {
            self.recent_inputs.pop_front();
        }
        self.recent_inputs.push_back(input);
    }

    fn push_status(&mut self, message: String) {
        self.events.push_back(Event::Status { message });
    }

    fn emit_settings(&mut self) {
        self.events.push_back(Event::SettingsUpdated {
            settings: self.settings.clone(),
        });
    }

    fn emit_glove_config(&mut self) {
        self.events.push_back(Event::GloveConfigUpdated {
            config: self.glove.snapshot(&self.resolver),
        });
    }

    fn emit_game_state(&mut self) {
        let matcher = self.game.matcher();
        self.events.push_back(Event::GameUpdated {
            mode: matcher.mode(),
            expected_index: matcher.expected_index(),
            expected_note: matcher.expected_note(),
            score: matcher.score(),
        });
    }

    fn emit_active_notes(&mut self) {
        let sounding = self.voices.sounding();
        if sounding != self.last_sounding {
            self.last_sounding = sounding.clone();
            self.events
                .push_back(Event::ActiveNotesUpdated { notes: sounding });
        }
    }

    fn save_settings(&self) {
        if let Some(storage) = self.storage.as_deref() {
            save_json(storage, KEY_SETTINGS, &self.settings);
        }
    }
}
