#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tactus_core::{AppCore, Command, Event};
use tactus_infra_storage_fs::MemoryStorage;
use tactus_ports::audio::{AudioError, AudioOutputPort, AudioRenderCallback, AudioStreamHandle};
use tactus_ports::device::{DeviceError, DeviceKeyMap, DevicePort};
use tactus_ports::storage::KeyValueStorePort;
use tactus_ports::synth::NoteSinkPort;
use tactus_ports::types::{AudioConfig, AudioOutputDevice, DeviceId, MidiNote, VolumeDb};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkCall {
    Attack(MidiNote),
    Release(MidiNote),
}

pub struct RecordingSink {
    ready: AtomicBool,
    calls: Mutex<Vec<SinkCall>>,
    volume: Mutex<Option<VolumeDb>>,
}

impl RecordingSink {
    pub fn new(ready: bool) -> Arc<Self> {
        Arc::new(Self {
            ready: AtomicBool::new(ready),
            calls: Mutex::new(Vec::new()),
            volume: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().clone()
    }

    pub fn attacks(&self) -> Vec<MidiNote> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Attack(note) => Some(note),
                SinkCall::Release(_) => None,
            })
            .collect()
    }

    pub fn releases(&self) -> Vec<MidiNote> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Release(note) => Some(note),
                SinkCall::Attack(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn is_ready_now(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    pub fn volume(&self) -> Option<VolumeDb> {
        *self.volume.lock()
    }
}

impl NoteSinkPort for RecordingSink {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    fn attack(&self, note: MidiNote) {
        self.calls.lock().push(SinkCall::Attack(note));
    }

    fn release(&self, note: MidiNote) {
        self.calls.lock().push(SinkCall::Release(note));
    }

    fn set_volume_db(&self, volume: VolumeDb) {
        *self.volume.lock() = Some(volume);
    }

    fn set_sample_rate(&self, _sample_rate_hz: u32) {}

    fn render(&self, _out_l: &mut [f32], _out_r: &mut [f32]) {
        self.ready.store(true, Ordering::Relaxed);
    }
}

pub struct NullAudioPort;

struct NullStream;

impl AudioStreamHandle for NullStream {
    fn close(self: Box<Self>) {}
}

impl AudioOutputPort for NullAudioPort {
    fn list_outputs(&self) -> Result<Vec<AudioOutputDevice>, AudioError> {
        Ok(vec![AudioOutputDevice {
            id: DeviceId("null".to_string()),
            name: "Null Output".to_string(),
            default_config: AudioConfig {
                sample_rate_hz: 48_000,
                channels: 2,
                buffer_size_frames: None,
            },
        }])
    }

    fn open_output(
        &self,
        device_id: &DeviceId,
        _config: AudioConfig,
        mut cb: Box<dyn AudioRenderCallback>,
    ) -> Result<Box<dyn AudioStreamHandle>, AudioError> {
        if device_id.0 != "null" {
            return Err(AudioError::DeviceNotFound(device_id.to_string()));
        }
        let mut left = [0.0; 16];
        let mut right = [0.0; 16];
        cb.render(0, &mut left, &mut right);
        Ok(Box::new(NullStream))
    }
}

/// Device double answering with canned results.
pub struct ScriptedDevice {
    pub fetch: Mutex<Result<Option<DeviceKeyMap>, DeviceError>>,
    pub push_fails_with: Mutex<Option<DeviceError>>,
    pub pushed: Mutex<Vec<DeviceKeyMap>>,
}

impl ScriptedDevice {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            fetch: Mutex::new(Ok(None)),
            push_fails_with: Mutex::new(None),
            pushed: Mutex::new(Vec::new()),
        })
    }

    pub fn with_stored(map: &[(&str, &str)]) -> Arc<Self> {
        let device = Self::empty();
        let map = map
            .iter()
            .map(|(key, note)| (key.to_string(), note.to_string()))
            .collect();
        *device.fetch.lock() = Ok(Some(map));
        device
    }

    pub fn unreachable() -> Arc<Self> {
        let device = Self::empty();
        *device.fetch.lock() = Err(DeviceError::Unreachable("no route".to_string()));
        *device.push_fails_with.lock() = Some(DeviceError::Unreachable("no route".to_string()));
        device
    }
}

impl DevicePort for ScriptedDevice {
    fn push_config(&self, mapping: &DeviceKeyMap) -> Result<(), DeviceError> {
        self.pushed.lock().push(mapping.clone());
        match self.push_fails_with.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fetch_config(&self) -> Result<Option<DeviceKeyMap>, DeviceError> {
        match &*self.fetch.lock() {
            Ok(map) => Ok(map.clone()),
            Err(DeviceError::Unreachable(msg)) => Err(DeviceError::Unreachable(msg.clone())),
            Err(DeviceError::Status(code)) => Err(DeviceError::Status(*code)),
            Err(DeviceError::Protocol(msg)) => Err(DeviceError::Protocol(msg.clone())),
        }
    }
}

pub struct Harness {
    pub core: AppCore,
    pub sink: Arc<RecordingSink>,
    pub storage: Arc<MemoryStorage>,
    pub t0: Instant,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(MemoryStorage::new().into(), None)
    }

    pub fn with_storage(storage: Arc<MemoryStorage>) -> Self {
        Self::build(storage, None)
    }

    pub fn with_device(device: Arc<ScriptedDevice>) -> Self {
        Self::build(MemoryStorage::new().into(), Some(device))
    }

    fn build(storage: Arc<MemoryStorage>, device: Option<Arc<ScriptedDevice>>) -> Self {
        let sink = RecordingSink::new(true);
        let device = device.map(|device| device as Arc<dyn DevicePort>);
        let store: Arc<dyn KeyValueStorePort> = storage.clone();
        let mut core = AppCore::new(Box::new(NullAudioPort), sink.clone(), device, Some(store))
            .expect("core");
        core.drain_events();
        Self {
            core,
            sink,
            storage,
            t0: Instant::now(),
        }
    }

    pub fn at(&self, ms: u64) -> Instant {
        self.t0 + Duration::from_millis(ms)
    }

    pub fn send(&mut self, cmd: Command, ms: u64) -> Vec<Event> {
        let now = self.at(ms);
        self.core.handle_command_at(cmd, now).expect("command");
        self.core.drain_events()
    }

    pub fn tick(&mut self, ms: u64) -> Vec<Event> {
        let now = self.at(ms);
        self.core.tick_at(now);
        self.core.drain_events()
    }

    pub fn key_down(&mut self, key: &str, ms: u64) -> Vec<Event> {
        self.send(
            Command::KeyDown {
                key: key.to_string(),
                code: None,
            },
            ms,
        )
    }

    pub fn key_up(&mut self, key: &str, ms: u64) -> Vec<Event> {
        self.send(
            Command::KeyUp {
                key: key.to_string(),
                code: None,
            },
            ms,
        )
    }

    pub fn pointer_tap(&mut self, note: &str, ms: u64) -> Vec<Event> {
        let mut events = self.send(
            Command::PointerDown {
                note: note.to_string(),
            },
            ms,
        );
        events.extend(self.send(
            Command::PointerUp {
                note: note.to_string(),
            },
            ms,
        ));
        events
    }

    /// Ticks on the wall clock until `pred` matches an emitted event. Device
    /// jobs run on real threads, so this is the only non-virtual wait.
    pub fn wait_for(&mut self, pred: impl Fn(&Event) -> bool) -> Vec<Event> {
        let mut seen = Vec::new();
        for _ in 0..200 {
            self.core.tick();
            let events = self.core.drain_events();
            let found = events.iter().any(&pred);
            seen.extend(events);
            if found {
                return seen;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("event never arrived; saw {seen:?}");
    }
}

pub fn statuses(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Status { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}
