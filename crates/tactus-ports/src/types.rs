use serde::{Deserialize, Serialize};
use std::fmt;

pub type MidiNote = u8; // C4 = 60
pub type SampleTime = u64; // audio sample index, monotonic while stream running

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AudioOutputDevice {
    pub id: DeviceId,
    pub name: String,
    pub default_config: AudioConfig,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub buffer_size_frames: Option<u32>,
}

/// Master level in decibels, kept inside the range the volume slider offers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeDb(pub f32);

impl VolumeDb {
    pub const MIN: f32 = -48.0;
    pub const MAX: f32 = 0.0;

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Linear amplitude factor.
    pub fn gain(self) -> f32 {
        10.0_f32.powf(self.0 / 20.0)
    }
}

impl Default for VolumeDb {
    fn default() -> Self {
        Self(-12.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
