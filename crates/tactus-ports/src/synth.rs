use crate::types::*;

/// Opaque sound sink driven by the core.
///
/// Thread model:
/// - attack / release / set_volume_db / set_sample_rate are called from the core thread
/// - render is called from the audio thread (must not block for long)
///
/// Before `is_ready` turns true the core skips attacks instead of queueing them.
pub trait NoteSinkPort: Send + Sync {
    fn is_ready(&self) -> bool;
    fn attack(&self, note: MidiNote);
    fn release(&self, note: MidiNote);
    fn set_volume_db(&self, volume: VolumeDb);
    fn set_sample_rate(&self, sample_rate_hz: u32);

    /// Called by audio thread: mix every sounding voice into out_l/out_r.
    fn render(&self, out_l: &mut [f32], out_r: &mut [f32]);
}
