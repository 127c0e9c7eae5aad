use std::sync::Arc;
use tactus_ports::audio::AudioRenderCallback;
use tactus_ports::synth::NoteSinkPort;
use tactus_ports::types::SampleTime;

/// Bridges the output stream to the note sink.
pub struct SinkRenderer {
    sink: Arc<dyn NoteSinkPort>,
}

impl SinkRenderer {
    pub fn new(sink: Arc<dyn NoteSinkPort>) -> Self {
        Self { sink }
    }
}

impl AudioRenderCallback for SinkRenderer {
    fn render(&mut self, _sample_time_start: SampleTime, out_l: &mut [f32], out_r: &mut [f32]) {
        out_l.fill(0.0);
        out_r.fill(0.0);
        self.sink.render(out_l, out_r);
    }
}
