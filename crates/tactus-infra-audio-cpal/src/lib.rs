use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, FromSample, Sample, SampleFormat, SampleRate, SizedSample, StreamConfig,
    SupportedStreamConfigRange,
};
use std::sync::mpsc;
use std::thread;
use tactus_ports::audio::{AudioError, AudioOutputPort, AudioRenderCallback, AudioStreamHandle};
use tactus_ports::types::{AudioConfig, AudioOutputDevice, DeviceId};

pub struct CpalAudioOutputPort {
    host: cpal::Host,
}

impl CpalAudioOutputPort {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// Id of the host's default output, if it is also enumerable.
    pub fn default_output_id(&self) -> Option<DeviceId> {
        let default_name = self.host.default_output_device()?.name().ok()?;
        list_devices_from_host(&self.host)
            .ok()?
            .into_iter()
            .find(|(_, device)| device.name().ok().as_deref() == Some(default_name.as_str()))
            .map(|(id, _)| id)
    }
}

impl Default for CpalAudioOutputPort {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CpalAudioStreamHandle {
    stop_tx: mpsc::Sender<()>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl AudioStreamHandle for CpalAudioStreamHandle {
    fn close(mut self: Box<Self>) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

impl AudioOutputPort for CpalAudioOutputPort {
    fn list_outputs(&self) -> Result<Vec<AudioOutputDevice>, AudioError> {
        let mut results = Vec::new();
        for (id, device) in list_devices_from_host(&self.host)? {
            let Ok(default_config) = device.default_output_config() else {
                continue;
            };
            results.push(AudioOutputDevice {
                id,
                name: device
                    .name()
                    .unwrap_or_else(|_| "Unknown Output".to_string()),
                default_config: AudioConfig {
                    sample_rate_hz: default_config.sample_rate().0,
                    channels: default_config.channels(),
                    buffer_size_frames: None,
                },
            });
        }
        Ok(results)
    }

    /// The stream lives on its own thread because `cpal::Stream` is not `Send`
    /// on every platform; the handle stops it by message.
    fn open_output(
        &self,
        device_id: &DeviceId,
        config: AudioConfig,
        cb: Box<dyn AudioRenderCallback>,
    ) -> Result<Box<dyn AudioStreamHandle>, AudioError> {
        let device_id = device_id.clone();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let join_handle = thread::spawn(move || {
            let stream = match start_stream(&device_id, config, cb) {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));
            let _ = stop_rx.recv();
            drop(stream);
        });

        ready_rx
            .recv()
            .map_err(|e| AudioError::Backend(e.to_string()))??;

        Ok(Box::new(CpalAudioStreamHandle {
            stop_tx,
            join_handle: Some(join_handle),
        }))
    }
}

fn list_devices_from_host(host: &cpal::Host) -> Result<Vec<(DeviceId, cpal::Device)>, AudioError> {
    let host_id = format!("{:?}", host.id());
    let devices = host
        .output_devices()
        .map_err(|e| AudioError::Backend(e.to_string()))?;

    Ok(devices
        .enumerate()
        .map(|(index, device)| {
            let name = device
                .name()
                .unwrap_or_else(|_| "Unknown Output".to_string());
            (DeviceId(format!("cpal:{host_id}:{index}:{name}")), device)
        })
        .collect())
}

fn start_stream(
    device_id: &DeviceId,
    desired: AudioConfig,
    cb: Box<dyn AudioRenderCallback>,
) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = list_devices_from_host(&host)?
        .into_iter()
        .find(|(id, _)| id == device_id)
        .map(|(_, device)| device)
        .ok_or_else(|| AudioError::DeviceNotFound(device_id.to_string()))?;

    let mut supported = device
        .supported_output_configs()
        .map_err(|e| AudioError::Backend(e.to_string()))?;
    let chosen = select_supported_config(&mut supported, desired)?;
    let sample_format = chosen.sample_format();
    let mut config = chosen.config();
    config.buffer_size = match desired.buffer_size_frames {
        Some(frames) => BufferSize::Fixed(frames),
        None => BufferSize::Default,
    };

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, cb),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, cb),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, cb),
        other => {
            return Err(AudioError::UnsupportedConfig(format!(
                "sample format {other:?}"
            )))
        }
    }
    .map_err(|e| AudioError::Backend(e.to_string()))?;

    stream
        .play()
        .map_err(|e| AudioError::Backend(e.to_string()))?;
    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut cb: Box<dyn AudioRenderCallback>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let initial_frames = match config.buffer_size {
        BufferSize::Fixed(frames) => frames as usize,
        BufferSize::Default => 8192,
    };
    let mut left = vec![0.0_f32; initial_frames];
    let mut right = vec![0.0_f32; initial_frames];
    let mut sample_time: u64 = 0;

    device.build_output_stream(
        config,
        move |data: &mut [T], _info: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels.max(1);
            if frames > left.len() {
                left.resize(frames, 0.0);
                right.resize(frames, 0.0);
            }
            cb.render(sample_time, &mut left[..frames], &mut right[..frames]);
            write_interleaved(data, channels, &left[..frames], &right[..frames]);
            sample_time = sample_time.saturating_add(frames as u64);
        },
        |err| log::error!("cpal stream error: {err}"),
        None,
    )
}

fn select_supported_config(
    supported: &mut dyn Iterator<Item = SupportedStreamConfigRange>,
    desired: AudioConfig,
) -> Result<cpal::SupportedStreamConfig, AudioError> {
    let mut best: Option<cpal::SupportedStreamConfig> = None;
    let mut best_score: i32 = -1;

    for config_range in supported {
        if config_range.channels() != desired.channels {
            continue;
        }
        let min = config_range.min_sample_rate().0;
        let max = config_range.max_sample_rate().0;
        if desired.sample_rate_hz < min || desired.sample_rate_hz > max {
            continue;
        }

        let score = match config_range.sample_format() {
            SampleFormat::F32 => 3,
            SampleFormat::I16 => 2,
            SampleFormat::U16 => 1,
            _ => 0,
        };
        if score > best_score {
            best = Some(config_range.with_sample_rate(SampleRate(desired.sample_rate_hz)));
            best_score = score;
        }
    }

    best.ok_or_else(|| AudioError::UnsupportedConfig("no matching stream config".to_string()))
}

/// Stereo into any channel count: mono gets the average, extra channels silence.
pub fn write_interleaved<T>(data: &mut [T], channels: usize, left: &[f32], right: &[f32])
where
    T: Sample + FromSample<f32>,
{
    if channels == 0 {
        return;
    }
    for (frame, out) in data.chunks_exact_mut(channels).enumerate() {
        let l = left.get(frame).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
        let r = right.get(frame).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
        if channels == 1 {
            out[0] = T::from_sample((l + r) * 0.5);
            continue;
        }
        out[0] = T::from_sample(l);
        out[1] = T::from_sample(r);
        for extra in &mut out[2..] {
            *extra = T::EQUILIBRIUM;
        }
    }
}
