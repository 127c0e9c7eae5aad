use parking_lot::Mutex;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tactus_core::{AppCore, Command, Event};
use tactus_infra_audio_cpal::CpalAudioOutputPort;
use tactus_infra_device_http::HttpDevicePort;
use tactus_infra_storage_fs::FsStorage;
use tactus_infra_synth_simple::SimpleSynth;
use tactus_ports::audio::AudioOutputPort;
use tactus_ports::device::DevicePort;
use tactus_ports::storage::{KeyValueStorePort, SettingsDto, KEY_SETTINGS};

const TICK: Duration = Duration::from_millis(16);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let storage: Arc<dyn KeyValueStorePort> = Arc::new(FsStorage::default());
    let device = device_from_settings(storage.as_ref());
    let audio_port = CpalAudioOutputPort::new();
    let default_output = default_output_command(&audio_port);
    let synth = Arc::new(SimpleSynth::default());

    let core = match AppCore::new(Box::new(audio_port), synth, device, Some(storage)) {
        Ok(core) => core,
        Err(err) => {
            log::error!("failed to initialize core: {err}");
            std::process::exit(1);
        }
    };
    let core = Arc::new(Mutex::new(core));

    match default_output {
        Some(cmd) => {
            if let Err(err) = core.lock().handle_command(cmd) {
                log::warn!("no audio output, notes will be silent: {err}");
            }
        }
        None => log::warn!("no audio output device found, notes will be silent"),
    }

    let running = Arc::new(AtomicBool::new(true));
    spawn_command_reader(core.clone(), running.clone());

    while running.load(Ordering::Acquire) {
        let events = {
            let mut core = core.lock();
            core.tick();
            core.drain_events()
        };
        print_events(&events);
        thread::sleep(TICK);
    }

    let events = core.lock().drain_events();
    print_events(&events);
    log::info!("stdin closed, exiting");
}

fn device_from_settings(storage: &dyn KeyValueStorePort) -> Option<Arc<dyn DevicePort>> {
    let settings = match storage.get(KEY_SETTINGS) {
        Ok(Some(raw)) => serde_json::from_str::<SettingsDto>(&raw).unwrap_or_default(),
        Ok(None) => SettingsDto::default(),
        Err(err) => {
            log::warn!("could not read settings: {err}");
            SettingsDto::default()
        }
    };
    let endpoint = settings.device_endpoint?;
    log::info!("glove endpoint {endpoint}");
    Some(Arc::new(HttpDevicePort::new(endpoint)))
}

fn default_output_command(audio_port: &CpalAudioOutputPort) -> Option<Command> {
    let default_id = audio_port.default_output_id();
    let outputs = match audio_port.list_outputs() {
        Ok(outputs) => outputs,
        Err(err) => {
            log::warn!("could not list audio outputs: {err}");
            return None;
        }
    };
    let output = outputs
        .iter()
        .find(|output| Some(&output.id) == default_id.as_ref())
        .or_else(|| outputs.first())?;
    Some(Command::SelectAudioOutput {
        device_id: output.id.clone(),
        config: Some(output.default_config),
    })
}

/// One JSON command per line; malformed lines are logged and skipped.
fn spawn_command_reader(core: Arc<Mutex<AppCore>>, running: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log::error!("stdin read failed: {err}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let cmd = match serde_json::from_str::<Command>(&line) {
                Ok(cmd) => cmd,
                Err(err) => {
                    log::warn!("ignoring malformed command: {err}");
                    continue;
                }
            };
            if let Err(err) = core.lock().handle_command(cmd) {
                log::warn!("command failed: {err}");
            }
        }
        running.store(false, Ordering::Release);
    });
}

fn print_events(events: &[Event]) {
    if events.is_empty() {
        return;
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for event in events {
        match serde_json::to_string(event) {
            Ok(line) => {
                let _ = writeln!(out, "{line}");
            }
            Err(err) => log::warn!("failed to encode event: {err}"),
        }
    }
    let _ = out.flush();
}
