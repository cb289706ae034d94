//! Live note-reading trainer: wires a MIDI input device to the lane
//! evaluation engine and keeps score on the console.
//!
//! Usage:
//!   trainer --list                     list MIDI input devices
//!   trainer [--device N] [--config F]  run a session (default device 0)

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use staffrun::engine::{Scoreboard, Session, SessionConfig};
use staffrun::midi::{NoteEvent, NoteQueue, TrainerInput};

/// Trainer loop tick; matches the engine's timeout slack comfortably
const TICK: Duration = Duration::from_millis(1);

struct Args {
    list: bool,
    device: usize,
    config_path: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        list: false,
        device: 0,
        config_path: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--list" => args.list = true,
            "--device" => {
                let value = iter.next().ok_or("--device requires an index")?;
                args.device = value
                    .parse()
                    .map_err(|_| format!("invalid device index: {}", value))?;
            }
            "--config" => {
                args.config_path = Some(iter.next().ok_or("--config requires a path")?);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<SessionConfig, String> {
    match path {
        None => Ok(SessionConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {}", path, e))?;
            serde_json::from_str(&text).map_err(|e| format!("failed to parse {}: {}", path, e))
        }
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;

    if args.list {
        let devices = TrainerInput::list_devices()?;
        if devices.is_empty() {
            println!("no MIDI input devices found");
        }
        for device in devices {
            println!("{}: {}", device.index, device.name);
        }
        return Ok(());
    }

    let config = load_config(args.config_path.as_deref())?;
    let queue = Arc::new(NoteQueue::new(256));
    let input = TrainerInput::connect(args.device, Arc::clone(&queue))?;
    println!("playing on: {}", input.device_name());

    let mut session =
        Session::new(config, Scoreboard::new()).map_err(|e| format!("bad config: {}", e))?;

    let mut buffer: Vec<NoteEvent> = Vec::with_capacity(256);
    loop {
        thread::sleep(TICK);
        let now = Instant::now();

        queue.drain_into(&mut buffer);
        for event in &buffer {
            if let NoteEvent::NoteOn { pitch, velocity } = *event {
                session.note_on(pitch, velocity, now);
            }
        }
        session.tick(now);

        if session.is_game_over() {
            break;
        }
    }

    let score = session.into_sink();
    println!("final score: {} hits, {} misses", score.hits, score.misses);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}
