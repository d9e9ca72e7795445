use gps_speedometer::{
    AppConfig, Fix, MockProvider, ReplayProvider, TerminalDisplay, TrackingController,
};
use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Toggle,
    Quit,
}

/// Map a line typed on stdin to a command; an empty line is a button press
fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "t" | "toggle" => Some(Command::Toggle),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

fn init_logging(config: &AppConfig) {
    let level = config.tracing_level().unwrap_or(tracing::Level::INFO);
    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .compact()
        .finish();
    match tracing::subscriber::set_global_default(subscriber) {
        Ok(_) => {
            info!("Logging initialised");
        }
        Err(e) => {
            eprintln!("Failed to init logging. {}", e);
        }
    }
}

fn load_config(path: Option<&String>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(AppConfig::from_file(path)?),
        None => Ok(AppConfig::default()),
    }
}

/// Replay a recorded track, toggled from the keyboard
fn run_replay(track_path: &str, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let provider = ReplayProvider::from_file(track_path)?.with_playback_rate(config.playback_rate);
    info!(samples = provider.track().len(), "Loaded track {}", track_path);

    let display = TerminalDisplay::new(io::stdout(), config.output_format);
    let mut controller = TrackingController::new(provider, display, config.controller_config());

    let (command_tx, command_rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                match parse_command(&line) {
                    Some(command) => {
                        if command_tx.send(command).is_err() {
                            break;
                        }
                    }
                    None => eprintln!("Unknown command '{}': press Enter to toggle, q to quit", line.trim()),
                }
            }
        })?;

    eprintln!("Press Enter to toggle tracking, q to quit");
    loop {
        match command_rx.recv_timeout(POLL_INTERVAL) {
            Ok(Command::Toggle) => {
                if let Err(e) = controller.toggle() {
                    error!("Toggle failed: {}", e);
                }
            }
            Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        controller.pump();
    }

    controller.shutdown()?;
    controller.pump();
    info!(
        fixes = controller.stats().fixes_received,
        readings = controller.stats().readings_produced,
        "Session finished"
    );
    Ok(())
}

/// Scripted session against the mock provider: a short walk at about 5 km/h
fn run_demo(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let display = TerminalDisplay::new(io::stdout(), config.output_format);
    let mut controller = TrackingController::new(MockProvider::new(), display, config.controller_config());

    controller.toggle()?;
    let start = 1_700_000_000.0;
    let walk: Vec<Fix> = (0..6)
        .map(|i| Fix::new(47.6062, -122.3321 + i as f64 * 0.000_02, start + i as f64))
        .collect();
    controller.provider().deliver_all(walk.clone());
    controller.pump();

    // a duplicate report is dropped rather than shown as infinite speed
    controller.provider().deliver(walk[walk.len() - 1]);
    controller.pump();

    controller.toggle()?;
    controller.toggle()?;
    controller.provider().deliver_all(walk.iter().map(|fix| Fix {
        timestamp: fix.timestamp + 60.0,
        ..*fix
    }));
    controller.pump();

    controller.shutdown()?;
    info!(
        fixes = controller.stats().fixes_received,
        readings = controller.stats().readings_produced,
        "Demo finished"
    );
    Ok(())
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <track_json_file> [config_json_file]", program);
    eprintln!("   or: {} --demo [config_json_file]", program);
    eprintln!("   or: {} --write-config <config_json_file>", program);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.get(0).map_or("speedometer", |s| s.as_str());

    if args.len() == 3 && args[1] == "--write-config" {
        AppConfig::default().save_to_file(&args[2])?;
        println!("Wrote default configuration to {}", args[2]);
        return Ok(());
    }

    if args.len() < 2 || args.len() > 3 || args[1] == "--write-config" {
        print_usage(program);
        return Err("Invalid arguments".into());
    }

    let config = load_config(args.get(2))?;
    init_logging(&config);

    if args[1] == "--demo" {
        run_demo(&config)
    } else {
        run_replay(&args[1], &config)
    }
}
