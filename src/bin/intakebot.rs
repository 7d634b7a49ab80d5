use intakebot::channels::{Channel, TelegramChannel};
use intakebot::config::load_runtime_config;
use intakebot::intake::{FlowSettings, IntakeEngine};
use intakebot::runtime::{run_until_stop, LoopOptions};
use intakebot::session::{InMemorySessionStore, SessionStore};
use intakebot::shared::LogSink;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const USAGE: &str = "usage: intakebot [--config <path>]";

fn parse_config_path(args: &[String]) -> Result<Option<PathBuf>, String> {
    match args {
        [] => Ok(None),
        [flag, path] if flag == "--config" => Ok(Some(PathBuf::from(path))),
        [flag] if flag == "--help" || flag == "-h" => Err(USAGE.to_string()),
        _ => Err(format!("unexpected arguments: {}\n{USAGE}", args.join(" "))),
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = parse_config_path(&args)?;
    let config = load_runtime_config(config_path.as_deref()).map_err(|e| e.to_string())?;

    let log = LogSink::new(config.log_path.clone(), config.log_to_stderr);
    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::from_config(&config));
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let engine = Arc::new(IntakeEngine::new(
        Arc::clone(&channel),
        sessions,
        FlowSettings::from_config(&config),
        log.clone(),
    ));

    let stop = AtomicBool::new(false);
    run_until_stop(engine, channel, &stop, LoopOptions::from_config(&config), &log);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
