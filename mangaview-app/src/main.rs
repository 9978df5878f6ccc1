mod app_dir;
mod commands;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};

use mangaview_core::{FileStore, Location, PreferenceStore, ReaderEvent, ReaderSession};
use mangaview_fetch::{spawn_loader, MangaDexClient, ReqwestClient, DEFAULT_API_BASE};

use terminal::{spawn_stdin_reader, status_line, Bell};

/// How often auto-play is checked when no events arrive.
const TICK: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "mangaview", version, about = "Read manga chapters from the terminal")]
struct Args {
    /// Reader location, e.g. `WORK_ID/1?chapter=CHAPTER_ID`
    location: Location,

    /// Metadata service base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Only list chapters translated into this language
    #[arg(long)]
    language: Option<String>,

    /// Page loader threads (0 = one per core)
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Directory holding the preferences file
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("Starting Mangaview");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = app_dir::config_directory(args.config_dir.as_deref());
    info!("Preferences directory: {}", config_dir.display());
    let prefs = PreferenceStore::open(FileStore::new(config_dir));

    let http = Arc::new(ReqwestClient::new()?);
    let mut api = MangaDexClient::new(Arc::clone(&http), args.api_base);
    if let Some(lang) = args.language {
        api = api.with_language(lang);
    }
    let (loader, events) = spawn_loader(http, Arc::new(api), args.threads)?;
    spawn_stdin_reader(loader.sender())?;

    let mut session = ReaderSession::new(&args.location, prefs, loader, Bell);
    session.open();
    println!("{}", status_line(&session));
    println!("type `help` for commands");

    loop {
        let changed = match events.recv_timeout(TICK) {
            Ok(ReaderEvent::Shutdown) => break,
            Ok(event) => session.handle(event, Instant::now()),
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        let turned = session.tick(Instant::now());

        for note in session.take_notifications() {
            println!("! {note}");
        }
        if changed || turned {
            println!("{}", status_line(&session));
        }
    }

    info!(location = %session.location(), "Closing reader");
    Ok(())
}
