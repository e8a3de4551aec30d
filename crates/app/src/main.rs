//! Headless VoxScribe front end.
//!
//! Reads audio file paths from stdin (one per line), queues each for
//! transcription, and prints the saved text as results land. Exits cleanly
//! on EOF or Ctrl-C.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use voxscribe_app::{ConfigManager, LastTranscript, Runtime, RuntimeOptions};
use voxscribe_bus::{AppEvent, CompletedTranscription, EventBus, EventKind};
use voxscribe_stt::engines::{StubConfig, StubEngine};

#[derive(Parser, Debug)]
#[command(name = "voxscribe", about = "Voice-to-text capture pipeline")]
struct Cli {
    /// Path to the TOML config file (created with defaults if missing)
    #[arg(long, default_value = "voxscribe.toml")]
    config: PathBuf,

    /// Override the database path from the config file
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Override the transcription model size
    #[arg(long)]
    model_size: Option<String>,

    /// Override the inference device (cpu, cuda)
    #[arg(long)]
    device: Option<String>,

    /// Process this many jobs, then exit
    #[arg(long)]
    max_loops: Option<u64>,
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let bus = Arc::new(EventBus::new());

    let manager = ConfigManager::load(&cli.config, bus.clone())
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let mut config = manager.get();
    if let Some(db_path) = cli.db_path {
        config.storage.db_path = db_path;
    }
    if let Some(model_size) = cli.model_size {
        config.transcriber.model_size = model_size;
    }
    if let Some(device) = cli.device {
        config.transcriber.device = device;
    }

    let last = if config.clipboard.auto_copy {
        Some(LastTranscript::attach(&bus))
    } else {
        None
    };

    bus.subscribe(EventKind::TranscriptionCompleted, |event| {
        if let AppEvent::TranscriptionCompleted(CompletedTranscription::Saved { id, text, .. }) =
            event
        {
            println!("[{id}] {text}");
        }
    });
    bus.subscribe(EventKind::Error, |event| {
        if let AppEvent::Error { message, critical } = event {
            if *critical {
                error!("{message}");
            } else {
                warn!("{message}");
            }
        }
    });

    // TODO: wire a whisper backend behind TranscriptionEngine; the stub
    // makes the pipeline runnable end to end without model weights.
    let runtime = Runtime::start(
        &config,
        RuntimeOptions {
            max_loops: cli.max_loops,
            ..Default::default()
        },
        bus.clone(),
        StubEngine::factory(StubConfig::default()),
    )?;

    info!(
        db = %config.storage.db_path.display(),
        model = %config.transcriber.model_size,
        "VoxScribe ready; enter audio file paths, one per line"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        let path = line.trim();
                        if path.is_empty() {
                            continue;
                        }
                        runtime.enqueue(path.to_string())?;
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received; shutting down");
                break;
            }
        }
    }

    let clean = runtime.shutdown(Duration::from_secs(5));
    if !clean {
        warn!("Worker did not stop in time; exiting anyway");
    }
    if let Some(last) = last {
        if let Some(text) = last.current() {
            info!("Last transcript: {text}");
        }
    }
    Ok(())
}
