//! vins entrypoint: replay a Vim key script through the insert-mode core.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::load_from;
use core_text::Buffer;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod replay;

use replay::Replay;

const LOG_FILE: &str = "vins.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "vins", version, about = "Replay Vim insert-mode keys over a buffer")]
struct Args {
    /// File to edit (UTF-8 text). An empty buffer is used when omitted.
    pub path: Option<PathBuf>,
    /// Keys in Vim notation, e.g. `hello<C-w><Esc>`.
    #[arg(long)]
    pub keys: String,
    /// Start in Replace mode instead of Insert mode.
    #[arg(long)]
    pub replace: bool,
    /// Caret line (0-based).
    #[arg(long, default_value_t = 0)]
    pub line: usize,
    /// Caret byte column within the line.
    #[arg(long, default_value_t = 0)]
    pub column: usize,
    /// Configuration file path (overrides discovery of `vins.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

/// Install the file logger. `RUST_LOG` wins over the configured filter.
fn configure_logging(fallback_filter: &str) -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter));
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn load_buffer(path: Option<&Path>) -> Result<Buffer> {
    let Some(path) = path else {
        return Buffer::from_str("untitled", "");
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .inspect_err(|e| error!(target: "io", file = %path.display(), error = %e, "file_open_error"))?;
    // Line breaks are normalized to `\n` for the replay.
    let content = content.replace("\r\n", "\n");
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    tracing::debug!(target: "io", file = %path.display(), size_bytes = content.len(), "file_read_ok");
    Buffer::from_str(name, &content)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let _log_guard = configure_logging(config.log_filter());
    install_panic_hook();
    info!(
        target: "runtime",
        config = config.source.as_ref().map(|p| p.display().to_string()).as_deref(),
        replace = args.replace,
        "startup"
    );

    let keys = core_input::parse_keys(&args.keys).context("invalid --keys notation")?;
    let buffer = load_buffer(args.path.as_deref())?;

    let mut replay = Replay::new(buffer, &config, args.replace);
    replay.place_caret(args.line, args.column);
    let outcome = replay.run(&keys);

    print!("{}", replay.text());
    eprint!("{}", replay.summary(&outcome, keys.len()));
    info!(target: "runtime", "shutdown");
    Ok(())
}
