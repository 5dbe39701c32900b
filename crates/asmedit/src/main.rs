//! asmedit entrypoint: headless driver for the editing engine.
//!
//! Loads a document, replays a key script through the cursor controller and
//! prints the resulting text. With `--checker`, the edited document is also
//! run through an external syntax checker once the quiet window elapses.
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use core_actions::{CursorController, EditorSettings};
use core_config::load_from;
use core_events::Platform;
use core_state::{
    Clock, EditorSession, History, HistoryConfig, SyntaxCheckSchedule, SyntaxReport, SystemClock,
};
use core_text::{LineBuffer, MonospaceMeasure};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

mod checker;
mod replay;

use checker::CommandChecker;
use replay::Replay;

/// Modifier convention for action and alt keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlatformArg {
    /// Command is the action key, option is alt.
    Mac,
    /// Control is the action key and doubles as alt.
    Other,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Mac => Platform::Mac,
            PlatformArg::Other => Platform::Other,
        }
    }
}

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "asmedit", version, about = "Assembly source line editor")]
struct Args {
    /// Document to edit (UTF-8 text). A missing file starts an empty buffer.
    pub path: PathBuf,
    /// Configuration file path (overrides discovery of `asmedit.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Key script to replay, e.g. `li $v0, 10<CR><C-/>`.
    #[arg(long = "script")]
    pub script: Option<String>,
    /// Modifier convention for action and alt keys.
    #[arg(long = "platform", value_enum, default_value_t = PlatformArg::Other)]
    pub platform: PlatformArg,
    /// Syntax checker program: reads the document on stdin, exits non-zero
    /// with a `LINE:OFFSET: message` diagnostic on stderr.
    #[arg(long = "checker")]
    pub checker: Option<PathBuf>,
    /// Write the edited text back to `path` instead of printing it.
    #[arg(long = "write")]
    pub write: bool,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("asmedit.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "asmedit.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
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

fn load_buffer(path: &Path) -> LineBuffer {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let buffer = LineBuffer::from_text(&content);
            tracing::debug!(target: "io", file = %path.display(), size_bytes = content.len(), line_count = buffer.line_count(), "file_read_ok");
            buffer
        }
        Err(e) => {
            error!(target: "io", file = %path.display(), ?e, "file_open_error");
            LineBuffer::new()
        }
    }
}

/// Wait out the quiet window, then run the checker once.
fn settle_syntax(replay: &mut Replay, checker: &mut CommandChecker) -> Option<SyntaxReport> {
    if let Some(deadline) = replay.syntax().deadline() {
        std::thread::sleep(deadline.saturating_duration_since(SystemClock.now()));
    }
    replay.check_due(checker).cloned()
}

fn run(args: Args) -> Result<()> {
    let platform = Platform::from(args.platform);
    let config = load_from(args.config.clone())?;
    let history = History::new(
        HistoryConfig {
            backlog: config.file.history.backlog,
            debounce: config.file.history.debounce(),
            commit_interval: config.file.history.commit_interval,
        },
        Box::new(SystemClock),
    );
    let session = EditorSession::new(load_buffer(&args.path), history).with_path(&args.path);
    let controller = CursorController::new(
        EditorSettings::from_config(&config),
        Box::new(MonospaceMeasure::default()),
        platform,
    );
    info!(
        target: "runtime",
        path = %args.path.display(),
        config = config.path.as_ref().map(|p| p.display().to_string()).as_deref(),
        ?platform,
        "bootstrap_complete"
    );

    let syntax = SyntaxCheckSchedule::new(config.file.syntax.debounce(), Box::new(SystemClock));
    let mut replay = Replay::new(session, controller, syntax);
    if let Some(script) = args.script.as_deref() {
        replay.run(script)?;
    }

    if let Some(program) = args.checker.as_ref() {
        let mut checker = CommandChecker::new(program);
        match settle_syntax(&mut replay, &mut checker) {
            Some(SyntaxReport::Success) => eprintln!("syntax ok"),
            Some(SyntaxReport::Error {
                line: Some(line),
                offset,
                message,
            }) => eprintln!("syntax error at {line}:{}: {message}", offset.unwrap_or(0)),
            Some(SyntaxReport::Error { message, .. }) => eprintln!("syntax error: {message}"),
            None => {}
        }
    }

    let text = replay.session.buffer.to_text();
    if args.write {
        std::fs::write(&args.path, &text)
            .with_context(|| format!("writing {}", args.path.display()))?;
        info!(target: "io", file = %args.path.display(), size_bytes = text.len(), "file_write_ok");
    } else {
        println!("{text}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");
    let result = run(Args::parse());
    if let Err(e) = &result {
        error!(target: "runtime", error = %e, "run_failed");
    }
    info!(target: "runtime", "shutdown");
    result
}
