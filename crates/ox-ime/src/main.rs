//! ox-ime entrypoint: replays a composition script against a headless
//! console and prints the composited window.
use anyhow::Result;
use clap::Parser;
use core_config::load_from;
use core_render::Coord;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod script;
mod session;

use script::Script;
use session::Session;

const LOG_FILE: &str = "ox-ime.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "ox-ime", version, about = "IME composition overlay replay")]
struct Args {
    /// Replay script (TOML list of `[[step]]` tables).
    pub script: PathBuf,
    /// Optional configuration file path (overrides discovery of `ox-ime.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Window width in cells.
    #[arg(long, default_value_t = 40)]
    pub width: i32,
    /// Window height in cells.
    #[arg(long, default_value_t = 10)]
    pub height: i32,
    /// Screen buffer height (scrollback) in cells.
    #[arg(long = "buffer-height", default_value_t = 100)]
    pub buffer_height: i32,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
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

    fn run(&mut self) -> Result<()> {
        self.configure_logging()?;
        Self::install_panic_hook();
        info!(target: "runtime", "startup");

        let args = Args::parse();
        let config = load_from(args.config.clone())?;
        let ime = config.apply_limits();
        info!(
            target: "runtime.startup",
            script = %args.script.display(),
            config_override = args.config.is_some(),
            width = args.width,
            height = args.height,
            chunk_capacity = ime.chunk_capacity,
            "bootstrap_complete"
        );

        let script = Script::load(&args.script)?;
        let window = Coord::new(args.width, args.height);
        let mut session = Session::new(window, args.buffer_height, ime)?;
        session.run(&script.steps)?;
        session.render(&mut stdout())?;
        info!(target: "runtime", "shutdown");
        Ok(())
    }
}

fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.run()
}
