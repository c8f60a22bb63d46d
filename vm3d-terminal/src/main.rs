//! VM3D Terminal Viewer - Spaceship launch in ASCII
//!
//! Controls:
//!   - W/S/A/D: Move, E/Q: Rise/Sink (Shift = fast, Ctrl = slow)
//!   - Arrow keys / mouse drag: Look around
//!   - F: Launch, R: Reset, C: Cycle camera while launching
//!   - Space: Pause camera control, Esc: Quit

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vm3d_terminal::config::{load_from_path, ViewerConfig};
use vm3d_terminal::{TerminalApp, ViewerError, ViewerResult};

#[derive(Parser, Debug)]
#[command(name = "vm3d-terminal", about = "Fly around a launching spaceship in the terminal")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OBJ model to place at the world origin.
    #[arg(long)]
    obj: Option<PathBuf>,

    /// Log filter directive (overridden by RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Circle subdivisions for the ship's cones and cylinders.
    #[arg(long)]
    subdivisions: Option<usize>,
}

impl Args {
    /// Command-line values win over the config file.
    fn apply(&self, config: &mut ViewerConfig) {
        if let Some(obj) = &self.obj {
            config.scene.obj = Some(obj.clone());
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
        if let Some(subdivisions) = self.subdivisions {
            config.scene.subdivisions = subdivisions;
        }
    }
}

/// Install the global subscriber. With no log file the default level is
/// `warn`, since stderr shares the terminal with the viewer.
fn init_logging(log_level: Option<&str>, config: &ViewerConfig) -> ViewerResult<()> {
    let default_level = match (log_level, &config.log_file) {
        (Some(level), _) => level,
        (None, Some(_)) => "vm3d=info",
        (None, None) => "vm3d=warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match &config.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                ViewerError::Config(format!("failed to create log file {}: {e}", path.display()))
            })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run(args: Args) -> ViewerResult<()> {
    let mut config = match &args.config {
        Some(path) => load_from_path(path)?,
        None => ViewerConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    init_logging(args.log_level.as_deref(), &config)?;
    tracing::info!(
        subdivisions = config.scene.subdivisions,
        obj = ?config.scene.obj,
        "starting vm3d terminal viewer"
    );

    let mut app = TerminalApp::new(config)?;
    app.run()
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("vm3d-terminal: {e}");
            ExitCode::FAILURE
        }
    }
}
