//! Ralph Board CLI entry point.

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use ralph_cli::cli::{Cli, Commands};
use ralph_cli::{commands, Context};
use ralph_core::config::{ensure_dirs_in, env_file_in, log_file_in};

fn main() {
    // Load .env.local if it exists (for ANTHROPIC_API_KEY etc.)
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();
    let state_dir = cli.state_dir();
    let _ = dotenvy::from_path(env_file_in(&state_dir));

    init_tracing(&cli, &state_dir);

    let ctx = Context::new(&state_dir, cli.project.clone());
    let command = cli.command.unwrap_or(Commands::Board);

    if let Err(e) = commands::execute(command, &ctx) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing.
///
/// The dashboard owns the terminal, so its logs go to a file.
fn init_tracing(cli: &Cli, state_dir: &std::path::Path) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    if cli.is_board() {
        let log_file = ensure_dirs_in(state_dir).and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file_in(state_dir))
        });

        match log_file {
            Ok(file) => fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init(),
            // Without a log file the dashboard runs silent.
            Err(_) => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init(),
        }
        return;
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
