//! Treeline CLI — interactive shell and single-shot command runner.

mod commands;
mod input;
mod shell;
mod watch;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, reload};

/// Treeline: a command shell with tree-structured argument completion
#[derive(Parser, Debug)]
#[command(name = "treeline", version, about, long_about = None)]
struct Cli {
    /// Command to execute once (starts interactive mode if omitted)
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,

    /// Workspace directory (config and history live under .treeline/)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Behind a reload handle so the 'log' command can change the level
    // at runtime.
    let (stderr_filter, reload_handle) = reload::Layer::new(EnvFilter::new(filter));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let log_dir = directories::ProjectDirs::from("sh", "treeline", "treeline")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "treeline.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let config = treeline_core::ShellConfig::load(&workspace)
        .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    let log_control: commands::LogLevelControl = Arc::new(move |level: &str| {
        reload_handle.reload(EnvFilter::new(level))?;
        Ok(())
    });

    let mut shell = shell::Shell::new(config, workspace, log_control);
    if cli.command.is_empty() {
        shell.run_interactive()
    } else {
        shell.run_single_command(&cli.command);
        Ok(())
    }
}
