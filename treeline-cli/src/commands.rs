//! Reference command set for the `treeline` binary.
//!
//! A small device-control vocabulary exercising every tree shape:
//! multi-level enumerated branches, numeric ranges, and long-running
//! handlers that demonstrate cancellation.

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use treeline_core::{CommandHandler, CommandRegistry, ParamTree, ShellConfig, TreeBuilder};

/// Applies a log-level change to the live tracing subscriber.
///
/// Built where the subscriber's reload handle has a nameable concrete
/// type; handlers only see the closure.
pub type LogLevelControl = Arc<dyn Fn(&str) -> anyhow::Result<()> + Send + Sync>;

/// Register the full application command set.
pub fn register_all(
    registry: &mut CommandRegistry,
    config: &ShellConfig,
    log_control: LogLevelControl,
) {
    register_checked(
        registry,
        "set",
        "Set a device or shell parameter",
        Arc::new(handle_set),
        TreeBuilder::new()
            .root(&["device1", "device2", "timeout"])
            .node(&["device1"], &["light", "sound"])
            .node(&["device1", "light"], &["0", "1", "2"])
            .node(&["device1", "sound"], &["on", "off"])
            .node(&["device2"], &["mode"])
            .node(&["device2", "mode"], &["eco", "normal", "performance"])
            .numeric(&["timeout"], 1, 600)
            .build(),
    );

    let show_config = config.clone();
    register_checked(
        registry,
        "show",
        "Show shell or device state",
        Arc::new(move |args| handle_show(&show_config, args)),
        TreeBuilder::new()
            .root(&["config", "devices", "version"])
            .build(),
    );

    register_checked(
        registry,
        "log",
        "Adjust the shell log level",
        Arc::new(move |args| handle_log(&log_control, args)),
        TreeBuilder::new()
            .root(&["level"])
            .node(&["level"], &["error", "warn", "info", "debug", "trace"])
            .build(),
    );

    register_checked(
        registry,
        "wait",
        "Sleep for N seconds (Ctrl+D cancels)",
        Arc::new(handle_wait),
        TreeBuilder::new().numeric(&[], 1, 3600).build(),
    );
}

/// Register a tree-driven command, logging consistency diagnostics.
///
/// Declaration stays permissive; findings are surfaced, not enforced.
fn register_checked(
    registry: &mut CommandRegistry,
    name: &str,
    description: &str,
    handler: CommandHandler,
    tree: ParamTree,
) {
    for finding in tree.check_consistency() {
        tracing::warn!(command = name, "tree declaration: {finding}");
    }
    registry.register_with_tree(name, description, handler, tree);
}

fn handle_set(args: &[String]) -> anyhow::Result<()> {
    // Validation already passed, so the shapes below are the only ones.
    match (args.get(1), args.get(2), args.get(3)) {
        (Some(target), Some(value), None) if target == "timeout" => {
            println!("timeout set to {value}s");
        }
        (Some(device), Some(param), Some(value)) => {
            println!("{device} {param} set to {value}");
        }
        _ => anyhow::bail!("unsupported argument shape: {args:?}"),
    }
    Ok(())
}

fn handle_show(config: &ShellConfig, args: &[String]) -> anyhow::Result<()> {
    match args.get(1).map(String::as_str) {
        Some("config") => print!("{}", render_config(config)),
        Some("devices") => {
            println!("device1   light=0 sound=off");
            println!("device2   mode=normal");
        }
        Some("version") => {
            println!("treeline {}", env!("CARGO_PKG_VERSION"));
        }
        other => anyhow::bail!("unsupported topic: {other:?}"),
    }
    Ok(())
}

fn render_config(config: &ShellConfig) -> String {
    format!(
        "prompt      = {:?}\nmax_history = {}\ncolor       = {}\nbanner      = {}\n",
        config.prompt, config.max_history, config.color, config.banner
    )
}

fn handle_log(control: &LogLevelControl, args: &[String]) -> anyhow::Result<()> {
    let level = args
        .get(2)
        .ok_or_else(|| anyhow::anyhow!("missing log level"))?;
    control(level)?;
    tracing::info!(%level, "log level changed");
    println!("log level set to {level}");
    Ok(())
}

fn handle_wait(args: &[String]) -> anyhow::Result<()> {
    let seconds: u64 = args
        .get(1)
        .ok_or_else(|| anyhow::anyhow!("missing duration"))?
        .parse()?;
    thread::sleep(Duration::from_secs(seconds));
    println!("waited {seconds}s");
    Ok(())
}
