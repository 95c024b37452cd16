//! Interactive shell loop and single-shot dispatch.
//!
//! Glues the line editor, registry, and execution supervisor together:
//! read a line, tokenize, resolve, validate, then run the handler under
//! abort watching. Per-command errors are reported and the loop
//! continues; only `exit`/`quit`, end-of-input, or a cancel during
//! execution ends the process.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use treeline_core::{
    AbortWatch, CommandRegistry, ExecOutcome, ExecutionSupervisor, ShellConfig, ShellError,
};

use crate::commands;
use crate::input::LineEditor;
use crate::watch::{StdinWatch, suppress_interactive_signals};

pub struct Shell {
    registry: CommandRegistry,
    supervisor: ExecutionSupervisor,
    config: ShellConfig,
    workspace: PathBuf,
    running: Arc<AtomicBool>,
}

impl Shell {
    pub fn new(
        config: ShellConfig,
        workspace: PathBuf,
        log_control: commands::LogLevelControl,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let mut registry = CommandRegistry::new();

        register_builtins(&mut registry, &running);
        commands::register_all(&mut registry, &config, log_control);

        // Re-register help with the final listing snapshot, so it covers
        // every command registered above (last write wins).
        let listing = registry.help_text();
        let help_handler: treeline_core::CommandHandler = Arc::new(move |_args| {
            println!("{listing}");
            Ok(())
        });
        registry.register("help", "Show available commands", help_handler);

        Self {
            registry,
            supervisor: ExecutionSupervisor::new(),
            config,
            workspace,
            running,
        }
    }

    /// Interactive mode: prompt, read, dispatch, repeat.
    pub fn run_interactive(&mut self) -> anyhow::Result<()> {
        suppress_interactive_signals();
        if self.config.banner {
            self.print_banner();
        }

        let mut editor = LineEditor::new(&self.workspace, &self.config);

        while self.running.load(Ordering::SeqCst) {
            let line = match editor.read_line(&self.registry)? {
                Some(line) => line,
                None => {
                    // Ctrl-D at the prompt
                    self.print_goodbye();
                    break;
                }
            };
            if line.is_empty() {
                continue;
            }

            let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            match self.try_execute(&tokens, Some(&mut StdinWatch)) {
                Ok(ExecOutcome::Completed) => {}
                Ok(ExecOutcome::Failed(message)) => {
                    self.report(&ShellError::Handler { message });
                }
                Ok(ExecOutcome::Cancelled) => {
                    // Fast exit: no cleanup, no joining the handler.
                    self.print_goodbye();
                    std::process::exit(0);
                }
                Err(err) => self.report(&err),
            }
        }
        Ok(())
    }

    /// Single-shot mode: one command, no abort watching, exit code 0
    /// even on failure (errors go to the user, not the exit status).
    pub fn run_single_command(&mut self, tokens: &[String]) {
        match self.try_execute(tokens, None) {
            Ok(ExecOutcome::Completed) => {}
            Ok(ExecOutcome::Failed(message)) => self.report(&ShellError::Handler { message }),
            Ok(ExecOutcome::Cancelled) => {}
            Err(err) => self.report(&err),
        }
    }

    /// Resolve, validate, and run one tokenized command line.
    ///
    /// With a watch, the handler runs supervised on a worker thread;
    /// without one it runs synchronously to completion.
    fn try_execute(
        &mut self,
        tokens: &[String],
        watch: Option<&mut dyn AbortWatch>,
    ) -> Result<ExecOutcome, ShellError> {
        let Some(name) = tokens.first() else {
            return Ok(ExecOutcome::Completed);
        };
        let Some(info) = self.registry.resolve(name) else {
            return Err(ShellError::UnknownCommand { name: name.clone() });
        };

        self.registry.validate_args(tokens)?;

        tracing::info!(command = %name, args = tokens.len() - 1, "executing");
        let outcome = match watch {
            Some(watch) => self.supervisor.run_watched(&info.handler, tokens, watch),
            None => self.supervisor.run_blocking(&info.handler, tokens),
        };
        Ok(outcome)
    }

    fn report(&self, err: &ShellError) {
        if self.config.color {
            println!("\x1b[31m{err}\x1b[0m");
        } else {
            println!("{err}");
        }
    }

    fn print_banner(&self) {
        if self.config.color {
            print!("\x1b[36m\x1b[1m");
        }
        println!();
        println!("    ╔════════════════════════════════════════╗");
        println!("    ║   Treeline Shell v{:<21}║", env!("CARGO_PKG_VERSION"));
        println!("    ║   Type 'help' for available commands   ║");
        println!("    ╚════════════════════════════════════════╝");
        if self.config.color {
            print!("\x1b[0m");
        }
        println!();
    }

    fn print_goodbye(&self) {
        if self.config.color {
            println!("\x1b[36mGoodbye!\x1b[0m");
        } else {
            println!("Goodbye!");
        }
    }

    #[cfg(test)]
    fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
}

/// Built-in commands: plain registry entries with no parameter tree.
fn register_builtins(registry: &mut CommandRegistry, running: &Arc<AtomicBool>) {
    // Placeholder; replaced with the full listing once all commands
    // are registered.
    let placeholder: treeline_core::CommandHandler = Arc::new(|_args| Ok(()));
    registry.register("help", "Show available commands", placeholder);

    let exit_flag = running.clone();
    let exit_handler: treeline_core::CommandHandler = Arc::new(move |_args| {
        exit_flag.store(false, Ordering::SeqCst);
        Ok(())
    });
    registry.register("exit", "Exit the shell", exit_handler.clone());
    registry.register("quit", "Exit the shell (alias for exit)", exit_handler);

    let clear_handler: treeline_core::CommandHandler = Arc::new(|_args| {
        use std::io::Write;
        print!("\x1b[2J\x1b[H");
        std::io::stdout().flush()?;
        Ok(())
    });
    registry.register("clear", "Clear the screen", clear_handler);
}
