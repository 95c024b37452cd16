//! # Treeline Core
//!
//! Core library for the Treeline interactive command shell.
//! Provides the parameter dependency tree, argument validation and
//! completion, the command registry, the cancellable execution
//! supervisor, and shell configuration.

pub mod complete;
pub mod config;
pub mod error;
pub mod registry;
pub mod supervisor;
pub mod tree;
pub mod validate;

// Re-export commonly used types at the crate root.
pub use complete::{Completer, longest_common_prefix};
pub use config::ShellConfig;
pub use error::{ConfigError, Result, ShellError, ValidationError};
pub use registry::{CommandHandler, CommandInfo, CommandRegistry};
pub use supervisor::{AbortPoll, AbortWatch, ExecOutcome, ExecutionSupervisor};
pub use tree::{NumericConstraint, ParamNode, ParamTree, TreeBuilder};
pub use validate::Validator;
