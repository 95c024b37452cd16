//! Command registry and dispatch.
//!
//! Maps command names to a handler, an optional parameter tree (which
//! supplies both the validator and the argument completer), and a
//! description. The registry is the explicit context object for every
//! completion and validation entry point — there is no process-global
//! shell instance, so multiple shells and tests can coexist.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::complete::Completer;
use crate::error::ValidationError;
use crate::tree::ParamTree;
use crate::validate::Validator;

/// A command handler: explicit argument list in, result out.
///
/// Handlers run synchronously and may block or run long; the
/// [`ExecutionSupervisor`](crate::ExecutionSupervisor) watches for abort
/// while one runs. `Arc` because the supervisor moves a clone onto a
/// worker thread.
pub type CommandHandler = Arc<dyn Fn(&[String]) -> anyhow::Result<()> + Send + Sync>;

/// A registered command: description, handler, and optional tree.
#[derive(Clone)]
pub struct CommandInfo {
    pub description: String,
    pub handler: CommandHandler,
    /// Declared argument structure; `None` for commands that take no
    /// structured arguments (the built-ins).
    pub tree: Option<ParamTree>,
}

impl CommandInfo {
    /// A validator borrowing this entry's tree, if one was declared.
    pub fn validator(&self) -> Option<Validator<'_>> {
        self.tree.as_ref().map(Validator::new)
    }

    /// A completer borrowing this entry's tree, if one was declared.
    pub fn completer(&self) -> Option<Completer<'_>> {
        self.tree.as_ref().map(Completer::new)
    }
}

impl std::fmt::Debug for CommandInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInfo")
            .field("description", &self.description)
            .field("tree", &self.tree.is_some())
            .finish()
    }
}

/// Registry holding all commands, keyed by exact name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandInfo>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command without a parameter tree.
    /// Re-registering a name overwrites the previous entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: CommandHandler,
    ) {
        self.insert(name.into(), description.into(), handler, None);
    }

    /// Register a command whose arguments are governed by `tree`.
    pub fn register_with_tree(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: CommandHandler,
        tree: ParamTree,
    ) {
        self.insert(name.into(), description.into(), handler, Some(tree));
    }

    fn insert(
        &mut self,
        name: String,
        description: String,
        handler: CommandHandler,
        tree: Option<ParamTree>,
    ) {
        if self.commands.contains_key(&name) {
            tracing::debug!(command = %name, "re-registering command, previous entry replaced");
        } else {
            tracing::debug!(command = %name, has_tree = tree.is_some(), "registered command");
        }
        self.commands.insert(
            name,
            CommandInfo {
                description,
                handler,
                tree,
            },
        );
    }

    /// Look up a command by exact name. No abbreviation, no fuzzy match.
    pub fn resolve(&self, name: &str) -> Option<&CommandInfo> {
        self.commands.get(name)
    }

    /// Validate a tokenized command line against the named command's
    /// tree. Commands without a tree accept anything.
    pub fn validate_args(&self, tokens: &[String]) -> Result<(), ValidationError> {
        let Some(name) = tokens.first() else {
            return Ok(());
        };
        match self.resolve(name).and_then(|info| info.tree.as_ref()) {
            Some(tree) => Validator::new(tree).validate(tokens),
            None => Ok(()),
        }
    }

    /// Argument completion entry point: candidates for the argument at
    /// `param_index` of the command named in `tokens[0]`.
    pub fn complete_args(
        &self,
        tokens: &[String],
        param_index: usize,
        current_input: &str,
    ) -> Vec<String> {
        let Some(name) = tokens.first() else {
            return Vec::new();
        };
        match self.resolve(name).and_then(|info| info.tree.as_ref()) {
            Some(tree) => Completer::new(tree).complete(tokens, param_index, current_input),
            None => Vec::new(),
        }
    }

    /// Command-name completion entry point: registered names with the
    /// given prefix, in sorted order.
    pub fn command_completions(&self, prefix: &str) -> Vec<String> {
        self.commands
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Sorted name/description listing for the help command.
    pub fn help_text(&self) -> String {
        let mut output = String::from("\nAvailable Commands:\n");
        output.push_str(&"-".repeat(50));
        output.push('\n');
        for (name, info) in &self.commands {
            output.push_str(&format!("  {name:<15} {}\n", info.description));
        }
        output
    }

    /// Return the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop() -> CommandHandler {
        Arc::new(|_args| Ok(()))
    }

    fn tokens(t: &[&str]) -> Vec<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    fn device_tree() -> ParamTree {
        TreeBuilder::new()
            .root(&["device1", "timeout"])
            .node(&["device1"], &["light", "sound"])
            .numeric(&["timeout"], 1, 600)
            .build()
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = CommandRegistry::new();
        registry.register("status", "Show status", noop());
        assert!(registry.resolve("status").is_some());
        assert!(registry.resolve("statu").is_none());
        assert!(registry.resolve("STATUS").is_none());
    }

    #[test]
    fn test_reregistration_overwrites() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new();
        registry.register("set", "first", noop());

        let c = counter.clone();
        registry.register_with_tree(
            "set",
            "second",
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            device_tree(),
        );

        assert_eq!(registry.len(), 1);
        let info = registry.resolve("set").unwrap();
        assert_eq!(info.description, "second");
        assert!(info.tree.is_some());
        (info.handler)(&tokens(&["set"])).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validate_args_delegates_to_tree() {
        let mut registry = CommandRegistry::new();
        registry.register_with_tree("set", "Set configuration", noop(), device_tree());

        assert!(registry.validate_args(&tokens(&["set", "timeout", "45"])).is_ok());
        let err = registry
            .validate_args(&tokens(&["set", "timeout", "700"]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Number out of range at position 2. Expected: 1 to 600"
        );
    }

    #[test]
    fn test_validate_args_without_tree_accepts_anything() {
        let mut registry = CommandRegistry::new();
        registry.register("help", "Show available commands", noop());
        assert!(registry.validate_args(&tokens(&["help", "junk", "junk"])).is_ok());
    }

    #[test]
    fn test_complete_args_delegates_to_tree() {
        let mut registry = CommandRegistry::new();
        registry.register_with_tree("set", "Set configuration", noop(), device_tree());
        assert_eq!(
            registry.complete_args(&tokens(&["set", "dev"]), 1, "dev"),
            vec!["device1"]
        );
        assert!(registry.complete_args(&tokens(&["help", ""]), 1, "").is_empty());
    }

    #[test]
    fn test_command_completions_prefix_match() {
        let mut registry = CommandRegistry::new();
        for name in ["set", "show", "status", "help"] {
            registry.register(name, "", noop());
        }
        assert_eq!(registry.command_completions("s"), vec!["set", "show", "status"]);
        assert_eq!(registry.command_completions("sh"), vec!["show"]);
        assert!(registry.command_completions("x").is_empty());
    }

    #[test]
    fn test_help_text_lists_sorted_commands() {
        let mut registry = CommandRegistry::new();
        registry.register("zeta", "Last", noop());
        registry.register("alpha", "First", noop());
        let help = registry.help_text();
        let alpha = help.find("alpha").unwrap();
        let zeta = help.find("zeta").unwrap();
        assert!(alpha < zeta);
        assert!(help.contains("First"));
    }

    #[test]
    fn test_two_registries_coexist() {
        let mut a = CommandRegistry::new();
        let mut b = CommandRegistry::new();
        a.register("only-a", "", noop());
        b.register("only-b", "", noop());
        assert!(a.resolve("only-b").is_none());
        assert!(b.resolve("only-a").is_none());
    }
}
