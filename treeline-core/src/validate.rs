//! Argument validation against a parameter tree.
//!
//! The validator walks the tree along the concrete argument list and
//! either accepts or rejects with a positional [`ValidationError`].
//! Positions in messages are 1-based: token 0 is the command name.

use crate::error::ValidationError;
use crate::tree::{ParamNode, ParamTree};

/// A read-only tree walker checking a full argument list.
///
/// Holds a non-owning reference to the tree; the registry entry owns the
/// tree for the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    root: &'a ParamNode,
}

impl<'a> Validator<'a> {
    pub fn new(tree: &'a ParamTree) -> Self {
        Self { root: tree.root() }
    }

    /// Validate `args`, where `args[0]` is the command name and the rest
    /// are positional arguments.
    pub fn validate(&self, args: &[String]) -> Result<(), ValidationError> {
        if args.len() < 2 {
            return Err(ValidationError::MissingArguments);
        }

        let mut current = self.root;
        let mut last_was_leaf = false;

        for (i, value) in args.iter().enumerate().skip(1) {
            last_was_leaf = false;

            if !current.is_enumerated() {
                // Numeric or open position.
                if let Some(range) = current.numeric {
                    let parsed = parse_number(value).ok_or_else(|| {
                        ValidationError::InvalidNumber {
                            value: value.clone(),
                            position: i,
                        }
                    })?;
                    if !range.contains(parsed) {
                        return Err(ValidationError::OutOfRange {
                            position: i,
                            min: range.min,
                            max: range.max,
                        });
                    }
                }
                // An exact-literal child still transitions; otherwise the
                // value is a leaf and the scan stops.
                if let Some(child) = current.children.get(value.as_str()) {
                    current = child;
                    continue;
                }
                last_was_leaf = true;
                break;
            }

            if !current.candidates.iter().any(|c| c == value) {
                return Err(ValidationError::InvalidValue {
                    value: value.clone(),
                    position: i,
                    candidates: current.candidates.clone(),
                });
            }

            match current.children.get(value.as_str()) {
                Some(child) => current = child,
                None => {
                    // Legal value with no declared continuation.
                    last_was_leaf = true;
                    if i + 1 < args.len() {
                        return Err(ValidationError::TooManyArguments {
                            value: value.clone(),
                        });
                    }
                    break;
                }
            }
        }

        if last_was_leaf {
            return Ok(());
        }

        // The scan ran out of arguments mid-tree.
        if current.is_enumerated() {
            return Err(ValidationError::MissingCandidate {
                candidates: current.candidates.clone(),
            });
        }
        if !current.children.is_empty() {
            return Err(ValidationError::MissingBranch {
                keys: current.children.keys().cloned().collect(),
            });
        }
        Ok(())
    }
}

/// Strict integer parse: rejects empty strings, embedded whitespace,
/// trailing non-digit characters, and overflow beyond `i64`.
fn parse_number(value: &str) -> Option<i64> {
    value.parse::<i64>().ok()
}
