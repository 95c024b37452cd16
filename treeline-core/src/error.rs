//! Error types for the Treeline shell core.
//!
//! Uses `thiserror` for public API error types. Validation errors carry
//! structured position/value data and render the exact messages shown to
//! the user, so callers can either match on variants or display them
//! verbatim.

/// Top-level error type for the Treeline core library.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Unknown command: {name}. Type 'help' for available commands.")]
    UnknownCommand { name: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Error: {message}")]
    Handler { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Positional argument validation failures.
///
/// Positions are 1-based indices into the token list, where token 0 is
/// the command name itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing arguments")]
    MissingArguments,

    #[error("Invalid value '{value}' at position {position}. Valid values: {}", .candidates.join(", "))]
    InvalidValue {
        value: String,
        position: usize,
        candidates: Vec<String>,
    },

    #[error("Invalid number '{value}' at position {position}")]
    InvalidNumber { value: String, position: usize },

    #[error("Number out of range at position {position}. Expected: {min} to {max}")]
    OutOfRange { position: usize, min: i64, max: i64 },

    #[error("Too many arguments after '{value}'")]
    TooManyArguments { value: String },

    #[error("Missing argument. Expected one of: {}", .candidates.join(", "))]
    MissingCandidate { candidates: Vec<String> },

    #[error("Missing argument. Expected: {}", .keys.join(", "))]
    MissingBranch { keys: Vec<String> },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration parse error: {0}")]
    Parse(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Parse(Box::new(err))
    }
}

/// A type alias for results using the top-level `ShellError`.
pub type Result<T> = std::result::Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_display() {
        let err = ShellError::UnknownCommand {
            name: "frobnicate".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown command: frobnicate. Type 'help' for available commands."
        );
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ValidationError::InvalidValue {
            value: "9".into(),
            position: 3,
            candidates: vec!["0".into(), "1".into(), "2".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid value '9' at position 3. Valid values: 0, 1, 2"
        );
    }

    #[test]
    fn test_out_of_range_display() {
        let err = ValidationError::OutOfRange {
            position: 2,
            min: 1,
            max: 600,
        };
        assert_eq!(
            err.to_string(),
            "Number out of range at position 2. Expected: 1 to 600"
        );
    }

    #[test]
    fn test_invalid_number_display() {
        let err = ValidationError::InvalidNumber {
            value: "12x".into(),
            position: 1,
        };
        assert_eq!(err.to_string(), "Invalid number '12x' at position 1");
    }

    #[test]
    fn test_missing_variants_display() {
        let err = ValidationError::MissingCandidate {
            candidates: vec!["light".into(), "sound".into()],
        };
        assert_eq!(
            err.to_string(),
            "Missing argument. Expected one of: light, sound"
        );

        let err = ValidationError::MissingBranch {
            keys: vec!["device1".into(), "timeout".into()],
        };
        assert_eq!(err.to_string(), "Missing argument. Expected: device1, timeout");
    }

    #[test]
    fn test_validation_error_converts_to_shell_error() {
        let err: ShellError = ValidationError::MissingArguments.into();
        assert_eq!(err.to_string(), "Missing arguments");
    }

    #[test]
    fn test_handler_error_display() {
        let err = ShellError::Handler {
            message: "device not reachable".into(),
        };
        assert_eq!(err.to_string(), "Error: device not reachable");
    }
}
