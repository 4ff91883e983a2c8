//! Errors reported by action handlers and configuration.

use std::fmt;

/// Why a drop, move or push cannot happen.
///
/// Handlers never propagate these: the message goes to the scroll and the
/// action ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    NotPossible,
    Blocked,
    OutOfRange,
    /// A lookup found no tile where one was expected.
    NoTile,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPossible | Self::NoTile => write!(f, "Not possible"),
            Self::Blocked => write!(f, "Blocked"),
            Self::OutOfRange => write!(f, "Out of range"),
        }
    }
}

impl std::error::Error for ActionError {}

/// Errors from applying a configuration setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownKey(String),
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "unknown config key '{key}'"),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value '{value}' for '{key}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tile_reads_as_not_possible() {
        assert_eq!(ActionError::NoTile.to_string(), "Not possible");
        assert_eq!(ActionError::Blocked.to_string(), "Blocked");
        assert_eq!(ActionError::OutOfRange.to_string(), "Out of range");
    }

    #[test]
    fn test_config_error_display() {
        let e = ConfigError::InvalidValue {
            key: "config/general/lighting".into(),
            value: "bright".into(),
        };
        assert_eq!(e.to_string(), "invalid value 'bright' for 'config/general/lighting'");
    }
}
