//! Lifecycle command execution
//!
//! The engine only needs to know whether `up`/`down` succeeded. Captured
//! output is kept for logging and for the failure notification.

pub mod wg_quick;

pub use wg_quick::WgQuickRunner;

use std::fmt;

/// Lifecycle verb passed to the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Up,
    Down,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Up => "up",
            Verb::Down => "down",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one lifecycle command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    /// Captured stderr, or the spawn error
    pub diagnostic: Option<String>,
}

impl CommandOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            diagnostic: None,
        }
    }

    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// Runs privileged up/down commands for a named interface
///
/// Calls block until the external process has finished.
pub trait CommandRunner: Send + Sync {
    fn run(&self, verb: Verb, interface: &str) -> CommandOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_display() {
        assert_eq!(Verb::Up.to_string(), "up");
        assert_eq!(Verb::Down.to_string(), "down");
    }

    #[test]
    fn test_outcome_constructors() {
        assert!(CommandOutcome::ok().success);
        let failed = CommandOutcome::failed("permission denied");
        assert!(!failed.success);
        assert_eq!(failed.diagnostic.as_deref(), Some("permission denied"));
    }
}
