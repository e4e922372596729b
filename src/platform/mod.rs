//! Privileged command construction
//!
//! `wg-quick` and reading `/etc/wireguard` need root. When we are not root
//! the command is prefixed with the configured elevation helper (pkexec by
//! default), which shows its own authentication prompt.

use crate::config::PrivilegeConfig;
use std::process::Command;
use tracing::debug;

/// Builds commands that may need elevation
#[derive(Debug, Clone)]
pub struct Elevator {
    helper: Option<String>,
}

impl Elevator {
    pub fn new(config: &PrivilegeConfig) -> Self {
        let helper = config.elevate_with.trim();
        let helper = if helper.is_empty() || is_root() {
            None
        } else {
            Some(helper.to_string())
        };
        Self { helper }
    }

    /// An elevator that never prefixes anything
    pub fn none() -> Self {
        Self { helper: None }
    }

    /// Build `program args...`, prefixed with the helper when one is configured
    pub fn command<I, S>(&self, program: &str, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut command = match &self.helper {
            Some(helper) => {
                let mut c = Command::new(helper);
                c.arg(program);
                c
            }
            None => Command::new(program),
        };
        command.args(args);
        debug!("Built command: {:?}", command);
        command
    }
}

/// Whether the current process already runs with root privileges
#[cfg(unix)]
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program_and_args(command: &Command) -> (String, Vec<String>) {
        (
            command.get_program().to_string_lossy().to_string(),
            command
                .get_args()
                .map(|a| a.to_string_lossy().to_string())
                .collect(),
        )
    }

    #[test]
    fn test_elevated_command_prefix() {
        let elevator = Elevator {
            helper: Some("pkexec".to_string()),
        };
        let command = elevator.command("wg-quick", ["up", "wg0"]);
        let (program, args) = program_and_args(&command);
        assert_eq!(program, "pkexec");
        assert_eq!(args, vec!["wg-quick", "up", "wg0"]);
    }

    #[test]
    fn test_plain_command() {
        let command = Elevator::none().command("wg", ["show", "interfaces"]);
        let (program, args) = program_and_args(&command);
        assert_eq!(program, "wg");
        assert_eq!(args, vec!["show", "interfaces"]);
    }

    #[test]
    fn test_empty_helper_disables_elevation() {
        let config = PrivilegeConfig {
            elevate_with: "  ".to_string(),
            elevate_probe: false,
        };
        let command = Elevator::new(&config).command("wg-quick", ["down", "wg0"]);
        let (program, args) = program_and_args(&command);
        assert_eq!(program, "wg-quick");
        assert_eq!(args, vec!["down", "wg0"]);
    }
}
