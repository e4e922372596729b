//! `wg-quick` backed command runner

use super::{CommandOutcome, CommandRunner, Verb};
use crate::platform::Elevator;
use std::process::Output;
use tracing::{info, warn};

pub struct WgQuickRunner {
    program: String,
    elevator: Elevator,
}

impl WgQuickRunner {
    pub fn new(program: impl Into<String>, elevator: Elevator) -> Self {
        Self {
            program: program.into(),
            elevator,
        }
    }
}

impl CommandRunner for WgQuickRunner {
    fn run(&self, verb: Verb, interface: &str) -> CommandOutcome {
        info!("Running {} {} {}", self.program, verb, interface);

        let output = self
            .elevator
            .command(&self.program, [verb.as_str(), interface])
            .output();

        match output {
            Ok(output) => outcome_from_output(&output),
            Err(e) => {
                warn!("Failed to spawn {}: {}", self.program, e);
                CommandOutcome::failed(e.to_string())
            }
        }
    }
}

fn outcome_from_output(output: &Output) -> CommandOutcome {
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        info!("{}", line);
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if output.status.success() {
        // wg-quick reports progress on stderr even when it succeeds
        for line in stderr.lines() {
            info!("{}", line);
        }
        return CommandOutcome::ok();
    }

    for line in stderr.lines() {
        warn!("{}", line);
    }
    let detail = if stderr.is_empty() {
        output.status.to_string()
    } else {
        stderr
    };
    CommandOutcome::failed(detail)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    fn output(code: i32, stderr: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(code << 8),
            stdout: b"[#] ip link add wg0 type wireguard\n".to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_success_output() {
        assert_eq!(outcome_from_output(&output(0, "")), CommandOutcome::ok());
    }

    #[test]
    fn test_failure_keeps_stderr() {
        let outcome = outcome_from_output(&output(1, "wg-quick: `wg0' already exists\n"));
        assert!(!outcome.success);
        assert_eq!(
            outcome.diagnostic.as_deref(),
            Some("wg-quick: `wg0' already exists")
        );
    }

    #[test]
    fn test_failure_without_stderr_reports_status() {
        let outcome = outcome_from_output(&output(126, ""));
        assert!(!outcome.success);
        assert!(outcome.diagnostic.unwrap().contains("126"));
    }

    #[test]
    fn test_missing_program_fails() {
        let runner = WgQuickRunner::new("/nonexistent/wg-quick", Elevator::none());
        let outcome = runner.run(Verb::Up, "wg0");
        assert!(!outcome.success);
        assert!(outcome.diagnostic.is_some());
    }
}
