//! Activity probing via `wg show interfaces`
//!
//! The probe is advisory: if the query fails we report nothing active
//! rather than blocking a menu refresh.

use crate::error::ReconcileError;
use crate::platform::Elevator;
use tracing::{debug, warn};

/// Reports which interface the OS currently has up
pub trait ActivityProber: Send + Sync {
    fn try_current_active(&self) -> Result<Option<String>, ReconcileError>;

    /// Like [`try_current_active`](Self::try_current_active), but a failed
    /// probe is logged and treated as "none"
    fn current_active(&self) -> Option<String> {
        match self.try_current_active() {
            Ok(active) => active,
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}

pub struct WgShowProber {
    program: String,
    elevator: Elevator,
}

impl WgShowProber {
    pub fn new(program: impl Into<String>, elevator: Elevator) -> Self {
        Self {
            program: program.into(),
            elevator,
        }
    }
}

impl ActivityProber for WgShowProber {
    fn try_current_active(&self) -> Result<Option<String>, ReconcileError> {
        let output = self
            .elevator
            .command(&self.program, ["show", "interfaces"])
            .output()
            .map_err(|e| ReconcileError::ProbeUnavailable(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReconcileError::ProbeUnavailable(stderr.trim().to_string()));
        }

        Ok(parse_active(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse `wg show interfaces` output into the active interface
///
/// Output is whitespace-delimited; empty means none. Only one interface is
/// expected, so extra names are logged and ignored: they are not marked
/// active, and a later switch-over will not bring them down.
pub fn parse_active(output: &str) -> Option<String> {
    let mut names = output.split_whitespace();
    let first = names.next()?;

    let extra: Vec<&str> = names.collect();
    if !extra.is_empty() {
        warn!(
            "Several interfaces are up ({} {}), treating {} as active",
            first,
            extra.join(" "),
            first
        );
    }

    debug!("Probed active interface: {}", first);
    Some(first.to_string())
}
