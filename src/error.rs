//! Error kinds produced while reconciling interface state
//!
//! None of these are fatal. Discovery and probe failures degrade to an empty
//! interface list and "nothing active"; command failures are reported back to
//! the caller so the tray can revert a toggle.

use crate::runner::Verb;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Interface discovery unavailable: {0}")]
    DiscoveryUnavailable(String),
    #[error("Activity probe unavailable: {0}")]
    ProbeUnavailable(String),
    #[error("wg-quick {verb} {interface} failed: {detail}")]
    CommandFailed {
        verb: Verb,
        interface: String,
        detail: String,
    },
    #[error("Unknown interface: {0}")]
    UnknownInterface(String),
}

impl ReconcileError {
    /// Interface the error refers to, if any
    pub fn interface(&self) -> Option<&str> {
        match self {
            ReconcileError::CommandFailed { interface, .. } => Some(interface),
            ReconcileError::UnknownInterface(name) => Some(name),
            _ => None,
        }
    }
}
