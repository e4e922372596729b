//! Reconciled interface state

use crate::error::ReconcileError;
use std::collections::BTreeMap;
use std::fmt;

/// Per-interface state as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceState {
    Inactive,
    Activating,
    Active,
    Deactivating,
}

impl InterfaceState {
    pub fn is_active(&self) -> bool {
        matches!(self, InterfaceState::Active)
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            InterfaceState::Activating | InterfaceState::Deactivating
        )
    }
}

impl fmt::Display for InterfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InterfaceState::Inactive => "inactive",
            InterfaceState::Activating => "activating",
            InterfaceState::Active => "active",
            InterfaceState::Deactivating => "deactivating",
        };
        f.write_str(s)
    }
}

/// One row of a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub active: bool,
}

/// Snapshot of all known interfaces, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceSet {
    entries: BTreeMap<String, InterfaceState>,
}

impl InterfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn state(&self, name: &str) -> Option<InterfaceState> {
        self.entries.get(name).copied()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.state(name).is_some_and(|s| s.is_active())
    }

    /// Names currently marked active. Normally at most one, but a failed
    /// switch-over can leave two until the next refresh.
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, state)| state.is_active())
            .map(|(name, _)| name.as_str())
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, InterfaceState)> {
        self.entries.iter().map(|(name, state)| (name.as_str(), *state))
    }

    pub fn interfaces(&self) -> Vec<Interface> {
        self.iter()
            .map(|(name, state)| Interface {
                name: name.to_string(),
                active: state.is_active(),
            })
            .collect()
    }

    pub(crate) fn set(&mut self, name: &str, state: InterfaceState) {
        if let Some(entry) = self.entries.get_mut(name) {
            *entry = state;
        }
    }
}

/// Build a snapshot from discovered names and the probed active name
///
/// Exactly the probed name is marked active, and only if it was discovered.
pub fn reconcile(discovered: &[String], active_probe: Option<&str>) -> InterfaceSet {
    let entries = discovered
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| {
            let state = if Some(name.as_str()) == active_probe {
                InterfaceState::Active
            } else {
                InterfaceState::Inactive
            };
            (name.clone(), state)
        })
        .collect();
    InterfaceSet { entries }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    Activate,
    Deactivate,
}

/// A user's request to change one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    pub target: String,
    pub desired: DesiredState,
}

impl ActivationRequest {
    pub fn activate(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            desired: DesiredState::Activate,
        }
    }

    pub fn deactivate(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            desired: DesiredState::Deactivate,
        }
    }
}

/// What a request left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub snapshot: InterfaceSet,
    /// Failed transitions, in the order they happened
    pub failures: Vec<ReconcileError>,
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
