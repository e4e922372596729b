//! Interface-state reconciliation engine
//!
//! The engine owns the current [`InterfaceSet`]. `refresh()` rebuilds it from
//! discovery and the activity probe, overwriting whatever we believed before.
//! Activation requests run lifecycle commands and update the set from their
//! outcomes:
//!
//! 1. Bring down every other interface marked active. A failed `down` leaves
//!    that interface marked active but does not stop the request.
//! 2. Bring up the target.
//!
//! All operations take the same lock, so requests are processed one at a
//! time in arrival order and never interleave with a refresh. Each change of
//! the set is published to subscribers.

pub mod model;

pub use model::{
    reconcile, ActivationRequest, DesiredState, Interface, InterfaceSet, InterfaceState,
    RequestOutcome,
};

use crate::error::ReconcileError;
use crate::interfaces::InterfaceSource;
use crate::probe::ActivityProber;
use crate::runner::{CommandRunner, Verb};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct Engine {
    source: Box<dyn InterfaceSource>,
    prober: Box<dyn ActivityProber>,
    runner: Box<dyn CommandRunner>,
    current: Mutex<InterfaceSet>,
    updates: watch::Sender<InterfaceSet>,
}

impl Engine {
    pub fn new(
        source: Box<dyn InterfaceSource>,
        prober: Box<dyn ActivityProber>,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        let (updates, _) = watch::channel(InterfaceSet::default());
        Self {
            source,
            prober,
            runner,
            current: Mutex::new(InterfaceSet::default()),
            updates,
        }
    }

    /// Last snapshot, without querying the OS
    pub fn snapshot(&self) -> InterfaceSet {
        self.lock().clone()
    }

    /// Receive every snapshot the engine publishes
    pub fn subscribe(&self) -> watch::Receiver<InterfaceSet> {
        self.updates.subscribe()
    }

    /// Rebuild the snapshot from discovery and the activity probe
    pub fn refresh(&self) -> InterfaceSet {
        let mut current = self.lock();

        let discovered = self.source.list();
        let active = self.prober.current_active();
        let set = reconcile(&discovered, active.as_deref());

        if *current != set {
            debug!(
                "Refreshed: {} interface(s), active: {}",
                set.len(),
                active.as_deref().unwrap_or("none")
            );
        }
        *current = set;
        self.publish(&current);
        current.clone()
    }

    pub fn handle(&self, request: &ActivationRequest) -> RequestOutcome {
        match request.desired {
            DesiredState::Activate => self.request_activate(&request.target),
            DesiredState::Deactivate => self.request_deactivate(&request.target),
        }
    }

    /// Make `target` the active interface, bringing others down first
    pub fn request_activate(&self, target: &str) -> RequestOutcome {
        let mut current = self.lock();
        let mut failures = Vec::new();

        match current.state(target) {
            None => {
                warn!("Activation requested for unknown interface {}", target);
                failures.push(ReconcileError::UnknownInterface(target.to_string()));
                return outcome(&current, failures);
            }
            Some(InterfaceState::Active) => {
                debug!("{} is already active", target);
                return outcome(&current, failures);
            }
            Some(_) => {}
        }

        let conflicting: Vec<String> = current
            .active()
            .filter(|name| *name != target)
            .map(str::to_string)
            .collect();

        for other in &conflicting {
            current.set(other, InterfaceState::Deactivating);
            self.publish(&current);

            match self.transition(Verb::Down, other) {
                Ok(()) => current.set(other, InterfaceState::Inactive),
                Err(e) => {
                    current.set(other, InterfaceState::Active);
                    failures.push(e);
                }
            }
        }

        current.set(target, InterfaceState::Activating);
        self.publish(&current);

        match self.transition(Verb::Up, target) {
            Ok(()) => {
                current.set(target, InterfaceState::Active);
                info!("{} is now active", target);
            }
            Err(e) => {
                current.set(target, InterfaceState::Inactive);
                failures.push(e);
            }
        }

        self.publish(&current);
        outcome(&current, failures)
    }

    /// Bring `target` down
    pub fn request_deactivate(&self, target: &str) -> RequestOutcome {
        let mut current = self.lock();
        let mut failures = Vec::new();

        match current.state(target) {
            None => {
                warn!("Deactivation requested for unknown interface {}", target);
                failures.push(ReconcileError::UnknownInterface(target.to_string()));
                return outcome(&current, failures);
            }
            Some(InterfaceState::Inactive) => {
                debug!("{} is already inactive", target);
                return outcome(&current, failures);
            }
            Some(_) => {}
        }

        current.set(target, InterfaceState::Deactivating);
        self.publish(&current);

        match self.transition(Verb::Down, target) {
            Ok(()) => {
                current.set(target, InterfaceState::Inactive);
                info!("{} is now inactive", target);
            }
            Err(e) => {
                current.set(target, InterfaceState::Active);
                failures.push(e);
            }
        }

        self.publish(&current);
        outcome(&current, failures)
    }

    fn transition(&self, verb: Verb, interface: &str) -> Result<(), ReconcileError> {
        let result = self.runner.run(verb, interface);
        if result.success {
            return Ok(());
        }

        let err = ReconcileError::CommandFailed {
            verb,
            interface: interface.to_string(),
            detail: result
                .diagnostic
                .unwrap_or_else(|| "unknown error".to_string()),
        };
        warn!("{}", err);
        Err(err)
    }

    fn publish(&self, set: &InterfaceSet) {
        self.updates.send_replace(set.clone());
    }

    fn lock(&self) -> MutexGuard<'_, InterfaceSet> {
        // A panic mid-request leaves a stale but well-formed set; the next
        // refresh corrects it.
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn outcome(set: &InterfaceSet, failures: Vec<ReconcileError>) -> RequestOutcome {
    RequestOutcome {
        snapshot: set.clone(),
        failures,
    }
}
