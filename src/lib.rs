//! wg-tray - keep exactly one WireGuard interface active from the tray
//!
//! The crate discovers WireGuard interfaces, asks `wg` which one is up, and
//! switches between them with `wg-quick` run through an elevation helper.
//!
//! # Architecture
//!
//! - `config`: Configuration file handling (TOML)
//! - `interfaces`: Interface discovery (config directory or persisted list)
//! - `probe`: Active interface probing (`wg show interfaces`)
//! - `runner`: Lifecycle commands (`wg-quick up|down`)
//! - `engine`: Reconciliation of discovered and active state
//! - `platform`: Privilege elevation
//! - `tray`: System tray indicator

pub mod config;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod platform;
pub mod probe;
pub mod runner;
pub mod tray;

pub use config::Config;
pub use engine::{Engine, InterfaceSet, InterfaceState};
pub use error::ReconcileError;

use platform::Elevator;
use probe::WgShowProber;
use runner::WgQuickRunner;

/// Wire up an [`Engine`] backed by the real system commands
pub fn engine_from_config(config: &Config) -> Engine {
    let elevator = Elevator::new(&config.privilege);
    let probe_elevator = if config.privilege.elevate_probe {
        elevator.clone()
    } else {
        Elevator::none()
    };

    Engine::new(
        interfaces::source_from_config(config),
        Box::new(WgShowProber::new(
            config.wireguard.wg.clone(),
            probe_elevator,
        )),
        Box::new(WgQuickRunner::new(
            config.wireguard.wg_quick.clone(),
            elevator,
        )),
    )
}
