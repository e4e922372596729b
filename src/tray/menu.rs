//! Tray menu model
//!
//! The menu is rebuilt from each snapshot. Entries are either command items
//! or interface toggles; the kind is carried by the menu id.

use crate::engine::{ActivationRequest, InterfaceSet};

const COMMAND_PREFIX: &str = "cmd:";
const INTERFACE_PREFIX: &str = "intf:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    /// Capture the config directory listing with elevation
    Scan,
    Refresh,
    Quit,
}

impl TrayCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TrayCommand::Scan => "scan",
            TrayCommand::Refresh => "refresh",
            TrayCommand::Quit => "quit",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "scan" => Some(TrayCommand::Scan),
            "refresh" => Some(TrayCommand::Refresh),
            "quit" => Some(TrayCommand::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Command {
        command: TrayCommand,
        label: String,
    },
    Interface {
        name: String,
        checked: bool,
        /// False while an up/down for this interface is in flight
        enabled: bool,
    },
    Separator,
}

impl MenuEntry {
    pub fn id(&self) -> Option<String> {
        match self {
            MenuEntry::Command { command, .. } => {
                Some(format!("{}{}", COMMAND_PREFIX, command.name()))
            }
            MenuEntry::Interface { name, .. } => Some(format!("{}{}", INTERFACE_PREFIX, name)),
            MenuEntry::Separator => None,
        }
    }
}

/// A clicked menu item, recovered from its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSelection {
    Command(TrayCommand),
    Interface(String),
}

impl MenuSelection {
    pub fn parse(id: &str) -> Option<Self> {
        if let Some(name) = id.strip_prefix(COMMAND_PREFIX) {
            return TrayCommand::from_name(name).map(MenuSelection::Command);
        }
        id.strip_prefix(INTERFACE_PREFIX)
            .filter(|name| !name.is_empty())
            .map(|name| MenuSelection::Interface(name.to_string()))
    }
}

/// Menu entries for a snapshot
///
/// `scan_label` adds the capture command at the top when the persisted list
/// can be used.
pub fn build_menu(set: &InterfaceSet, scan_label: Option<&str>) -> Vec<MenuEntry> {
    let mut entries = Vec::with_capacity(set.len() + 5);

    if let Some(label) = scan_label {
        entries.push(MenuEntry::Command {
            command: TrayCommand::Scan,
            label: label.to_string(),
        });
        entries.push(MenuEntry::Separator);
    }

    for (name, state) in set.iter() {
        entries.push(MenuEntry::Interface {
            name: name.to_string(),
            checked: state.is_active(),
            enabled: !state.is_transitioning(),
        });
    }
    if !set.is_empty() {
        entries.push(MenuEntry::Separator);
    }

    entries.push(MenuEntry::Command {
        command: TrayCommand::Refresh,
        label: "Refresh".to_string(),
    });
    entries.push(MenuEntry::Command {
        command: TrayCommand::Quit,
        label: "Quit".to_string(),
    });
    entries
}

/// Request for a click on an interface toggle, given the engine's state
pub fn toggle_request(set: &InterfaceSet, name: &str) -> ActivationRequest {
    if set.is_active(name) {
        ActivationRequest::deactivate(name)
    } else {
        ActivationRequest::activate(name)
    }
}

/// Tooltip text for a snapshot
pub fn tooltip(set: &InterfaceSet) -> String {
    let active: Vec<&str> = set.active().collect();
    if active.is_empty() {
        "WireGuard: no active interface".to_string()
    } else {
        format!("WireGuard: {}", active.join(", "))
    }
}
