//! System tray indicator
//!
//! The tao event loop owns the tray icon on the main thread. Clicks become
//! jobs on a queue drained by a single worker, which drives the [`Engine`].
//! Snapshots published by the engine flow back to the event loop and
//! re-render the menu and icon.

pub mod icon;
pub mod menu;

pub use menu::{build_menu, MenuEntry, MenuSelection, TrayCommand};

use crate::engine::{Engine, InterfaceSet};
use crate::error::ReconcileError;
use crate::interfaces::capture::{capture_listing, CaptureError};
use crate::interfaces::InterfaceStore;
use crate::platform::Elevator;
use std::path::PathBuf;
use std::sync::Arc;
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use tray_icon::menu::{CheckMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};

#[derive(Error, Debug)]
pub enum TrayError {
    #[error("Failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("Failed to create tray icon: {0}")]
    Build(#[from] tray_icon::Error),
    #[error("Failed to build menu: {0}")]
    Menu(#[from] tray_icon::menu::Error),
    #[error("Invalid icon: {0}")]
    Icon(#[from] tray_icon::BadIcon),
}

/// Where the scan command reads from and saves to
#[derive(Debug, Clone)]
pub struct ScanTarget {
    pub elevator: Elevator,
    pub dir: PathBuf,
    pub suffix: String,
    pub store: InterfaceStore,
}

impl ScanTarget {
    fn label(&self) -> String {
        format!("Scan {}", self.dir.display())
    }

    fn run(&self) -> Result<Vec<String>, CaptureError> {
        capture_listing(&self.elevator, &self.dir, &self.suffix, &self.store)
    }
}

#[derive(Debug)]
enum UserEvent {
    Menu(MenuEvent),
    Tray(TrayIconEvent),
    Snapshot(InterfaceSet),
    Failed(Vec<Failure>),
}

/// A failed job, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
struct Failure {
    title: String,
    message: String,
}

impl Failure {
    fn new(interface: Option<&str>, message: String) -> Self {
        let title = match interface {
            Some(name) => format!("WireGuard: {}", name),
            None => "WireGuard".to_string(),
        };
        Self { title, message }
    }
}

impl From<&ReconcileError> for Failure {
    fn from(err: &ReconcileError) -> Self {
        Failure::new(err.interface(), err.to_string())
    }
}

#[derive(Debug)]
enum Job {
    Refresh,
    Scan,
    Toggle(String),
}

/// Run the tray until the user quits. Does not return on success.
pub fn run(engine: Arc<Engine>, scan: Option<ScanTarget>) -> Result<(), TrayError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let menu_proxy = proxy.clone();
    MenuEvent::set_event_handler(Some(move |event| {
        let _ = menu_proxy.send_event(UserEvent::Menu(event));
    }));
    let tray_proxy = proxy.clone();
    TrayIconEvent::set_event_handler(Some(move |event| {
        let _ = tray_proxy.send_event(UserEvent::Tray(event));
    }));

    let (jobs, job_rx) = mpsc::unbounded_channel();
    // Subscribe before any job runs so the first refresh is not missed
    runtime.spawn(forward_snapshots(engine.subscribe(), proxy.clone()));
    runtime.spawn(process_jobs(engine, scan.clone(), job_rx, proxy));

    let scan_label = scan.as_ref().map(ScanTarget::label);
    let mut tray: Option<TrayIcon> = None;
    let mut shown_active: Option<bool> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        // Moved in so the worker tasks live as long as the event loop
        let _runtime = &runtime;

        match event {
            Event::NewEvents(StartCause::Init) => {
                match create_tray(&InterfaceSet::new(), scan_label.as_deref()) {
                    Ok(icon) => tray = Some(icon),
                    Err(e) => {
                        error!("{}", e);
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                }
                queue(&jobs, Job::Refresh);
            }
            Event::UserEvent(UserEvent::Snapshot(set)) => {
                if let Some(tray) = &tray {
                    if let Err(e) = render(tray, &set, scan_label.as_deref(), &mut shown_active) {
                        warn!("Failed to update tray: {}", e);
                    }
                }
            }
            Event::UserEvent(UserEvent::Menu(event)) => match MenuSelection::parse(&event.id.0) {
                Some(MenuSelection::Command(TrayCommand::Quit)) => {
                    info!("Quitting");
                    tray.take();
                    *control_flow = ControlFlow::Exit;
                }
                Some(MenuSelection::Command(TrayCommand::Refresh)) => {
                    queue(&jobs, Job::Refresh);
                }
                Some(MenuSelection::Command(TrayCommand::Scan)) => {
                    queue(&jobs, Job::Scan);
                }
                Some(MenuSelection::Interface(name)) => {
                    queue(&jobs, Job::Toggle(name));
                }
                None => debug!("Ignoring menu event {:?}", event.id),
            },
            Event::UserEvent(UserEvent::Tray(TrayIconEvent::Click { button_state, .. })) => {
                if refreshes_on_click(button_state) {
                    queue(&jobs, Job::Refresh);
                }
            }
            Event::UserEvent(UserEvent::Failed(failures)) => {
                for failure in failures {
                    notify_failure(&failure);
                }
            }
            _ => {}
        }
    })
}

/// Push a job for the worker, returning false if the worker is gone
fn queue(jobs: &mpsc::UnboundedSender<Job>, job: Job) -> bool {
    match jobs.send(job) {
        Ok(()) => true,
        Err(e) => {
            warn!("Tray worker stopped, dropping {:?}", e.0);
            false
        }
    }
}

/// Clicks report both press and release; refresh once, on release.
/// Linux trays never report clicks, so there the Refresh item is the only way.
fn refreshes_on_click(button_state: MouseButtonState) -> bool {
    matches!(button_state, MouseButtonState::Up)
}

/// Drain jobs one at a time so user requests are queued, not dropped
async fn process_jobs(
    engine: Arc<Engine>,
    scan: Option<ScanTarget>,
    mut jobs: mpsc::UnboundedReceiver<Job>,
    proxy: EventLoopProxy<UserEvent>,
) {
    while let Some(job) = jobs.recv().await {
        let engine = Arc::clone(&engine);
        let scan = scan.clone();
        let result =
            tokio::task::spawn_blocking(move || run_job(&engine, scan.as_ref(), job)).await;

        match result {
            Ok(failures) if !failures.is_empty() => {
                if proxy.send_event(UserEvent::Failed(failures)).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => error!("Tray job panicked: {}", e),
        }
    }
}

/// Run one job, returning what failed
fn run_job(engine: &Engine, scan: Option<&ScanTarget>, job: Job) -> Vec<Failure> {
    match job {
        Job::Refresh => {
            engine.refresh();
            Vec::new()
        }
        Job::Scan => {
            let failures = match scan.map(ScanTarget::run) {
                Some(Err(e)) => {
                    warn!("{}", e);
                    vec![Failure::new(None, e.to_string())]
                }
                _ => Vec::new(),
            };
            engine.refresh();
            failures
        }
        Job::Toggle(name) => {
            let request = menu::toggle_request(&engine.snapshot(), &name);
            engine
                .handle(&request)
                .failures
                .iter()
                .map(Failure::from)
                .collect()
        }
    }
}

async fn forward_snapshots(
    mut updates: watch::Receiver<InterfaceSet>,
    proxy: EventLoopProxy<UserEvent>,
) {
    while updates.changed().await.is_ok() {
        let set = updates.borrow_and_update().clone();
        if proxy.send_event(UserEvent::Snapshot(set)).is_err() {
            break;
        }
    }
}

fn create_tray(set: &InterfaceSet, scan_label: Option<&str>) -> Result<TrayIcon, TrayError> {
    let menu = native_menu(&build_menu(set, scan_label))?;
    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_icon(icon::icon(set.has_active())?)
        .with_tooltip(menu::tooltip(set))
        .build()?;
    Ok(tray)
}

fn render(
    tray: &TrayIcon,
    set: &InterfaceSet,
    scan_label: Option<&str>,
    shown_active: &mut Option<bool>,
) -> Result<(), TrayError> {
    // The menu is always rebuilt so a toggle the toolkit flipped on click
    // snaps back to the engine's view.
    tray.set_menu(Some(Box::new(native_menu(&build_menu(set, scan_label))?)));
    tray.set_tooltip(Some(menu::tooltip(set)))?;

    let active = set.has_active();
    if *shown_active != Some(active) {
        tray.set_icon(Some(icon::icon(active)?))?;
        *shown_active = Some(active);
    }
    Ok(())
}

fn native_menu(entries: &[MenuEntry]) -> Result<Menu, TrayError> {
    let menu = Menu::new();
    for entry in entries {
        let id = entry.id().unwrap_or_default();
        match entry {
            MenuEntry::Command { label, .. } => {
                menu.append(&MenuItem::with_id(id, label, true, None))?;
            }
            MenuEntry::Interface {
                name,
                checked,
                enabled,
            } => {
                menu.append(&CheckMenuItem::with_id(id, name, *enabled, *checked, None))?;
            }
            MenuEntry::Separator => {
                menu.append(&PredefinedMenuItem::separator())?;
            }
        }
    }
    Ok(menu)
}

#[cfg(not(windows))]
fn notify_failure(failure: &Failure) {
    error!("{}", failure.message);
    if let Err(e) = notify_rust::Notification::new()
        .summary(&failure.title)
        .body(&failure.message)
        .show()
    {
        warn!("Failed to show notification: {}", e);
    }
}

#[cfg(windows)]
fn notify_failure(failure: &Failure) {
    error!("{}", failure.message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::InterfaceSource;
    use crate::probe::ActivityProber;
    use crate::runner::{CommandOutcome, CommandRunner, Verb};
    use std::sync::Mutex;

    struct Static(Vec<String>);

    impl InterfaceSource for Static {
        fn try_list(&self) -> Result<Vec<String>, ReconcileError> {
            Ok(self.0.clone())
        }
    }

    struct Probe(Mutex<Option<String>>);

    impl ActivityProber for Probe {
        fn try_current_active(&self) -> Result<Option<String>, ReconcileError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    struct Runner {
        fail_up: bool,
    }

    impl CommandRunner for Runner {
        fn run(&self, verb: Verb, _interface: &str) -> CommandOutcome {
            if self.fail_up && verb == Verb::Up {
                CommandOutcome::failed("Permission denied")
            } else {
                CommandOutcome::ok()
            }
        }
    }

    fn engine(active: Option<&str>, fail_up: bool) -> Engine {
        let engine = Engine::new(
            Box::new(Static(vec!["home".to_string(), "office".to_string()])),
            Box::new(Probe(Mutex::new(active.map(str::to_string)))),
            Box::new(Runner { fail_up }),
        );
        engine.refresh();
        engine
    }

    #[test]
    fn test_toggle_job_switches_interface() {
        let engine = engine(Some("home"), false);
        let failures = run_job(&engine, None, Job::Toggle("office".to_string()));
        assert!(failures.is_empty());
        assert!(engine.snapshot().is_active("office"));
        assert!(!engine.snapshot().is_active("home"));
    }

    #[test]
    fn test_toggle_job_on_active_deactivates() {
        let engine = engine(Some("home"), false);
        run_job(&engine, None, Job::Toggle("home".to_string()));
        assert!(!engine.snapshot().has_active());
    }

    #[test]
    fn test_toggle_job_reports_failures() {
        let engine = engine(None, true);
        let failures = run_job(&engine, None, Job::Toggle("home".to_string()));
        assert_eq!(
            failures,
            vec![Failure {
                title: "WireGuard: home".to_string(),
                message: "wg-quick up home failed: Permission denied".to_string(),
            }]
        );
        assert!(!engine.snapshot().has_active());
    }

    #[test]
    fn test_scan_job_without_target_refreshes() {
        let engine = engine(Some("office"), false);
        assert!(run_job(&engine, None, Job::Scan).is_empty());
        assert!(engine.snapshot().is_active("office"));
    }

    #[test]
    fn test_queue_reports_stopped_worker() {
        let (jobs, job_rx) = mpsc::unbounded_channel();
        assert!(queue(&jobs, Job::Refresh));
        drop(job_rx);
        assert!(!queue(&jobs, Job::Refresh));
    }

    #[test]
    fn test_click_refreshes_on_release_only() {
        assert!(refreshes_on_click(MouseButtonState::Up));
        assert!(!refreshes_on_click(MouseButtonState::Down));
    }

    #[test]
    fn test_early_subscriber_sees_first_refresh() {
        let engine = Engine::new(
            Box::new(Static(vec!["home".to_string()])),
            Box::new(Probe(Mutex::new(Some("home".to_string())))),
            Box::new(Runner { fail_up: false }),
        );
        let mut updates = engine.subscribe();

        run_job(&engine, None, Job::Refresh);

        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_active("home"));
    }
}
