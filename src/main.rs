use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wg_tray::config::SourceStrategy;
use wg_tray::engine::RequestOutcome;
use wg_tray::interfaces::capture::capture_listing;
use wg_tray::interfaces::InterfaceStore;
use wg_tray::platform::Elevator;
use wg_tray::tray::{self, ScanTarget};
use wg_tray::Config;

#[derive(Parser)]
#[command(name = "wg-tray")]
#[command(about = "Tray indicator that keeps exactly one WireGuard interface active")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tray indicator (default)
    Tray,
    /// List discovered interfaces
    List,
    /// Show the active interface
    Status,
    /// Activate an interface, bringing down any other active one
    Up {
        /// Interface name
        name: String,
    },
    /// Deactivate an interface
    Down {
        /// Interface name
        name: String,
    },
    /// Capture the config directory listing for the persisted list
    Scan,
    /// Generate default config file
    Init,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    // RUST_LOG, when set, takes precedence over --verbose
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let load_config = || Config::load_or_default(&config_path);

    match cli.command.unwrap_or(Commands::Tray) {
        Commands::Init => {
            info!("Generating default config...");
            Config::default().save(&config_path)?;
            println!("Created default config: {}", config_path.display());
        }
        Commands::Tray => {
            let config = load_config()?;
            let engine = Arc::new(wg_tray::engine_from_config(&config));
            let scan = match config.source.strategy {
                SourceStrategy::Directory => None,
                SourceStrategy::Persisted | SourceStrategy::Auto => Some(ScanTarget {
                    elevator: Elevator::new(&config.privilege),
                    dir: config.wireguard.config_dir.clone(),
                    suffix: config.wireguard.config_suffix.clone(),
                    store: InterfaceStore::new(config.store_path()),
                }),
            };
            tray::run(engine, scan)?;
        }
        Commands::List => {
            let config = load_config()?;
            let set = wg_tray::engine_from_config(&config).refresh();
            if set.is_empty() {
                println!("No interfaces found");
            }
            for interface in set.interfaces() {
                let marker = if interface.active { "*" } else { " " };
                println!("{} {}", marker, interface.name);
            }
        }
        Commands::Status => {
            let config = load_config()?;
            let set = wg_tray::engine_from_config(&config).refresh();
            match set.active().next() {
                Some(name) => println!("Active: {}", name),
                None => println!("Active: none"),
            }
        }
        Commands::Up { name } => {
            let config = load_config()?;
            let engine = wg_tray::engine_from_config(&config);
            engine.refresh();
            report(engine.request_activate(&name));
        }
        Commands::Down { name } => {
            let config = load_config()?;
            let engine = wg_tray::engine_from_config(&config);
            engine.refresh();
            report(engine.request_deactivate(&name));
        }
        Commands::Scan => {
            let config = load_config()?;
            let store = InterfaceStore::new(config.store_path());
            let names = capture_listing(
                &Elevator::new(&config.privilege),
                &config.wireguard.config_dir,
                &config.wireguard.config_suffix,
                &store,
            )?;
            println!(
                "Saved {} interface(s) to {}",
                names.len(),
                store.path().display()
            );
            for name in names {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

/// Print the result of an up/down request, exiting non-zero on failure
fn report(outcome: RequestOutcome) {
    for failure in &outcome.failures {
        error!("{}", failure);
    }
    match outcome.snapshot.active().collect::<Vec<_>>().as_slice() {
        [] => println!("Active: none"),
        names => println!("Active: {}", names.join(", ")),
    }
    if !outcome.is_success() {
        std::process::exit(1);
    }
}
