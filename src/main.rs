//! memdude - SPI EEPROM programmer
//!
//! Drives 25-series EEPROM chips through a USBtinyISP-style USB-to-SPI
//! bridge adapter: erase, write (Intel-HEX or raw binary, with optional
//! read-back verification) and read.
//!
//! # Architecture
//!
//! The protocol and programming algorithms live in `memdude-core`,
//! parameterized over a `BridgeTransport` trait. Backends plug in below
//! that seam: `memdude-usbtiny` for the real adapter, `memdude-dummy`
//! for an in-memory emulator. This binary is the thin glue: argument
//! parsing, profile lookup, progress display and session lifetime.

mod cli;
mod commands;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};
use memdude_core::profile::{DeviceProfile, ProfileCatalog};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (warn)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    // Built-in catalog plus any user overlay
    let mut catalog = ProfileCatalog::builtin();
    if let Some(path) = &cli.profiles {
        let count = catalog.load_file(path)?;
        log::info!("loaded {} profile(s) from {}", count, path.display());
    }

    match cli.command {
        Commands::Write {
            device,
            programmer,
            format,
            verify,
            input,
        } => {
            let profile = lookup_device(&catalog, &device)?;
            let mut session = commands::Session::open(&programmer, profile)?;
            commands::write::run_write(&mut session, profile, &input, format, verify)
        }
        Commands::Read {
            device,
            programmer,
            addr,
            count,
            output,
        } => {
            let profile = lookup_device(&catalog, &device)?;
            let mut session = commands::Session::open(&programmer, profile)?;
            commands::read::run_read(&mut session, profile, addr, count, &output)
        }
        Commands::Erase { device, programmer } => {
            let profile = lookup_device(&catalog, &device)?;
            let mut session = commands::Session::open(&programmer, profile)?;
            commands::erase::run_erase(&mut session, profile)
        }
        Commands::ListDevices => {
            commands::list_devices(&catalog);
            Ok(())
        }
    }
}

/// Look up a device profile, turning an unknown name into a clean error
fn lookup_device<'a>(
    catalog: &'a ProfileCatalog,
    name: &str,
) -> Result<&'a DeviceProfile, Box<dyn std::error::Error>> {
    catalog.find(name).ok_or_else(|| {
        format!(
            "unsupported device '{}' (run `memdude list-devices` for the catalog)",
            name
        )
        .into()
    })
}
