//! CLI argument parsing

use crate::programmers;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Bridge adapter to use [available: {}]",
        programmers::programmer_names_short()
    )
}

/// Image format for write input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageFormat {
    /// Intel-HEX records
    Hex,
    /// Flat binary mapped to address 0
    Bin,
}

#[derive(Parser)]
#[command(name = "memdude")]
#[command(author, version, about = "SPI EEPROM programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Extra device profiles (RON file), overlaid on the built-in catalog
    #[arg(long, global = true)]
    pub profiles: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Program a device from an Intel-HEX or raw binary image
    Write {
        /// Device name (see `list-devices`)
        #[arg(short, long)]
        device: String,

        /// Bridge adapter to use
        #[arg(short, long, help = programmer_help(), default_value = "usbtiny")]
        programmer: String,

        /// Input format [default: by file extension]
        #[arg(long, value_enum)]
        format: Option<ImageFormat>,

        /// Read back and compare after writing
        #[arg(long)]
        verify: bool,

        /// Input file path
        input: PathBuf,
    },

    /// Read device contents to a file
    Read {
        /// Device name (see `list-devices`)
        #[arg(short, long)]
        device: String,

        /// Bridge adapter to use
        #[arg(short, long, help = programmer_help(), default_value = "usbtiny")]
        programmer: String,

        /// Start address (hex, e.g. 0x100, or decimal)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        addr: u32,

        /// Byte count [default: the rest of the device]
        #[arg(long, value_parser = parse_hex_u32)]
        count: Option<u32>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Erase the whole device
    Erase {
        /// Device name (see `list-devices`)
        #[arg(short, long)]
        device: String,

        /// Bridge adapter to use
        #[arg(short, long, help = programmer_help(), default_value = "usbtiny")]
        programmer: String,
    },

    /// List supported devices
    ListDevices,
}
