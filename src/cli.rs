//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "ndsplus")]
#[command(author, version, about = "NDS Adapter+ savegame backup tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Adapter index when multiple are connected (0-indexed)
    #[arg(long, default_value_t = 0, global = true)]
    pub device: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show adapter and cartridge information
    Info,

    /// Back up the savegame to a file
    Backup {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Override the detected save size in bytes (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        size: Option<u32>,
    },

    /// Restore a savegame from a file
    Restore {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Override the detected save size in bytes (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        size: Option<u32>,
    },

    /// Wipe the savegame on the cartridge
    Wipe {
        /// Override the detected save size in bytes (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        size: Option<u32>,
    },

    /// List connected adapters
    List,
}
