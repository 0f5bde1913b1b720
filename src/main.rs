//! ndsplus - savegame backup tool for the NDS Adapter+
//!
//! Backs up, wipes and restores the save-data region of a cartridge
//! inserted into the NDS Adapter+ USB reader. The device protocol is
//! reverse-engineered from the vendor tool and lives in `ndsplus-core`;
//! USB plumbing is in `ndsplus-usb`.

mod cli;
mod commands;
mod hexdump;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let result = match cli.command {
        Commands::Info => commands::run_info(cli.device),
        Commands::Backup { output, size } => commands::run_backup(cli.device, &output, size),
        Commands::Restore { input, size } => commands::run_restore(cli.device, &input, size),
        Commands::Wipe { size } => commands::run_wipe(cli.device, size),
        Commands::List => commands::run_list(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
