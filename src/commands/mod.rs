//! CLI command implementations
//!
//! Every cartridge command runs the same bring-up first: open the adapter,
//! query its status, run the preparation handshake, read the ROM header.
//! The save transfer commands then resolve the geometry and drive the
//! transfer engine with an indicatif progress bar.

mod backup;
mod info;
mod list;
mod restore;
mod wipe;

pub use backup::run_backup;
pub use info::run_info;
pub use list::run_list;
pub use restore::run_restore;
pub use wipe::run_wipe;

use indicatif::{ProgressBar, ProgressStyle};
use ndsplus_core::{AdapterSession, Error, HeaderResponse, SaveGeometry, StatusResponse};
use ndsplus_usb::NdsAdapter;

use crate::hexdump;

/// A session that finished the setup sequence, plus everything it learned.
pub(crate) struct OpenedCard {
    pub session: AdapterSession<NdsAdapter>,
    pub status: StatusResponse,
    pub header: HeaderResponse,
}

/// Open the adapter and run the full setup sequence.
///
/// Fails with `NoCartridge` before the handshake if the slot is empty.
pub(crate) fn open_card(device_index: usize) -> Result<OpenedCard, Box<dyn std::error::Error>> {
    let adapter = NdsAdapter::open_nth(device_index)?;
    let mut session = AdapterSession::new(adapter);

    let status = session.query_status()?;
    hexdump::debug_dump("card status", status.bytes());
    println!(
        "NDS Adapter+ firmware version {} detected.",
        status.firmware_version
    );

    if status.cartridge_missing() {
        return Err(Error::NoCartridge.into());
    }

    let handshake_reply = session.prepare()?;
    hexdump::debug_dump("handshake reply", &handshake_reply);

    let header = session.read_header()?;
    hexdump::debug_dump("card header", header.bytes());

    Ok(OpenedCard {
        session,
        status,
        header,
    })
}

/// Print the cartridge details the way the vendor tool did.
pub(crate) fn print_card_info(card: &OpenedCard, geometry: &SaveGeometry) {
    println!(
        "Card title: {}",
        card.header.title().unwrap_or_else(|| "???".to_string())
    );
    println!(
        "Card ID: {}",
        card.header.card_id().unwrap_or_else(|| "???".to_string())
    );
    match card.header.rom_size_mib() {
        Some(mib) => println!("Card size: {} MiB", mib),
        None => println!("Card size: ??? MiB"),
    }
    if geometry.size_bytes >= 1024 {
        println!(
            "Save chip: {}, {} KiB",
            geometry.kind,
            geometry.size_bytes / 1024
        );
    } else {
        println!("Save chip: {}, {} bytes", geometry.kind, geometry.size_bytes);
    }
}

/// Progress bar for save transfers, sized in bytes.
pub(crate) fn transfer_bar(
    total: u64,
) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}
