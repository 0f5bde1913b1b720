//! Backup command implementation

use std::fs::File;
use std::path::Path;

use ndsplus_core::{geometry, TransferEngine};

use super::{open_card, print_card_info, transfer_bar};

/// Back up the savegame to `output`.
pub fn run_backup(
    device_index: usize,
    output: &Path,
    size_override: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut card = open_card(device_index)?;
    let geom = geometry::resolve(&card.status, size_override)?;
    print_card_info(&card, &geom);

    let mut file = File::create(output)?;

    println!("Backing up savegame...");
    let pb = transfer_bar(geom.size_bytes)?;
    let mut engine = TransferEngine::new(&mut card.session, &card.status, geom)?;
    engine.backup(&mut file, &mut |done, _total| pb.set_position(done))?;
    file.sync_all()?;
    pb.finish_with_message("done");

    println!(
        "Backup of {} bytes to {} completed!",
        geom.size_bytes,
        output.display()
    );
    Ok(())
}
