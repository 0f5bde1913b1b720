//! Restore command implementation

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndsplus_core::{geometry, TransferEngine};

use super::{open_card, print_card_info, transfer_bar};

/// Restore the savegame from `input`.
pub fn run_restore(
    device_index: usize,
    input: &Path,
    size_override: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut card = open_card(device_index)?;
    let geom = geometry::resolve(&card.status, size_override)?;
    print_card_info(&card, &geom);

    let file = File::open(input)?;
    let file_len = file.metadata()?.len();
    if file_len != geom.size_bytes {
        log::warn!(
            "{} is {} bytes but the save region is {} bytes",
            input.display(),
            file_len,
            geom.size_bytes
        );
    }
    let mut source = BufReader::new(file);

    println!("Restoring savegame...");
    let pb = transfer_bar(geom.size_bytes)?;
    let mut engine = TransferEngine::new(&mut card.session, &card.status, geom)?;
    engine.restore(&mut source, &mut |done, _total| pb.set_position(done))?;
    pb.finish_with_message("done");

    println!(
        "Restore of {} bytes from {} completed!",
        geom.size_bytes,
        input.display()
    );
    Ok(())
}
