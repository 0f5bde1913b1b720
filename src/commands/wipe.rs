//! Wipe command implementation

use ndsplus_core::{geometry, TransferEngine};

use super::{open_card, print_card_info, transfer_bar};

/// Overwrite the savegame on the cartridge with zeros.
pub fn run_wipe(
    device_index: usize,
    size_override: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut card = open_card(device_index)?;
    let geom = geometry::resolve(&card.status, size_override)?;
    print_card_info(&card, &geom);

    println!("Wiping savegame...");
    let pb = transfer_bar(geom.size_bytes)?;
    let mut engine = TransferEngine::new(&mut card.session, &card.status, geom)?;
    engine.wipe(&mut |done, _total| pb.set_position(done))?;
    pb.finish_with_message("done");

    println!("Wiped {} bytes.", geom.size_bytes);
    Ok(())
}
