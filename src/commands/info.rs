//! Info command implementation

use ndsplus_core::geometry;

use super::{open_card, print_card_info};

/// Print adapter firmware, cartridge header details and save geometry.
pub fn run_info(device_index: usize) -> Result<(), Box<dyn std::error::Error>> {
    let card = open_card(device_index)?;
    let geom = geometry::resolve(&card.status, None)?;
    print_card_info(&card, &geom);
    if card.status.eeprom_busy() {
        println!("Note: the save chip reports busy.");
    }
    Ok(())
}
