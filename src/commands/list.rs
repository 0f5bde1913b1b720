//! List command implementation

use ndsplus_usb::NdsAdapter;

/// List connected NDS Adapter+ devices.
pub fn run_list() -> Result<(), Box<dyn std::error::Error>> {
    let devices = NdsAdapter::list_devices()?;
    if devices.is_empty() {
        println!("No NDS Adapter+ found.");
        return Ok(());
    }
    for (index, device) in devices.iter().enumerate() {
        println!("{}: {}", index, device);
    }
    Ok(())
}
