//! ndsplus-usb - nusb-backed transport for the NDS Adapter+
//!
//! Finds the adapter by its USB vendor/product id, claims interface 0 and
//! exposes the two bulk endpoints as an [`ndsplus_core::transport::Transport`]
//! implementation. No protocol knowledge lives here; frames and their
//! meaning belong to `ndsplus-core`.
//!
//! # Example
//!
//! ```no_run
//! use ndsplus_usb::NdsAdapter;
//! use ndsplus_core::session::AdapterSession;
//!
//! let adapter = NdsAdapter::open()?;
//! let mut session = AdapterSession::new(adapter);
//! let status = session.query_status()?;
//! println!("firmware version {}", status.firmware_version);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod device;
mod error;

pub use device::{NdsAdapter, NdsAdapterInfo, NDS_USB_PRODUCT, NDS_USB_VENDOR};
pub use error::{NdsUsbError, Result};
