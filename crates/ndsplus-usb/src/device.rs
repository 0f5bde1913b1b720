//! NDS Adapter+ device open and bulk transport
//!
//! The adapter is a plain full-speed device with one interface and one bulk
//! endpoint in each direction. All commands and data move over those two
//! endpoints; there are no control transfers beyond the standard requests.

use std::time::Duration;

use ndsplus_core::transport::{Transport, TransportFault};
use nusb::transfer::{Buffer, Bulk, In, Out, TransferError};
use nusb::{Endpoint, MaybeFuture};

use crate::error::{NdsUsbError, Result};

/// USB vendor id of the NDS Adapter+.
pub const NDS_USB_VENDOR: u16 = 0x4670;
/// USB product id of the NDS Adapter+.
pub const NDS_USB_PRODUCT: u16 = 0x9394;

// Bulk endpoint addresses on interface 0.
const BULK_OUT_EP: u8 = 0x02;
const BULK_IN_EP: u8 = 0x81;

/// An opened NDS Adapter+.
///
/// Owns both bulk endpoints for the lifetime of the session; dropping the
/// adapter releases the interface claim.
pub struct NdsAdapter {
    out_ep: Endpoint<Bulk, Out>,
    in_ep: Endpoint<Bulk, In>,
}

impl NdsAdapter {
    /// Open the first NDS Adapter+ found.
    pub fn open() -> Result<Self> {
        Self::open_nth(0)
    }

    /// Open the nth matching adapter (0-indexed).
    pub fn open_nth(index: usize) -> Result<Self> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| NdsUsbError::OpenFailed(e.to_string()))?
            .filter(|d| d.vendor_id() == NDS_USB_VENDOR && d.product_id() == NDS_USB_PRODUCT)
            .collect();

        let device_info = devices.get(index).ok_or(NdsUsbError::DeviceNotFound)?;

        log::info!(
            "Opening NDS Adapter+ at bus {} address {}",
            device_info.busnum(),
            device_info.device_address()
        );

        let device = device_info
            .open()
            .wait()
            .map_err(|e| NdsUsbError::OpenFailed(e.to_string()))?;

        let interface = device
            .claim_interface(0)
            .wait()
            .map_err(|e| NdsUsbError::ClaimFailed(e.to_string()))?;

        let out_ep = interface
            .endpoint::<Bulk, Out>(BULK_OUT_EP)
            .map_err(|e| NdsUsbError::ClaimFailed(e.to_string()))?;
        let in_ep = interface
            .endpoint::<Bulk, In>(BULK_IN_EP)
            .map_err(|e| NdsUsbError::ClaimFailed(e.to_string()))?;

        Ok(Self { out_ep, in_ep })
    }

    /// List all connected NDS Adapter+ devices.
    pub fn list_devices() -> Result<Vec<NdsAdapterInfo>> {
        let devices = nusb::list_devices()
            .wait()
            .map_err(|e| NdsUsbError::OpenFailed(e.to_string()))?
            .filter(|d| d.vendor_id() == NDS_USB_VENDOR && d.product_id() == NDS_USB_PRODUCT)
            .map(|d| NdsAdapterInfo {
                bus: d.busnum(),
                address: d.device_address(),
            })
            .collect();

        Ok(devices)
    }
}

fn map_transfer_error(e: TransferError) -> TransportFault {
    match e {
        // transfer_blocking cancels the transfer when the timeout elapses
        TransferError::Cancelled => TransportFault::Timeout,
        other => TransportFault::Failed(other.to_string()),
    }
}

impl Transport for NdsAdapter {
    fn send(&mut self, bytes: &[u8], timeout: Duration) -> std::result::Result<usize, TransportFault> {
        let mut buf = Buffer::new(bytes.len());
        buf.extend_from_slice(bytes);

        let completion = self.out_ep.transfer_blocking(buf, timeout);
        completion.status.map_err(map_transfer_error)?;

        log::trace!("USB send {} bytes", completion.actual_len);
        Ok(completion.actual_len)
    }

    fn receive(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> std::result::Result<usize, TransportFault> {
        // The requested length must be a whole number of packets.
        let max_packet_size = self.in_ep.max_packet_size();
        let request_len = buf.len().div_ceil(max_packet_size) * max_packet_size;
        let mut in_buf = Buffer::new(request_len);
        in_buf.set_requested_len(request_len);

        let completion = self.in_ep.transfer_blocking(in_buf, timeout);
        let data = completion.into_result().map_err(map_transfer_error)?;

        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        log::trace!("USB receive {} bytes", len);
        Ok(len)
    }
}

/// Information about a connected NDS Adapter+.
#[derive(Debug, Clone)]
pub struct NdsAdapterInfo {
    /// USB bus number
    pub bus: u8,
    /// USB device address
    pub address: u8,
}

impl std::fmt::Display for NdsAdapterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NDS Adapter+ at bus {} address {}", self.bus, self.address)
    }
}
