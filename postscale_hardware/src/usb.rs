//! USB transport for HID postal scales, built on `nusb`'s blocking API.

use std::time::Duration;

use nusb::transfer::{Buffer, In, Interrupt, TransferError};
use nusb::{Device, Endpoint, Interface, MaybeFuture};
use postscale_traits::{Transport, TransportError};
use tracing::{debug, trace};

use crate::error::HwError;

/// Direction bit of an endpoint address.
const ENDPOINT_DIR_IN: u8 = 0x80;

impl From<TransferError> for HwError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Stall => HwError::Stall,
            // transfer_blocking cancels the transfer once its timeout expires
            TransferError::Cancelled => HwError::Timeout,
            TransferError::Disconnected => HwError::Disconnected,
            other => HwError::Usb(other.to_string()),
        }
    }
}

impl From<nusb::Error> for HwError {
    fn from(e: nusb::Error) -> Self {
        HwError::Usb(e.to_string())
    }
}

/// Claimed interface plus the interrupt-IN endpoint reports arrive on.
pub struct UsbEndpoint {
    _interface: Interface,
    ep: Endpoint<Interrupt, In>,
    address: u8,
    max_packet_size: usize,
}

impl std::fmt::Debug for UsbEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbEndpoint")
            .field("address", &format_args!("{:#04x}", self.address))
            .field("max_packet_size", &self.max_packet_size)
            .finish()
    }
}

/// Transport over the host USB stack.
#[derive(Debug, Clone)]
pub struct UsbTransport {
    read_timeout: Duration,
}

impl UsbTransport {
    pub fn new(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }
}

impl Transport for UsbTransport {
    type Device = Device;
    type Endpoint = UsbEndpoint;

    fn enumerate(&mut self, vendor_id: u16) -> Result<Vec<Device>, TransportError> {
        let infos: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(HwError::from)?
            .filter(|d| d.vendor_id() == vendor_id)
            .collect();

        let mut devices = Vec::with_capacity(infos.len());
        for info in infos {
            debug!(
                vendor_id = format_args!("{:04x}", info.vendor_id()),
                product_id = format_args!("{:04x}", info.product_id()),
                "opening scale candidate"
            );
            devices.push(info.open().wait().map_err(HwError::from)?);
        }
        Ok(devices)
    }

    fn open_endpoint(&mut self, device: &Device) -> Result<UsbEndpoint, TransportError> {
        let config = device
            .active_configuration()
            .map_err(|e| HwError::Usb(e.to_string()))?;
        let alt = config
            .interface_alt_settings()
            .next()
            .ok_or_else(|| HwError::NoEndpoint("device exposes no interface".into()))?;
        let number = alt.interface_number();
        let setting = alt.alternate_setting();
        let desc = alt
            .endpoints()
            .next()
            .ok_or_else(|| HwError::NoEndpoint(format!("interface {number} has no endpoint")))?;
        let address = desc.address();
        let max_packet_size = desc.max_packet_size();
        if address & ENDPOINT_DIR_IN == 0 {
            return Err(HwError::NoEndpoint(format!("endpoint {address:#04x} is not IN")).into());
        }

        // The kernel HID driver usually owns the scale; take it over.
        let interface = device
            .detach_and_claim_interface(number)
            .wait()
            .map_err(HwError::from)?;
        if setting != 0 {
            interface
                .set_alt_setting(setting)
                .wait()
                .map_err(HwError::from)?;
        }
        let ep = interface
            .endpoint::<Interrupt, In>(address)
            .map_err(HwError::from)?;
        debug!(
            interface = number,
            setting,
            endpoint = format_args!("{address:#04x}"),
            max_packet_size,
            "scale endpoint opened"
        );

        Ok(UsbEndpoint {
            _interface: interface,
            ep,
            address,
            max_packet_size,
        })
    }

    fn max_packet_size(&self, endpoint: &UsbEndpoint) -> usize {
        endpoint.max_packet_size
    }

    fn read(&mut self, endpoint: &mut UsbEndpoint, buf: &mut [u8]) -> Result<usize, TransportError> {
        let len = endpoint.max_packet_size;
        let mut request = Buffer::new(len);
        request.set_requested_len(len);

        let data = endpoint
            .ep
            .transfer_blocking(request, self.read_timeout)
            .into_result()
            .map_err(HwError::from)?;

        let received = data.len().min(buf.len());
        buf[..received].copy_from_slice(&data[..received]);
        trace!(bytes = received, "usb read");
        Ok(received)
    }

    fn reset(&mut self, device: &Device) -> Result<(), TransportError> {
        device.reset().wait().map_err(HwError::from)?;
        Ok(())
    }

    fn close_device(
        &mut self,
        device: Device,
        endpoint: Option<UsbEndpoint>,
    ) -> Result<(), TransportError> {
        // nusb releases the interface and handle on drop; endpoint goes first.
        drop(endpoint);
        drop(device);
        Ok(())
    }

    fn close_context(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}
