//! Owned connection to exactly one attached scale.

use postscale_traits::{Transport, TransportError};
use tracing::{debug, trace};

use crate::error::{Resource, Result, ScaleError};
use crate::hw_error::map_transport_error;
use crate::measurement::Measurement;
use crate::report;
use crate::scaler::Scaler;

/// USB vendor id shared by all Dymo scales.
pub const DYMO_VENDOR_ID: u16 = 0x0922;

struct Handles<T: Transport> {
    device: T::Device,
    endpoint: T::Endpoint,
}

/// Open scale session.
///
/// Holds the transport (the communication context), the device handle and
/// its endpoint. Release happens once, through [`ScaleSession::close`] or on
/// drop; both release steps are always attempted.
///
/// Not meant for concurrent use; wrap it in a lock if several callers share
/// one scale.
pub struct ScaleSession<T: Transport> {
    transport: T,
    handles: Option<Handles<T>>,
    packet_size: usize,
}

impl<T: Transport> std::fmt::Debug for ScaleSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleSession")
            .field("packet_size", &self.packet_size)
            .field("open", &self.handles.is_some())
            .finish()
    }
}

impl<T: Transport> ScaleSession<T> {
    /// Open the single attached Dymo scale.
    pub fn open(transport: T) -> Result<Self> {
        Self::open_vendor(transport, DYMO_VENDOR_ID)
    }

    /// Open the single attached device with `vendor_id`.
    ///
    /// Zero or several matches is a [`ScaleError::DeviceCountMismatch`];
    /// nothing is picked on the caller's behalf. On any failure every
    /// enumerated device and the context are released before returning.
    pub fn open_vendor(mut transport: T, vendor_id: u16) -> Result<Self> {
        let mut devices = match transport.enumerate(vendor_id) {
            Ok(devices) => devices,
            Err(e) => {
                let err = map_transport_error(&*e);
                return Err(abandon(transport, Vec::new(), err));
            }
        };

        if devices.len() != 1 {
            let found = devices.len();
            return Err(abandon(
                transport,
                devices,
                ScaleError::DeviceCountMismatch { found },
            ));
        }
        let Some(device) = devices.pop() else {
            return Err(abandon(
                transport,
                Vec::new(),
                ScaleError::DeviceCountMismatch { found: 0 },
            ));
        };

        let endpoint = match transport.open_endpoint(&device) {
            Ok(ep) => ep,
            Err(e) => {
                let err = map_transport_error(&*e);
                return Err(abandon(transport, vec![device], err));
            }
        };
        let packet_size = transport.max_packet_size(&endpoint);
        debug!(
            vendor_id = format_args!("{vendor_id:04x}"),
            packet_size, "scale session open"
        );

        Ok(Self {
            transport,
            handles: Some(Handles { device, endpoint }),
            packet_size,
        })
    }

    /// Maximum packet size of the endpoint; every read requests this many bytes.
    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    /// Release the endpoint, device and context.
    ///
    /// Both the device and the context release are attempted; the device
    /// failure is reported when both fail.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        let Some(handles) = self.handles.take() else {
            return Ok(());
        };
        let device = self
            .transport
            .close_device(handles.device, Some(handles.endpoint))
            .map_err(|e| release_error(Resource::Device, &e));
        let context = self
            .transport
            .close_context()
            .map_err(|e| release_error(Resource::Context, &e));
        debug!(
            device_ok = device.is_ok(),
            context_ok = context.is_ok(),
            "scale session closed"
        );
        device.and(context)
    }

    /// One blocking packet read into `buf`, resetting the device on a
    /// stall or timeout. The read itself is never retried.
    fn read_packet(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Self {
            transport, handles, ..
        } = self;
        let handles = handles
            .as_mut()
            .ok_or_else(|| ScaleError::Transport("session closed".into()))?;

        match transport.read(&mut handles.endpoint, buf) {
            Ok(n) => {
                trace!(bytes = n, "scale packet");
                Ok(n)
            }
            Err(e) => {
                let err = map_transport_error(&*e);
                if let Some(kind) = err.fault_kind() {
                    match transport.reset(&handles.device) {
                        Ok(()) => debug!(%kind, "device reset after transport fault"),
                        Err(re) => debug!(%kind, error = %re, "device reset failed"),
                    }
                }
                Err(err)
            }
        }
    }
}

impl<T: Transport> Scaler for ScaleSession<T> {
    fn read_raw(&mut self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.packet_size];
        let n = self.read_packet(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    fn read_measurement(&mut self) -> Result<Measurement> {
        let mut buf = vec![0u8; self.packet_size];
        let n = self.read_packet(&mut buf)?;
        report::decode(&buf[..n])
    }
}

impl<T: Transport> Drop for ScaleSession<T> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            debug!(error = %e, "release on drop failed");
        }
    }
}

/// Release everything handed out during a failed open, keeping `err`.
fn abandon<T: Transport>(mut transport: T, devices: Vec<T::Device>, err: ScaleError) -> ScaleError {
    for device in devices {
        if let Err(e) = transport.close_device(device, None) {
            debug!(error = %e, "closing unused device failed");
        }
    }
    if let Err(e) = transport.close_context() {
        debug!(error = %e, "closing context failed");
    }
    err
}

fn release_error(resource: Resource, e: &TransportError) -> ScaleError {
    ScaleError::ResourceRelease {
        resource,
        message: e.to_string(),
    }
}
