pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type crossing the transport boundary.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Device I/O collaborator used by the scale session.
///
/// A transport enumerates devices by vendor id, opens one endpoint on a
/// device, performs blocking fixed-size reads and can reset or release what
/// it handed out. The transport value itself is the communication context.
pub trait Transport {
    /// Handle to one enumerated device.
    type Device;
    /// Handle to an opened endpoint on a device.
    type Endpoint;

    fn enumerate(&mut self, vendor_id: u16) -> Result<Vec<Self::Device>, TransportError>;

    /// Open the first configuration/interface/setting/endpoint of `device`.
    fn open_endpoint(&mut self, device: &Self::Device) -> Result<Self::Endpoint, TransportError>;

    /// Maximum packet size negotiated for `endpoint`; reads use this length.
    fn max_packet_size(&self, endpoint: &Self::Endpoint) -> usize;

    /// Blocking read of one packet into `buf`, returning the bytes read.
    fn read(
        &mut self,
        endpoint: &mut Self::Endpoint,
        buf: &mut [u8],
    ) -> Result<usize, TransportError>;

    fn reset(&mut self, device: &Self::Device) -> Result<(), TransportError>;

    /// Release the endpoint and the device handle it was opened on.
    fn close_device(
        &mut self,
        device: Self::Device,
        endpoint: Option<Self::Endpoint>,
    ) -> Result<(), TransportError>;

    /// Release the communication context itself.
    fn close_context(&mut self) -> Result<(), TransportError>;
}
