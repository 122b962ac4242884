pub mod error;
#[cfg(feature = "hardware")]
pub mod usb;

#[cfg(feature = "hardware")]
pub use usb::{UsbEndpoint, UsbTransport};

use error::HwError;
use postscale_traits::{Transport, TransportError};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Packet size reported by the simulated endpoint, matching the real scale.
pub const SIM_PACKET_SIZE: usize = 8;

/// Report of an empty platform in grams mode.
pub const SIM_DEFAULT_REPORT: [u8; 8] = [3, 2, 2, 0, 0, 0, 0, 0];

/// Transport fault the simulator can inject in place of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    Stall,
    Timeout,
    Disconnect,
}

impl SimFault {
    fn to_error(self) -> HwError {
        match self {
            SimFault::Stall => HwError::Stall,
            SimFault::Timeout => HwError::Timeout,
            SimFault::Disconnect => HwError::Disconnected,
        }
    }
}

impl std::str::FromStr for SimFault {
    type Err = HwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stall" | "pipe" => Ok(SimFault::Stall),
            "timeout" => Ok(SimFault::Timeout),
            "disconnect" | "disconnected" => Ok(SimFault::Disconnect),
            other => Err(HwError::Sim(format!("unknown fault {other:?}"))),
        }
    }
}

#[derive(Debug, Clone)]
enum SimStep {
    Report(Vec<u8>),
    Fault(SimFault),
}

/// Shared tallies of what the simulated transport was asked to do.
///
/// Cloned handles observe the same counters, so a test can keep one while
/// the transport is owned by a session.
#[derive(Debug, Clone, Default)]
pub struct SimCounters {
    reads: Rc<Cell<usize>>,
    resets: Rc<Cell<usize>>,
    device_closes: Rc<Cell<usize>>,
    context_closes: Rc<Cell<usize>>,
}

impl SimCounters {
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
    pub fn resets(&self) -> usize {
        self.resets.get()
    }
    pub fn device_closes(&self) -> usize {
        self.device_closes.get()
    }
    pub fn context_closes(&self) -> usize {
        self.context_closes.get()
    }

    fn bump(cell: &Cell<usize>) {
        cell.set(cell.get().saturating_add(1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimDevice {
    pub index: usize,
}

#[derive(Debug)]
pub struct SimEndpoint {
    device: usize,
}

/// Simulated scale transport
///
/// Serves a scripted sequence of reports and faults; once the script is
/// exhausted the last report repeats.
#[derive(Debug)]
pub struct SimulatedTransport {
    devices: usize,
    script: VecDeque<SimStep>,
    last: Vec<u8>,
    fail_enumerate: bool,
    fail_open: bool,
    fail_close_device: bool,
    fail_close_context: bool,
    counters: SimCounters,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTransport {
    /// One attached scale reporting an empty platform.
    pub fn new() -> Self {
        Self {
            devices: 1,
            script: VecDeque::new(),
            last: SIM_DEFAULT_REPORT.to_vec(),
            fail_enumerate: false,
            fail_open: false,
            fail_close_device: false,
            fail_close_context: false,
            counters: SimCounters::default(),
        }
    }

    /// Build from `POSTSCALE_SIM_*` environment variables.
    ///
    /// - `POSTSCALE_SIM_REPORT`: comma-separated bytes served on every read
    /// - `POSTSCALE_SIM_DEVICES`: number of attached scales (default 1)
    /// - `POSTSCALE_SIM_FAULT`: `stall|timeout|disconnect` injected on the first read
    pub fn from_env() -> error::Result<Self> {
        let mut sim = Self::new();
        if let Ok(report) = std::env::var("POSTSCALE_SIM_REPORT") {
            sim.last = parse_report(&report)?;
        }
        if let Ok(n) = std::env::var("POSTSCALE_SIM_DEVICES") {
            sim.devices = n
                .trim()
                .parse()
                .map_err(|_| HwError::Sim(format!("invalid device count {n:?}")))?;
        }
        if let Ok(fault) = std::env::var("POSTSCALE_SIM_FAULT") {
            sim = sim.then_fault(fault.parse()?);
        }
        tracing::debug!(devices = sim.devices, report = ?sim.last, "simulated transport");
        Ok(sim)
    }

    pub fn with_devices(mut self, n: usize) -> Self {
        self.devices = n;
        self
    }

    /// Queue a report for the next unscripted read.
    pub fn then_report(mut self, report: impl Into<Vec<u8>>) -> Self {
        self.script.push_back(SimStep::Report(report.into()));
        self
    }

    /// Queue a fault for the next unscripted read.
    pub fn then_fault(mut self, fault: SimFault) -> Self {
        self.script.push_back(SimStep::Fault(fault));
        self
    }

    /// Make device enumeration itself fail, as when the bus is unavailable.
    pub fn failing_enumerate(mut self) -> Self {
        self.fail_enumerate = true;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_close(mut self, device: bool, context: bool) -> Self {
        self.fail_close_device = device;
        self.fail_close_context = context;
        self
    }

    pub fn counters(&self) -> SimCounters {
        self.counters.clone()
    }
}

fn parse_report(s: &str) -> error::Result<Vec<u8>> {
    s.split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(|b| {
            b.parse::<u8>()
                .map_err(|_| HwError::Sim(format!("invalid report byte {b:?}")))
        })
        .collect()
}

impl Transport for SimulatedTransport {
    type Device = SimDevice;
    type Endpoint = SimEndpoint;

    fn enumerate(&mut self, _vendor_id: u16) -> Result<Vec<SimDevice>, TransportError> {
        if self.fail_enumerate {
            return Err(HwError::Usb("simulated enumeration failure".into()).into());
        }
        Ok((0..self.devices).map(|index| SimDevice { index }).collect())
    }

    fn open_endpoint(&mut self, device: &SimDevice) -> Result<SimEndpoint, TransportError> {
        if self.fail_open {
            return Err(HwError::NoEndpoint("simulated open failure".into()).into());
        }
        Ok(SimEndpoint {
            device: device.index,
        })
    }

    fn max_packet_size(&self, _endpoint: &SimEndpoint) -> usize {
        SIM_PACKET_SIZE
    }

    fn read(&mut self, endpoint: &mut SimEndpoint, buf: &mut [u8]) -> Result<usize, TransportError> {
        SimCounters::bump(&self.counters.reads);
        if let Some(step) = self.script.pop_front() {
            match step {
                SimStep::Report(r) => self.last = r,
                SimStep::Fault(f) => return Err(f.to_error().into()),
            }
        }
        let n = self.last.len().min(buf.len());
        buf[..n].copy_from_slice(&self.last[..n]);
        tracing::trace!(device = endpoint.device, bytes = n, "simulated read");
        Ok(n)
    }

    fn reset(&mut self, _device: &SimDevice) -> Result<(), TransportError> {
        SimCounters::bump(&self.counters.resets);
        Ok(())
    }

    fn close_device(
        &mut self,
        _device: SimDevice,
        _endpoint: Option<SimEndpoint>,
    ) -> Result<(), TransportError> {
        SimCounters::bump(&self.counters.device_closes);
        if self.fail_close_device {
            return Err(HwError::Usb("simulated device close failure".into()).into());
        }
        Ok(())
    }

    fn close_context(&mut self) -> Result<(), TransportError> {
        SimCounters::bump(&self.counters.context_closes);
        if self.fail_close_context {
            return Err(HwError::Usb("simulated context close failure".into()).into());
        }
        Ok(())
    }
}
