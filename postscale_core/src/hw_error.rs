//! Maps `Box<dyn Error>` from the transport boundary to typed `ScaleError`.
//!
//! The `Transport` trait uses `Box<dyn Error + Send + Sync>` so any backend
//! fits; this module decides which failures count as stall/timeout faults,
//! with an optional feature-gated path for `postscale_hardware::HwError`
//! downcasting.

use crate::error::{FaultKind, ScaleError};

/// Map a transport-boundary error to a typed `ScaleError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_transport_error(e: &(dyn std::error::Error + 'static)) -> ScaleError {
    #[cfg(feature = "hardware-errors")]
    {
        use postscale_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Stall => fault(FaultKind::Stall, hw),
                HwError::Timeout => fault(FaultKind::Timeout, hw),
                other => ScaleError::Transport(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        match io.kind() {
            std::io::ErrorKind::TimedOut => return fault(FaultKind::Timeout, io),
            std::io::ErrorKind::BrokenPipe => return fault(FaultKind::Stall, io),
            _ => {}
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("stall") || lower.contains("pipe") {
        fault(FaultKind::Stall, &s)
    } else if lower.contains("timeout") || lower.contains("timed out") {
        fault(FaultKind::Timeout, &s)
    } else {
        ScaleError::Transport(s)
    }
}

fn fault(kind: FaultKind, e: &dyn std::fmt::Display) -> ScaleError {
    ScaleError::TransportFault {
        kind,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hw_errors_map_precisely() {
        use postscale_hardware::error::HwError;
        let stall: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::Stall);
        assert_eq!(map_transport_error(&*stall).fault_kind(), Some(FaultKind::Stall));
        let gone: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::Disconnected);
        assert!(matches!(map_transport_error(&*gone), ScaleError::Transport(_)));
    }

    #[test]
    fn io_kinds_map() {
        let e = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert_eq!(map_transport_error(&e).fault_kind(), Some(FaultKind::Timeout));
    }

    #[test]
    fn foreign_errors_fall_back_to_text() {
        let e: Box<dyn std::error::Error + Send + Sync> = "LIBUSB_ERROR_PIPE".into();
        assert_eq!(map_transport_error(&*e).fault_kind(), Some(FaultKind::Stall));
        let e: Box<dyn std::error::Error + Send + Sync> = "operation timed out".into();
        assert_eq!(map_transport_error(&*e).fault_kind(), Some(FaultKind::Timeout));
        let e: Box<dyn std::error::Error + Send + Sync> = "no such device".into();
        assert_eq!(
            map_transport_error(&*e),
            ScaleError::Transport("no such device".into())
        );
    }
}
