use thiserror::Error;

/// Transport faults after which the session resets the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Stall,
    Timeout,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultKind::Stall => f.write_str("pipe stall"),
            FaultKind::Timeout => f.write_str("timeout"),
        }
    }
}

/// Which resource a release step was tearing down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Device,
    Context,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Device => f.write_str("device"),
            Resource::Context => f.write_str("context"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error("unexpected end of input")]
    DecodeTruncated { expected: usize, got: usize },
    #[error("scale gave invalid reading")]
    InvalidRead,
    #[error("scale reads negative, please tare")]
    NeedsTare,
    #[error("scale is in ounces mode, please switch to grams")]
    WrongMode,
    #[error("transport {kind}: {message}")]
    TransportFault { kind: FaultKind, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("expected 1 device, found {found}")]
    DeviceCountMismatch { found: usize },
    #[error("failed to release {resource}: {message}")]
    ResourceRelease { resource: Resource, message: String },
}

impl ScaleError {
    /// Errors describing the reading itself rather than the device link.
    pub fn is_reading_error(&self) -> bool {
        matches!(
            self,
            ScaleError::DecodeTruncated { .. }
                | ScaleError::InvalidRead
                | ScaleError::NeedsTare
                | ScaleError::WrongMode
        )
    }

    pub fn fault_kind(&self) -> Option<FaultKind> {
        match self {
            ScaleError::TransportFault { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaleError>;
