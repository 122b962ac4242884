use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("usb error: {0}")]
    Usb(String),
    #[error("pipe stall on scale endpoint")]
    Stall,
    #[error("scale read timeout")]
    Timeout,
    #[error("scale disconnected")]
    Disconnected,
    #[error("no usable endpoint: {0}")]
    NoEndpoint(String),
    #[error("simulator setup: {0}")]
    Sim(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
