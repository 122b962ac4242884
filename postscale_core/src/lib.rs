#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Postal scale protocol core (transport-agnostic).
//!
//! All device I/O goes through `postscale_traits::Transport`; this crate
//! turns what the transport delivers into readings.
//!
//! ## Architecture
//!
//! - **Decoding**: fixed 8-byte report → `Measurement` (`report` module)
//! - **Classification**: invalid / needs tare / wrong mode / valid, and the
//!   grams value of a valid reading (`measurement` module)
//! - **Session**: one owned device, reads, reset after stall/timeout, and
//!   guaranteed release (`session` module)
//! - **Errors**: the shared `ScaleError` taxonomy (`error` module)

pub mod error;
pub mod hw_error;
pub mod measurement;
pub mod mocks;
pub mod report;
pub mod scaler;
pub mod session;

pub use error::{FaultKind, Resource, Result, ScaleError};
pub use measurement::{Measurement, Mode, Stability};
pub use report::{REPORT_LEN, decode, read_from};
pub use scaler::Scaler;
pub use session::{DYMO_VENDOR_ID, ScaleSession};
