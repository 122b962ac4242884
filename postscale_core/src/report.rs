//! Wire decoding of the scale's fixed 8-byte report.
//!
//! Layout, one byte per field:
//!
//! | byte | field          | type |
//! |------|----------------|------|
//! | 0    | always_three   | i8   |
//! | 1    | stability      | i8   |
//! | 2    | mode           | i8   |
//! | 3    | scale_factor   | i8   |
//! | 4    | weight_minor   | u8   |
//! | 5    | weight_major   | u8   |
//! | 6..8 | unused         |      |

use std::io::Read;

use crate::error::{Result, ScaleError};
use crate::measurement::Measurement;

/// Length of one report on the wire.
pub const REPORT_LEN: usize = 8;

/// Decode the first [`REPORT_LEN`] bytes of `bytes`.
///
/// Short input fails with [`ScaleError::DecodeTruncated`] and produces no
/// partial value; callers that still want a `Measurement` should fall back
/// to `Measurement::default()`, which classifies as invalid.
pub fn decode(bytes: &[u8]) -> Result<Measurement> {
    let report: &[u8; REPORT_LEN] = bytes
        .get(..REPORT_LEN)
        .and_then(|b| b.try_into().ok())
        .ok_or(ScaleError::DecodeTruncated {
            expected: REPORT_LEN,
            got: bytes.len(),
        })?;
    Ok(decode_report(report))
}

/// Read exactly one report from `reader` and decode it.
pub fn read_from<R: Read>(mut reader: R) -> Result<Measurement> {
    let mut buf = [0u8; REPORT_LEN];
    let mut filled = 0;
    while filled < REPORT_LEN {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(crate::hw_error::map_transport_error(&e)),
        }
    }
    decode(&buf[..filled])
}

#[inline]
fn decode_report(r: &[u8; REPORT_LEN]) -> Measurement {
    Measurement {
        always_three: i8::from_le_bytes([r[0]]),
        stability: i8::from_le_bytes([r[1]]).into(),
        mode: i8::from_le_bytes([r[2]]).into(),
        scale_factor: i8::from_le_bytes([r[3]]),
        weight_minor: r[4],
        weight_major: r[5],
    }
}
