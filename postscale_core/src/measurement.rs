//! Decoded scale readings and the policy that turns them into grams.

use crate::error::{Result, ScaleError};

/// Value of `always_three` in every well-formed report.
pub const REPORT_SENTINEL: i8 = 3;

/// Device confidence/state code for the current reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// Nothing on the platform (2).
    NoWeight,
    /// Settled reading (4).
    Stable,
    /// Negative weight; the scale must be re-zeroed (5).
    NeedsTare,
    /// Any other code, including the zero of an unpopulated report.
    Unrecognized(i8),
}

impl Default for Stability {
    fn default() -> Self {
        Stability::Unrecognized(0)
    }
}

impl From<i8> for Stability {
    fn from(v: i8) -> Self {
        match v {
            2 => Stability::NoWeight,
            4 => Stability::Stable,
            5 => Stability::NeedsTare,
            other => Stability::Unrecognized(other),
        }
    }
}

impl Stability {
    pub fn raw(self) -> i8 {
        match self {
            Stability::NoWeight => 2,
            Stability::Stable => 4,
            Stability::NeedsTare => 5,
            Stability::Unrecognized(v) => v,
        }
    }

    /// Canonical form of the code; `Unrecognized(4)` becomes `Stable`.
    pub fn normalized(self) -> Self {
        Self::from(self.raw())
    }
}

/// Unit the scale is currently set to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 2
    Grams,
    /// 11
    Ounces,
    Unrecognized(i8),
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Unrecognized(0)
    }
}

impl From<i8> for Mode {
    fn from(v: i8) -> Self {
        match v {
            2 => Mode::Grams,
            11 => Mode::Ounces,
            other => Mode::Unrecognized(other),
        }
    }
}

impl Mode {
    pub fn raw(self) -> i8 {
        match self {
            Mode::Grams => 2,
            Mode::Ounces => 11,
            Mode::Unrecognized(v) => v,
        }
    }

    /// Canonical form of the code; `Unrecognized(2)` becomes `Grams`.
    pub fn normalized(self) -> Self {
        Self::from(self.raw())
    }
}

/// One parsed report from the scale.
///
/// `Measurement::default()` is the all-zero value that stands in for a
/// report that could not be decoded; it always classifies as
/// [`ScaleError::InvalidRead`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    /// Constant 3 on well-formed reports.
    pub always_three: i8,
    pub stability: Stability,
    pub mode: Mode,
    /// Power-of-ten exponent for ounces readings; unused for grams.
    pub scale_factor: i8,
    pub weight_minor: u8,
    /// Overflow for `weight_minor`, counts of 256.
    pub weight_major: u8,
}

impl Measurement {
    /// Raw magnitude as reported, without any unit policy applied.
    #[inline]
    pub fn raw_weight(&self) -> u16 {
        u16::from(self.weight_minor) + u16::from(self.weight_major) * 256
    }

    #[inline]
    pub fn is_no_weight(&self) -> bool {
        self.stability.normalized() == Stability::NoWeight
    }

    /// Check that the reading can be trusted as a grams value.
    ///
    /// Rules apply in order: malformed or unrecognized fields, then a
    /// negative reading, then a loaded platform outside grams mode. An empty
    /// platform passes in any recognized mode since zero needs no unit.
    /// Fields are judged by their raw codes, so a hand-built
    /// `Unrecognized(2)` behaves exactly like the variant it spells.
    pub fn classify(&self) -> Result<()> {
        let stability = self.stability.normalized();
        let mode = self.mode.normalized();
        if self.always_three != REPORT_SENTINEL
            || matches!(stability, Stability::Unrecognized(_))
            || matches!(mode, Mode::Unrecognized(_))
        {
            return Err(ScaleError::InvalidRead);
        }

        if stability == Stability::NeedsTare {
            return Err(ScaleError::NeedsTare);
        }

        if mode != Mode::Grams && stability != Stability::NoWeight {
            return Err(ScaleError::WrongMode);
        }

        Ok(())
    }

    /// Weight in grams. Ounces readings are refused rather than converted.
    pub fn grams(&self) -> Result<u16> {
        self.classify()?;
        Ok(self.raw_weight())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(stability: i8, mode: i8, minor: u8, major: u8) -> Measurement {
        Measurement {
            always_three: 3,
            stability: stability.into(),
            mode: mode.into(),
            scale_factor: 0,
            weight_minor: minor,
            weight_major: major,
        }
    }

    #[test]
    fn zero_value_is_invalid() {
        assert_eq!(Measurement::default().grams(), Err(ScaleError::InvalidRead));
    }

    #[test]
    fn raw_codes_round_trip() {
        for v in [0i8, 2, 3, 4, 5, 11, -1, i8::MAX] {
            assert_eq!(Stability::from(v).raw(), v);
            assert_eq!(Mode::from(v).raw(), v);
        }
    }

    #[test]
    fn unrecognized_codes_are_invalid() {
        assert_eq!(reading(3, 2, 10, 0).classify(), Err(ScaleError::InvalidRead));
        assert_eq!(reading(4, 7, 10, 0).classify(), Err(ScaleError::InvalidRead));
    }

    #[test]
    fn hand_built_codes_classify_like_their_variant() {
        let m = Measurement {
            always_three: 3,
            stability: Stability::Unrecognized(4),
            mode: Mode::Unrecognized(2),
            weight_minor: 136,
            ..Measurement::default()
        };
        assert_eq!(m.grams(), Ok(136));

        let empty_ounces = Measurement {
            stability: Stability::Unrecognized(2),
            mode: Mode::Unrecognized(11),
            ..m
        };
        assert!(empty_ounces.is_no_weight());
        assert_eq!(empty_ounces.classify(), Ok(()));

        let tare = Measurement {
            stability: Stability::Unrecognized(5),
            ..m
        };
        assert_eq!(tare.classify(), Err(ScaleError::NeedsTare));
        assert_eq!(Stability::Unrecognized(7).normalized(), Stability::Unrecognized(7));
    }

    #[test]
    fn tare_outranks_mode() {
        assert_eq!(reading(5, 11, 10, 0).grams(), Err(ScaleError::NeedsTare));
    }

    #[test]
    fn magnitude_combines_bytes() {
        assert_eq!(reading(4, 2, 255, 255).grams(), Ok(u16::MAX));
        assert_eq!(reading(4, 2, 104, 5).raw_weight(), 1384);
    }
}
