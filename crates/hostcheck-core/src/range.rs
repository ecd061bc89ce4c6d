//! Threshold range specifications.
//!
//! A range string describes the band of acceptable values for a measurement:
//!
//! ```text
//! "10"      0 ..= 10
//! "@1:10"   1 ..= 10
//! "@:10"    1 ..= 10
//! "@10:"    10 ..= 4294967295
//! "@:"      1 ..= 4294967295
//! "@10:1"   outside 1 ..= 10 (inverse)
//! ```
//!
//! A measurement fails its threshold when it is *not* contained in the range.
//! When the lower bound is written greater than the upper one the bounds are
//! swapped and the sense flips, so the band becomes a forbidden zone.

use std::fmt;
use std::str::FromStr;

use crate::error::RangeParseError;
use crate::status::Status;

/// Numeric domain a range is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Integer,
    Real,
}

/// Upper bound used when a range leaves its high end open.
pub const DOMAIN_MAX: u32 = u32::MAX;

/// A numeric type usable as a range bound.
pub trait RangeValue: Copy + PartialOrd + fmt::Debug + fmt::Display {
    const DOMAIN: Domain;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    /// Parse one bound token, `None` if it is not a number of this domain.
    fn parse_token(token: &str) -> Option<Self>;
}

impl RangeValue for i64 {
    const DOMAIN: Domain = Domain::Integer;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MAX: Self = DOMAIN_MAX as i64;

    fn parse_token(token: &str) -> Option<Self> {
        token.parse().ok()
    }
}

impl RangeValue for f64 {
    const DOMAIN: Domain = Domain::Real;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const MAX: Self = DOMAIN_MAX as f64;

    fn parse_token(token: &str) -> Option<Self> {
        token.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// A parsed threshold range. `low <= high` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec<T> {
    low: T,
    high: T,
    inverse: bool,
    source: String,
}

/// Range over integer measurements (process counts and the like).
pub type IntRange = RangeSpec<i64>;

/// Range over real-valued measurements (load averages, percentages).
pub type RealRange = RangeSpec<f64>;

impl<T: RangeValue> RangeSpec<T> {
    /// Parse a range specification string.
    pub fn parse(spec: &str) -> Result<Self, RangeParseError> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(RangeParseError::new(spec, "empty specification"));
        }

        let (min, max) = match trimmed.strip_prefix('@') {
            None => (T::ZERO, Self::bound(spec, trimmed)?),
            Some(body) => {
                let (lo, hi) = body
                    .split_once(':')
                    .ok_or_else(|| RangeParseError::new(spec, "missing ':' separator after '@'"))?;
                let (lo, hi) = (lo.trim(), hi.trim());
                let min = if lo.is_empty() { T::ONE } else { Self::bound(spec, lo)? };
                let max = if hi.is_empty() { T::MAX } else { Self::bound(spec, hi)? };
                (min, max)
            }
        };

        let (low, high, inverse) = if min > max {
            (max, min, true)
        } else {
            (min, max, false)
        };

        Ok(Self {
            low,
            high,
            inverse,
            source: trimmed.to_string(),
        })
    }

    fn bound(spec: &str, token: &str) -> Result<T, RangeParseError> {
        T::parse_token(token).ok_or_else(|| {
            let kind = match T::DOMAIN {
                Domain::Integer => "an integer",
                Domain::Real => "a real number",
            };
            RangeParseError::new(spec, format!("bound {token:?} is not {kind}"))
        })
    }

    /// Whether `value` is acceptable under this range.
    pub fn contains(&self, value: T) -> bool {
        if self.inverse {
            value < self.low || value > self.high
        } else {
            self.low <= value && value <= self.high
        }
    }

    pub fn low(&self) -> T {
        self.low
    }

    pub fn high(&self) -> T {
        self.high
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    pub fn domain(&self) -> Domain {
        T::DOMAIN
    }

    /// The specification string this range was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl<T: RangeValue> FromStr for RangeSpec<T> {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<T> fmt::Display for RangeSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A warning/critical pair checked against the same measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds<T> {
    pub warn: RangeSpec<T>,
    pub critical: RangeSpec<T>,
}

impl<T: RangeValue> Thresholds<T> {
    pub fn new(warn: RangeSpec<T>, critical: RangeSpec<T>) -> Self {
        Self { warn, critical }
    }

    /// Status earned by `value`. Warning is checked before critical so a
    /// value outside both ranges ends at CRITICAL.
    pub fn evaluate(&self, value: T) -> Status {
        let mut status = Status::Ok;
        if !self.warn.contains(value) {
            status = status.escalate(Status::Warn);
        }
        if !self.critical.contains(value) {
            status = status.escalate(Status::Critical);
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: i64 = 4_294_967_295;

    #[test]
    fn bare_number_starts_at_zero() {
        let one = IntRange::parse("1").unwrap();
        assert!(one.contains(0));
        assert!(one.contains(1));
        assert!(!one.contains(2));

        let ten = IntRange::parse("10").unwrap();
        assert_eq!((ten.low(), ten.high(), ten.is_inverse()), (0, 10, false));
        for v in -5..=15 {
            assert_eq!(ten.contains(v), (0..=10).contains(&v), "value {v}");
        }
    }

    #[test]
    fn bare_number_property_holds_for_many_sizes() {
        for n in [0i64, 1, 7, 100, 65_535, MAX] {
            let range = IntRange::parse(&n.to_string()).unwrap();
            assert_eq!((range.low(), range.high(), range.is_inverse()), (0, n, false));
            for v in [-1, 0, n / 2, n, n + 1] {
                assert_eq!(range.contains(v), 0 <= v && v <= n, "n={n} v={v}");
            }
        }
    }

    #[test]
    fn explicit_bounds() {
        let range = IntRange::parse("@1:10").unwrap();
        assert_eq!((range.low(), range.high(), range.is_inverse()), (1, 10, false));
        assert!(range.contains(1));
        assert!(range.contains(5));
        assert!(range.contains(10));
        assert!(!range.contains(0));
        assert!(!range.contains(11));
    }

    #[test]
    fn omitted_low_defaults_to_one() {
        let range = IntRange::parse("@:10").unwrap();
        assert_eq!((range.low(), range.high()), (1, 10));
        assert!(!range.contains(0));
        assert!(range.contains(1));
        assert!(range.contains(10));
        assert!(!range.contains(11));
    }

    #[test]
    fn omitted_high_defaults_to_domain_max() {
        let range = IntRange::parse("@10:").unwrap();
        assert_eq!((range.low(), range.high()), (10, MAX));
        assert!(range.contains(MAX));
        assert!(range.contains(11));
        assert!(!range.contains(9));
        assert!(!range.contains(MAX + 1));
    }

    #[test]
    fn both_omitted() {
        let range = IntRange::parse("@:").unwrap();
        assert_eq!((range.low(), range.high(), range.is_inverse()), (1, MAX, false));
        assert!(!range.contains(0));
        assert!(range.contains(1));
        assert!(range.contains(11));
        assert!(!range.contains(MAX + 1));
    }

    #[test]
    fn reversed_bounds_are_swapped_and_inverted() {
        let range = IntRange::parse("@10:1").unwrap();
        assert_eq!((range.low(), range.high(), range.is_inverse()), (1, 10, true));
        assert!(range.contains(0));
        assert!(range.contains(11));
        assert!(!range.contains(1));
        assert!(!range.contains(5));
        assert!(!range.contains(10));
    }

    #[test]
    fn negative_bounds() {
        let range = IntRange::parse("@-10:12").unwrap();
        assert_eq!((range.low(), range.high()), (-10, 12));
        assert!(range.contains(-10));
        assert!(range.contains(12));
        assert!(!range.contains(-11));
        assert!(!range.contains(13));
    }

    #[test]
    fn bare_negative_number_is_normalized() {
        let range = IntRange::parse("-5").unwrap();
        assert_eq!((range.low(), range.high(), range.is_inverse()), (-5, 0, true));
    }

    #[test]
    fn non_numeric_bounds_are_rejected() {
        assert!(IntRange::parse("@a:b").is_err());
        assert!(IntRange::parse("@1:b").is_err());
        assert!(IntRange::parse("ten").is_err());
        assert!(IntRange::parse("1.5").is_err());
        assert!(IntRange::parse("").is_err());
        assert!(IntRange::parse("@5").is_err());

        let err = IntRange::parse("@a:b").unwrap_err();
        assert_eq!(err.input, "@a:b");
        assert!(err.reason.contains("\"a\""));
    }

    #[test]
    fn real_ranges_follow_the_same_grammar() {
        let one = RealRange::parse("1").unwrap();
        assert_eq!((one.low(), one.high()), (0.0, 1.0));
        assert!(one.contains(1.0));
        assert!(!one.contains(1.01));
        assert!(!one.contains(-0.01));

        let band = RealRange::parse("@1.5:10").unwrap();
        assert!(band.contains(1.5));
        assert!(!band.contains(1.49));

        let open = RealRange::parse("@10:").unwrap();
        assert_eq!(open.high(), MAX as f64);
        assert!(open.contains(MAX as f64));
        assert!(!open.contains(9.99));

        let inverse = RealRange::parse("@10:1").unwrap();
        assert!(inverse.is_inverse());
        assert!(inverse.contains(0.5));
        assert!(inverse.contains(10.5));
        assert!(!inverse.contains(5.0));

        let negative = RealRange::parse("@-10:12").unwrap();
        assert!(negative.contains(-10.0));
        assert!(!negative.contains(12.5));

        assert_eq!(RealRange::parse("@:10").unwrap().low(), 1.0);
        assert_eq!(negative.domain(), Domain::Real);
        assert!(RealRange::parse("@a:b").is_err());
        assert!(RealRange::parse("nan").is_err());
        assert!(RealRange::parse("@1:inf").is_err());
    }

    #[test]
    fn from_str_and_display_keep_the_source() {
        let range: IntRange = " @10:1 ".parse().unwrap();
        assert_eq!(range.to_string(), "@10:1");
        assert_eq!(range.as_str(), "@10:1");
        assert_eq!(range.domain(), Domain::Integer);
    }

    #[test]
    fn thresholds_critical_wins_when_both_fail() {
        let thresholds = Thresholds::new(
            RealRange::parse("5").unwrap(),
            RealRange::parse("10").unwrap(),
        );
        assert_eq!(thresholds.evaluate(3.0), Status::Ok);
        assert_eq!(thresholds.evaluate(7.0), Status::Warn);
        assert_eq!(thresholds.evaluate(12.0), Status::Critical);
    }
}
