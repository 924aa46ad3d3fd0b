//! Expiry policy: relative duration specs such as `"15m"` or `"7d"`.
//!
//! A [`DurationSpec`] is parsed once, when the keyring is configured, so a
//! malformed spec fails at startup. Computing an expiry from it is pure
//! integer arithmetic on Unix seconds.

use std::fmt;
use std::str::FromStr;

use crate::error::TokenError;

/// Unit of a duration spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    /// `s`, `sec`, `second`.
    Seconds,
    /// `m`, `min`, `minute`.
    Minutes,
    /// `h`, `hr`, `hour`.
    Hours,
    /// `d`, `day`.
    Days,
    /// `w`, `wk`, `week`.
    Weeks,
}

impl DurationUnit {
    /// Number of seconds in one unit.
    #[must_use]
    pub fn seconds(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Days => 24 * 60 * 60,
            Self::Weeks => 7 * 24 * 60 * 60,
        }
    }

    /// Short suffix used when formatting a spec.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
            Self::Days => "d",
            Self::Weeks => "w",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Self::Seconds,
            "m" | "min" | "mins" | "minute" | "minutes" => Self::Minutes,
            "h" | "hr" | "hrs" | "hour" | "hours" => Self::Hours,
            "d" | "day" | "days" => Self::Days,
            "w" | "wk" | "wks" | "week" | "weeks" => Self::Weeks,
            _ => return None,
        };
        Some(unit)
    }
}

/// A relative token lifetime: a non-negative magnitude and a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DurationSpec {
    magnitude: u64,
    unit: DurationUnit,
    seconds: i64,
}

impl DurationSpec {
    /// Parses a spec such as `"15m"`, `"7d"` or `"2 hours"`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidDuration`] for empty input, a missing or
    /// unknown unit, signs, fractions, or a lifetime that does not fit in
    /// an `i64` of seconds.
    pub fn parse(spec: &str) -> Result<Self, TokenError> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(TokenError::invalid_duration(spec, "duration is empty"));
        }

        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, rest) = trimmed.split_at(split);
        if digits.is_empty() {
            return Err(TokenError::invalid_duration(
                spec,
                "expected a whole number followed by a unit",
            ));
        }

        let suffix = rest.trim_start();
        if suffix.is_empty() {
            return Err(TokenError::invalid_duration(
                spec,
                "missing unit (expected one of s, m, h, d, w)",
            ));
        }
        let unit = DurationUnit::from_suffix(suffix).ok_or_else(|| {
            TokenError::invalid_duration(spec, format!("unknown unit '{suffix}'"))
        })?;

        let magnitude: u64 = digits
            .parse()
            .map_err(|_| TokenError::invalid_duration(spec, "magnitude is too large"))?;
        let seconds = magnitude
            .checked_mul(unit.seconds())
            .and_then(|s| i64::try_from(s).ok())
            .ok_or_else(|| TokenError::invalid_duration(spec, "duration is too large"))?;

        Ok(Self {
            magnitude,
            unit,
            seconds,
        })
    }

    /// The magnitude as written.
    #[must_use]
    pub fn magnitude(&self) -> u64 {
        self.magnitude
    }

    /// The unit as written.
    #[must_use]
    pub fn unit(&self) -> DurationUnit {
        self.unit
    }

    /// Total length in seconds.
    #[must_use]
    pub fn as_seconds(&self) -> i64 {
        self.seconds
    }

    /// Absolute expiry for a token issued at `issued_at` (Unix seconds).
    ///
    /// Saturates at `i64::MAX` rather than wrapping.
    #[must_use]
    pub fn expires_at(&self, issued_at: i64) -> i64 {
        issued_at.saturating_add(self.seconds)
    }
}

impl FromStr for DurationSpec {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

/// Computes the absolute expiry of a token issued at `issued_at`.
///
/// # Errors
///
/// Returns [`TokenError::InvalidDuration`] if `duration_spec` is malformed.
pub fn compute_expiry(issued_at: i64, duration_spec: &str) -> Result<i64, TokenError> {
    DurationSpec::parse(duration_spec).map(|spec| spec.expires_at(issued_at))
}
