//! # Sale Prices
//!
//! `Money` holds a price as a whole number of cents, mirroring the
//! `NUMERIC(10, 2)` column the price belongs in: ten significant digits, two
//! of them after the point.
//!
//! ```text
//! "50.05"  → 5005
//! "16"     → 1600
//! "0.125"  → 13      extra digits round half away from zero
//! "1e3"    → InvalidFormat
//! "100000000" → OutOfRange (nine integer digits)
//! ```
//!
//! ## Usage
//! ```rust
//! use bookstore_core::money::Money;
//!
//! let price = Money::parse("50.05").unwrap();
//! assert_eq!(price.cents(), 5005);
//! assert_eq!(price.to_string(), "50.05");
//!
//! // Revenue for three copies
//! assert_eq!(price.checked_mul(3), Some(Money::from_cents(15015)));
//! assert_eq!(price.checked_mul(i64::MAX), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::{MAX_PRICE_CENTS, PRICE_PRECISION, PRICE_SCALE};

// =============================================================================
// Money Type
// =============================================================================

/// A price in cents.
///
/// Signed so that `"-1"` parses and is then refused by
/// [`validate_price`](crate::validation::validate_price) with a range error
/// rather than a format error. Stored as INTEGER; SQLite has no fixed-point
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Wraps a cent amount.
    ///
    /// ## Example
    /// ```rust
    /// use bookstore_core::money::Money;
    ///
    /// let price = Money::from_cents(999); // 9.99
    /// assert_eq!(price.cents(), 999);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal string into Money.
    ///
    /// ## Rules
    /// - Optional leading sign, digits, optional `.` and fractional digits
    /// - More than two fractional digits are rounded half away from zero
    /// - At most eight integer digits (`NUMERIC(10, 2)`)
    ///
    /// ## Example
    /// ```rust
    /// use bookstore_core::money::Money;
    ///
    /// assert_eq!(Money::parse("9.99").unwrap().cents(), 999);
    /// assert_eq!(Money::parse("9.995").unwrap().cents(), 1000);
    /// assert_eq!(Money::parse(".5").unwrap().cents(), 50);
    /// assert_eq!(Money::parse("-1").unwrap().cents(), -100);
    /// assert!(Money::parse("abc").is_err());
    /// assert!(Money::parse("123456789").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let s = input.trim();
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(ValidationError::invalid_format("price", "expected a decimal number"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ValidationError::invalid_format(
                "price",
                format!("'{}' is not a decimal number", input),
            ));
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() > (PRICE_PRECISION - PRICE_SCALE) as usize {
            return Err(out_of_range());
        }
        // At most eight digits, cannot overflow
        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| out_of_range())?
        };

        let mut digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let cents = whole_value * 100 + tenths * 10 + hundredths + i64::from(round_up);
        if cents > MAX_PRICE_CENTS {
            return Err(out_of_range());
        }

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Price of `qty` copies, or `None` when it overflows `i64`.
    #[inline]
    pub fn checked_mul(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole units, truncated toward zero.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Cents past the whole units, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Below zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

fn out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "price".to_string(),
        min: 0,
        max: MAX_PRICE_CENTS / 100,
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Formats as a plain two-decimal number (`50.05`), the way a NUMERIC(10, 2)
/// column prints.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}


// =============================================================================
// Unit Tests
// =============================================================================
