//! Rational number type for exact edit-rate and position arithmetic.
//!
//! Source positions in IMF are counted in edit units of a track's edit rate.
//! Comparing positions across tracks with different edit rates needs exact
//! arithmetic, so everything here stays in integers and intermediate products
//! are widened to `i128`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A rational number represented as a numerator and denominator.
///
/// Values built through the arithmetic operators and [`Rational::reduce`]
/// are kept in lowest terms, so derived equality is exact equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    /// Numerator
    pub num: i64,
    /// Denominator (always positive)
    pub den: i64,
}

/// Edit rate of a track or resource, in edit units per second.
pub type EditRate = Rational;

impl Rational {
    /// Create a new rational number.
    ///
    /// # Panics
    ///
    /// Panics if denominator is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "Denominator cannot be zero");
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        Self { num, den }
    }

    /// Create a rational, rejecting a zero denominator.
    pub fn try_new(num: i64, den: i64) -> Result<Self> {
        if den == 0 {
            return Err(Error::InvalidRational { num, den });
        }
        Ok(Self::new(num, den))
    }

    /// Create an edit rate, requiring both terms to be strictly positive.
    pub fn edit_rate(num: i64, den: i64) -> Result<EditRate> {
        if num <= 0 || den <= 0 {
            return Err(Error::InvalidEditRate { num, den });
        }
        Ok(Self { num, den })
    }

    /// Create a rational from an integer.
    pub fn from_int(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// Create a zero rational.
    pub const fn zero() -> Self {
        Self { num: 0, den: 1 }
    }

    /// Reduce the rational to its simplest form.
    pub fn reduce(&self) -> Self {
        reduce_or_saturate(self.num as i128, self.den as i128)
    }

    /// Time in seconds covered by `units` edit units at this edit rate.
    ///
    /// The result is reduced, so positions expressed at different edit rates
    /// compare equal exactly when they denote the same instant.
    pub fn units_to_seconds(&self, units: u64) -> Result<Rational> {
        // units / (num / den) == units * den / num
        let num = units as i128 * self.den as i128;
        from_i128(num, self.num as i128)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let num = self.num as i128 * rhs.den as i128 + rhs.num as i128 * self.den as i128;
        let den = self.den as i128 * rhs.den as i128;
        reduce_or_saturate(num, den)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let num = self.num as i128 * rhs.den as i128 - rhs.num as i128 * self.den as i128;
        let den = self.den as i128 * rhs.den as i128;
        reduce_or_saturate(num, den)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let num = self.num as i128 * rhs.num as i128;
        let den = self.den as i128 * rhs.den as i128;
        reduce_or_saturate(num, den)
    }
}

/// Build a reduced rational from wide terms, failing if it does not fit.
fn from_i128(num: i128, den: i128) -> Result<Rational> {
    if den == 0 {
        return Err(Error::InvalidRational {
            num: num as i64,
            den: 0,
        });
    }
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let g = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1) as i128;
    let (num, den) = (num / g, den / g);
    let num = i64::try_from(num).map_err(|_| Error::Overflow(format!("{}/{}", num, den)))?;
    let den = i64::try_from(den).map_err(|_| Error::Overflow(format!("{}/{}", num, den)))?;
    Ok(Rational { num, den })
}

fn reduce_or_saturate(num: i128, den: i128) -> Rational {
    match from_i128(num, den) {
        Ok(r) => r,
        Err(_) if (num < 0) != (den < 0) => Rational::from_int(i64::MIN),
        Err(_) => Rational::from_int(i64::MAX),
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
