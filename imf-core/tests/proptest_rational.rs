//! Property-based tests for edit-rate arithmetic.

use imf_core::Rational;
use proptest::prelude::*;

// =============================================================================
// Ordering and reduction
// =============================================================================

proptest! {
    /// Reduction never changes the value a rational denotes.
    #[test]
    fn reduce_preserves_value(num in -1_000_000i64..1_000_000, den in 1i64..1_000_000) {
        let r = Rational::new(num, den);
        prop_assert_eq!(r.reduce().cmp(&r), std::cmp::Ordering::Equal);
    }

    /// Addition then subtraction returns to the starting value.
    #[test]
    fn add_sub_inverse(a in -10_000i64..10_000, b in 1i64..10_000, c in -10_000i64..10_000, d in 1i64..10_000) {
        let x = Rational::new(a, b);
        let y = Rational::new(c, d);
        prop_assert_eq!((x + y) - y, x.reduce());
    }
}

// =============================================================================
// Edit-unit conversion
// =============================================================================

proptest! {
    /// Scaling both the edit rate and the unit count by the same factor
    /// denotes the same instant.
    #[test]
    fn units_to_seconds_scale_invariant(
        num in 1i64..120_000,
        den in 1i64..1_002,
        units in 0u64..1_000_000,
        k in 1u64..8,
    ) {
        let base = Rational::edit_rate(num, den).unwrap();
        let scaled = Rational::edit_rate(num * k as i64, den).unwrap();
        prop_assert_eq!(
            base.units_to_seconds(units).unwrap(),
            scaled.units_to_seconds(units * k).unwrap()
        );
    }

    /// Conversion is additive over adjacent unit ranges.
    #[test]
    fn units_to_seconds_additive(num in 1i64..120_000, den in 1i64..1_002, a in 0u64..100_000, b in 0u64..100_000) {
        let rate = Rational::edit_rate(num, den).unwrap();
        let sum = rate.units_to_seconds(a).unwrap() + rate.units_to_seconds(b).unwrap();
        prop_assert_eq!(sum, rate.units_to_seconds(a + b).unwrap());
    }
}
