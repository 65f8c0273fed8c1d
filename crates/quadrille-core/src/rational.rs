//! Exact rational arithmetic.
//!
//! Every value the solver touches is an exact reduced fraction, so equality
//! tests stay exact across arbitrarily long incremental sessions. The type
//! itself comes from `num-rational`; this module adds the handful of
//! constructors the rest of the engine uses.

use num_bigint::BigInt;

/// The numeric type used throughout the engine: an arbitrary-precision
/// reduced fraction.
pub type Rational = num_rational::BigRational;

/// A whole-number rational.
pub fn int(n: i64) -> Rational {
    Rational::from_integer(BigInt::from(n))
}

/// The reduced fraction `numer / denom`.
///
/// Panics if `denom` is zero, like the underlying `Ratio` constructor.
pub fn fraction(numer: i64, denom: i64) -> Rational {
    Rational::new(BigInt::from(numer), BigInt::from(denom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn fractions_reduce() {
        assert_eq!(fraction(17, 34), fraction(1, 2));
        assert_eq!(fraction(-4, 8), fraction(1, -2));
    }

    #[test]
    fn exact_arithmetic() {
        let third = fraction(1, 3);
        let sum = &third + &third + &third;
        assert_eq!(sum, int(1));
        assert!((&sum - int(1)).is_zero());
    }
}
