//! Constraint strengths.
//!
//! A strength is a three-level lexicographic priority: required beats
//! strong beats medium beats weak, and no combination of weaker
//! constraints can outweigh a single stronger one. For the objective row
//! the triple collapses into a single rational coefficient using a radix
//! large enough that the levels cannot interfere for any realistic
//! constraint weight.

use num_bigint::BigInt;

use crate::rational::Rational;

/// Radix separating the three levels in the collapsed coefficient.
const LEVEL_RADIX: i64 = 1_000_000;

/// A lexicographic weight triple: `[strong, medium, weak]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolicWeight([i64; 3]);

impl SymbolicWeight {
    pub const fn new(levels: [i64; 3]) -> Self {
        Self(levels)
    }

    pub fn levels(self) -> [i64; 3] {
        self.0
    }

    /// Collapse the triple into one exact rational, scaled by the
    /// constraint weight: `Σ levelᵢ · RADIX^(2-i) · weight`.
    pub fn collapse(self, weight: &Rational) -> Rational {
        let radix = BigInt::from(LEVEL_RADIX);
        let mut total = BigInt::from(0);
        for level in self.0 {
            total = total * &radix + BigInt::from(level);
        }
        Rational::from_integer(total) * weight
    }
}

/// A named constraint priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Strength(SymbolicWeight);

impl Strength {
    /// Must hold; conflicts among required constraints are reported as
    /// failures rather than absorbed as error.
    pub const REQUIRED: Strength = Strength(SymbolicWeight::new([1_000, 1_000, 1_000]));
    pub const STRONG: Strength = Strength(SymbolicWeight::new([1, 0, 0]));
    pub const MEDIUM: Strength = Strength(SymbolicWeight::new([0, 1, 0]));
    pub const WEAK: Strength = Strength(SymbolicWeight::new([0, 0, 1]));

    pub fn is_required(self) -> bool {
        self == Self::REQUIRED
    }

    pub fn symbolic_weight(self) -> SymbolicWeight {
        self.0
    }

    /// The objective-row coefficient for an error variable of a constraint
    /// with this strength and the given weight.
    pub fn coefficient(self, weight: &Rational) -> Rational {
        self.0.collapse(weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::int;

    #[test]
    fn lexicographic_order() {
        assert!(Strength::REQUIRED > Strength::STRONG);
        assert!(Strength::STRONG > Strength::MEDIUM);
        assert!(Strength::MEDIUM > Strength::WEAK);
    }

    #[test]
    fn collapse_keeps_levels_apart() {
        // A heavily weighted weak constraint still collapses below a
        // unit-weight medium one.
        let weak = Strength::WEAK.coefficient(&int(999_999));
        let medium = Strength::MEDIUM.coefficient(&int(1));
        assert!(weak < medium);

        let medium = Strength::MEDIUM.coefficient(&int(999_999));
        let strong = Strength::STRONG.coefficient(&int(1));
        assert!(medium < strong);
    }

    #[test]
    fn collapse_scales_by_weight() {
        let one = Strength::WEAK.coefficient(&int(1));
        let five = Strength::WEAK.coefficient(&int(5));
        assert_eq!(five, one * int(5));
    }

    #[test]
    fn required_dominates() {
        let required = Strength::REQUIRED.coefficient(&int(1));
        let strong = Strength::STRONG.coefficient(&int(1_000_000));
        assert!(required > strong);
    }
}
