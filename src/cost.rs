//! Path cost values
//!
//! Search algorithms accumulate the cost of a path (`g`) and combine it with a
//! heuristic estimate (`h`) into an f-value. Both sides share one value type
//! implementing [`Cost`]: a totally ordered additive monoid with a designated
//! `zero` and an absorbing `infinity`.
//!
//! `Cost` is implemented for every primitive integer type and for
//! [`DoubleCost`], a NaN-free `f64` wrapper.
//!
//! Costs are expected to be non-negative. This is not checked, but the
//! optimality guarantees of the solvers rely on it.

use crate::error::CostError;
use num_traits::{Bounded, SaturatingAdd, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// Trait for types that can be used as path costs.
///
/// `combine` must saturate at [`Cost::infinity`]: adding anything to an
/// infinite cost yields an infinite cost.
pub trait Cost: Copy + Ord + fmt::Debug {
    /// The identity of [`Cost::combine`].
    fn zero() -> Self;

    /// The largest cost, used for dead ends and unbounded search limits.
    fn infinity() -> Self;

    /// Adds two costs, saturating at infinity.
    fn combine(self, other: Self) -> Self;

    /// Returns true if this cost equals [`Cost::infinity`].
    #[inline]
    fn is_infinite(self) -> bool {
        self == Self::infinity()
    }
}

macro_rules! impl_integer_cost {
    ($($t:ty),* $(,)?) => {
        $(
            impl Cost for $t {
                #[inline]
                fn zero() -> Self {
                    <$t as Zero>::zero()
                }

                #[inline]
                fn infinity() -> Self {
                    <$t as Bounded>::max_value()
                }

                #[inline]
                fn combine(self, other: Self) -> Self {
                    SaturatingAdd::saturating_add(&self, &other)
                }
            }
        )*
    };
}

impl_integer_cost!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// A floating point cost with a total order.
///
/// NaN is rejected at construction and `-0.0` is normalized to `0.0`, so
/// equality and ordering agree.
///
/// # Example
///
/// ```rust
/// use informed_search::cost::{Cost, DoubleCost};
///
/// let a = DoubleCost::new(0.5).unwrap();
/// let b = DoubleCost::new(1.5).unwrap();
/// assert_eq!(a.combine(b), DoubleCost::new(2.0).unwrap());
/// assert!(DoubleCost::new(f64::NAN).is_err());
/// assert!(DoubleCost::infinity().combine(a).is_infinite());
/// ```
#[derive(Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DoubleCost(f64);

impl DoubleCost {
    /// Creates a cost, rejecting NaN.
    pub fn new(value: f64) -> Result<Self, CostError> {
        if value.is_nan() {
            return Err(CostError::NotANumber);
        }
        // -0.0 + 0.0 == +0.0
        Ok(DoubleCost(value + 0.0))
    }

    /// Returns the wrapped value.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for DoubleCost {
    type Error = CostError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        DoubleCost::new(value)
    }
}

impl From<DoubleCost> for f64 {
    fn from(cost: DoubleCost) -> f64 {
        cost.0
    }
}

impl From<u32> for DoubleCost {
    fn from(value: u32) -> Self {
        DoubleCost(f64::from(value))
    }
}

impl PartialEq for DoubleCost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DoubleCost {}

impl PartialOrd for DoubleCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DoubleCost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for DoubleCost {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Add for DoubleCost {
    type Output = DoubleCost;

    fn add(self, rhs: Self) -> Self::Output {
        self.combine(rhs)
    }
}

impl Zero for DoubleCost {
    fn zero() -> Self {
        DoubleCost(0.0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Bounded for DoubleCost {
    fn min_value() -> Self {
        DoubleCost(f64::NEG_INFINITY)
    }

    fn max_value() -> Self {
        DoubleCost(f64::INFINITY)
    }
}

impl Cost for DoubleCost {
    #[inline]
    fn zero() -> Self {
        <DoubleCost as Zero>::zero()
    }

    #[inline]
    fn infinity() -> Self {
        <DoubleCost as Bounded>::max_value()
    }

    #[inline]
    fn combine(self, other: Self) -> Self {
        if self.is_infinite() || other.is_infinite() {
            return Self::infinity();
        }
        // Finite, non-NaN operands cannot produce NaN.
        DoubleCost(self.0 + other.0 + 0.0)
    }
}

impl fmt::Debug for DoubleCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for DoubleCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
