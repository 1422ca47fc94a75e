//! The numeric tower: arbitrary-precision integers, normalized rationals, and
//! IEEE-754 doubles, combined under a single promotion rule.
//!
//! Precedence (lowest = most specific): Integer(1) < Rational(2) < Inexact(4).
//! Binary operators widen to the less-specific operand before computing.

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LispNumber {
    Integer(BigInt),
    /// Always in lowest terms, denominator > 1. A ratio that reduces to an
    /// integer is never stored here — see `Rational::new`.
    Rational(BigRational),
    Inexact(f64),
}

impl LispNumber {
    pub fn from_i64(n: i64) -> Self {
        LispNumber::Integer(BigInt::from(n))
    }

    /// Builds a rational from a numerator/denominator pair, normalizing to an
    /// `Integer` when the reduced denominator is 1. Denominator must be > 0;
    /// callers (the lexer) reject negative denominators before this is reached.
    pub fn rational(num: BigInt, den: BigInt) -> Self {
        debug_assert!(den > BigInt::zero());
        let ratio = BigRational::new(num, den);
        if ratio.is_integer() {
            LispNumber::Integer(ratio.to_integer())
        } else {
            LispNumber::Rational(ratio)
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            LispNumber::Integer(_) => 1,
            LispNumber::Rational(_) => 2,
            LispNumber::Inexact(_) => 4,
        }
    }

    pub fn is_exact(&self) -> bool {
        !matches!(self, LispNumber::Inexact(_))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            LispNumber::Integer(i) => i.to_f64().unwrap_or(f64::NAN),
            LispNumber::Rational(r) => r.to_f64().unwrap_or(f64::NAN),
            LispNumber::Inexact(f) => *f,
        }
    }

    fn to_ratio(&self) -> BigRational {
        match self {
            LispNumber::Integer(i) => BigRational::from_integer(i.clone()),
            LispNumber::Rational(r) => r.clone(),
            LispNumber::Inexact(_) => unreachable!("exact-only path"),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            LispNumber::Integer(i) => i.is_zero(),
            LispNumber::Rational(r) => r.is_zero(),
            LispNumber::Inexact(f) => *f == 0.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            LispNumber::Integer(i) => i.is_negative(),
            LispNumber::Rational(r) => r.is_negative(),
            LispNumber::Inexact(f) => *f < 0.0,
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            LispNumber::Integer(i) => i.is_positive(),
            LispNumber::Rational(r) => r.is_positive(),
            LispNumber::Inexact(f) => *f > 0.0,
        }
    }

    /// Value-based test per the spec's adopted resolution of the
    /// integer?-across-representations open question: true for any
    /// Number whose mathematical value is an integer, not just the
    /// `Integer` variant.
    pub fn is_integer_valued(&self) -> bool {
        match self {
            LispNumber::Integer(_) => true,
            LispNumber::Rational(_) => false,
            LispNumber::Inexact(f) => f.fract() == 0.0 && f.is_finite(),
        }
    }

    pub fn negate(&self) -> LispNumber {
        match self {
            LispNumber::Integer(i) => LispNumber::Integer(-i),
            LispNumber::Rational(r) => LispNumber::Rational(-r),
            LispNumber::Inexact(f) => LispNumber::Inexact(-f),
        }
    }

    fn widen_pair(a: &LispNumber, b: &LispNumber) -> (LispNumber, LispNumber) {
        if a.precedence() >= b.precedence() {
            (a.clone(), Self::coerce_to(b, a))
        } else {
            (Self::coerce_to(a, b), b.clone())
        }
    }

    fn coerce_to(value: &LispNumber, target_repr: &LispNumber) -> LispNumber {
        match target_repr {
            LispNumber::Inexact(_) => LispNumber::Inexact(value.to_f64()),
            LispNumber::Rational(_) => LispNumber::Rational(value.to_ratio()),
            LispNumber::Integer(_) => value.clone(),
        }
    }

    pub fn add(&self, other: &LispNumber) -> LispNumber {
        let (a, b) = Self::widen_pair(self, other);
        match (a, b) {
            (LispNumber::Integer(x), LispNumber::Integer(y)) => LispNumber::Integer(x + y),
            (LispNumber::Rational(x), LispNumber::Rational(y)) => {
                Self::from_ratio(x + y)
            }
            (LispNumber::Inexact(x), LispNumber::Inexact(y)) => LispNumber::Inexact(x + y),
            _ => unreachable!("widen_pair always produces matching variants"),
        }
    }

    pub fn sub(&self, other: &LispNumber) -> LispNumber {
        let (a, b) = Self::widen_pair(self, other);
        match (a, b) {
            (LispNumber::Integer(x), LispNumber::Integer(y)) => LispNumber::Integer(x - y),
            (LispNumber::Rational(x), LispNumber::Rational(y)) => Self::from_ratio(x - y),
            (LispNumber::Inexact(x), LispNumber::Inexact(y)) => LispNumber::Inexact(x - y),
            _ => unreachable!("widen_pair always produces matching variants"),
        }
    }

    pub fn mul(&self, other: &LispNumber) -> LispNumber {
        // Fast path: an Integer(0) operand short-circuits the product to Integer(0),
        // regardless of the other operand's representation.
        if matches!(self, LispNumber::Integer(x) if x.is_zero())
            || matches!(other, LispNumber::Integer(y) if y.is_zero())
        {
            return LispNumber::Integer(BigInt::zero());
        }
        let (a, b) = Self::widen_pair(self, other);
        match (a, b) {
            (LispNumber::Integer(x), LispNumber::Integer(y)) => LispNumber::Integer(x * y),
            (LispNumber::Rational(x), LispNumber::Rational(y)) => Self::from_ratio(x * y),
            (LispNumber::Inexact(x), LispNumber::Inexact(y)) => LispNumber::Inexact(x * y),
            _ => unreachable!("widen_pair always produces matching variants"),
        }
    }

    /// `None` signals division by zero; the caller attributes position/name.
    pub fn div(&self, other: &LispNumber) -> Option<LispNumber> {
        if other.is_zero() && other.is_exact() {
            return None;
        }
        let (a, b) = Self::widen_pair(self, other);
        Some(match (a, b) {
            (LispNumber::Integer(x), LispNumber::Integer(y)) => {
                Self::from_ratio(BigRational::new(x, y))
            }
            (LispNumber::Rational(x), LispNumber::Rational(y)) => Self::from_ratio(x / y),
            (LispNumber::Inexact(x), LispNumber::Inexact(y)) => LispNumber::Inexact(x / y),
            _ => unreachable!("widen_pair always produces matching variants"),
        })
    }

    pub fn modulo(&self, other: &LispNumber) -> Option<LispNumber> {
        if other.is_zero() {
            return None;
        }
        match (self, other) {
            (LispNumber::Integer(x), LispNumber::Integer(y)) => {
                Some(LispNumber::Integer(x.mod_floor(y)))
            }
            _ => {
                let x = self.to_f64();
                let y = other.to_f64();
                Some(LispNumber::Inexact(x.rem_euclid(y)))
            }
        }
    }

    pub fn gcd(&self, other: &LispNumber) -> Option<LispNumber> {
        match (self, other) {
            (LispNumber::Integer(x), LispNumber::Integer(y)) => {
                Some(LispNumber::Integer(x.gcd(y)))
            }
            _ => None,
        }
    }

    pub fn lcm(&self, other: &LispNumber) -> Option<LispNumber> {
        match (self, other) {
            (LispNumber::Integer(x), LispNumber::Integer(y)) => {
                Some(LispNumber::Integer(x.lcm(y)))
            }
            _ => None,
        }
    }

    fn from_ratio(r: BigRational) -> LispNumber {
        if r.is_integer() {
            LispNumber::Integer(r.to_integer())
        } else {
            LispNumber::Rational(r)
        }
    }

    /// Equality across exactness: `(= 1 1.0)` and `(= 1/2 0.5)` are both true.
    pub fn numeric_eq(&self, other: &LispNumber) -> bool {
        match (self, other) {
            (LispNumber::Inexact(_), _) | (_, LispNumber::Inexact(_)) => {
                self.to_f64() == other.to_f64()
            }
            _ => self.to_ratio() == other.to_ratio(),
        }
    }

    pub fn numeric_cmp(&self, other: &LispNumber) -> std::cmp::Ordering {
        match (self, other) {
            (LispNumber::Inexact(_), _) | (_, LispNumber::Inexact(_)) => self
                .to_f64()
                .partial_cmp(&other.to_f64())
                .unwrap_or(std::cmp::Ordering::Equal),
            _ => self.to_ratio().cmp(&other.to_ratio()),
        }
    }

    pub fn abs(&self) -> LispNumber {
        match self {
            LispNumber::Integer(i) => LispNumber::Integer(i.abs()),
            LispNumber::Rational(r) => LispNumber::Rational(r.abs()),
            LispNumber::Inexact(f) => LispNumber::Inexact(f.abs()),
        }
    }

    pub fn sgn(&self) -> LispNumber {
        let s = if self.is_negative() {
            -1
        } else if self.is_zero() {
            0
        } else {
            1
        };
        if self.is_exact() {
            LispNumber::from_i64(s)
        } else {
            LispNumber::Inexact(s as f64)
        }
    }

    pub fn exact_to_inexact(&self) -> LispNumber {
        LispNumber::Inexact(self.to_f64())
    }

    pub fn add1(&self) -> LispNumber {
        self.add(&LispNumber::from_i64(1))
    }

    pub fn sub1(&self) -> LispNumber {
        self.sub(&LispNumber::from_i64(1))
    }

    pub fn ceiling(&self) -> LispNumber {
        match self {
            LispNumber::Integer(_) => self.clone(),
            LispNumber::Rational(r) => LispNumber::Integer(r.ceil().to_integer()),
            LispNumber::Inexact(f) => LispNumber::Inexact(f.ceil()),
        }
    }

    pub fn floor(&self) -> LispNumber {
        match self {
            LispNumber::Integer(_) => self.clone(),
            LispNumber::Rational(r) => LispNumber::Integer(r.floor().to_integer()),
            LispNumber::Inexact(f) => LispNumber::Inexact(f.floor()),
        }
    }

    /// Ties round to even, matching the student language's host (Racket).
    pub fn round(&self) -> LispNumber {
        match self {
            LispNumber::Integer(_) => self.clone(),
            LispNumber::Rational(r) => LispNumber::Integer(r.round().to_integer()),
            LispNumber::Inexact(f) => LispNumber::Inexact(f.round_ties_even()),
        }
    }

    pub fn sqr(&self) -> LispNumber {
        self.mul(self)
    }

    /// Exact for a non-negative Integer perfect square, inexact otherwise.
    pub fn sqrt(&self) -> LispNumber {
        if let LispNumber::Integer(i) = self {
            if !i.is_negative() {
                let root = i.sqrt();
                if &(&root * &root) == i {
                    return LispNumber::Integer(root);
                }
            }
        }
        LispNumber::Inexact(self.to_f64().sqrt())
    }

    pub fn exp(&self) -> LispNumber {
        LispNumber::Inexact(self.to_f64().exp())
    }

    pub fn log(&self) -> LispNumber {
        LispNumber::Inexact(self.to_f64().ln())
    }
}

impl fmt::Display for LispNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LispNumber::Integer(i) => write!(f, "{i}"),
            LispNumber::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            LispNumber::Inexact(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> LispNumber {
        LispNumber::from_i64(n)
    }

    fn rat(n: i64, d: i64) -> LispNumber {
        LispNumber::rational(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn rational_normalizes_to_integer_when_denominator_is_one() {
        assert_eq!(rat(4, 2), int(2));
    }

    #[test]
    fn rational_stays_in_lowest_terms() {
        match rat(2, 4) {
            LispNumber::Rational(r) => {
                assert_eq!(*r.numer(), BigInt::from(1));
                assert_eq!(*r.denom(), BigInt::from(2));
            }
            other => panic!("expected Rational, got {other:?}"),
        }
    }

    #[test]
    fn addition_widens_toward_inexact() {
        let sum = rat(1, 2).add(&LispNumber::Inexact(0.5));
        assert!(matches!(sum, LispNumber::Inexact(_)));
        assert_eq!(sum.to_f64(), 1.0);
    }

    #[test]
    fn half_plus_half_is_exact_one() {
        assert_eq!(rat(1, 2).add(&rat(1, 2)), int(1));
    }

    #[test]
    fn quarter_from_multiplying_halves() {
        match rat(1, 2).mul(&rat(1, 2)) {
            LispNumber::Rational(r) => {
                assert_eq!(*r.numer(), BigInt::from(1));
                assert_eq!(*r.denom(), BigInt::from(4));
            }
            other => panic!("expected 1/4, got {other:?}"),
        }
    }

    #[test]
    fn numeric_eq_crosses_exactness() {
        assert!(int(1).numeric_eq(&LispNumber::Inexact(1.0)));
        assert!(rat(1, 2).numeric_eq(&LispNumber::Inexact(0.5)));
    }

    #[test]
    fn exact_predicate_distinguishes_representation() {
        assert!(!LispNumber::Inexact(0.5).is_exact());
        assert!(rat(1, 2).is_exact());
    }

    #[test]
    fn division_by_zero_detected_for_exact_operands() {
        assert!(int(1).div(&int(0)).is_none());
    }

    #[test]
    fn integer_division_yields_rational() {
        match int(1).div(&int(2)).unwrap() {
            LispNumber::Rational(r) => assert_eq!(r, BigRational::new(1.into(), 2.into())),
            other => panic!("expected 1/2, got {other:?}"),
        }
    }

    #[test]
    fn mul_by_exact_zero_short_circuits() {
        assert_eq!(int(0).mul(&rat(3, 7)), int(0));
    }

    #[test]
    fn integer_valued_accepts_whole_floats() {
        assert!(LispNumber::Inexact(2.0).is_integer_valued());
        assert!(!LispNumber::Inexact(2.5).is_integer_valued());
        assert!(!rat(1, 2).is_integer_valued());
    }
}
