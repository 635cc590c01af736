// This file is part of the diyfp project.
//
// Copyright (C) 2025 Chen-Pang He <jdh8@skymizer.com>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Extended-precision binary float for shortest round-trip formatting
//!
//! [`ExtendedFloat`] pairs a 64-bit significand with a 32-bit binary
//! exponent.  It carries 11 more bits of precision than [`f64`] and an
//! exponent range that cannot overflow over the handful of operations a
//! Grisu-style digit generator performs per conversion.
#![no_std]

mod detail;

use core::ops::{Mul, MulAssign, Sub, SubAssign};
use num_traits::CheckedSub;

/// Exponent bias of [`f64`]
pub const F64_EXPONENT_BIAS: i32 = 1023;

/// Width of the explicit fraction field of [`f64`]
pub const F64_FRACTION_BITS: u32 = 52;

/// Exponent bias of [`f32`]
pub const F32_EXPONENT_BIAS: i32 = 127;

/// Width of the explicit fraction field of [`f32`]
pub const F32_FRACTION_BITS: u32 = 23;

/// Unsigned binary float `significand × 2^exponent`
///
/// Operations take and return plain values.  Preconditions on the hot-path
/// operations are checked with `debug_assert!` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExtendedFloat {
    significand: u64,
    exponent: i32,
}

impl ExtendedFloat {
    /// Width of the significand in bits
    pub const SIGNIFICAND_BITS: u32 = u64::BITS;

    /// Construct from raw parts without validation
    #[must_use]
    pub const fn new(significand: u64, exponent: i32) -> Self {
        Self { significand, exponent }
    }

    #[must_use]
    pub const fn significand(self) -> u64 {
        self.significand
    }

    #[must_use]
    pub const fn exponent(self) -> i32 {
        self.exponent
    }

    pub fn set_significand(&mut self, significand: u64) {
        self.significand = significand;
    }

    pub fn set_exponent(&mut self, exponent: i32) {
        self.exponent = exponent;
    }

    /// Exact difference of two values sharing an exponent
    ///
    /// Requires `self.exponent() == rhs.exponent()` and
    /// `self.significand() >= rhs.significand()`.  See
    /// [`CheckedSub::checked_sub`] for the fallible form.
    #[must_use]
    pub const fn subtract(self, rhs: Self) -> Self {
        debug_assert!(self.exponent == rhs.exponent);
        debug_assert!(self.significand >= rhs.significand);
        Self::new(self.significand.wrapping_sub(rhs.significand), self.exponent)
    }

    /// Product rounded to 64 significant bits
    ///
    /// The significand is the high half of the 128-bit product, rounded half
    /// up on the low half, so the result is within 0.5 ulp of the exact
    /// product.  The exponent is always `self.exponent() + rhs.exponent() +
    /// 64`, so the result is not normalized.
    #[must_use]
    pub const fn multiply(self, rhs: Self) -> Self {
        Self::new(
            detail::mul_high_rounded(self.significand, rhs.significand),
            self.exponent + rhs.exponent + Self::SIGNIFICAND_BITS as i32,
        )
    }

    /// Shift the significand left until bit 63 is set
    ///
    /// The value is preserved exactly.  The significand must be nonzero.
    #[must_use]
    pub const fn normalize(self) -> Self {
        debug_assert!(self.significand != 0);
        let shift = self.significand.leading_zeros();
        Self::new(self.significand << shift, self.exponent - shift as i32)
    }

    /// Unpack the magnitude of an IEEE binary float without normalizing
    ///
    /// Subnormals keep their bare fraction and the minimum exponent.
    const fn decode(bits: u64, fraction_bits: u32, bias: i32) -> Self {
        let hidden = 1 << fraction_bits;
        let fraction = bits & (hidden - 1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let biased = ((bits >> fraction_bits) & (2 * bias as u64 + 1)) as i32;
        let offset = bias + fraction_bits as i32;

        match biased {
            0 => Self::new(fraction, 1 - offset),
            _ => Self::new(fraction | hidden, biased - offset),
        }
    }

    const fn decode_f64(value: f64) -> Self {
        Self::decode(value.to_bits(), F64_FRACTION_BITS, F64_EXPONENT_BIAS)
    }

    /// Normalize the magnitude of a finite nonzero [`f64`]
    ///
    /// The sign is ignored.  The result has bit 63 of its significand set
    /// and represents `|value|` exactly.
    #[must_use]
    pub const fn from_f64(value: f64) -> Self {
        debug_assert!(value.is_finite() && value != 0.0);
        Self::decode_f64(value).normalize()
    }

    /// Normalize the magnitude of a finite nonzero [`f32`]
    ///
    /// Same contract as [`ExtendedFloat::from_f64`].
    #[must_use]
    pub const fn from_f32(value: f32) -> Self {
        debug_assert!(value.is_finite() && value != 0.0);
        Self::decode(value.to_bits() as u64, F32_FRACTION_BITS, F32_EXPONENT_BIAS).normalize()
    }

    /// Fallible [`ExtendedFloat::from_f64`]
    ///
    /// Returns [`None`] for zeros, infinities, and NaNs.
    #[must_use]
    pub const fn checked_from_f64(value: f64) -> Option<Self> {
        if value.is_finite() && value != 0.0 {
            Some(Self::from_f64(value))
        } else {
            None
        }
    }

    /// Rounding boundaries `(m⁻, m⁺)` of a finite nonzero [`f64`]
    ///
    /// The boundaries are the midpoints between `value` and its neighbours.
    /// `m⁺` is normalized and `m⁻` is shifted to share its exponent.  When
    /// `value` is a power of two above the smallest normal, the lower
    /// neighbour is twice as close, and so is `m⁻`.
    #[must_use]
    pub const fn normalized_boundaries(value: f64) -> (Self, Self) {
        let v = Self::decode_f64(value);
        let plus = Self::new((v.significand << 1) + 1, v.exponent - 1).normalize();

        let lower_is_closer = v.significand == 1 << F64_FRACTION_BITS
            && v.exponent > 1 - F64_EXPONENT_BIAS - F64_FRACTION_BITS as i32;

        let minus = if lower_is_closer {
            Self::new((v.significand << 2) - 1, v.exponent - 2)
        } else {
            Self::new((v.significand << 1) - 1, v.exponent - 1)
        };

        #[allow(clippy::cast_sign_loss)]
        let shift = (minus.exponent - plus.exponent) as u32;
        (Self::new(minus.significand << shift, plus.exponent), plus)
    }

    /// Round to the nearest [`f64`], ties to even
    ///
    /// Overflows to infinity and underflows to zero.  Exact for every value
    /// produced by [`ExtendedFloat::from_f64`].
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub const fn to_f64(self) -> f64 {
        const MIN_EXP: i64 = 1 - F64_EXPONENT_BIAS as i64;
        const DROPPED: i64 = (u64::BITS - 1 - F64_FRACTION_BITS) as i64;

        if self.significand == 0 {
            return 0.0;
        }

        let x = self.normalize();
        let top = x.exponent as i64 + 63;

        if top > F64_EXPONENT_BIAS as i64 {
            return f64::INFINITY;
        }

        let shift = if top >= MIN_EXP { DROPPED } else { DROPPED + MIN_EXP - top };

        if shift > 64 {
            return 0.0;
        }

        // A carry out of the fraction bumps the biased exponent by itself.
        let base = if top >= MIN_EXP { ((top - MIN_EXP) as u64) << F64_FRACTION_BITS } else { 0 };
        f64::from_bits(base + detail::round_shr_even(x.significand, shift as u32))
    }
}

impl Sub for ExtendedFloat {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.subtract(rhs)
    }
}

impl SubAssign for ExtendedFloat {
    fn sub_assign(&mut self, rhs: Self) {
        *self = self.subtract(rhs);
    }
}

impl CheckedSub for ExtendedFloat {
    fn checked_sub(&self, v: &Self) -> Option<Self> {
        if self.exponent != v.exponent {
            return None;
        }
        let significand = self.significand.checked_sub(v.significand)?;
        Some(Self::new(significand, self.exponent))
    }
}

impl Mul for ExtendedFloat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(rhs)
    }
}

impl MulAssign for ExtendedFloat {
    fn mul_assign(&mut self, rhs: Self) {
        *self = self.multiply(rhs);
    }
}
