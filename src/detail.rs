// This file is part of the diyfp project.
//
// Copyright (C) 2025 Chen-Pang He <jdh8@skymizer.com>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Implementation details
//!
//! This module is not part of the public API.

const LOW: u64 = 0xFFFF_FFFF;

/// Full 128-bit product of `x` and `y` as `(low, high)` halves
///
/// Built from four 32×32→64 partial products so that no intermediate
/// exceeds 64 bits.
#[must_use]
pub const fn widening_mul(x: u64, y: u64) -> (u64, u64) {
    let (a, b) = (x >> 32, x & LOW);
    let (c, d) = (y >> 32, y & LOW);

    let ac = a * c;
    let bc = b * c;
    let ad = a * d;
    let bd = b * d;

    // At most 3 × (2^32 - 1), no overflow
    let mid = (bd >> 32) + (ad & LOW) + (bc & LOW);
    let low = (mid << 32) | (bd & LOW);
    let high = ac + (ad >> 32) + (bc >> 32) + (mid >> 32);
    (low, high)
}

/// High half of `x × y`, rounded half up on the discarded low half
///
/// Equivalent to adding 2<sup>63</sup> to the 128-bit product before
/// truncation.  Never overflows: the largest product has a high half of
/// 2<sup>64</sup> - 2.
#[must_use]
pub const fn mul_high_rounded(x: u64, y: u64) -> u64 {
    let (low, high) = widening_mul(x, y);
    high + (low >> 63)
}

/// Round `x` to nearest, ties to even, after dropping its low `shift` bits
///
/// `shift` may be 64, in which case every bit is dropped.
#[must_use]
pub const fn round_shr_even(x: u64, shift: u32) -> u64 {
    debug_assert!(shift > 0 && shift <= 64);
    let (kept, rest, half) = if shift == 64 {
        (0, x, 1 << 63)
    } else {
        (x >> shift, x & ((1 << shift) - 1), 1 << (shift - 1))
    };
    let up = rest > half || (rest == half && kept & 1 == 1);
    kept + up as u64
}
