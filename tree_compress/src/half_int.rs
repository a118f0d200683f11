// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lossless packing for float arrays dominated by multiples of 0.5.
//!
//! Trees trained on integer or ordinal features split halfway between
//! adjacent values, so most thresholds are `k / 2` for some integer `k`.
//! Those are stored as `k` in a narrowed integer array; everything else is
//! kept verbatim.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};

use crate::{
    error::{CodecError, Result},
    shrink::{shrink_ints, unshrink_ints, PackedArray},
};

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Half-integer packed float array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HalfIntFloatArray {
    /// One flag per input element.
    pub is_compressible: Vec<bool>,
    /// `value * 2` for compressible elements, in order.
    pub compressed: PackedArray,
    /// Original values of the remaining elements, in order.
    pub raw: Vec<f64>,
}

impl HalfIntFloatArray {
    #[must_use]
    pub fn len(&self) -> usize {
        self.is_compressible.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_compressible.is_empty()
    }
}

/// Returns `value * 2` if `value` is a half-integer that survives the round
/// trip through `i64` bit-exactly.
fn doubled_half_int(value: f64) -> Option<i64> {
    let doubled = value * 2.0;
    let exact = doubled.is_finite() && doubled.abs() <= MAX_EXACT_INT && doubled.fract() == 0.0;
    // -0.0 would come back as +0.0
    let negative_zero = value == 0.0 && value.is_sign_negative();
    (exact && !negative_zero).then_some(doubled as i64)
}

/// Split `values` into half-integers (stored doubled, narrowed) and raw floats.
#[must_use]
pub fn compress_half_int_float_array(values: &[f64]) -> HalfIntFloatArray {
    let mut is_compressible = Vec::with_capacity(values.len());
    let mut doubled = Vec::new();
    let mut raw = Vec::new();

    for &value in values {
        match doubled_half_int(value) {
            Some(d) => {
                is_compressible.push(true);
                doubled.push(d);
            },
            None => {
                is_compressible.push(false);
                raw.push(value);
            },
        }
    }

    HalfIntFloatArray {
        is_compressible,
        compressed: shrink_ints(&doubled),
        raw,
    }
}

/// Rebuild the original float array.
///
/// # Errors
/// Returns `MaskCountMismatch` if the mask does not select exactly as many
/// compressed and raw entries as are stored, or an unpacking error if the
/// compressed array is not an `i64` integer array.
pub fn decompress_half_int_float_array(packed: &HalfIntFloatArray) -> Result<Vec<f64>> {
    let halves = unshrink_ints::<i64>(&packed.compressed)?;

    let n_compressible = packed.is_compressible.iter().filter(|&&c| c).count();
    if n_compressible != halves.len() {
        return Err(CodecError::MaskCountMismatch {
            kind: "compressed",
            expected: n_compressible,
            actual: halves.len(),
        });
    }
    let n_raw = packed.len() - n_compressible;
    if n_raw != packed.raw.len() {
        return Err(CodecError::MaskCountMismatch {
            kind: "raw",
            expected: n_raw,
            actual: packed.raw.len(),
        });
    }

    let mut halves = halves.into_iter();
    let mut raw = packed.raw.iter().copied();
    packed
        .is_compressible
        .iter()
        .map(|&c| {
            let value = if c {
                halves.next().map(|h| h as f64 / 2.0)
            } else {
                raw.next()
            };
            value.ok_or(CodecError::MaskCountMismatch {
                kind: if c { "compressed" } else { "raw" },
                expected: packed.len(),
                actual: 0,
            })
        })
        .collect()
}
