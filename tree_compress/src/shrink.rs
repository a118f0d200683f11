// SPDX-License-Identifier: MIT OR Apache-2.0
//! Minimal-width re-encoding for integer and boolean arrays.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use serde::{Deserialize, Serialize};

use crate::{
    error::{CodecError, Result},
    width::{IntDtype, NarrowedInts, PackInt, UintWidth},
};

/// A packed array. The variant records which inverse applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PackedArray {
    /// Eight flags per byte, most significant bit first.
    BooleanPacked { bytes: Vec<u8>, len: usize },
    /// Integers with a negative minimum, stored as `value - min`.
    OffsetNarrowedInt {
        dtype: IntDtype,
        min: i64,
        data: NarrowedInts,
    },
    /// Non-negative integers stored as-is at a narrower width.
    NarrowedInt { dtype: IntDtype, data: NarrowedInts },
}

impl PackedArray {
    /// Number of logical elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::BooleanPacked { len, .. } => *len,
            Self::OffsetNarrowedInt { data, .. } | Self::NarrowedInt { data, .. } => data.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Approximate encoded size: payload plus fixed per-variant metadata.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::BooleanPacked { bytes, .. } => bytes.len() + 8,
            Self::OffsetNarrowedInt { data, .. } => data.size_bytes() + 9,
            Self::NarrowedInt { data, .. } => data.size_bytes() + 1,
        }
    }
}

/// Narrow an integer array to the smallest unsigned width that holds it.
///
/// Arrays with a negative minimum are offset by that minimum first. An empty
/// array packs as an empty 8-bit array.
#[must_use]
pub fn shrink_ints<T: PackInt>(values: &[T]) -> PackedArray {
    let min = values.iter().map(|v| v.to_i128()).min().unwrap_or(0);

    if min < 0 {
        let offset: Vec<u64> = values.iter().map(|v| (v.to_i128() - min) as u64).collect();
        let max = offset.iter().copied().max().unwrap_or(0);
        PackedArray::OffsetNarrowedInt {
            dtype: T::DTYPE,
            min: min as i64,
            data: NarrowedInts::narrow(&offset, UintWidth::for_max(max)),
        }
    } else {
        let plain: Vec<u64> = values.iter().map(|v| v.to_i128() as u64).collect();
        let max = plain.iter().copied().max().unwrap_or(0);
        PackedArray::NarrowedInt {
            dtype: T::DTYPE,
            data: NarrowedInts::narrow(&plain, UintWidth::for_max(max)),
        }
    }
}

/// Widen a packed integer array back to `T`.
///
/// # Errors
/// Returns `NotInteger` for boolean-packed input, `DtypeMismatch` if the
/// array was packed from a different type, and `ValueOutOfRange` if a
/// stored value does not fit `T` (only possible for corrupted input).
pub fn unshrink_ints<T: PackInt>(packed: &PackedArray) -> Result<Vec<T>> {
    let (dtype, offset, data) = match packed {
        PackedArray::BooleanPacked { .. } => return Err(CodecError::NotInteger),
        PackedArray::OffsetNarrowedInt { dtype, min, data } => (*dtype, i128::from(*min), data),
        PackedArray::NarrowedInt { dtype, data } => (*dtype, 0, data),
    };

    if dtype != T::DTYPE {
        return Err(CodecError::DtypeMismatch {
            packed: dtype,
            requested: T::DTYPE,
        });
    }

    data.widen()
        .into_iter()
        .map(|v| T::from_i128(i128::from(v) + offset).ok_or(CodecError::ValueOutOfRange(dtype)))
        .collect()
}

/// Bit-pack a boolean array, eight flags per byte.
#[must_use]
pub fn pack_bools(flags: &[bool]) -> PackedArray {
    let mut bytes = vec![0u8; flags.len().div_ceil(8)];
    for (i, &flag) in flags.iter().enumerate() {
        if flag {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    PackedArray::BooleanPacked {
        bytes,
        len: flags.len(),
    }
}

/// Unpack a bit-packed boolean array, truncated to its stored length.
///
/// # Errors
/// Returns `NotBoolean` for integer input and `TruncatedBits` if the byte
/// buffer is too short for the stored length.
pub fn unpack_bools(packed: &PackedArray) -> Result<Vec<bool>> {
    let PackedArray::BooleanPacked { bytes, len } = packed else {
        return Err(CodecError::NotBoolean);
    };

    if bytes.len() < len.div_ceil(8) {
        return Err(CodecError::TruncatedBits {
            bytes: bytes.len(),
            len: *len,
        });
    }

    Ok((0..*len)
        .map(|i| bytes[i / 8] & (0x80 >> (i % 8)) != 0)
        .collect())
}
