// SPDX-License-Identifier: MIT OR Apache-2.0
//! Numeric width utilities.
//!
//! `IntDtype` tags the width an integer array had before packing, `UintWidth`
//! picks the narrowest unsigned storage for a given maximum, and
//! `NarrowedInts` holds the narrowed data itself.

#![allow(clippy::cast_possible_truncation)]

use serde::{Deserialize, Serialize};

/// Original element type of a packed integer array.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IntDtype {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntDtype {
    #[must_use]
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 => 4,
            Self::I64 | Self::U64 => 8,
        }
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }
}

/// Storage width of a narrowed array. Narrowed data is always unsigned:
/// negative inputs are offset by their minimum before narrowing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UintWidth {
    U8,
    U16,
    U32,
    U64,
}

impl UintWidth {
    /// Smallest width whose range covers `0..=max`.
    #[must_use]
    pub const fn for_max(max: u64) -> Self {
        if max <= u8::MAX as u64 {
            Self::U8
        } else if max <= u16::MAX as u64 {
            Self::U16
        } else if max <= u32::MAX as u64 {
            Self::U32
        } else {
            Self::U64
        }
    }

    #[must_use]
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Integer element types the packer accepts.
///
/// Sealed: the set of dtypes is closed so every packed array can be
/// widened back without runtime type inspection.
pub trait PackInt: Copy + sealed::Sealed {
    const DTYPE: IntDtype;

    fn to_i128(self) -> i128;

    /// Converts back from the widened representation, `None` if out of range.
    fn from_i128(value: i128) -> Option<Self>;
}

macro_rules! impl_pack_int {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl PackInt for $ty {
                const DTYPE: IntDtype = IntDtype::$dtype;

                #[inline]
                fn to_i128(self) -> i128 {
                    i128::from(self)
                }

                #[inline]
                fn from_i128(value: i128) -> Option<Self> {
                    Self::try_from(value).ok()
                }
            }
        )*
    };
}

impl_pack_int!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
);

/// Integer data stored at its narrowest unsigned width.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NarrowedInts {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

impl NarrowedInts {
    /// Stores `values` at `width`. Every value must be `<= max` of the width.
    #[must_use]
    pub fn narrow(values: &[u64], width: UintWidth) -> Self {
        debug_assert!(values.iter().all(|&v| UintWidth::for_max(v) <= width));
        match width {
            UintWidth::U8 => Self::U8(values.iter().map(|&v| v as u8).collect()),
            UintWidth::U16 => Self::U16(values.iter().map(|&v| v as u16).collect()),
            UintWidth::U32 => Self::U32(values.iter().map(|&v| v as u32).collect()),
            UintWidth::U64 => Self::U64(values.to_vec()),
        }
    }

    #[must_use]
    pub fn widen(&self) -> Vec<u64> {
        match self {
            Self::U8(v) => v.iter().map(|&x| u64::from(x)).collect(),
            Self::U16(v) => v.iter().map(|&x| u64::from(x)).collect(),
            Self::U32(v) => v.iter().map(|&x| u64::from(x)).collect(),
            Self::U64(v) => v.clone(),
        }
    }

    #[must_use]
    pub const fn width(&self) -> UintWidth {
        match self {
            Self::U8(_) => UintWidth::U8,
            Self::U16(_) => UintWidth::U16,
            Self::U32(_) => UintWidth::U32,
            Self::U64(_) => UintWidth::U64,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload size in bytes, excluding the enum tag.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.len() * self.width().size_bytes()
    }
}
