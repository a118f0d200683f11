// SPDX-License-Identifier: MIT OR Apache-2.0
use thiserror::Error;

use crate::width::IntDtype;

/// Errors from tree codec operations.
///
/// Every variant aborts the current call before any output is produced.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("node count mismatch: header says {expected}, got {actual} nodes")]
    NodeCountMismatch { expected: usize, actual: usize },

    #[error("value shape mismatch: expected {expected} values, got {actual}")]
    ValueShapeMismatch { expected: usize, actual: usize },

    #[error("leaf mismatch at node {index}: left and right child disagree on leaf status")]
    LeafMismatch { index: usize },

    #[error("length mismatch for {field}: expected {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("dtype mismatch: packed as {packed:?}, requested {requested:?}")]
    DtypeMismatch {
        packed: IntDtype,
        requested: IntDtype,
    },

    #[error("packed array is not boolean-packed")]
    NotBoolean,

    #[error("packed array is not an integer array")]
    NotInteger,

    #[error("bit buffer too short: {bytes} bytes cannot hold {len} flags")]
    TruncatedBits { bytes: usize, len: usize },

    #[error("packed value out of range for {0:?}")]
    ValueOutOfRange(IntDtype),

    #[error("mask selects {expected} {kind} entries, but {actual} are stored")]
    MaskCountMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid node bytes: length {0} is not a multiple of the record size")]
    InvalidNodeBytes(usize),

    #[error("node {node} splits on feature {feature}, but sample has {n_features} features")]
    FeatureOutOfRange {
        node: usize,
        feature: i64,
        n_features: usize,
    },

    #[error("node {node} points to child {child} outside the tree")]
    ChildOutOfRange { node: usize, child: i64 },

    #[error("traversal exceeded {0} steps; tree contains a cycle")]
    CycleDetected(usize),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid magic bytes")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u16),

    #[error("tree count mismatch: header says {expected}, payload has {actual}")]
    TreeCountMismatch { expected: u64, actual: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodecError::LeafMismatch { index: 3 };
        assert_eq!(
            err.to_string(),
            "leaf mismatch at node 3: left and right child disagree on leaf status"
        );

        let err = CodecError::UnsupportedVersion(9);
        assert_eq!(err.to_string(), "unsupported version: 9");

        let err = CodecError::DtypeMismatch {
            packed: IntDtype::I64,
            requested: IntDtype::I32,
        };
        assert_eq!(err.to_string(), "dtype mismatch: packed as I64, requested I32");
    }

    #[test]
    fn test_error_from_bincode() {
        let bad: std::result::Result<u64, bincode::Error> = bincode::deserialize(&[1u8]);
        let err: CodecError = bad.unwrap_err().into();
        assert!(matches!(err, CodecError::Serialization(_)));
    }
}
