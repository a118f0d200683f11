// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bespoke compression for decision-tree ensemble state.
//!
//! Shrinks the per-tree node and value arrays of a trained tree ensemble:
//! - Leaf/internal partitioning drops fields that are redundant per node kind
//! - Integer arrays are narrowed to the smallest width that holds them
//! - Thresholds that are multiples of 0.5 are stored as narrowed integers
//! - Leaf flags are bit-packed
//!
//! Everything is lossless except leaf values, which are narrowed to `f32`
//! under the default [`LeafPrecision`]. Training statistics (`impurity`,
//! `n_node_samples`, `weighted_n_node_samples`) are not stored and come back
//! as zero: a decompressed tree predicts, it cannot be inspected for
//! training-time statistics.

mod error;
mod half_int;
mod node;
mod shrink;
mod tree_state;
mod width;

pub mod forest;
pub mod format;

pub use error::{CodecError, Result};
pub use forest::{compress_forest, decompress_forest};
pub use format::{deserialize_forest, deserialize_tree, serialize_forest, serialize_tree};
pub use half_int::{
    compress_half_int_float_array, decompress_half_int_float_array, HalfIntFloatArray,
};
pub use node::{nodes_from_bytes, nodes_to_bytes, Node, LEAF_THRESHOLD, TREE_LEAF, TREE_UNDEFINED};
pub use shrink::{pack_bools, shrink_ints, unpack_bools, unshrink_ints, PackedArray};
pub use tree_state::{
    compress_tree_state, compress_tree_state_with, decompress_tree_state, CompressedTreeState,
    CompressionStats, LeafValues, NodeValues, PackedThresholds, TreeState,
};
pub use width::{IntDtype, NarrowedInts, PackInt, UintWidth};

use serde::{Deserialize, Serialize};

/// Trees per batch at which forest transforms switch to the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Codec configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodecConfig {
    /// Storage precision of leaf values.
    pub leaf_precision: LeafPrecision,
    /// Minimum number of trees before batch transforms run in parallel.
    pub parallel_threshold: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            leaf_precision: LeafPrecision::F32,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl CodecConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_leaf_precision(mut self, precision: LeafPrecision) -> Self {
        self.leaf_precision = precision;
        self
    }

    #[must_use]
    pub const fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `parallel_threshold` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.parallel_threshold == 0 {
            return Err(CodecError::InvalidConfig(
                "parallel_threshold must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Storage precision for leaf values.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LeafPrecision {
    /// Narrow to f32. Halves value storage; predictions may move by f32 rounding.
    #[default]
    F32,
    /// Keep f64. Lossless.
    F64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_config_default() {
        let config = CodecConfig::default();
        assert_eq!(config.leaf_precision, LeafPrecision::F32);
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_codec_config_builder() {
        let config = CodecConfig::new()
            .with_leaf_precision(LeafPrecision::F64)
            .with_parallel_threshold(16);
        assert_eq!(config.leaf_precision, LeafPrecision::F64);
        assert_eq!(config.parallel_threshold, 16);
    }

    #[test]
    fn test_codec_config_validate_zero_threshold() {
        let config = CodecConfig::new().with_parallel_threshold(0);
        assert!(matches!(
            config.validate(),
            Err(CodecError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_codec_config_serialize() {
        let config = CodecConfig::new().with_leaf_precision(LeafPrecision::F64);
        let bytes = bincode::serialize(&config).unwrap();
        let decoded: CodecConfig = bincode::deserialize(&bytes).unwrap();
        assert_eq!(config, decoded);
    }
}
