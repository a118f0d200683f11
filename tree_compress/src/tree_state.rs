// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tree state transform: partition by node kind, narrow, reassemble.
//!
//! Internal nodes keep their children, feature and threshold; leaves keep
//! only their value row. The leaf mask is stored once, bit-packed, so both
//! partitions can be scattered back to their original positions.

#![allow(clippy::cast_possible_truncation)]

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::{CodecError, Result},
    half_int::{compress_half_int_float_array, decompress_half_int_float_array, HalfIntFloatArray},
    node::{Node, TREE_LEAF},
    shrink::{pack_bools, shrink_ints, unpack_bools, unshrink_ints, PackedArray},
    CodecConfig, LeafPrecision,
};

/// Scalars per row, `None` if the shape's product overflows.
fn checked_row_len(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// One fixed-shape value vector per node, stored row-major.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeValues {
    /// Shape of a single node's vector, e.g. `[n_outputs, max_n_classes]`.
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl NodeValues {
    #[must_use]
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Self {
        Self { shape, data }
    }

    #[must_use]
    pub fn zeros(n_rows: usize, shape: Vec<usize>) -> Self {
        let row_len: usize = shape.iter().product();
        Self {
            data: vec![0.0; n_rows * row_len],
            shape,
        }
    }

    /// Number of scalars per node.
    #[must_use]
    pub fn row_len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Value vector of node `index`, `None` if the row is out of range.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let len = self.row_len();
        let start = index.checked_mul(len)?;
        self.data.get(start..start.checked_add(len)?)
    }
}

/// Serializable state of one decision tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeState {
    pub max_depth: u64,
    pub node_count: usize,
    pub nodes: Vec<Node>,
    pub values: NodeValues,
}

impl TreeState {
    /// Checks that every per-node array has `node_count` entries.
    ///
    /// # Errors
    /// Returns `NodeCountMismatch` or `ValueShapeMismatch`.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.len() != self.node_count {
            return Err(CodecError::NodeCountMismatch {
                expected: self.node_count,
                actual: self.nodes.len(),
            });
        }
        let expected = checked_row_len(&self.values.shape)
            .and_then(|len| len.checked_mul(self.node_count))
            .unwrap_or(usize::MAX);
        if self.values.data.len() != expected {
            return Err(CodecError::ValueShapeMismatch {
                expected,
                actual: self.values.data.len(),
            });
        }
        Ok(())
    }

    /// Leaf flag per node.
    ///
    /// # Errors
    /// Returns `LeafMismatch` at the first node where only one child is
    /// `TREE_LEAF`. Such a tree is corrupt.
    pub fn leaf_mask(&self) -> Result<Vec<bool>> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let is_leaf = node.left_child == TREE_LEAF;
                if is_leaf == (node.right_child == TREE_LEAF) {
                    Ok(is_leaf)
                } else {
                    Err(CodecError::LeafMismatch { index })
                }
            })
            .collect()
    }

    /// Index of the leaf `sample` falls into. Goes left iff
    /// `sample[feature] <= threshold`.
    ///
    /// # Errors
    /// Returns an error if a split references a missing feature or child,
    /// or if the walk does not reach a leaf within `node_count` steps.
    pub fn apply(&self, sample: &[f64]) -> Result<usize> {
        let mut index = 0usize;
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(index)
                .ok_or(CodecError::ChildOutOfRange {
                    node: index,
                    child: index as i64,
                })?;
            if node.is_leaf() {
                return Ok(index);
            }

            let feature = usize::try_from(node.feature)
                .ok()
                .filter(|&f| f < sample.len())
                .ok_or(CodecError::FeatureOutOfRange {
                    node: index,
                    feature: node.feature,
                    n_features: sample.len(),
                })?;
            let child = if sample[feature] <= node.threshold {
                node.left_child
            } else {
                node.right_child
            };
            index = usize::try_from(child)
                .ok()
                .filter(|&c| c < self.nodes.len())
                .ok_or(CodecError::ChildOutOfRange { node: index, child })?;
        }
        Err(CodecError::CycleDetected(self.nodes.len()))
    }

    /// Value row of the leaf `sample` falls into.
    ///
    /// # Errors
    /// Same as [`TreeState::apply`], plus the checks of [`TreeState::validate`].
    pub fn predict(&self, sample: &[f64]) -> Result<&[f64]> {
        self.validate()?;
        let leaf = self.apply(sample)?;
        self.values.row(leaf).ok_or(CodecError::ValueShapeMismatch {
            expected: self.node_count.saturating_mul(self.values.row_len()),
            actual: self.values.data.len(),
        })
    }

    /// Size of the uncompressed node records and values in bytes.
    #[must_use]
    pub fn raw_size_bytes(&self) -> usize {
        self.nodes.len() * Node::SIZE + self.values.data.len() * 8
    }
}

/// Leaf-only value rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LeafValues {
    F32 { shape: Vec<usize>, data: Vec<f32> },
    F64 { shape: Vec<usize>, data: Vec<f64> },
}

impl LeafValues {
    fn narrow(shape: Vec<usize>, data: Vec<f64>, precision: LeafPrecision) -> Self {
        match precision {
            LeafPrecision::F32 => Self::F32 {
                shape,
                data: data.into_iter().map(|v| v as f32).collect(),
            },
            LeafPrecision::F64 => Self::F64 { shape, data },
        }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F32 { shape, .. } | Self::F64 { shape, .. } => shape,
        }
    }

    /// Number of stored scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::F32 { data, .. } => data.len(),
            Self::F64 { data, .. } => data.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn widen(&self) -> Vec<f64> {
        match self {
            Self::F32 { data, .. } => data.iter().map(|&v| f64::from(v)).collect(),
            Self::F64 { data, .. } => data.clone(),
        }
    }

    #[must_use]
    pub fn size_bytes(&self) -> usize {
        let scalar = match self {
            Self::F32 { .. } => 4,
            Self::F64 { .. } => 8,
        };
        self.len() * scalar + self.shape().len() * 8
    }
}

/// Half-integer packed thresholds with a bit-packed compressibility mask.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackedThresholds {
    pub is_compressible: PackedArray,
    pub compressed: PackedArray,
    pub raw: Vec<f64>,
}

impl PackedThresholds {
    fn pack(thresholds: &[f64]) -> Self {
        let HalfIntFloatArray {
            is_compressible,
            compressed,
            raw,
        } = compress_half_int_float_array(thresholds);
        Self {
            is_compressible: pack_bools(&is_compressible),
            compressed,
            raw,
        }
    }

    fn unpack(&self) -> Result<Vec<f64>> {
        let half_ints = HalfIntFloatArray {
            is_compressible: unpack_bools(&self.is_compressible)?,
            compressed: self.compressed.clone(),
            raw: self.raw.clone(),
        };
        decompress_half_int_float_array(&half_ints)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.is_compressible.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_compressible.is_empty()
    }

    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.is_compressible.size_bytes() + self.compressed.size_bytes() + self.raw.len() * 8
    }
}

/// Compressed state of one decision tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompressedTreeState {
    pub max_depth: u64,
    pub node_count: usize,
    /// Leaf flag for every node, bit-packed.
    pub is_leaf: PackedArray,
    /// Internal nodes only.
    pub children_left: PackedArray,
    /// Internal nodes only.
    pub children_right: PackedArray,
    /// Internal nodes only.
    pub features: PackedArray,
    /// Internal nodes only.
    pub thresholds: PackedThresholds,
    /// Leaf nodes only.
    pub values: LeafValues,
}

impl CompressedTreeState {
    /// Checks the partition invariants and returns the unpacked leaf mask.
    ///
    /// # Errors
    /// Returns `LengthMismatch` if any array disagrees with the mask or a
    /// non-empty tree has no leaf, or `ValueShapeMismatch` if the leaf values
    /// do not hold one row per leaf or the value shape is too large.
    pub fn validate(&self) -> Result<Vec<bool>> {
        let is_leaf = unpack_bools(&self.is_leaf)?;
        if is_leaf.len() != self.node_count {
            return Err(CodecError::LengthMismatch {
                field: "is_leaf",
                expected: self.node_count,
                actual: is_leaf.len(),
            });
        }

        let n_leaves = is_leaf.iter().filter(|&&leaf| leaf).count();
        if self.node_count > 0 && n_leaves == 0 {
            return Err(CodecError::LengthMismatch {
                field: "leaves",
                expected: 1,
                actual: 0,
            });
        }
        let n_internal = self.node_count - n_leaves;
        let internal = [
            ("children_left", self.children_left.len()),
            ("children_right", self.children_right.len()),
            ("features", self.features.len()),
            ("thresholds", self.thresholds.len()),
        ];
        for (field, actual) in internal {
            if actual != n_internal {
                return Err(CodecError::LengthMismatch {
                    field,
                    expected: n_internal,
                    actual,
                });
            }
        }

        // rows are reallocated for every node on decompression
        let Some(row_len) = checked_row_len(self.values.shape()).filter(|len| {
            len.checked_mul(self.node_count)
                .and_then(|n| n.checked_mul(std::mem::size_of::<f64>()))
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        }) else {
            return Err(CodecError::ValueShapeMismatch {
                expected: usize::MAX,
                actual: self.values.len(),
            });
        };
        let expected = row_len * n_leaves;
        if self.values.len() != expected {
            return Err(CodecError::ValueShapeMismatch {
                expected,
                actual: self.values.len(),
            });
        }

        Ok(is_leaf)
    }

    /// Approximate encoded size in bytes.
    #[must_use]
    pub fn packed_size_bytes(&self) -> usize {
        16 + self.is_leaf.size_bytes()
            + self.children_left.size_bytes()
            + self.children_right.size_bytes()
            + self.features.size_bytes()
            + self.thresholds.size_bytes()
            + self.values.size_bytes()
    }
}

/// Size comparison between a tree and its compressed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    pub raw_bytes: usize,
    pub packed_bytes: usize,
}

impl CompressionStats {
    #[must_use]
    pub fn new(raw: &TreeState, packed: &CompressedTreeState) -> Self {
        Self {
            raw_bytes: raw.raw_size_bytes(),
            packed_bytes: packed.packed_size_bytes(),
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.packed_bytes == 0 {
            return 0.0;
        }
        self.raw_bytes as f64 / self.packed_bytes as f64
    }
}

/// Compress a tree with the default configuration.
///
/// # Errors
/// See [`compress_tree_state_with`].
pub fn compress_tree_state(state: &TreeState) -> Result<CompressedTreeState> {
    compress_tree_state_with(state, &CodecConfig::default())
}

/// Compress a tree.
///
/// Leaf values are narrowed to `config.leaf_precision`; with the default
/// `F32` this is the only lossy step.
///
/// # Errors
/// Returns an error if the state's arrays disagree with `node_count` or a
/// node has exactly one `TREE_LEAF` child.
#[instrument(skip_all, fields(node_count = state.node_count))]
pub fn compress_tree_state_with(
    state: &TreeState,
    config: &CodecConfig,
) -> Result<CompressedTreeState> {
    state.validate()?;
    let is_leaf = state.leaf_mask()?;

    let internal: Vec<&Node> = state
        .nodes
        .iter()
        .zip(&is_leaf)
        .filter(|&(_, &leaf)| !leaf)
        .map(|(node, _)| node)
        .collect();
    let children_left: Vec<i64> = internal.iter().map(|n| n.left_child).collect();
    let children_right: Vec<i64> = internal.iter().map(|n| n.right_child).collect();
    let features: Vec<i64> = internal.iter().map(|n| n.feature).collect();
    let thresholds: Vec<f64> = internal.iter().map(|n| n.threshold).collect();

    let row_len = state.values.row_len();
    let leaf_values: Vec<f64> = is_leaf
        .iter()
        .enumerate()
        .filter(|&(_, &leaf)| leaf)
        .flat_map(|(i, _)| state.values.data[i * row_len..(i + 1) * row_len].iter().copied())
        .collect();

    let compressed = CompressedTreeState {
        max_depth: state.max_depth,
        node_count: state.node_count,
        is_leaf: pack_bools(&is_leaf),
        children_left: shrink_ints(&children_left),
        children_right: shrink_ints(&children_right),
        features: shrink_ints(&features),
        thresholds: PackedThresholds::pack(&thresholds),
        values: LeafValues::narrow(state.values.shape.clone(), leaf_values, config.leaf_precision),
    };

    debug!(
        internal = internal.len(),
        raw_bytes = state.raw_size_bytes(),
        packed_bytes = compressed.packed_size_bytes(),
        "compressed tree"
    );
    Ok(compressed)
}

/// Rebuild a tree from its compressed form.
///
/// Leaves get sentinel children (`TREE_LEAF`), feature (`TREE_UNDEFINED`)
/// and threshold (`LEAF_THRESHOLD`); internal nodes get zero value rows.
/// `impurity`, `n_node_samples` and `weighted_n_node_samples` are not
/// stored and come back as zero.
///
/// # Errors
/// Returns an error if the compressed arrays violate the partition
/// invariants or cannot be unpacked.
#[instrument(skip_all, fields(node_count = state.node_count))]
pub fn decompress_tree_state(state: &CompressedTreeState) -> Result<TreeState> {
    let is_leaf = state.validate()?;

    let mut children_left = unshrink_ints::<i64>(&state.children_left)?.into_iter();
    let mut children_right = unshrink_ints::<i64>(&state.children_right)?.into_iter();
    let mut features = unshrink_ints::<i64>(&state.features)?.into_iter();
    let mut thresholds = state.thresholds.unpack()?.into_iter();

    let mut nodes = Vec::with_capacity(state.node_count);
    for &leaf in &is_leaf {
        let node = if leaf {
            Node::leaf()
        } else {
            match (
                children_left.next(),
                children_right.next(),
                features.next(),
                thresholds.next(),
            ) {
                (Some(left), Some(right), Some(feature), Some(threshold)) => {
                    Node::split(left, right, feature, threshold)
                },
                _ => {
                    return Err(CodecError::LengthMismatch {
                        field: "internal nodes",
                        expected: state.node_count,
                        actual: nodes.len(),
                    })
                },
            }
        };
        nodes.push(node);
    }

    let shape = state.values.shape().to_vec();
    let mut values = NodeValues::zeros(state.node_count, shape);
    let row_len = values.row_len();
    let leaf_data = state.values.widen();
    let leaf_rows = is_leaf
        .iter()
        .enumerate()
        .filter(|&(_, &leaf)| leaf)
        .map(|(i, _)| i);
    for (row, i) in leaf_rows.enumerate() {
        values.data[i * row_len..(i + 1) * row_len]
            .copy_from_slice(&leaf_data[row * row_len..(row + 1) * row_len]);
    }

    Ok(TreeState {
        max_depth: state.max_depth,
        node_count: state.node_count,
        nodes,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LEAF_THRESHOLD, TREE_UNDEFINED};
    use crate::width::NarrowedInts;

    /// Seven-node tree: root splits on feature 0, its left child on feature 1.
    ///
    /// ```text
    ///         0 (f0 <= 2.5)
    ///        /            \
    ///   1 (f1 <= 7.5)      2 (f0 <= 0.3)
    ///    /      \          /      \
    ///   3        4        5        6
    /// ```
    fn sample_tree() -> TreeState {
        let nodes = vec![
            Node {
                impurity: 0.9,
                n_node_samples: 100,
                weighted_n_node_samples: 100.0,
                ..Node::split(1, 2, 0, 2.5)
            },
            Node::split(3, 4, 1, 7.5),
            Node::split(5, 6, 0, 0.3),
            Node::leaf(),
            Node::leaf(),
            Node::leaf(),
            Node::leaf(),
        ];
        let values = NodeValues::new(vec![1, 1], vec![9.0, 9.0, 9.0, 1.2, 3.4, 5.6, 7.8]);
        TreeState {
            max_depth: 2,
            node_count: 7,
            nodes,
            values,
        }
    }

    #[test]
    fn test_compress_partitions() {
        let tree = sample_tree();
        let compressed = compress_tree_state(&tree).unwrap();

        assert_eq!(compressed.node_count, 7);
        assert_eq!(compressed.max_depth, 2);
        assert_eq!(compressed.is_leaf.len(), 7);
        assert_eq!(compressed.children_left.len(), 3);
        assert_eq!(compressed.features.len(), 3);
        assert_eq!(compressed.thresholds.len(), 3);
        assert_eq!(compressed.thresholds.raw, vec![0.3]);
        assert_eq!(compressed.values.len(), 4);
        assert!(matches!(compressed.values, LeafValues::F32 { .. }));
        assert_eq!(
            compressed.children_left,
            PackedArray::NarrowedInt {
                dtype: crate::IntDtype::I64,
                data: NarrowedInts::U8(vec![1, 3, 5]),
            }
        );
    }

    #[test]
    fn test_roundtrip_structure() {
        let tree = sample_tree();
        let restored = decompress_tree_state(&compress_tree_state(&tree).unwrap()).unwrap();

        assert_eq!(restored.max_depth, tree.max_depth);
        assert_eq!(restored.node_count, tree.node_count);
        for (orig, back) in tree.nodes.iter().zip(&restored.nodes) {
            assert_eq!(orig.left_child, back.left_child);
            assert_eq!(orig.right_child, back.right_child);
            if !orig.is_leaf() {
                assert_eq!(orig.feature, back.feature);
                assert_eq!(orig.threshold.to_bits(), back.threshold.to_bits());
            }
        }
        // training statistics are not stored
        assert_eq!(restored.nodes[0].impurity, 0.0);
        assert_eq!(restored.nodes[0].n_node_samples, 0);
        assert_eq!(restored.nodes[0].weighted_n_node_samples, 0.0);

        // internal value rows are zeroed, leaf rows survive at f32 precision
        assert_eq!(&restored.values.data[..3], &[0.0, 0.0, 0.0]);
        for (orig, back) in tree.values.data[3..].iter().zip(&restored.values.data[3..]) {
            assert_eq!(*back, f64::from(*orig as f32));
        }
        assert_eq!(restored.values.shape, vec![1, 1]);
    }

    #[test]
    fn test_roundtrip_leaf_sentinels() {
        let mut tree = sample_tree();
        tree.nodes[4].feature = 17;
        tree.nodes[4].threshold = 123.0;
        let restored = decompress_tree_state(&compress_tree_state(&tree).unwrap()).unwrap();
        assert_eq!(restored.nodes[4].feature, TREE_UNDEFINED);
        assert_eq!(restored.nodes[4].threshold, LEAF_THRESHOLD);
    }

    #[test]
    fn test_roundtrip_f64_is_lossless() {
        let tree = sample_tree();
        let config = CodecConfig::new().with_leaf_precision(LeafPrecision::F64);
        let compressed = compress_tree_state_with(&tree, &config).unwrap();
        let restored = decompress_tree_state(&compressed).unwrap();
        assert_eq!(&restored.values.data[3..], &tree.values.data[3..]);
    }

    #[test]
    fn test_leaf_mismatch_rejected() {
        let mut tree = sample_tree();
        tree.nodes[5].right_child = 2;
        assert!(matches!(
            compress_tree_state(&tree),
            Err(CodecError::LeafMismatch { index: 5 })
        ));

        let mut tree = sample_tree();
        tree.nodes[1].right_child = TREE_LEAF;
        assert!(matches!(
            compress_tree_state(&tree),
            Err(CodecError::LeafMismatch { index: 1 })
        ));
    }

    #[test]
    fn test_node_count_mismatch() {
        let mut tree = sample_tree();
        tree.node_count = 8;
        assert!(matches!(
            compress_tree_state(&tree),
            Err(CodecError::NodeCountMismatch {
                expected: 8,
                actual: 7,
            })
        ));
    }

    #[test]
    fn test_value_shape_mismatch() {
        let mut tree = sample_tree();
        tree.values.shape = vec![1, 2];
        assert!(matches!(
            compress_tree_state(&tree),
            Err(CodecError::ValueShapeMismatch {
                expected: 14,
                actual: 7,
            })
        ));
    }

    #[test]
    fn test_multi_output_values() {
        let mut tree = sample_tree();
        tree.values = NodeValues::new(
            vec![1, 2],
            (0..14).map(|i| f64::from(i) * 0.25).collect(),
        );
        let restored = decompress_tree_state(&compress_tree_state(&tree).unwrap()).unwrap();
        for i in 3..7 {
            assert_eq!(restored.values.row(i), tree.values.row(i));
        }
        assert_eq!(restored.values.row(1), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = TreeState {
            max_depth: 0,
            node_count: 1,
            nodes: vec![Node::leaf()],
            values: NodeValues::new(vec![1, 1], vec![4.0]),
        };
        let compressed = compress_tree_state(&tree).unwrap();
        assert!(compressed.children_left.is_empty());
        assert!(compressed.thresholds.is_empty());
        let restored = decompress_tree_state(&compressed).unwrap();
        assert_eq!(restored, tree);
    }

    #[test]
    fn test_decompress_rejects_bad_partition() {
        let mut compressed = compress_tree_state(&sample_tree()).unwrap();
        compressed.features = shrink_ints(&[0i64, 1]);
        assert!(matches!(
            decompress_tree_state(&compressed),
            Err(CodecError::LengthMismatch {
                field: "features",
                expected: 3,
                actual: 2,
            })
        ));

        let mut compressed = compress_tree_state(&sample_tree()).unwrap();
        compressed.node_count = 6;
        assert!(matches!(
            decompress_tree_state(&compressed),
            Err(CodecError::LengthMismatch {
                field: "is_leaf",
                ..
            })
        ));

        let mut compressed = compress_tree_state(&sample_tree()).unwrap();
        compressed.values = LeafValues::F32 {
            shape: vec![1, 1],
            data: vec![1.0],
        };
        assert!(matches!(
            decompress_tree_state(&compressed),
            Err(CodecError::ValueShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_decompress_rejects_oversized_value_shape() {
        let internal_only = CompressedTreeState {
            max_depth: 0,
            node_count: 1,
            is_leaf: pack_bools(&[false]),
            children_left: shrink_ints(&[1i64]),
            children_right: shrink_ints(&[2i64]),
            features: shrink_ints(&[0i64]),
            thresholds: PackedThresholds::pack(&[0.5]),
            values: LeafValues::F32 {
                shape: vec![1 << 62],
                data: vec![],
            },
        };
        assert!(matches!(
            decompress_tree_state(&internal_only),
            Err(CodecError::LengthMismatch { field: "leaves", .. })
        ));

        let mut compressed = compress_tree_state(&sample_tree()).unwrap();
        compressed.values = LeafValues::F32 {
            shape: vec![1 << 60],
            data: vec![],
        };
        assert!(matches!(
            decompress_tree_state(&compressed),
            Err(CodecError::ValueShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_row_out_of_range() {
        let tree = sample_tree();
        assert_eq!(tree.values.row(6), Some(&[7.8][..]));
        assert_eq!(tree.values.row(7), None);
        assert_eq!(tree.values.row(usize::MAX), None);
    }

    #[test]
    fn test_apply_and_predict() {
        let tree = sample_tree();
        assert_eq!(tree.apply(&[1.0, 7.5]).unwrap(), 3);
        assert_eq!(tree.apply(&[2.5, 8.0]).unwrap(), 4);
        assert_eq!(tree.apply(&[3.0, 0.0]).unwrap(), 6);
        assert_eq!(tree.predict(&[3.0, 0.0]).unwrap(), &[7.8]);
    }

    #[test]
    fn test_apply_errors() {
        let tree = sample_tree();
        assert!(matches!(
            tree.apply(&[1.0]),
            Err(CodecError::FeatureOutOfRange { node: 1, feature: 1, .. })
        ));

        let mut broken = sample_tree();
        broken.nodes[2].right_child = 42;
        assert!(matches!(
            broken.apply(&[3.0, 0.0]),
            Err(CodecError::ChildOutOfRange { node: 2, child: 42 })
        ));

        let mut cyclic = sample_tree();
        cyclic.nodes[2].right_child = 0;
        assert!(matches!(
            cyclic.apply(&[3.0, 0.0]),
            Err(CodecError::CycleDetected(7))
        ));
    }

    #[test]
    fn test_compression_stats() {
        let tree = sample_tree();
        let compressed = compress_tree_state(&tree).unwrap();
        let stats = CompressionStats::new(&tree, &compressed);
        assert_eq!(stats.raw_bytes, 7 * Node::SIZE + 7 * 8);
        assert!(stats.packed_bytes < stats.raw_bytes);
        assert!(stats.ratio() > 1.0);
    }
}
