// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed node record and its canonical binary layout.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Child index marking a leaf.
pub const TREE_LEAF: i64 = -1;

/// Feature index stored at leaves.
pub const TREE_UNDEFINED: i64 = -2;

/// Threshold stored at leaves.
pub const LEAF_THRESHOLD: f64 = -2.0;

/// One node of a decision tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Node {
    pub left_child: i64,
    pub right_child: i64,
    pub feature: i64,
    pub threshold: f64,
    pub impurity: f64,
    pub n_node_samples: i64,
    pub weighted_n_node_samples: f64,
}

impl Node {
    /// Size of one record in bytes.
    pub const SIZE: usize = 56;

    /// A leaf with sentinel split fields and zeroed statistics.
    #[must_use]
    pub const fn leaf() -> Self {
        Self {
            left_child: TREE_LEAF,
            right_child: TREE_LEAF,
            feature: TREE_UNDEFINED,
            threshold: LEAF_THRESHOLD,
            impurity: 0.0,
            n_node_samples: 0,
            weighted_n_node_samples: 0.0,
        }
    }

    /// A split node with zeroed statistics.
    #[must_use]
    pub fn split(left_child: i64, right_child: i64, feature: i64, threshold: f64) -> Self {
        Self {
            left_child,
            right_child,
            feature,
            threshold,
            impurity: 0.0,
            n_node_samples: 0,
            weighted_n_node_samples: 0.0,
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.left_child == TREE_LEAF
    }

    /// Little-endian record in field order.
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        let fields: [[u8; 8]; 7] = [
            self.left_child.to_le_bytes(),
            self.right_child.to_le_bytes(),
            self.feature.to_le_bytes(),
            self.threshold.to_le_bytes(),
            self.impurity.to_le_bytes(),
            self.n_node_samples.to_le_bytes(),
            self.weighted_n_node_samples.to_le_bytes(),
        ];
        for (chunk, field) in out.chunks_exact_mut(8).zip(fields) {
            chunk.copy_from_slice(&field);
        }
        out
    }

    #[must_use]
    pub fn from_le_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let mut words = [[0u8; 8]; 7];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
            word.copy_from_slice(chunk);
        }
        Self {
            left_child: i64::from_le_bytes(words[0]),
            right_child: i64::from_le_bytes(words[1]),
            feature: i64::from_le_bytes(words[2]),
            threshold: f64::from_le_bytes(words[3]),
            impurity: f64::from_le_bytes(words[4]),
            n_node_samples: i64::from_le_bytes(words[5]),
            weighted_n_node_samples: f64::from_le_bytes(words[6]),
        }
    }
}

/// Serialize nodes as a contiguous record array.
#[must_use]
pub fn nodes_to_bytes(nodes: &[Node]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(nodes.len() * Node::SIZE);
    for node in nodes {
        bytes.extend_from_slice(&node.to_le_bytes());
    }
    bytes
}

/// Parse a contiguous record array.
///
/// # Errors
/// Returns `InvalidNodeBytes` if the length is not a multiple of `Node::SIZE`.
pub fn nodes_from_bytes(bytes: &[u8]) -> Result<Vec<Node>> {
    if bytes.len() % Node::SIZE != 0 {
        return Err(CodecError::InvalidNodeBytes(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(Node::SIZE)
        .map(|chunk| {
            let mut record = [0u8; Node::SIZE];
            record.copy_from_slice(chunk);
            Node::from_le_bytes(&record)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_sentinels() {
        let leaf = Node::leaf();
        assert!(leaf.is_leaf());
        assert_eq!(leaf.right_child, TREE_LEAF);
        assert_eq!(leaf.feature, TREE_UNDEFINED);
        assert_eq!(leaf.threshold, LEAF_THRESHOLD);
    }

    #[test]
    fn test_record_layout() {
        let node = Node {
            left_child: 1,
            right_child: 2,
            feature: 3,
            threshold: 0.5,
            impurity: 0.25,
            n_node_samples: 10,
            weighted_n_node_samples: 10.0,
        };
        let bytes = node.to_le_bytes();
        assert_eq!(&bytes[0..8], &1i64.to_le_bytes());
        assert_eq!(&bytes[16..24], &3i64.to_le_bytes());
        assert_eq!(&bytes[24..32], &0.5f64.to_le_bytes());
        assert_eq!(&bytes[48..56], &10.0f64.to_le_bytes());
        assert_eq!(Node::from_le_bytes(&bytes), node);
    }

    #[test]
    fn test_nodes_bytes_roundtrip() {
        let nodes = vec![Node::split(1, 2, 0, 2.5), Node::leaf(), Node::leaf()];
        let bytes = nodes_to_bytes(&nodes);
        assert_eq!(bytes.len(), 3 * Node::SIZE);
        assert_eq!(nodes_from_bytes(&bytes).unwrap(), nodes);
    }

    #[test]
    fn test_nodes_from_bytes_bad_length() {
        assert!(matches!(
            nodes_from_bytes(&[0u8; 57]),
            Err(CodecError::InvalidNodeBytes(57))
        ));
        assert!(nodes_from_bytes(&[]).unwrap().is_empty());
    }
}
