// SPDX-License-Identifier: MIT OR Apache-2.0
#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tree_compress::{
    compress_tree_state_with, decompress_tree_state, CodecConfig, LeafPrecision, Node,
    NodeValues, TreeState,
};

#[derive(Arbitrary, Debug)]
struct FuzzNode {
    left_child: i64,
    right_child: i64,
    feature: i64,
    threshold: f64,
    value: f64,
}

fuzz_target!(|input: (u64, Vec<FuzzNode>)| {
    let (max_depth, raw_nodes) = input;
    let tree = TreeState {
        max_depth,
        node_count: raw_nodes.len(),
        nodes: raw_nodes
            .iter()
            .map(|n| Node::split(n.left_child, n.right_child, n.feature, n.threshold))
            .collect(),
        values: NodeValues::new(vec![1], raw_nodes.iter().map(|n| n.value).collect()),
    };

    let config = CodecConfig::new().with_leaf_precision(LeafPrecision::F64);
    // Arbitrary child pairs are usually leaf-inconsistent; rejection is fine
    let Ok(compressed) = compress_tree_state_with(&tree, &config) else {
        return;
    };
    let restored = decompress_tree_state(&compressed).unwrap();

    assert_eq!(restored.node_count, tree.node_count);
    for (i, (orig, back)) in tree.nodes.iter().zip(&restored.nodes).enumerate() {
        assert_eq!(orig.left_child, back.left_child, "left child at {i}");
        assert_eq!(orig.right_child, back.right_child, "right child at {i}");
        if orig.is_leaf() {
            assert_eq!(
                tree.values.row(i)[0].to_bits(),
                restored.values.row(i)[0].to_bits(),
                "leaf value at {i}"
            );
        } else {
            assert_eq!(orig.feature, back.feature, "feature at {i}");
            assert_eq!(orig.threshold.to_bits(), back.threshold.to_bits(), "threshold at {i}");
        }
    }
});
