// SPDX-License-Identifier: MIT OR Apache-2.0
#![no_main]

use libfuzzer_sys::fuzz_target;
use tree_compress::{deserialize_tree, serialize_tree, CodecConfig, LeafPrecision};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must be rejected with an error, never a panic
    if let Ok(tree) = deserialize_tree(data) {
        let config = CodecConfig::new().with_leaf_precision(LeafPrecision::F64);
        if let Ok(bytes) = serialize_tree(&tree, &config) {
            let again = deserialize_tree(&bytes).unwrap();
            assert_eq!(again.node_count, tree.node_count, "payload roundtrip mismatch");
        }
    }
});
