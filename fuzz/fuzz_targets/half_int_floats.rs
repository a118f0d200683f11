// SPDX-License-Identifier: MIT OR Apache-2.0
#![no_main]

use libfuzzer_sys::fuzz_target;
use tree_compress::{compress_half_int_float_array, decompress_half_int_float_array};

fuzz_target!(|bits: Vec<u64>| {
    // Raw bit patterns cover NaN payloads, signed zeros and subnormals
    let values: Vec<f64> = bits.iter().map(|&b| f64::from_bits(b)).collect();
    let packed = compress_half_int_float_array(&values);
    let restored = decompress_half_int_float_array(&packed).unwrap();
    let restored_bits: Vec<u64> = restored.iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits, restored_bits, "half-int roundtrip is not bit-exact");
});
