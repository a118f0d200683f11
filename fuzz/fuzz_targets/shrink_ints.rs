// SPDX-License-Identifier: MIT OR Apache-2.0
#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tree_compress::{pack_bools, shrink_ints, unpack_bools, unshrink_ints};

#[derive(Arbitrary, Debug)]
struct ShrinkInput {
    signed: Vec<i64>,
    unsigned: Vec<u16>,
    flags: Vec<bool>,
}

fuzz_target!(|input: ShrinkInput| {
    let packed = shrink_ints(&input.signed);
    assert_eq!(
        unshrink_ints::<i64>(&packed).unwrap(),
        input.signed,
        "i64 shrink roundtrip failed"
    );

    let packed = shrink_ints(&input.unsigned);
    assert_eq!(
        unshrink_ints::<u16>(&packed).unwrap(),
        input.unsigned,
        "u16 shrink roundtrip failed"
    );

    let packed = pack_bools(&input.flags);
    assert_eq!(unpack_bools(&packed).unwrap(), input.flags, "bool pack roundtrip failed");
});
