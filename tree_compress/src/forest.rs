// SPDX-License-Identifier: MIT OR Apache-2.0
//! Batch transforms over every tree of an ensemble.
//!
//! Trees share no data, so a batch is a plain map. Batches of at least
//! `CodecConfig::parallel_threshold` trees run on the rayon pool.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    error::Result,
    tree_state::{compress_tree_state_with, decompress_tree_state, CompressedTreeState, TreeState},
    CodecConfig,
};

/// Compress every tree. Fails on the first invalid tree without returning
/// any partial output.
///
/// # Errors
/// Returns an error if the config is invalid or any tree fails to compress.
#[instrument(skip_all, fields(tree_count = trees.len()))]
pub fn compress_forest(trees: &[TreeState], config: &CodecConfig) -> Result<Vec<CompressedTreeState>> {
    config.validate()?;

    let compressed: Vec<CompressedTreeState> = if trees.len() >= config.parallel_threshold {
        trees
            .par_iter()
            .map(|t| compress_tree_state_with(t, config))
            .collect::<Result<_>>()?
    } else {
        trees
            .iter()
            .map(|t| compress_tree_state_with(t, config))
            .collect::<Result<_>>()?
    };

    debug!(
        raw_bytes = trees.iter().map(TreeState::raw_size_bytes).sum::<usize>(),
        packed_bytes = compressed
            .iter()
            .map(CompressedTreeState::packed_size_bytes)
            .sum::<usize>(),
        "compressed forest"
    );
    Ok(compressed)
}

/// Decompress every tree.
///
/// # Errors
/// Returns an error if the config is invalid or any tree fails to decompress.
#[instrument(skip_all, fields(tree_count = trees.len()))]
pub fn decompress_forest(
    trees: &[CompressedTreeState],
    config: &CodecConfig,
) -> Result<Vec<TreeState>> {
    config.validate()?;

    if trees.len() >= config.parallel_threshold {
        trees.par_iter().map(decompress_tree_state).collect()
    } else {
        trees.iter().map(decompress_tree_state).collect()
    }
}
