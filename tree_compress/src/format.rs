// SPDX-License-Identifier: MIT OR Apache-2.0
//! Versioned payload format for compressed trees and forests.
//!
//! The transforms in this crate operate on in-memory records; this module is
//! the explicit save/load pair that frames them as bytes together with the
//! format version the reader checks before decompressing anything.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{CodecError, Result},
    forest::{compress_forest, decompress_forest},
    tree_state::{compress_tree_state_with, decompress_tree_state, CompressedTreeState, TreeState},
    CodecConfig,
};

/// Magic bytes identifying a compressed forest payload.
pub const MAGIC: [u8; 4] = *b"TRZC";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

fn check_version(version: u16) -> Result<()> {
    if version == 0 || version > FORMAT_VERSION {
        warn!(version, supported = FORMAT_VERSION, "rejecting payload");
        return Err(CodecError::UnsupportedVersion(version));
    }
    Ok(())
}

/// A single compressed tree tagged with the format version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreePayload {
    pub version: u16,
    pub state: CompressedTreeState,
}

impl TreePayload {
    #[must_use]
    pub const fn new(state: CompressedTreeState) -> Self {
        Self {
            version: FORMAT_VERSION,
            state,
        }
    }

    /// # Errors
    /// Returns error if the version is not supported.
    pub fn validate(&self) -> Result<()> {
        check_version(self.version)
    }
}

/// Forest payload header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u16,
    pub config: CodecConfig,
    pub tree_count: u64,
}

impl Header {
    #[must_use]
    pub const fn new(config: CodecConfig, tree_count: u64) -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            config,
            tree_count,
        }
    }

    /// # Errors
    /// Returns error if magic bytes or version are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(CodecError::InvalidMagic);
        }
        check_version(self.version)
    }
}

/// Every tree of an ensemble, in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestPayload {
    pub header: Header,
    pub trees: Vec<CompressedTreeState>,
}

impl ForestPayload {
    /// # Errors
    /// Returns error if the header is invalid or disagrees with the tree list.
    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;
        if self.header.tree_count != self.trees.len() as u64 {
            return Err(CodecError::TreeCountMismatch {
                expected: self.header.tree_count,
                actual: self.trees.len(),
            });
        }
        Ok(())
    }
}

/// Compress a tree and encode it with its format version.
///
/// # Errors
/// Returns error if compression or serialization fails.
pub fn serialize_tree(state: &TreeState, config: &CodecConfig) -> Result<Vec<u8>> {
    let payload = TreePayload::new(compress_tree_state_with(state, config)?);
    Ok(bincode::serialize(&payload)?)
}

/// Decode and decompress a tree. The version is checked first.
///
/// # Errors
/// Returns error if the bytes are malformed, the version is unsupported, or
/// decompression fails.
pub fn deserialize_tree(bytes: &[u8]) -> Result<TreeState> {
    let payload: TreePayload = bincode::deserialize(bytes)?;
    payload.validate()?;
    decompress_tree_state(&payload.state)
}

/// Compress every tree of an ensemble and encode them with a header.
///
/// # Errors
/// Returns error if compression or serialization fails.
pub fn serialize_forest(trees: &[TreeState], config: &CodecConfig) -> Result<Vec<u8>> {
    let payload = ForestPayload {
        header: Header::new(config.clone(), trees.len() as u64),
        trees: compress_forest(trees, config)?,
    };
    Ok(bincode::serialize(&payload)?)
}

/// Decode and decompress an ensemble. The header is checked first.
///
/// # Errors
/// Returns error if the bytes are malformed, the header is invalid, or any
/// tree fails to decompress.
pub fn deserialize_forest(bytes: &[u8]) -> Result<Vec<TreeState>> {
    let payload: ForestPayload = bincode::deserialize(bytes)?;
    payload.validate()?;
    decompress_forest(&payload.trees, &payload.header.config)
}
