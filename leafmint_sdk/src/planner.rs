use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Smallest depth ever planned
pub const MIN_MAX_DEPTH: u32 = 5;
/// Deepest tree the compression program accepts
pub const MAX_MAX_DEPTH: u32 = 30;
/// Largest request that still fits twice over in a tree of `MAX_MAX_DEPTH`
pub const MAX_LEAF_REQUEST: u64 = 1 << (MAX_MAX_DEPTH - 1);
/// Concurrent modifications the tree can reconcile per slot
pub const MAX_BUFFER_SIZE: u32 = 8;

/// Shape parameters of a compressed-leaf tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeShape {
    pub max_depth: u32,
    pub max_buffer_size: u32,
    pub canopy_depth: u32,
}

impl TreeShape {
    /// Maximum number of leaves
    pub fn capacity(&self) -> u64 {
        1u64 << self.max_depth
    }
}

/// Choose the smallest tree holding at least twice `requested_leaf_count`
/// leaves. A request of zero is planned as one; requests above
/// `MAX_LEAF_REQUEST` have no valid tree.
pub fn plan(requested_leaf_count: u64) -> Result<TreeShape> {
    if requested_leaf_count > MAX_LEAF_REQUEST {
        return Err(Error::InvalidRequest(format!(
            "{} leaves exceed the largest plannable tree ({} leaves)",
            requested_leaf_count, MAX_LEAF_REQUEST
        )));
    }
    let wanted = requested_leaf_count.max(1) * 2;

    let mut max_depth = MIN_MAX_DEPTH;
    while (1u64 << max_depth) < wanted {
        max_depth += 1;
    }

    Ok(TreeShape {
        max_depth,
        max_buffer_size: MAX_BUFFER_SIZE,
        canopy_depth: max_depth.saturating_sub(2),
    })
}

/// Planned tree bound to its address. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSpecification {
    tree_address: Pubkey,
    shape: TreeShape,
}

impl TreeSpecification {
    pub fn new(tree_address: Pubkey, shape: TreeShape) -> Self {
        Self { tree_address, shape }
    }

    /// Plan for `requested_leaf_count` and bind to `tree_address`
    pub fn for_leaves(tree_address: Pubkey, requested_leaf_count: u64) -> Result<Self> {
        Ok(Self::new(tree_address, plan(requested_leaf_count)?))
    }

    pub fn tree_address(&self) -> Pubkey {
        self.tree_address
    }

    pub fn shape(&self) -> TreeShape {
        self.shape
    }

    pub fn max_depth(&self) -> u32 {
        self.shape.max_depth
    }

    pub fn max_buffer_size(&self) -> u32 {
        self.shape.max_buffer_size
    }

    pub fn canopy_depth(&self) -> u32 {
        self.shape.canopy_depth
    }
}
