//! Approximate nearest-neighbor index over room edge tiles
//!
//! Each room builds one of these over its edge tiles so that room
//! connection can ask "which of your edge tiles is closest to here"
//! without scanning the whole set.
//!
//! The search is greedy and never backtracks: at every branch it descends
//! into whichever child's representative vector is nearer to the target
//! and ignores the other subtree entirely. Internal representatives are
//! per-axis extents of the subtree, not positions, so the answer can be a
//! suboptimal edge tile. The search trades accuracy for a short,
//! allocation free descent; callers needing the true nearest point must
//! not use this index.

use glam::IVec3;
use rand::Rng;

use crate::error::{CaveError, Result};

/// One node of the approximate index
///
/// A branch's `extent` is the per-axis absolute difference between the
/// first and last coordinate of its axis-sorted subtree. It stands in
/// for the subtree during descent.
#[derive(Debug, Clone)]
pub enum IndexNode {
    /// A single coordinate
    Leaf(IVec3),
    /// An internal split
    Branch {
        left: Box<IndexNode>,
        right: Box<IndexNode>,
        extent: IVec3,
    },
}

impl IndexNode {
    /// Build an index over a coordinate set
    ///
    /// Each subtree sorts its coordinates along a uniformly random axis
    /// and splits at the midpoint. Sets of one or two coordinates become
    /// a terminal branch over leaves.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty coordinate set.
    pub fn build<R: Rng>(coords: &[IVec3], rng: &mut R) -> Result<Self> {
        if coords.is_empty() {
            return Err(CaveError::InvalidInput(
                "cannot build a spatial index over an empty coordinate set".to_string(),
            ));
        }
        Ok(Self::build_inner(coords.to_vec(), rng))
    }

    fn build_inner<R: Rng>(mut coords: Vec<IVec3>, rng: &mut R) -> Self {
        let axis = rng.gen_range(0..3usize);

        match coords.len() {
            1 => IndexNode::Branch {
                left: Box::new(IndexNode::Leaf(coords[0])),
                right: Box::new(IndexNode::Leaf(coords[0])),
                extent: IVec3::ZERO,
            },
            2 => {
                let extent = (coords[0] - coords[1]).abs();
                let (near, far) = if coords[0][axis] < coords[1][axis] {
                    (coords[0], coords[1])
                } else {
                    (coords[1], coords[0])
                };
                IndexNode::Branch {
                    left: Box::new(IndexNode::Leaf(near)),
                    right: Box::new(IndexNode::Leaf(far)),
                    extent,
                }
            }
            len => {
                coords.sort_by_key(|c| c[axis]);
                let extent = (coords[0] - coords[len - 1]).abs();
                let upper = coords.split_off(len / 2);
                IndexNode::Branch {
                    left: Box::new(Self::build_inner(coords, rng)),
                    right: Box::new(Self::build_inner(upper, rng)),
                    extent,
                }
            }
        }
    }

    /// The vector this node presents during descent
    ///
    /// Leaves present their coordinate; branches present their extent.
    #[inline]
    pub fn representative(&self) -> IVec3 {
        match self {
            IndexNode::Leaf(c) => *c,
            IndexNode::Branch { extent, .. } => *extent,
        }
    }

    /// Greedy descent toward the coordinate nearest to `target`
    ///
    /// May return a suboptimal coordinate when the true nearest neighbor
    /// lies in a pruned subtree. Distance ties descend right.
    pub fn find_closest(&self, target: IVec3) -> IVec3 {
        match self {
            IndexNode::Leaf(c) => *c,
            IndexNode::Branch { left, right, .. } => {
                let left_dist = distance_squared(left.representative(), target);
                let right_dist = distance_squared(right.representative(), target);
                if left_dist < right_dist {
                    left.find_closest(target)
                } else {
                    right.find_closest(target)
                }
            }
        }
    }

    /// Number of coordinates stored under this node
    pub fn len(&self) -> usize {
        match self {
            IndexNode::Leaf(_) => 1,
            IndexNode::Branch { left, right, .. } => left.len() + right.len(),
        }
    }

    /// Always false; a valid index holds at least one coordinate
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Squared Euclidean distance, widened to avoid overflow on large grids
#[inline]
pub(crate) fn distance_squared(a: IVec3, b: IVec3) -> i64 {
    (a - b).as_i64vec3().length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_empty_set_is_invalid() {
        assert!(IndexNode::build(&[], &mut test_rng()).is_err());
    }

    #[test]
    fn test_single_coordinate() {
        let c = IVec3::new(3, 4, 5);
        let index = IndexNode::build(&[c], &mut test_rng()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.find_closest(IVec3::new(100, -7, 0)), c);
    }

    #[test]
    fn test_pair_is_exact() {
        // With two coordinates both children are leaves, so the greedy
        // descent compares real positions and is exact
        let a = IVec3::new(0, 0, 0);
        let b = IVec3::new(10, 10, 10);
        let index = IndexNode::build(&[a, b], &mut test_rng()).unwrap();

        assert_eq!(index.find_closest(IVec3::new(1, 1, 1)), a);
        assert_eq!(index.find_closest(IVec3::new(9, 9, 9)), b);
    }

    #[test]
    fn test_returns_member_of_set() {
        let coords: Vec<IVec3> = (0..40)
            .map(|i| IVec3::new(i % 7, (i * 3) % 11, (i * 5) % 13))
            .collect();
        let index = IndexNode::build(&coords, &mut test_rng()).unwrap();
        assert_eq!(index.len(), coords.len());

        for target in [IVec3::ZERO, IVec3::new(6, 10, 12), IVec3::new(3, 5, 7)] {
            let found = index.find_closest(target);
            assert!(coords.contains(&found));
        }
    }

    #[test]
    fn test_build_determinism() {
        let coords: Vec<IVec3> = (0..25).map(|i| IVec3::new(i, 25 - i, i * 2)).collect();
        let a = IndexNode::build(&coords, &mut test_rng()).unwrap();
        let b = IndexNode::build(&coords, &mut test_rng()).unwrap();

        for target in [IVec3::new(0, 0, 0), IVec3::new(12, 12, 24)] {
            assert_eq!(a.find_closest(target), b.find_closest(target));
        }
    }

    #[test]
    fn test_extent_is_axis_spread() {
        // Force a deterministic check by building repeatedly; the root
        // extent is always first-vs-last of the sorted set, whatever the
        // axis, and for collinear points that spread is the same
        let coords: Vec<IVec3> = (0..5).map(|i| IVec3::new(i, i, i)).collect();
        let index = IndexNode::build(&coords, &mut test_rng()).unwrap();
        assert_eq!(index.representative(), IVec3::new(4, 4, 4));
    }
}
