//! ## R*-tree Implementation
//!
//! This module implements a dynamic, in-memory R*-tree over axis-aligned bounding
//! boxes in a fixed number of dimensions. The tree stores opaque values keyed by
//! their minimum bounding boxes and supports insertion, range search, and
//! range-based deletion. Insertion follows Beckmann et al.: the descent picks the
//! subtree with the cheapest cover extension, a full node first tries to reinsert
//! its outermost entries (once per level per insertion), and only then splits
//! along the axis with the smallest total margin.
//!
//! # Examples
//!
//! ```
//! use starix::geometry::BoundingBox;
//! use starix::rstar_tree::RStarTree;
//!
//! let mut tree: RStarTree<&str> = RStarTree::new(2, 2, 4).unwrap();
//! tree.insert("a", BoundingBox::new(vec![0.0, 0.0], vec![1.0, 1.0])).unwrap();
//! tree.insert("b", BoundingBox::new(vec![3.0, 3.0], vec![4.0, 4.0])).unwrap();
//!
//! let query = BoundingBox::new(vec![0.5, 0.5], vec![2.0, 2.0]);
//! let results = tree.search(&query);
//! assert_eq!(results.len(), 1);
//! assert_eq!(*results[0].0, "a");
//!
//! let removed = tree.delete_in_area(&query);
//! assert_eq!(removed, 1);
//! assert_eq!(tree.len(), 1);
//! ```

use crate::exceptions::StarixError;
use crate::geometry::BoundingBox;
use ordered_float::OrderedFloat;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

// Share of a full node detached by a forced reinsert.
const REINSERT_FRACTION: f64 = 0.3;

/// An entry in the R*-tree, which holds either a stored value or a child node.
///
/// Entries within one node are homogeneous; the node's `leaf_level` flag says
/// which variant its entries are.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Entry<T> {
    /// A stored value together with its minimum bounding box.
    Leaf { mbr: BoundingBox, value: T },
    /// A child node together with the exact cover of the child's entries.
    Inner {
        mbr: BoundingBox,
        child: Box<Node<T>>,
    },
}

impl<T> Entry<T> {
    /// Returns a reference to the minimum bounding box of this entry.
    pub fn mbr(&self) -> &BoundingBox {
        match self {
            Entry::Leaf { mbr, .. } => mbr,
            Entry::Inner { mbr, .. } => mbr,
        }
    }

    /// Returns the stored value if this is a leaf entry.
    pub fn value(&self) -> Option<&T> {
        match self {
            Entry::Leaf { value, .. } => Some(value),
            Entry::Inner { .. } => None,
        }
    }

    /// Returns the child node if this is an inner entry.
    pub fn child(&self) -> Option<&Node<T>> {
        match self {
            Entry::Inner { child, .. } => Some(child),
            Entry::Leaf { .. } => None,
        }
    }
}

/// A node in the R*-tree.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node<T> {
    /// The entries stored in this node.
    pub entries: Vec<Entry<T>>,
    /// Indicates whether the entries of this node are leaf entries.
    pub leaf_level: bool,
}

impl<T> Node<T> {
    fn new(leaf_level: bool) -> Self {
        Node {
            entries: Vec::new(),
            leaf_level,
        }
    }

    /// Returns the exact cover of this node's entries, or `None` for an empty node.
    pub fn mbr(&self) -> Option<BoundingBox> {
        mbr_of_entries(&self.entries)
    }
}

/// R*-tree data structure indexing values by D-dimensional bounding boxes.
///
/// The tree is configured with a dimensionality and a minimum and maximum fan-out.
/// Every non-root node keeps between `min_entries` and `max_entries` entries after
/// an insertion; deletion may leave nodes under-full (there is no CondenseTree
/// pass). All leaf entries sit at the same depth.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RStarTree<T> {
    root: Node<T>,
    dims: usize,
    min_entries: usize,
    max_entries: usize,
    len: usize,
    // Levels already drained by a forced reinsert, scoped to one insert call.
    // Keyed by level above the leaves so the recorded levels stay valid when the
    // root splits mid-insertion.
    #[cfg_attr(feature = "serde", serde(skip))]
    reinserted_levels: HashSet<usize>,
}

impl<T> RStarTree<T> {
    /// Creates a new R*-tree.
    ///
    /// # Arguments
    ///
    /// * `dims` - The number of dimensions of the indexed bounding boxes.
    /// * `min_entries` - The minimum number of entries per non-root node.
    /// * `max_entries` - The maximum number of entries per node.
    ///
    /// # Errors
    ///
    /// Returns `StarixError::InvalidConfiguration` unless `dims >= 1`,
    /// `min_entries >= 2`, and `max_entries >= 2 * min_entries - 1` (the last
    /// bound guarantees that a full node has at least one valid split).
    pub fn new(dims: usize, min_entries: usize, max_entries: usize) -> Result<Self, StarixError> {
        if dims < 1 || min_entries < 2 || max_entries < 2 * min_entries - 1 {
            return Err(StarixError::InvalidConfiguration {
                dims,
                min_entries,
                max_entries,
            });
        }
        info!(
            "Creating new RStarTree with dims: {}, min_entries: {}, max_entries: {}",
            dims, min_entries, max_entries
        );
        Ok(RStarTree {
            root: Node::new(true),
            dims,
            min_entries,
            max_entries,
            len: 0,
            reinserted_levels: HashSet::new(),
        })
    }

    /// Inserts a value keyed by its minimum bounding box.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to store. The tree treats it as opaque.
    /// * `mbr` - The bounding box of the value.
    ///
    /// # Errors
    ///
    /// Returns `StarixError::DimensionMismatch` if `mbr` does not have the tree's
    /// dimensionality, or `StarixError::InvalidGeometry` naming the first axis on
    /// which `lo > hi`. On error the tree is left untouched.
    pub fn insert(&mut self, value: T, mbr: BoundingBox) -> Result<(), StarixError> {
        if mbr.dims() != self.dims {
            return Err(StarixError::DimensionMismatch {
                expected: self.dims,
                found: mbr.dims(),
            });
        }
        for axis in 0..self.dims {
            if mbr.lo()[axis] > mbr.hi()[axis] {
                return Err(StarixError::InvalidGeometry {
                    axis,
                    lo: mbr.lo()[axis],
                    hi: mbr.hi()[axis],
                });
            }
        }
        info!("Inserting entry into RStarTree with mbr: {:?}", mbr);
        self.reinserted_levels.clear();
        self.len += 1;
        self.insert_entry(Entry::Leaf { mbr, value });
        Ok(())
    }

    /// Performs a range search with the given query box.
    ///
    /// # Arguments
    ///
    /// * `query` - The box to search against. Must have the tree's dimensionality.
    ///
    /// # Returns
    ///
    /// The values whose bounding boxes share a region of positive volume with
    /// `query`, each paired with its box. Boxes that only touch the query on a
    /// face are not reported. The order of the results is unspecified.
    pub fn search(&self, query: &BoundingBox) -> Vec<(&T, &BoundingBox)> {
        debug_assert_eq!(query.dims(), self.dims);
        info!("Performing range search with query: {:?}", query);
        let mut found = Vec::new();
        search_node(&self.root, query, &mut found);
        found
    }

    /// Deletes every entry whose bounding box intersects the given query box.
    ///
    /// Uses the same open-style intersection test as [`RStarTree::search`]: entries
    /// that only touch the query are kept. Nodes may be left under-full; children
    /// that become empty are pruned, but the tree height never shrinks.
    ///
    /// # Arguments
    ///
    /// * `query` - The area to clear. Must have the tree's dimensionality.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    pub fn delete_in_area(&mut self, query: &BoundingBox) -> usize {
        debug_assert_eq!(query.dims(), self.dims);
        info!("Deleting entries in area: {:?}", query);
        let removed = delete_in_node(&mut self.root, query);
        if self.root.entries.is_empty() {
            // The tree is empty again; later inserts start from a leaf root.
            self.root.leaf_level = true;
        }
        self.len -= removed;
        debug!("Deleted {} entries", removed);
        removed
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree stores no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[doc(hidden)]
    pub fn height(&self) -> usize {
        level_of(&self.root) + 1
    }

    /// Returns read-only access to the root node.
    ///
    /// This is the traversal hook for printers, visualizers, and persisters: each
    /// node exposes its cover, its `leaf_level` flag, and its entries.
    pub fn root_for_inspection(&self) -> &Node<T> {
        &self.root
    }

    // Drains the insertion queue. The queue starts with the new leaf entry; a
    // forced reinsert deeper down pushes the detached entries here together with
    // the level they must return to.
    fn insert_entry(&mut self, entry: Entry<T>) {
        let mut pending: Vec<(Entry<T>, usize)> = vec![(entry, 0)];
        while let Some((entry, target_level)) = pending.pop() {
            let root_level = level_of(&self.root);
            let split = insert_at_level(
                &mut self.root,
                entry,
                target_level,
                root_level,
                true,
                self.min_entries,
                self.max_entries,
                &mut self.reinserted_levels,
                &mut pending,
            );
            if let Some(sibling) = split {
                self.grow_root(sibling);
            }
        }
    }

    // Replaces the root with a fresh inner node over the old root and its new
    // sibling; the only way the tree gains a level.
    fn grow_root(&mut self, sibling: Node<T>) {
        debug!("Root split: growing tree by one level");
        let old_root = std::mem::replace(&mut self.root, Node::new(false));
        for child in [old_root, sibling] {
            let mbr = mbr_of_entries(&child.entries).expect("split nodes are never empty");
            self.root.entries.push(Entry::Inner {
                mbr,
                child: Box::new(child),
            });
        }
    }
}

// Exact cover of a group of entries; None when the group is empty.
fn mbr_of_entries<T>(entries: &[Entry<T>]) -> Option<BoundingBox> {
    let mut iter = entries.iter();
    let first = iter.next()?.mbr().clone();
    Some(iter.fold(first, |acc, entry| acc.union(entry.mbr())))
}

// Level of `node` above the leaves: 0 for a leaf-level node. All branches have
// the same length, so following the first child is enough.
fn level_of<T>(node: &Node<T>) -> usize {
    let mut level = 0;
    let mut current = node;
    while let Some(Entry::Inner { child, .. }) = current.entries.first() {
        level += 1;
        current = child;
    }
    level
}

/// Picks the child of `node` to descend into when placing a box.
///
/// At the level just above the leaves, children are scored by how much the
/// insertion would grow their overlap with their siblings; higher up, by area
/// enlargement. Ties fall through to the smaller resulting cover, then the
/// smaller current cover, then the first candidate.
fn choose_subtree<T>(node: &Node<T>, mbr: &BoundingBox, level: usize) -> usize {
    let score_by_overlap = level == 1;
    node.entries
        .iter()
        .enumerate()
        .min_by_key(|&(index, entry)| {
            let extended = entry.mbr().union(mbr);
            let score = if score_by_overlap {
                overlap_enlargement(node, index, &extended)
            } else {
                extended.area() - entry.mbr().area()
            };
            (
                OrderedFloat(score),
                OrderedFloat(extended.area()),
                OrderedFloat(entry.mbr().area()),
            )
        })
        .map(|(index, _)| index)
        .unwrap_or(0)
}

// Growth of the total pairwise overlap between `node.entries[index]` and its
// siblings if that entry's cover grows to `extended`.
fn overlap_enlargement<T>(node: &Node<T>, index: usize, extended: &BoundingBox) -> f64 {
    let mbr = node.entries[index].mbr();
    node.entries
        .iter()
        .enumerate()
        .filter(|&(sibling, _)| sibling != index)
        .map(|(_, other)| extended.overlap(other.mbr()) - mbr.overlap(other.mbr()))
        .sum()
}

// Recursive descent for one queued entry. Places `entry` at `target_level`,
// keeps the covers along the path exact on the way back, and resolves overflow
// bottom-up. Returns the new sibling when this node was split.
#[allow(clippy::too_many_arguments)]
fn insert_at_level<T>(
    node: &mut Node<T>,
    entry: Entry<T>,
    target_level: usize,
    level: usize,
    is_root: bool,
    min_entries: usize,
    max_entries: usize,
    reinserted_levels: &mut HashSet<usize>,
    pending: &mut Vec<(Entry<T>, usize)>,
) -> Option<Node<T>> {
    if level == target_level {
        debug_assert_eq!(node.leaf_level, matches!(entry, Entry::Leaf { .. }));
        node.entries.push(entry);
    } else {
        let best = choose_subtree(node, entry.mbr(), level);
        let (split, child_mbr) = {
            let child = match &mut node.entries[best] {
                Entry::Inner { child, .. } => child,
                Entry::Leaf { .. } => unreachable!("descent continued past the leaf level"),
            };
            let split = insert_at_level(
                child,
                entry,
                target_level,
                level - 1,
                false,
                min_entries,
                max_entries,
                reinserted_levels,
                pending,
            );
            (split, mbr_of_entries(&child.entries))
        };
        // The child gained, lost, or redistributed entries; recompute its cached
        // cover exactly so ancestors stay tight after a reinsert.
        if let (Entry::Inner { mbr, .. }, Some(new_mbr)) = (&mut node.entries[best], child_mbr) {
            *mbr = new_mbr;
        }
        if let Some(new_node) = split {
            let mbr = mbr_of_entries(&new_node.entries).expect("split nodes are never empty");
            node.entries.push(Entry::Inner {
                mbr,
                child: Box::new(new_node),
            });
        }
    }

    if node.entries.len() > max_entries {
        handle_overflow(
            node,
            level,
            is_root,
            min_entries,
            max_entries,
            reinserted_levels,
            pending,
        )
    } else {
        None
    }
}

// Resolves a node that has grown to max_entries + 1 entries: forced reinsert the
// first time a level overflows during this insertion, split otherwise. The root
// always splits.
fn handle_overflow<T>(
    node: &mut Node<T>,
    level: usize,
    is_root: bool,
    min_entries: usize,
    max_entries: usize,
    reinserted_levels: &mut HashSet<usize>,
    pending: &mut Vec<(Entry<T>, usize)>,
) -> Option<Node<T>> {
    if !is_root && !reinserted_levels.contains(&level) {
        reinserted_levels.insert(level);
        forced_reinsert(node, level, max_entries, pending);
        None
    } else {
        Some(split_node(node, min_entries, max_entries))
    }
}

// Detaches the entries farthest from the node's center and queues them for
// re-insertion at their original level, farthest first. Smooths local clustering
// and often avoids a split altogether.
fn forced_reinsert<T>(
    node: &mut Node<T>,
    level: usize,
    max_entries: usize,
    pending: &mut Vec<(Entry<T>, usize)>,
) {
    let node_mbr = mbr_of_entries(&node.entries).expect("overflowing node is never empty");
    let reinsert_count = ((max_entries + 1) as f64 * REINSERT_FRACTION) as usize;
    debug!(
        "Forced reinsert of {} entries at level {}",
        reinsert_count, level
    );
    node.entries
        .sort_by_key(|entry| OrderedFloat(entry.mbr().center_distance_sq(&node_mbr)));
    let keep = node.entries.len() - reinsert_count;
    pending.extend(
        node.entries
            .split_off(keep)
            .into_iter()
            .map(|entry| (entry, level)),
    );
}

// Sort key for a split distribution pass: the lower or upper edge on `axis`.
fn axis_key<T>(entry: &Entry<T>, axis: usize, by_upper: bool) -> OrderedFloat<f64> {
    if by_upper {
        OrderedFloat(entry.mbr().hi()[axis])
    } else {
        OrderedFloat(entry.mbr().lo()[axis])
    }
}

// Stage one of the R* split: the axis whose candidate distributions have the
// smallest total margin. Left groups hold min_entries + k entries, for every k
// that leaves both groups at least min_entries.
fn choose_split_axis<T>(entries: &mut [Entry<T>], min_entries: usize) -> usize {
    let dims = entries[0].mbr().dims();
    let distributions = entries.len() - 2 * min_entries + 1;
    let mut best_axis = 0;
    let mut min_margin = f64::INFINITY;
    for axis in 0..dims {
        let mut margin_sum = 0.0;
        for by_upper in [false, true] {
            entries.sort_by_key(|entry| axis_key(entry, axis, by_upper));
            for k in 0..distributions {
                let (left, right) = entries.split_at(min_entries + k);
                let left_mbr = mbr_of_entries(left).expect("split groups are never empty");
                let right_mbr = mbr_of_entries(right).expect("split groups are never empty");
                margin_sum += left_mbr.margin() + right_mbr.margin();
            }
        }
        if margin_sum < min_margin {
            min_margin = margin_sum;
            best_axis = axis;
        }
    }
    best_axis
}

// Stage two plus the cut itself: along the chosen axis, over both sorts and all
// distributions, the grouping with the least overlap between the two covers wins,
// ties broken by total area. Detaches and returns the right group.
fn split_node<T>(node: &mut Node<T>, min_entries: usize, max_entries: usize) -> Node<T> {
    debug_assert_eq!(node.entries.len(), max_entries + 1);
    let axis = choose_split_axis(&mut node.entries, min_entries);
    let distributions = node.entries.len() - 2 * min_entries + 1;

    let mut best_by_upper = false;
    let mut best_index = 0;
    let mut best_score = (OrderedFloat(f64::INFINITY), OrderedFloat(f64::INFINITY));
    for by_upper in [false, true] {
        node.entries
            .sort_by_key(|entry| axis_key(entry, axis, by_upper));
        for k in 0..distributions {
            let (left, right) = node.entries.split_at(min_entries + k);
            let left_mbr = mbr_of_entries(left).expect("split groups are never empty");
            let right_mbr = mbr_of_entries(right).expect("split groups are never empty");
            let score = (
                OrderedFloat(left_mbr.overlap(&right_mbr)),
                OrderedFloat(left_mbr.area() + right_mbr.area()),
            );
            if score < best_score {
                best_score = score;
                best_by_upper = by_upper;
                best_index = k;
            }
        }
    }
    if !best_by_upper {
        node.entries
            .sort_by_key(|entry| axis_key(entry, axis, false));
    }
    debug!(
        "Splitting node on axis {} at distribution index {}",
        axis, best_index
    );
    Node {
        entries: node.entries.split_off(min_entries + best_index),
        leaf_level: node.leaf_level,
    }
}

fn search_node<'a, T>(
    node: &'a Node<T>,
    query: &BoundingBox,
    found: &mut Vec<(&'a T, &'a BoundingBox)>,
) {
    for entry in &node.entries {
        if !query.intersects(entry.mbr()) {
            continue;
        }
        match entry {
            Entry::Leaf { mbr, value } => found.push((value, mbr)),
            Entry::Inner { child, .. } => search_node(child, query, found),
        }
    }
}

// Removes every leaf entry intersecting `query` below `node`, pruning children
// that become empty and recomputing the covers of the ones that shrank. Returns
// the number of removed leaf entries.
fn delete_in_node<T>(node: &mut Node<T>, query: &BoundingBox) -> usize {
    let mut removed = 0;
    if node.leaf_level {
        let before = node.entries.len();
        node.entries.retain(|entry| !query.intersects(entry.mbr()));
        removed = before - node.entries.len();
    } else {
        let mut emptied = Vec::new();
        for (index, entry) in node.entries.iter_mut().enumerate() {
            if !query.intersects(entry.mbr()) {
                continue;
            }
            let (mbr, child) = match entry {
                Entry::Inner { mbr, child } => (mbr, child),
                Entry::Leaf { .. } => unreachable!("leaf entry in a non-leaf node"),
            };
            let in_child = delete_in_node(child, query);
            if in_child == 0 {
                continue;
            }
            removed += in_child;
            if child.entries.is_empty() {
                emptied.push(index);
            } else if let Some(new_mbr) = mbr_of_entries(&child.entries) {
                // Removals only shrink the child; an incremental extend would leave
                // the cached cover too large.
                *mbr = new_mbr;
            }
        }
        for &index in emptied.iter().rev() {
            node.entries.remove(index);
        }
    }
    removed
}
