//! ## Geometry Primitives for Starix
//!
//! This module defines the axis-aligned bounding box used to key entries in the
//! R*-tree. A box stores its lower and upper edges for a fixed number of axes and
//! provides the measures the tree algorithms rank candidates by: area, margin,
//! pairwise overlap, and squared center distance.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned minimum bounding rectangle in `dims` dimensions.
///
/// A freshly created empty box has `lo = +inf` and `hi = -inf` on every axis, which
/// makes it the identity for [`BoundingBox::extend`]. The measures (`area`, `margin`,
/// `overlap`) are only meaningful once the box covers something; callers must not
/// query them on an empty box.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    lo: Vec<f64>,
    hi: Vec<f64>,
}

impl BoundingBox {
    /// Creates a box from its lower and upper edges.
    ///
    /// # Panics
    ///
    /// Panics if `lo` and `hi` have different lengths.
    pub fn new(lo: Vec<f64>, hi: Vec<f64>) -> Self {
        assert_eq!(lo.len(), hi.len(), "lo and hi must have the same length");
        BoundingBox { lo, hi }
    }

    /// Creates the empty box in `dims` dimensions, the identity for `extend`.
    pub fn empty(dims: usize) -> Self {
        BoundingBox {
            lo: vec![f64::INFINITY; dims],
            hi: vec![f64::NEG_INFINITY; dims],
        }
    }

    /// Returns the number of axes of the box.
    pub fn dims(&self) -> usize {
        self.lo.len()
    }

    /// Returns the lower edges, one per axis.
    pub fn lo(&self) -> &[f64] {
        &self.lo
    }

    /// Returns the upper edges, one per axis.
    pub fn hi(&self) -> &[f64] {
        &self.hi
    }

    /// Returns true if the box has an inverted extent on some axis.
    pub fn is_empty(&self) -> bool {
        (0..self.dims()).any(|axis| self.lo[axis] > self.hi[axis])
    }

    /// Returns the product of the side lengths.
    pub fn area(&self) -> f64 {
        (0..self.dims()).map(|axis| self.hi[axis] - self.lo[axis]).product()
    }

    /// Returns the sum of the side lengths.
    pub fn margin(&self) -> f64 {
        (0..self.dims()).map(|axis| self.hi[axis] - self.lo[axis]).sum()
    }

    /// Returns the center coordinate on the given axis.
    pub fn center(&self, axis: usize) -> f64 {
        (self.lo[axis] + self.hi[axis]) / 2.0
    }

    /// Returns the volume of the intersection of `self` and `other`, or zero if the
    /// boxes do not overlap on some axis.
    pub fn overlap(&self, other: &BoundingBox) -> f64 {
        let mut ans = 1.0;
        for axis in 0..self.dims() {
            let span = self.hi[axis].min(other.hi[axis]) - self.lo[axis].max(other.lo[axis]);
            if span <= 0.0 {
                return 0.0;
            }
            ans *= span;
        }
        ans
    }

    /// Returns true if the boxes share a region of positive volume.
    ///
    /// Boxes that only touch on a face, edge, or corner do not intersect. The tree
    /// uses this predicate for both search and deletion.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.overlap(other) > 0.0
    }

    /// Returns the squared distance between the centers of `self` and `other`.
    pub fn center_distance_sq(&self, other: &BoundingBox) -> f64 {
        (0..self.dims())
            .map(|axis| {
                let d = (self.hi[axis] + self.lo[axis]) - (other.hi[axis] + other.lo[axis]);
                (d / 2.0) * (d / 2.0)
            })
            .sum()
    }

    /// Grows `self` in place so that it also covers `other`.
    pub fn extend(&mut self, other: &BoundingBox) {
        for axis in 0..self.dims() {
            self.lo[axis] = self.lo[axis].min(other.lo[axis]);
            self.hi[axis] = self.hi[axis].max(other.hi[axis]);
        }
    }

    /// Returns the smallest box that covers both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut ans = self.clone();
        ans.extend(other);
        ans
    }

    /// Returns the additional area required to enlarge `self` to include `other`.
    pub fn enlargement(&self, other: &BoundingBox) -> f64 {
        self.union(other).area() - self.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box2(lo: [f64; 2], hi: [f64; 2]) -> BoundingBox {
        BoundingBox::new(lo.to_vec(), hi.to_vec())
    }

    #[test]
    fn test_area_and_margin() {
        let b = box2([0.0, 0.0], [2.0, 3.0]);
        assert_eq!(b.area(), 6.0);
        assert_eq!(b.margin(), 5.0);
    }

    #[test]
    fn test_overlap_partial() {
        let a = box2([0.0, 0.0], [2.0, 2.0]);
        let b = box2([1.0, 1.0], [3.0, 3.0]);
        assert_eq!(a.overlap(&b), 1.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_touching_boxes_do_not_intersect() {
        let a = box2([0.0, 0.0], [1.0, 1.0]);
        let b = box2([1.0, 0.0], [2.0, 1.0]);
        assert_eq!(a.overlap(&b), 0.0);
        assert!(!a.intersects(&b));

        let corner = box2([1.0, 1.0], [2.0, 2.0]);
        assert!(!a.intersects(&corner));
    }

    #[test]
    fn test_extend_covers_both() {
        let mut a = box2([0.0, 0.0], [1.0, 1.0]);
        let b = box2([2.0, -1.0], [3.0, 0.5]);
        a.extend(&b);
        assert_eq!(a, box2([0.0, -1.0], [3.0, 1.0]));
    }

    #[test]
    fn test_empty_box_is_extend_identity() {
        let mut acc = BoundingBox::empty(2);
        assert!(acc.is_empty());
        let b = box2([4.0, 5.0], [6.0, 7.0]);
        acc.extend(&b);
        assert_eq!(acc, b);
    }

    #[test]
    fn test_overlap_with_empty_is_zero() {
        let empty = BoundingBox::empty(2);
        let b = box2([0.0, 0.0], [1.0, 1.0]);
        assert_eq!(empty.overlap(&b), 0.0);
        assert_eq!(b.overlap(&empty), 0.0);
    }

    #[test]
    fn test_center_distance_sq() {
        let a = box2([0.0, 0.0], [2.0, 2.0]);
        let b = box2([3.0, 4.0], [5.0, 6.0]);
        // Centers are (1, 1) and (4, 5).
        assert_eq!(a.center_distance_sq(&b), 25.0);
        assert_eq!(a.center_distance_sq(&a), 0.0);
    }

    #[test]
    fn test_enlargement() {
        let a = box2([0.0, 0.0], [2.0, 2.0]);
        let b = box2([2.0, 0.0], [4.0, 2.0]);
        assert_eq!(a.enlargement(&b), 4.0);
        assert_eq!(a.enlargement(&a), 0.0);
    }

    #[test]
    fn test_equality_is_element_wise() {
        let a = box2([0.0, 0.0], [1.0, 1.0]);
        let b = box2([0.0, 0.0], [1.0, 1.0]);
        let c = box2([0.0, 0.0], [1.0, 2.0]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
