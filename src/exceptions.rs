//! ## Custom Errors for Starix
//!
//! This module defines custom errors and exceptions that are used internally by Starix.

use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents errors specific to invalid operations or parameters in Starix.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug)]
pub enum StarixError {
    /// Occurs when a tree is created with parameters that cannot form a valid R*-tree.
    InvalidConfiguration {
        /// The number of dimensions that was requested.
        dims: usize,
        /// The minimum fan-out that was requested.
        min_entries: usize,
        /// The maximum fan-out that was requested.
        max_entries: usize,
    },
    /// Occurs when a bounding box has an inverted extent on some axis.
    InvalidGeometry {
        /// The axis on which the lower edge exceeds the upper edge.
        axis: usize,
        /// The lower edge on that axis.
        lo: f64,
        /// The upper edge on that axis.
        hi: f64,
    },
    /// Occurs when a bounding box has a different dimensionality than the tree.
    DimensionMismatch {
        /// The dimensionality of the tree.
        expected: usize,
        /// The dimensionality of the supplied box.
        found: usize,
    },
}

impl fmt::Display for StarixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarixError::InvalidConfiguration {
                dims,
                min_entries,
                max_entries,
            } => {
                write!(
                    f,
                    "Invalid configuration: dims={dims}, min_entries={min_entries}, \
                     max_entries={max_entries}. Requires dims >= 1, min_entries >= 2, and \
                     max_entries >= 2 * min_entries - 1."
                )
            }
            StarixError::InvalidGeometry { axis, lo, hi } => {
                write!(
                    f,
                    "Invalid geometry: lower edge {lo} exceeds upper edge {hi} on axis {axis}"
                )
            }
            StarixError::DimensionMismatch { expected, found } => {
                write!(
                    f,
                    "Dimension mismatch: tree has {expected} dimensions, but the box has {found}"
                )
            }
        }
    }
}

impl Error for StarixError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_display() {
        let err = StarixError::InvalidConfiguration {
            dims: 0,
            min_entries: 2,
            max_entries: 4,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid configuration: dims=0, min_entries=2, max_entries=4. Requires dims >= 1, \
             min_entries >= 2, and max_entries >= 2 * min_entries - 1."
        );
    }

    #[test]
    fn test_invalid_geometry_display() {
        let err = StarixError::InvalidGeometry {
            axis: 1,
            lo: 3.0,
            hi: 2.0,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid geometry: lower edge 3 exceeds upper edge 2 on axis 1"
        );
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = StarixError::DimensionMismatch {
            expected: 2,
            found: 3,
        };
        assert_eq!(
            format!("{}", err),
            "Dimension mismatch: tree has 2 dimensions, but the box has 3"
        );
    }
}
