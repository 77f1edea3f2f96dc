//! Spatial data structures for selections
//!
//! This module contains spatial-related functionality including:
//! - Lattice coordinates and bounding boxes
//! - Border densification from polygon vertices
//! - Mask encoding with exterior flood fill and interior indexing

/// Integer lattice coordinates and inclusive bounding boxes
pub mod coordinate;
/// Closed selection border construction
pub mod border;
/// Mask encoding and stored selections
pub mod mask;

pub use coordinate::{BoundingBox, Coordinate};
pub use mask::{Cell, Mask, Selection};
