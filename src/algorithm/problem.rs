//! Immutable blend problem and the mutable iterate it is solved with

use image::RgbaImage;
use ndarray::Array2;

use crate::analysis::guidance::{GuidanceFields, build_guidance, initial_guess};
use crate::io::configuration::CHANNELS;
use crate::io::error::{Result, geometry_error};
use crate::spatial::coordinate::{BoundingBox, Coordinate};
use crate::spatial::mask::{Mask, Selection, build_mask};

/// Everything a relaxation sweep reads, built once per blend
///
/// Mask, selection geometry, guidance fields and the initial guess are frozen
/// at construction; solver progress lives in a separate [`SolverState`].
#[derive(Debug, Clone)]
pub struct BlendProblem {
    mask: Mask,
    selection: Selection,
    guidance: GuidanceFields,
    initial: Array2<f64>,
}

impl BlendProblem {
    /// Assemble a problem from an encoded selection and its rasters
    ///
    /// `patch` is the source patch anchored at the selection's bounding-box
    /// origin, `target` the canvas the patch is blended into.
    ///
    /// # Errors
    ///
    /// Returns a geometry error if:
    /// - The mask and target canvas differ in size
    /// - The patch does not cover the selection's bounding box
    /// - An area coordinate lies outside the bounds or disagrees with its mask index
    pub fn new(
        mask: Mask,
        selection: Selection,
        patch: &RgbaImage,
        target: &RgbaImage,
    ) -> Result<Self> {
        let (width, height) = (target.width() as usize, target.height() as usize);
        if mask.width() != width || mask.height() != height {
            return Err(geometry_error(&format!(
                "mask is {}x{} but the target canvas is {width}x{height}",
                mask.width(),
                mask.height()
            )));
        }

        let bounds = selection.bounds;
        if patch.width() < bounds.width() || patch.height() < bounds.height() {
            return Err(geometry_error(&format!(
                "source patch is {}x{} but the selection spans {}x{}",
                patch.width(),
                patch.height(),
                bounds.width(),
                bounds.height()
            )));
        }

        for (i, point) in selection.area.iter().enumerate() {
            if !bounds.contains(*point) {
                return Err(geometry_error(&format!(
                    "area position {i} at {point} lies outside the selection bounds"
                )));
            }
            if mask.index(point.x, point.y) != Some(i) {
                return Err(geometry_error(&format!(
                    "area position {i} at {point} does not match the mask"
                )));
            }
        }

        let origin = bounds.origin();
        let guidance = build_guidance(&mask, &selection.area, origin, patch, target)?;
        let initial = initial_guess(&selection.area, origin, patch)?;

        Ok(Self {
            mask,
            selection,
            guidance,
            initial,
        })
    }

    /// Encode a densified border on the target canvas and assemble the problem
    ///
    /// # Errors
    ///
    /// Returns a geometry error if mask encoding or problem assembly fails
    pub fn from_border(
        border: &[Coordinate],
        patch: &RgbaImage,
        target: &RgbaImage,
    ) -> Result<Self> {
        let (mask, selection) =
            build_mask(border, target.width() as usize, target.height() as usize)?;
        Self::new(mask, selection, patch, target)
    }

    /// Rebuild the mask of a stored selection on the target canvas and assemble the problem
    ///
    /// # Errors
    ///
    /// Returns a geometry error if the selection does not fit the target canvas
    /// or problem assembly fails
    pub fn from_selection(
        selection: Selection,
        patch: &RgbaImage,
        target: &RgbaImage,
    ) -> Result<Self> {
        let mask =
            Mask::from_selection(&selection, target.width() as usize, target.height() as usize)?;
        Self::new(mask, selection, patch, target)
    }

    /// Classified canvas grid
    pub const fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Interior pixels in unknown-index order
    pub fn area(&self) -> &[Coordinate] {
        &self.selection.area
    }

    /// Stored selection
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Bounding box of the selection border
    pub const fn bounds(&self) -> BoundingBox {
        self.selection.bounds
    }

    /// Canvas position of the patch's top-left pixel
    pub const fn origin(&self) -> Coordinate {
        self.selection.bounds.origin()
    }

    /// Guidance fields
    pub const fn guidance(&self) -> &GuidanceFields {
        &self.guidance
    }

    /// Source values at every interior pixel
    pub const fn initial(&self) -> &Array2<f64> {
        &self.initial
    }

    /// Canvas width
    pub fn width(&self) -> usize {
        self.mask.width()
    }

    /// Canvas height
    pub fn height(&self) -> usize {
        self.mask.height()
    }

    /// Number of unknowns `N`
    pub fn len(&self) -> usize {
        self.selection.area.len()
    }

    /// Whether the selection has no interior pixel
    pub fn is_empty(&self) -> bool {
        self.selection.area.is_empty()
    }
}

/// Current and next iterate of the unknown vectors
///
/// `u` is the iterate the last sweep committed, `v` the write target of the
/// sweep in progress. Both have shape `(N, 3)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverState {
    /// Committed iterate `U`
    pub u: Array2<f64>,
    /// Iterate under construction `V`
    pub v: Array2<f64>,
}

impl SolverState {
    /// Start from the problem's initial guess (the source patch values)
    pub fn new(problem: &BlendProblem) -> Self {
        Self::from_values(problem.initial().clone())
    }

    /// Start from explicit values for both iterates
    pub fn from_values(values: Array2<f64>) -> Self {
        Self {
            u: values.clone(),
            v: values,
        }
    }

    /// Start from zero
    pub fn zeros(len: usize) -> Self {
        Self::from_values(Array2::zeros((len, CHANNELS)))
    }

    /// Sweep-end step: overwrite `U` with `V`
    pub fn commit(&mut self) {
        self.u.assign(&self.v);
    }

    /// Committed iterate
    pub const fn solution(&self) -> &Array2<f64> {
        &self.u
    }
}
