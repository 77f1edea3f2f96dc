//! Selection masks: border, indexed interior and exterior classification
//!
//! A mask is a canvas-sized integer grid. Border cells hold `-1`, cells outside
//! the selection hold `-2`, and every interior cell holds its index into the
//! per-pixel unknown arrays. Interior indices are assigned in a single
//! row-major pass, so `area[mask(x, y)] == (x, y)` for every interior cell.

use bitvec::prelude::{BitVec, bitvec};
use ndarray::Array2;

use crate::io::configuration::{BORDER, EXTERIOR};
use crate::io::error::{BlendError, Result, geometry_error};
use crate::spatial::coordinate::{BoundingBox, Coordinate};

/// Classification of a single mask cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Outside the selection, or off the canvas
    Exterior,
    /// On the selection border (Dirichlet boundary)
    Border,
    /// Inside the selection, with its unknown index
    Interior(usize),
}

/// Canvas-sized classification grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    /// Raw mask values indexed by `[row, col]`
    values: Array2<i32>,
}

impl Mask {
    /// Create a mask with every cell exterior
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: Array2::from_elem((height, width), EXTERIOR),
        }
    }

    /// Canvas width in cells
    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    /// Canvas height in cells
    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    /// Raw value at `(x, y)`; off-canvas positions read as exterior
    pub fn value(&self, x: i32, y: i32) -> i32 {
        if x < 0 || y < 0 {
            return EXTERIOR;
        }
        self.values
            .get([y as usize, x as usize])
            .copied()
            .unwrap_or(EXTERIOR)
    }

    /// Classified cell at `(x, y)`
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        match self.value(x, y) {
            BORDER => Cell::Border,
            value if value >= 0 => Cell::Interior(value as usize),
            _ => Cell::Exterior,
        }
    }

    /// Unknown index at `(x, y)`, if the cell is interior
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        match self.cell(x, y) {
            Cell::Interior(index) => Some(index),
            Cell::Border | Cell::Exterior => None,
        }
    }

    /// Number of interior cells
    pub fn interior_count(&self) -> usize {
        self.values.iter().filter(|&&value| value >= 0).count()
    }

    /// Read-only view of the raw values (`[row, col]`)
    pub const fn values(&self) -> &Array2<i32> {
        &self.values
    }

    fn set(&mut self, point: Coordinate, value: i32) {
        if point.x < 0 || point.y < 0 {
            return;
        }
        if let Some(cell) = self.values.get_mut([point.y as usize, point.x as usize]) {
            *cell = value;
        }
    }

    /// Rebuild a mask directly from a stored selection, without flood filling
    ///
    /// Border coordinates are marked `-1`, area position `i` is marked `i`,
    /// everything else stays exterior.
    ///
    /// # Errors
    ///
    /// Returns a geometry error if:
    /// - Any border or area coordinate lies off the canvas
    /// - An area coordinate repeats or coincides with a border coordinate
    pub fn from_selection(
        selection: &Selection,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        if !selection.fits(width, height) {
            return Err(geometry_error(&format!(
                "selection does not fit a {width}x{height} canvas"
            )));
        }

        let mut mask = Self::new(width, height);
        for &point in &selection.border {
            mask.set(point, BORDER);
        }
        for (index, &point) in selection.area.iter().enumerate() {
            if mask.value(point.x, point.y) != EXTERIOR {
                return Err(geometry_error(&format!(
                    "area coordinate {point} is duplicated or lies on the border"
                )));
            }
            mask.set(point, index as i32);
        }
        Ok(mask)
    }
}

/// Snapshot of a selection: its border, indexed area and bounding box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Densified closed border, duplicates permitted
    pub border: Vec<Coordinate>,
    /// Interior pixels; position `i` matches mask value `i`
    pub area: Vec<Coordinate>,
    /// Bounding box of the border
    pub bounds: BoundingBox,
}

impl Selection {
    /// Selection shifted by `(dx, dy)`
    ///
    /// # Errors
    ///
    /// Returns a geometry error if a shifted coordinate leaves the `i32` range
    pub fn translated(&self, dx: i32, dy: i32) -> Result<Self> {
        let shift = |points: &[Coordinate]| -> Result<Vec<Coordinate>> {
            points
                .iter()
                .map(|p| p.checked_offset(dx, dy).ok_or_else(|| overflow(dx, dy)))
                .collect()
        };
        Ok(Self {
            border: shift(&self.border)?,
            area: shift(&self.area)?,
            bounds: self
                .bounds
                .checked_offset(dx, dy)
                .ok_or_else(|| overflow(dx, dy))?,
        })
    }

    /// Whether every border and area coordinate lies on the canvas
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.border
            .iter()
            .chain(self.area.iter())
            .all(|p| p.within(width, height))
    }

    /// Number of interior pixels
    pub const fn len(&self) -> usize {
        self.area.len()
    }

    /// Whether the selection encloses no interior pixel
    pub const fn is_empty(&self) -> bool {
        self.area.is_empty()
    }
}

/// Encode a densified border into a classified mask
///
/// Marks the border, flood-fills the exterior from a seed found outside the
/// bounding box (row-major scan), then indexes every unreached, non-border cell
/// inside the bounding box in row-major order.
///
/// # Errors
///
/// Returns a geometry error if:
/// - The border is empty
/// - A border coordinate lies off the canvas
/// - No canvas cell lies outside the bounding box (no exterior seed)
pub fn build_mask(
    border: &[Coordinate],
    width: usize,
    height: usize,
) -> Result<(Mask, Selection)> {
    let bounds = BoundingBox::enclosing(border)
        .ok_or_else(|| geometry_error(&"selection border is empty"))?;

    if let Some(outside) = border.iter().find(|p| !p.within(width, height)) {
        return Err(geometry_error(&format!(
            "border point {outside} lies outside the {width}x{height} canvas"
        )));
    }

    let mut mask = Mask::new(width, height);
    for &point in border {
        mask.set(point, BORDER);
    }

    let seed = find_exterior_seed(&bounds, width, height).ok_or_else(|| {
        geometry_error(&"selection covers the whole canvas, no exterior seed exists")
    })?;
    let reached = flood_exterior(&mask, seed);

    let mut area = Vec::new();
    for y in bounds.y_min..=bounds.y_max {
        for x in bounds.x_min..=bounds.x_max {
            let flat = y as usize * width + x as usize;
            let is_reached = reached.get(flat).is_some_and(|bit| *bit);
            if is_reached || mask.value(x, y) == BORDER {
                continue;
            }
            let point = Coordinate::new(x, y);
            mask.set(point, area.len() as i32);
            area.push(point);
        }
    }

    log::debug!(
        "mask built: {} border points, {} interior pixels, bounds {:?}",
        border.len(),
        area.len(),
        bounds
    );

    Ok((
        mask,
        Selection {
            border: border.to_vec(),
            area,
            bounds,
        },
    ))
}

/// First canvas cell outside the bounding box in row-major order
pub fn find_exterior_seed(
    bounds: &BoundingBox,
    width: usize,
    height: usize,
) -> Option<Coordinate> {
    (0..height as i32)
        .flat_map(|y| (0..width as i32).map(move |x| Coordinate::new(x, y)))
        .find(|&point| !bounds.contains(point))
}

// 4-connected fill that stops at border cells and never revisits a cell
fn flood_exterior(mask: &Mask, seed: Coordinate) -> BitVec {
    let (width, height) = (mask.width(), mask.height());
    let mut reached = bitvec![0; width * height];
    let mut stack = vec![seed];

    while let Some(point) = stack.pop() {
        if !point.within(width, height) || mask.value(point.x, point.y) == BORDER {
            continue;
        }
        let flat = point.y as usize * width + point.x as usize;
        if reached.get(flat).is_none_or(|bit| *bit) {
            continue;
        }
        reached.set(flat, true);
        stack.push(point.offset(-1, 0));
        stack.push(point.offset(1, 0));
        stack.push(point.offset(0, -1));
        stack.push(point.offset(0, 1));
    }

    reached
}

fn overflow(dx: i32, dy: i32) -> BlendError {
    geometry_error(&format!(
        "offset ({dx}, {dy}) moves the selection outside the coordinate range"
    ))
}
