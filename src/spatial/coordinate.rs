//! Integer lattice coordinates and inclusive bounding boxes

use std::fmt;

/// Pixel position on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    /// Column, growing to the right
    pub x: i32,
    /// Row, growing downwards
    pub y: i32,
}

impl Coordinate {
    /// Create a coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by `(dx, dy)`
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Coordinate shifted by `(dx, dy)`, `None` if a component overflows
    pub const fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// Whether the coordinate lies on a `width` x `height` canvas
    pub const fn within(self, width: usize, height: usize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < width && (self.y as usize) < height
    }

    /// Parity class used by the red-black rotated-grid sweep
    pub const fn is_even(self) -> bool {
        (self.x + self.y).rem_euclid(2) == 0
    }
}

impl From<[i32; 2]> for Coordinate {
    fn from(value: [i32; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned bounding box with inclusive corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// Minimum column (inclusive)
    pub x_min: i32,
    /// Minimum row (inclusive)
    pub y_min: i32,
    /// Maximum column (inclusive)
    pub x_max: i32,
    /// Maximum row (inclusive)
    pub y_max: i32,
}

impl BoundingBox {
    /// Smallest box containing every point, `None` for an empty slice
    pub fn enclosing(points: &[Coordinate]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };
        for point in points {
            bounds.x_min = bounds.x_min.min(point.x);
            bounds.y_min = bounds.y_min.min(point.y);
            bounds.x_max = bounds.x_max.max(point.x);
            bounds.y_max = bounds.y_max.max(point.y);
        }
        Some(bounds)
    }

    /// Check if a position is within the bounds
    pub const fn contains(&self, point: Coordinate) -> bool {
        point.x >= self.x_min
            && point.x <= self.x_max
            && point.y >= self.y_min
            && point.y <= self.y_max
    }

    /// Top-left corner, the origin of the patch raster
    pub const fn origin(&self) -> Coordinate {
        Coordinate::new(self.x_min, self.y_min)
    }

    /// Number of columns covered, saturating at the `u32` range
    pub const fn width(&self) -> u32 {
        extent(self.x_min, self.x_max)
    }

    /// Number of rows covered, saturating at the `u32` range
    pub const fn height(&self) -> u32 {
        extent(self.y_min, self.y_max)
    }

    /// Whether the box is non-empty and its extent is addressable with `i32`
    pub const fn is_addressable(&self) -> bool {
        match (
            self.x_max.checked_sub(self.x_min),
            self.y_max.checked_sub(self.y_min),
        ) {
            (Some(dx), Some(dy)) => dx >= 0 && dy >= 0 && dx < i32::MAX && dy < i32::MAX,
            _ => false,
        }
    }

    /// Box shifted by `(dx, dy)`, `None` if a corner overflows
    pub const fn checked_offset(&self, dx: i32, dy: i32) -> Option<Self> {
        match (
            Coordinate::new(self.x_min, self.y_min).checked_offset(dx, dy),
            Coordinate::new(self.x_max, self.y_max).checked_offset(dx, dy),
        ) {
            (Some(min), Some(max)) => Some(Self {
                x_min: min.x,
                y_min: min.y,
                x_max: max.x,
                y_max: max.y,
            }),
            _ => None,
        }
    }
}

// Inclusive span of `min..=max`, zero when inverted
const fn extent(min: i32, max: i32) -> u32 {
    let span = max as i64 - min as i64 + 1;
    if span <= 0 {
        0
    } else if span > u32::MAX as i64 {
        u32::MAX
    } else {
        span as u32
    }
}
