//! Parametrized four-point stencil sweep shared by every relaxation method
//!
//! A [`Stencil`] names the neighbor offsets, which iterate each neighbor is
//! read from, the guidance field, the sweep domain, the relaxation weighting
//! and where the result is written. [`apply_stencil`] walks the domain in
//! row-major order (`y` outer, `x` inner, ascending), which is what makes the
//! `Next`-reading taps see values already updated in the same sweep.

use ndarray::Array2;

use crate::algorithm::problem::{BlendProblem, SolverState};
use crate::io::configuration::CHANNELS;
use crate::spatial::coordinate::{BoundingBox, Coordinate};
use crate::spatial::mask::Mask;

/// Which iterate a neighbor value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    /// Committed iterate `U` (previous sweep)
    Committed,
    /// Iterate under construction `V` (already updated this sweep when earlier in row-major order)
    Next,
}

/// One neighbor of the stencil
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tap {
    /// Offset `[dx, dy]` from the updated pixel
    pub offset: [i32; 2],
    /// Iterate the neighbor is read from
    pub read: Read,
}

impl Tap {
    /// Create a tap
    pub const fn new(dx: i32, dy: i32, read: Read) -> Self {
        Self {
            offset: [dx, dy],
            read,
        }
    }
}

/// Right-hand side the stencil is solved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Axis field `b`
    Axis,
    /// Rotated field `c`
    Rotated,
}

/// Coordinate parity class visited by a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    /// Every pixel
    Any,
    /// Pixels with even `x + y`
    Even,
    /// Pixels with odd `x + y`
    Odd,
}

impl Parity {
    /// Whether a position belongs to this class
    pub const fn admits(self, point: Coordinate) -> bool {
        match self {
            Self::Any => true,
            Self::Even => point.is_even(),
            Self::Odd => !point.is_even(),
        }
    }
}

/// Canvas region walked by a sweep
///
/// Columns run over `start..width - x_trim` and rows over
/// `start..height - y_trim`, intersected with the selection bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    /// Parity filter
    pub parity: Parity,
    /// First row and column visited
    pub start: usize,
    /// Columns dropped at the right edge of the canvas
    pub x_trim: usize,
    /// Rows dropped at the bottom edge of the canvas
    pub y_trim: usize,
}

impl Domain {
    /// The whole canvas
    pub const FULL: Self = Self {
        parity: Parity::Any,
        start: 0,
        x_trim: 0,
        y_trim: 0,
    };

    /// Even-parity rotated-grid sweep
    ///
    /// Columns stop at `width - 2` while rows stop at `height - 1`; the
    /// asymmetric column bound is a known quirk of this sweep and is preserved.
    pub const ROTATED_SWEEP: Self = Self {
        parity: Parity::Even,
        start: 1,
        x_trim: 2,
        y_trim: 1,
    };

    /// Odd-parity completion pass after the rotated sweep converges
    pub const ROTATED_FILL: Self = Self {
        parity: Parity::Odd,
        start: 1,
        x_trim: 2,
        y_trim: 2,
    };

    /// Visit every interior pixel of the domain in row-major order
    ///
    /// The callback receives the pixel position and its unknown index.
    pub fn for_each_interior<F>(&self, mask: &Mask, bounds: BoundingBox, mut visit: F)
    where
        F: FnMut(Coordinate, usize),
    {
        let x_end = mask.width().saturating_sub(self.x_trim) as i32;
        let y_end = mask.height().saturating_sub(self.y_trim) as i32;
        let x_start = (self.start as i32).max(bounds.x_min);
        let y_start = (self.start as i32).max(bounds.y_min);
        let x_stop = x_end.min(bounds.x_max.saturating_add(1));
        let y_stop = y_end.min(bounds.y_max.saturating_add(1));

        for y in y_start..y_stop {
            for x in x_start..x_stop {
                let point = Coordinate::new(x, y);
                if !self.parity.admits(point) {
                    continue;
                }
                if let Some(i) = mask.index(x, y) {
                    visit(point, i);
                }
            }
        }
    }
}

/// Weighting applied to the plain stencil average
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weighting {
    /// `V[i] = ¼(Σ neighbors + g[i])`
    Plain,
    /// `V[i] = (w/4)(Σ neighbors + g[i]) + (1 − w)·U[i]`
    Relaxed {
        /// Relaxation factor `w`
        omega: f64,
    },
    /// Relaxed update plus `(r/4)·[ΔL + ΔD]`, one combined extrapolation term
    Accelerated {
        /// Relaxation factor `w`
        omega: f64,
        /// Acceleration factor `r`
        r: f64,
    },
    /// Relaxed update plus `(r/4)·ΔL + (s/4)·ΔD`, independently weighted
    TwoParameter {
        /// Relaxation factor `w`
        omega: f64,
        /// Weight of the left-neighbor change
        r: f64,
        /// Weight of the down-neighbor change
        s: f64,
    },
}

/// Iterates a stencil result is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    /// Only `V`; the caller commits `V → U` at sweep end
    Next,
    /// Both `U` and `V` at once
    Both,
}

/// Complete description of one relaxation sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    /// Neighbors in summation order
    pub taps: [Tap; 4],
    /// Guidance field added to the neighbor sum
    pub field: Field,
    /// Pixels updated by the sweep
    pub domain: Domain,
    /// Update weighting
    pub weighting: Weighting,
    /// Write target
    pub write: Write,
}

/// Offset of the left neighbor used by the extrapolation terms
pub const LEFT: [i32; 2] = [-1, 0];
/// Offset of the down neighbor (`y - 1`) used by the extrapolation terms
pub const DOWN: [i32; 2] = [0, -1];

/// Run one sweep of `stencil` over the problem, updating `state` in place
///
/// Neighbors that are not interior read as zero. The sweep does not commit
/// `V → U`; that is the caller's sweep-end step.
pub fn apply_stencil(problem: &BlendProblem, state: &mut SolverState, stencil: &Stencil) {
    let mask = problem.mask();
    let guidance = match stencil.field {
        Field::Axis => &problem.guidance().axis,
        Field::Rotated => &problem.guidance().rotated,
    };

    stencil
        .domain
        .for_each_interior(mask, problem.bounds(), |point, i| {
            let mut sum = [0.0; CHANNELS];
            for tap in &stencil.taps {
                let Some(j) = mask.index(point.x + tap.offset[0], point.y + tap.offset[1]) else {
                    continue;
                };
                let source = match tap.read {
                    Read::Committed => &state.u,
                    Read::Next => &state.v,
                };
                let value = triple(source, j);
                for (acc, v) in sum.iter_mut().zip(value) {
                    *acc += v;
                }
            }
            let g = triple(guidance, i);
            for (acc, v) in sum.iter_mut().zip(g) {
                *acc += v;
            }

            let current = triple(&state.u, i);
            let updated = match stencil.weighting {
                Weighting::Plain => sum.map(|total| 0.25 * total),
                Weighting::Relaxed { omega } => relaxed(omega, sum, current),
                Weighting::Accelerated { omega, r } => {
                    let (left_next, left_committed) = neighbor_pair(mask, state, point, LEFT);
                    let (down_next, down_committed) = neighbor_pair(mask, state, point, DOWN);
                    let base = relaxed(omega, sum, current);
                    std::array::from_fn(|c| {
                        base[c]
                            + r / 4.0
                                * (left_next[c] - left_committed[c] + down_next[c]
                                    - down_committed[c])
                    })
                }
                Weighting::TwoParameter { omega, r, s } => {
                    let (left_next, left_committed) = neighbor_pair(mask, state, point, LEFT);
                    let (down_next, down_committed) = neighbor_pair(mask, state, point, DOWN);
                    let base = relaxed(omega, sum, current);
                    std::array::from_fn(|c| {
                        base[c]
                            + r / 4.0 * (left_next[c] - left_committed[c])
                            + s / 4.0 * (down_next[c] - down_committed[c])
                    })
                }
            };

            store(&mut state.v, i, updated);
            if stencil.write == Write::Both {
                store(&mut state.u, i, updated);
            }
        });
}

fn relaxed(omega: f64, sum: [f64; CHANNELS], current: [f64; CHANNELS]) -> [f64; CHANNELS] {
    std::array::from_fn(|c| omega / 4.0 * sum[c] + (1.0 - omega) * current[c])
}

// (V, U) at a neighbor, both zero when the neighbor is not interior
fn neighbor_pair(
    mask: &Mask,
    state: &SolverState,
    point: Coordinate,
    offset: [i32; 2],
) -> ([f64; CHANNELS], [f64; CHANNELS]) {
    mask.index(point.x + offset[0], point.y + offset[1])
        .map_or(([0.0; CHANNELS], [0.0; CHANNELS]), |j| {
            (triple(&state.v, j), triple(&state.u, j))
        })
}

/// RGB triple stored at row `i` of an `(N, 3)` array
pub fn triple(values: &Array2<f64>, i: usize) -> [f64; CHANNELS] {
    std::array::from_fn(|c| values.get([i, c]).copied().unwrap_or(0.0))
}

fn store(values: &mut Array2<f64>, i: usize, triple: [f64; CHANNELS]) {
    for (c, value) in triple.into_iter().enumerate() {
        if let Some(slot) = values.get_mut([i, c]) {
            *slot = value;
        }
    }
}
