//! The six relaxation methods expressed as stencil descriptors
//!
//! | Method | Neighbors | Reads |
//! |---|---|---|
//! | Jacobi | axis | all from `U` |
//! | Gauss-Seidel | axis | left/down from `V`, right/up from `U` |
//! | SOR | axis | as Gauss-Seidel, relaxed by `w` |
//! | AOR | axis | all from `U`, relaxed by `w`, plus `(r/4)` times the left and down changes |
//! | TOR | axis | as AOR with the left change weighted by `r` and the down change by `s` |
//! | RGS | diagonal, even parity | upper diagonals from `V`, lower from `U`, field `c` |
//!
//! RGS determines only the even-parity half of the lattice; once it converges,
//! [`fill_rotated`] reconstructs the odd half with the axis stencil and field `b`.

use std::fmt;

use crate::algorithm::problem::{BlendProblem, SolverState};
use crate::algorithm::stencil::{
    Domain, Field, Read, Stencil, Tap, Weighting, Write, apply_stencil,
};

/// Relaxation method and its scalar parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    /// Jacobi iteration
    Jacobi,
    /// Gauss-Seidel iteration
    GaussSeidel,
    /// Successive over-relaxation
    Sor {
        /// Relaxation factor
        omega: f64,
    },
    /// Accelerated over-relaxation
    Aor {
        /// Relaxation factor
        omega: f64,
        /// Acceleration factor
        r: f64,
    },
    /// Two-parameter over-relaxation
    Tor {
        /// Relaxation factor
        omega: f64,
        /// Left-change weight
        r: f64,
        /// Down-change weight
        s: f64,
    },
    /// Red-black Gauss-Seidel on the rotated (diagonal) grid
    RotatedGaussSeidel,
}

const AXIS_JACOBI: [Tap; 4] = [
    Tap::new(-1, 0, Read::Committed),
    Tap::new(1, 0, Read::Committed),
    Tap::new(0, -1, Read::Committed),
    Tap::new(0, 1, Read::Committed),
];

const AXIS_GAUSS_SEIDEL: [Tap; 4] = [
    Tap::new(-1, 0, Read::Next),
    Tap::new(1, 0, Read::Committed),
    Tap::new(0, -1, Read::Next),
    Tap::new(0, 1, Read::Committed),
];

const DIAGONAL_GAUSS_SEIDEL: [Tap; 4] = [
    Tap::new(-1, -1, Read::Next),
    Tap::new(1, -1, Read::Next),
    Tap::new(-1, 1, Read::Committed),
    Tap::new(1, 1, Read::Committed),
];

/// Completion pass for the odd-parity half after a rotated-grid solve
pub const ROTATED_FILL: Stencil = Stencil {
    taps: AXIS_JACOBI,
    field: Field::Axis,
    domain: Domain::ROTATED_FILL,
    weighting: Weighting::Plain,
    write: Write::Both,
};

impl Method {
    /// Stencil descriptor of one sweep of this method
    pub const fn stencil(&self) -> Stencil {
        match *self {
            Self::Jacobi => axis_stencil(AXIS_JACOBI, Weighting::Plain),
            Self::GaussSeidel => axis_stencil(AXIS_GAUSS_SEIDEL, Weighting::Plain),
            Self::Sor { omega } => axis_stencil(AXIS_GAUSS_SEIDEL, Weighting::Relaxed { omega }),
            Self::Aor { omega, r } => {
                axis_stencil(AXIS_JACOBI, Weighting::Accelerated { omega, r })
            }
            Self::Tor { omega, r, s } => {
                axis_stencil(AXIS_JACOBI, Weighting::TwoParameter { omega, r, s })
            }
            Self::RotatedGaussSeidel => Stencil {
                taps: DIAGONAL_GAUSS_SEIDEL,
                field: Field::Rotated,
                domain: Domain::ROTATED_SWEEP,
                weighting: Weighting::Plain,
                write: Write::Next,
            },
        }
    }

    /// Whether convergence is measured on the rotated grid and a completion pass follows
    pub const fn is_rotated(&self) -> bool {
        matches!(self, Self::RotatedGaussSeidel)
    }

    /// Short upper-case name, as accepted on the command line
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Jacobi => "JACOBI",
            Self::GaussSeidel => "GS",
            Self::Sor { .. } => "SOR",
            Self::Aor { .. } => "AOR",
            Self::Tor { .. } => "TOR",
            Self::RotatedGaussSeidel => "RGS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sor { omega } => write!(f, "SOR, w={omega:.2}"),
            Self::Aor { omega, r } => write!(f, "AOR, w={omega:.2}, r={r:.2}"),
            Self::Tor { omega, r, s } => write!(f, "TOR, w={omega:.2}, r={r:.2}, s={s:.2}"),
            other => f.write_str(other.name()),
        }
    }
}

const fn axis_stencil(taps: [Tap; 4], weighting: Weighting) -> Stencil {
    Stencil {
        taps,
        field: Field::Axis,
        domain: Domain::FULL,
        weighting,
        write: Write::Next,
    }
}

/// Run one sweep of `method` and commit `V → U`
pub fn relax(problem: &BlendProblem, state: &mut SolverState, method: &Method) {
    apply_stencil(problem, state, &method.stencil());
    state.commit();
}

/// Reconstruct the odd-parity pixels after a converged rotated-grid solve
///
/// Uses the axis stencil and field `b`, writing `U` and `V` together. No
/// further convergence check is expected after this pass.
pub fn fill_rotated(problem: &BlendProblem, state: &mut SolverState) {
    apply_stencil(problem, state, &ROTATED_FILL);
    state.commit();
}
