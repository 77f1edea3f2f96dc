//! Residual norms that drive loop termination

use ndarray::Array2;

use crate::algorithm::problem::BlendProblem;
use crate::algorithm::stencil::{Domain, triple};
use crate::analysis::guidance::{AXIS_OFFSETS, DIAGONAL_OFFSETS};

/// Global L2 norm of the axis-stencil defect
///
/// For every interior pixel the per-channel defect is
/// `b[i] + Σ U[axis neighbor] − 4·U[i]`, with non-interior neighbors read as
/// zero. Squares are summed over pixels and channels before the square root.
pub fn residual(problem: &BlendProblem, u: &Array2<f64>) -> f64 {
    stencil_residual(
        problem,
        u,
        &problem.guidance().axis,
        &AXIS_OFFSETS,
        Domain::FULL,
    )
}

/// Global L2 norm of the diagonal-stencil defect over the rotated sweep domain
///
/// Only even-parity pixels are visited, with field `c`.
pub fn rotated_residual(problem: &BlendProblem, u: &Array2<f64>) -> f64 {
    stencil_residual(
        problem,
        u,
        &problem.guidance().rotated,
        &DIAGONAL_OFFSETS,
        Domain::ROTATED_SWEEP,
    )
}

fn stencil_residual(
    problem: &BlendProblem,
    u: &Array2<f64>,
    field: &Array2<f64>,
    offsets: &[[i32; 2]],
    domain: Domain,
) -> f64 {
    let mask = problem.mask();
    let mut total = 0.0;

    domain.for_each_interior(mask, problem.bounds(), |point, i| {
        let mut defect = triple(field, i);
        for offset in offsets {
            if let Some(j) = mask.index(point.x + offset[0], point.y + offset[1]) {
                let neighbor = triple(u, j);
                for (d, n) in defect.iter_mut().zip(neighbor) {
                    *d += n;
                }
            }
        }
        for (d, center) in defect.iter_mut().zip(triple(u, i)) {
            *d -= 4.0 * center;
        }
        total += defect.iter().map(|d| d * d).sum::<f64>();
    });

    total.sqrt()
}
