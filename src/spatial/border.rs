//! Closed selection border construction from polygon vertices

use crate::math::interpolation::lerp_lattice;
use crate::spatial::coordinate::Coordinate;

/// Densify a closed polygon into a gap-free border
///
/// Each edge (including the closing edge from the last vertex back to the
/// first) contributes `|dx| + |dy|` points, interpolated linearly from the
/// edge start and rounded to the lattice. Consecutive points therefore never
/// move more than one unit along either axis. Duplicates are kept.
pub fn densify_border(polygon: &[Coordinate]) -> Vec<Coordinate> {
    let vertex_count = polygon.len();
    let capacity = (0..vertex_count)
        .map(|n| edge_steps(polygon, n))
        .sum::<usize>();
    let mut border = Vec::with_capacity(capacity);

    for n in 0..vertex_count {
        let (Some(start), Some(end)) = (polygon.get(n), polygon.get((n + 1) % vertex_count))
        else {
            continue;
        };
        let delta = [end.x - start.x, end.y - start.y];
        let steps = edge_steps(polygon, n);
        for step in 0..steps {
            border.push(Coordinate::from(lerp_lattice(
                [start.x, start.y],
                delta,
                step,
                steps,
            )));
        }
    }

    border
}

/// Number of border points the densified edge starting at vertex `n` produces
pub fn edge_steps(polygon: &[Coordinate], n: usize) -> usize {
    let vertex_count = polygon.len();
    if vertex_count == 0 {
        return 0;
    }
    match (polygon.get(n), polygon.get((n + 1) % vertex_count)) {
        (Some(start), Some(end)) => {
            (end.x - start.x).unsigned_abs() as usize + (end.y - start.y).unsigned_abs() as usize
        }
        _ => 0,
    }
}
