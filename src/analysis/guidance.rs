//! Guidance (right-hand-side) fields for the discrete Poisson equation
//!
//! Two fields are built once per blend. The axis field `b` gathers the four
//! axis-aligned neighbors of every interior pixel, the rotated field `c`
//! gathers the four diagonal neighbors. A border neighbor contributes the
//! target value, an interior neighbor contributes the source gradient
//! `source(p) - source(q)`.
//!
//! Exterior neighbors are treated differently by the two fields: they
//! contribute nothing to `b` but contribute the target value to `c`, exactly
//! like a border neighbor would.

use image::RgbaImage;
use ndarray::Array2;

use crate::io::configuration::CHANNELS;
use crate::io::error::{Result, geometry_error};
use crate::spatial::coordinate::Coordinate;
use crate::spatial::mask::{Cell, Mask};

/// Left, right, down (`y - 1`) and up (`y + 1`) neighbor offsets
pub const AXIS_OFFSETS: [[i32; 2]; 4] = [[-1, 0], [1, 0], [0, -1], [0, 1]];

/// The four diagonal neighbor offsets of the rotated grid
pub const DIAGONAL_OFFSETS: [[i32; 2]; 4] = [[-1, -1], [1, -1], [-1, 1], [1, 1]];

/// How a neighbor outside the selection feeds the guidance sum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExteriorRule {
    /// Exterior neighbors contribute nothing
    Ignore,
    /// Exterior neighbors contribute the target value, as border neighbors do
    UseTarget,
}

/// Immutable guidance vectors, one RGB triple per interior pixel
#[derive(Debug, Clone, PartialEq)]
pub struct GuidanceFields {
    /// Axis-stencil field `b`, shape `(N, 3)`
    pub axis: Array2<f64>,
    /// Diagonal-stencil field `c`, shape `(N, 3)`
    pub rotated: Array2<f64>,
}

/// Build both guidance fields for the interior pixels of a selection
///
/// `source` is the patch raster whose top-left corner sits at `origin` on the
/// canvas; `target` is the canvas-sized raster providing boundary values.
///
/// # Errors
///
/// Returns a geometry error if the source patch does not cover an interior
/// pixel or one of its interior neighbors
pub fn build_guidance(
    mask: &Mask,
    area: &[Coordinate],
    origin: Coordinate,
    source: &RgbaImage,
    target: &RgbaImage,
) -> Result<GuidanceFields> {
    let axis = accumulate_field(
        mask,
        area,
        origin,
        source,
        target,
        &AXIS_OFFSETS,
        ExteriorRule::Ignore,
    )?;
    let rotated = accumulate_field(
        mask,
        area,
        origin,
        source,
        target,
        &DIAGONAL_OFFSETS,
        ExteriorRule::UseTarget,
    )?;

    log::debug!("guidance fields built for {} interior pixels", area.len());

    Ok(GuidanceFields { axis, rotated })
}

/// Accumulate one guidance field over the given neighbor offsets
///
/// # Errors
///
/// Returns a geometry error if the source patch does not cover a required pixel
pub fn accumulate_field(
    mask: &Mask,
    area: &[Coordinate],
    origin: Coordinate,
    source: &RgbaImage,
    target: &RgbaImage,
    offsets: &[[i32; 2]],
    exterior: ExteriorRule,
) -> Result<Array2<f64>> {
    let mut field = Array2::zeros((area.len(), CHANNELS));

    for (i, &p) in area.iter().enumerate() {
        let p_value = source_value(source, origin, p)?;
        let mut sum = [0.0; CHANNELS];

        for offset in offsets {
            let q = p.offset(offset[0], offset[1]);
            let contribution = match mask.cell(q.x, q.y) {
                Cell::Border => target_value(target, q),
                Cell::Exterior => match exterior {
                    ExteriorRule::Ignore => None,
                    ExteriorRule::UseTarget => target_value(target, q),
                },
                Cell::Interior(_) => {
                    let q_value = source_value(source, origin, q)?;
                    Some([
                        p_value[0] - q_value[0],
                        p_value[1] - q_value[1],
                        p_value[2] - q_value[2],
                    ])
                }
            };
            if let Some(value) = contribution {
                for (acc, v) in sum.iter_mut().zip(value) {
                    *acc += v;
                }
            }
        }

        for (channel, value) in sum.into_iter().enumerate() {
            if let Some(slot) = field.get_mut([i, channel]) {
                *slot = value;
            }
        }
    }

    Ok(field)
}

/// Source patch values at every interior pixel, the solver's initial guess
///
/// # Errors
///
/// Returns a geometry error if the source patch does not cover an interior pixel
pub fn initial_guess(
    area: &[Coordinate],
    origin: Coordinate,
    source: &RgbaImage,
) -> Result<Array2<f64>> {
    let mut guess = Array2::zeros((area.len(), CHANNELS));
    for (i, &p) in area.iter().enumerate() {
        let value = source_value(source, origin, p)?;
        for (channel, v) in value.into_iter().enumerate() {
            if let Some(slot) = guess.get_mut([i, channel]) {
                *slot = v;
            }
        }
    }
    Ok(guess)
}

fn source_value(
    source: &RgbaImage,
    origin: Coordinate,
    p: Coordinate,
) -> Result<[f64; CHANNELS]> {
    let (x, y) = (p.x - origin.x, p.y - origin.y);
    if x < 0 || y < 0 {
        return Err(geometry_error(&format!(
            "pixel {p} lies before the source patch origin {origin}"
        )));
    }
    source
        .get_pixel_checked(x as u32, y as u32)
        .map(|pixel| rgb(pixel.0))
        .ok_or_else(|| geometry_error(&format!("pixel {p} lies outside the source patch")))
}

fn target_value(target: &RgbaImage, q: Coordinate) -> Option<[f64; CHANNELS]> {
    if q.x < 0 || q.y < 0 {
        return None;
    }
    target
        .get_pixel_checked(q.x as u32, q.y as u32)
        .map(|pixel| rgb(pixel.0))
}

fn rgb(channels: [u8; 4]) -> [f64; CHANNELS] {
    [
        f64::from(channels[0]),
        f64::from(channels[1]),
        f64::from(channels[2]),
    ]
}
