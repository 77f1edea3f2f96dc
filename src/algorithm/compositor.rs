//! Preview and output reconstruction from the current iterate

use image::{Rgba, RgbaImage};
use ndarray::Array2;

use crate::algorithm::stencil::triple;
use crate::math::interpolation::quantize_channel;
use crate::spatial::coordinate::{BoundingBox, Coordinate};

/// Alpha of pixels inside the selection
pub const OPAQUE: u8 = 255;
/// Alpha of pixels outside the selection
pub const TRANSPARENT: u8 = 0;

/// Rebuild a patch raster sized to `bounds` from the iterate `u`
///
/// Every interior pixel is rounded, clamped to `[0, 255]` and written opaque
/// at its position relative to the bounding-box origin. All other pixels are
/// fully transparent.
pub fn reconstruct(u: &Array2<f64>, area: &[Coordinate], bounds: BoundingBox) -> RgbaImage {
    let mut patch = RgbaImage::from_pixel(
        bounds.width(),
        bounds.height(),
        Rgba([0, 0, 0, TRANSPARENT]),
    );
    let origin = bounds.origin();

    for (i, point) in area.iter().enumerate() {
        let (x, y) = (point.x - origin.x, point.y - origin.y);
        if x < 0 || y < 0 {
            continue;
        }
        let [r, g, b] = triple(u, i).map(quantize_channel);
        if let Some(pixel) = patch.get_pixel_mut_checked(x as u32, y as u32) {
            *pixel = Rgba([r, g, b, OPAQUE]);
        }
    }

    patch
}

/// Paint the opaque pixels of `patch` onto `canvas` with its top-left at `origin`
///
/// Transparent patch pixels leave the canvas untouched; pixels falling off the
/// canvas are dropped.
pub fn merge_patch(canvas: &mut RgbaImage, patch: &RgbaImage, origin: Coordinate) {
    for (x, y, pixel) in patch.enumerate_pixels() {
        let Rgba([_, _, _, alpha]) = *pixel;
        if alpha == TRANSPARENT {
            continue;
        }
        let (cx, cy) = (origin.x + x as i32, origin.y + y as i32);
        if cx < 0 || cy < 0 {
            continue;
        }
        if let Some(slot) = canvas.get_pixel_mut_checked(cx as u32, cy as u32) {
            *slot = *pixel;
        }
    }
}
