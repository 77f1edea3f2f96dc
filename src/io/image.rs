//! Raster loading, saving and selection patch extraction

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::algorithm::compositor::{OPAQUE, TRANSPARENT};
use crate::io::configuration::{MASK_SELECTED, MASK_UNSELECTED, OUTPUT_SUFFIX};
use crate::io::error::{BlendError, Result, geometry_error};
use crate::spatial::mask::Selection;

/// Load any supported raster as RGBA
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|e| BlendError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(image.to_rgba8())
}

/// Save an RGBA raster, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn save_rgba(image: &RgbaImage, path: &Path) -> Result<()> {
    create_parent(path)?;
    image.save(path).map_err(|e| BlendError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save a single-channel raster, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn save_gray(image: &GrayImage, path: &Path) -> Result<()> {
    create_parent(path)?;
    image.save(path).map_err(|e| BlendError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BlendError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }
    Ok(())
}

/// Cut the selected pixels out of `source`
///
/// The patch spans the selection's bounding box. Area pixels are copied with
/// full opacity; every other pixel is transparent.
///
/// # Errors
///
/// Returns a geometry error if the selection does not fit on `source`
pub fn extract_patch(source: &RgbaImage, selection: &Selection) -> Result<RgbaImage> {
    let (width, height) = source.dimensions();
    if !selection.fits(width as usize, height as usize) {
        return Err(geometry_error(&format!(
            "selection does not fit the {width}x{height} source image"
        )));
    }

    let bounds = selection.bounds;
    let origin = bounds.origin();
    let mut patch = RgbaImage::from_pixel(
        bounds.width(),
        bounds.height(),
        Rgba([0, 0, 0, TRANSPARENT]),
    );

    for point in &selection.area {
        let Rgba([r, g, b, _]) = *source.get_pixel(point.x as u32, point.y as u32);
        let (px, py) = ((point.x - origin.x) as u32, (point.y - origin.y) as u32);
        if let Some(pixel) = patch.get_pixel_mut_checked(px, py) {
            *pixel = Rgba([r, g, b, OPAQUE]);
        }
    }

    Ok(patch)
}

/// Binary preview of a patch: selected (non-transparent) pixels dark, the rest light
pub fn mask_preview(patch: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(patch.width(), patch.height(), |x, y| {
        let Rgba([_, _, _, alpha]) = *patch.get_pixel(x, y);
        if alpha > TRANSPARENT {
            Luma([MASK_SELECTED])
        } else {
            Luma([MASK_UNSELECTED])
        }
    })
}

/// Default output location: `<target stem>_blended.png` beside the target
pub fn default_output_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    target.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.png"))
}
