//! Full-reference image comparison
//!
//! All metrics read the first (red) channel only. Both rasters must have the
//! same dimensions.

use std::fmt;

use image::{GrayImage, Luma, RgbaImage};
use image_compare::Algorithm;

use crate::io::error::{Result, geometry_error};

const PEAK: f64 = 255.0;

/// The seven comparison metrics of a reference and a test image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Peak signal-to-noise ratio in decibels (infinite for identical images)
    pub psnr: f64,
    /// Mean structural similarity over 8×8 windows, in `[-1, 1]`
    pub ssim: f64,
    /// Structural content, ideally 1
    pub structural_content: f64,
    /// Normalized absolute error, ideally 0
    pub normalized_absolute_error: f64,
    /// Average absolute difference, ideally 0
    pub average_difference: f64,
    /// Maximum absolute difference
    pub maximum_difference: f64,
    /// Normalized cross-correlation, ideally 1
    pub cross_correlation: f64,
}

impl Similarity {
    /// Compute every metric
    ///
    /// # Errors
    ///
    /// Returns a geometry error if the images differ in size or are empty
    pub fn compare(reference: &RgbaImage, test: &RgbaImage) -> Result<Self> {
        let (a, b) = channel_pair(reference, test)?;
        let count = a.len() as f64;

        let mut squared = 0.0;
        let mut absolute = 0.0;
        let mut maximum: f64 = 0.0;
        let (mut energy_a, mut energy_b, mut cross, mut sum_a) = (0.0, 0.0, 0.0, 0.0);
        for (&x, &y) in a.iter().zip(&b) {
            let diff = (x - y).abs();
            squared += diff * diff;
            absolute += diff;
            maximum = maximum.max(diff);
            energy_a += x * x;
            energy_b += y * y;
            cross += x * y;
            sum_a += x;
        }

        Ok(Self {
            psnr: 10.0 * (PEAK * PEAK / (squared / count)).log10(),
            ssim: mean_ssim(reference, test)?,
            structural_content: energy_a / energy_b,
            normalized_absolute_error: absolute / sum_a,
            average_difference: absolute / count,
            maximum_difference: maximum,
            cross_correlation: cross / energy_a,
        })
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PSNR = {}", self.psnr)?;
        writeln!(f, "SSIM = {}", self.ssim)?;
        writeln!(f, "SC = {}", self.structural_content)?;
        writeln!(f, "NAE = {}", self.normalized_absolute_error)?;
        writeln!(f, "AVD = {}", self.average_difference)?;
        writeln!(f, "MD = {}", self.maximum_difference)?;
        write!(f, "NCC = {}", self.cross_correlation)
    }
}

/// Peak signal-to-noise ratio on the first channel
///
/// # Errors
///
/// Returns a geometry error if the images differ in size or are empty
pub fn psnr(reference: &RgbaImage, test: &RgbaImage) -> Result<f64> {
    Similarity::compare(reference, test).map(|s| s.psnr)
}

/// Mean SSIM on the first channel
///
/// Uses the simple mean-SSIM of `image_compare` over `8×8` windows.
///
/// # Errors
///
/// Returns a geometry error if the images differ in size or are empty
pub fn ssim(reference: &RgbaImage, test: &RgbaImage) -> Result<f64> {
    channel_pair(reference, test)?;
    mean_ssim(reference, test)
}

fn mean_ssim(reference: &RgbaImage, test: &RgbaImage) -> Result<f64> {
    let similarity = image_compare::gray_similarity_structure(
        &Algorithm::MSSIMSimple,
        &first_channel(reference),
        &first_channel(test),
    )
    .map_err(|e| geometry_error(&format!("SSIM comparison failed: {e}")))?;
    Ok(similarity.score)
}

fn first_channel(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y).0[0]])
    })
}

fn channel_pair(reference: &RgbaImage, test: &RgbaImage) -> Result<(Vec<f64>, Vec<f64>)> {
    if reference.dimensions() != test.dimensions() {
        let (rw, rh) = reference.dimensions();
        let (tw, th) = test.dimensions();
        return Err(geometry_error(&format!(
            "cannot compare a {rw}x{rh} image with a {tw}x{th} image"
        )));
    }
    if reference.width() == 0 || reference.height() == 0 {
        return Err(geometry_error(&"cannot compare empty images"));
    }

    let first = |image: &RgbaImage| -> Vec<f64> {
        image.pixels().map(|p| f64::from(p.0[0])).collect()
    };
    Ok((first(reference), first(test)))
}
