/// Axis and rotated guidance fields plus the initial guess
pub mod guidance;
/// PSNR, SSIM and related full-reference image metrics
pub mod similarity;
