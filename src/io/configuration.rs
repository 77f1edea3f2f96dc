//! Solver constants and runtime configuration defaults

// Convergence policy
/// Residual below which relaxation stops
pub const DEFAULT_TOLERANCE: f64 = 1.0;

// Divergent relaxation factors otherwise loop forever
/// Default iteration cap before reporting divergence
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Method used when none is given on the command line
pub const DEFAULT_METHOD: &str = "GS";

/// Maximum number of positional relaxation parameters (`w`, `r`, `s`, `t`)
pub const MAX_PARAMETERS: usize = 4;

// Mask sentinels shared by the encoder and the persisted format
/// Mask value for cells outside the selection
pub const EXTERIOR: i32 = -2;
/// Mask value for selection border cells
pub const BORDER: i32 = -1;

/// Number of color channels carried by the solver
pub const CHANNELS: usize = 3;

// Preview and telemetry cadence
/// Publish a preview snapshot every N iterations
pub const PREVIEW_PUBLISH_INTERVAL: usize = 1;
/// Emit a debug log line every N iterations
pub const LOG_EVERY_ITERATIONS: usize = 100;
/// Records a worker buffers for a slow consumer before skipping new ones
pub const RECORD_QUEUE_CAPACITY: usize = 64;

// Progress display settings
/// Spinner refresh interval in milliseconds
pub const PROGRESS_TICK_MS: u64 = 120;

// Output settings
/// Suffix added to blended output filenames
pub const OUTPUT_SUFFIX: &str = "_blended";
/// Suffix of the RGBA patch stored beside a region file
pub const REGION_PATCH_SUFFIX: &str = ".png";
/// Suffix of the binary mask preview stored beside a region file
pub const REGION_MASK_SUFFIX: &str = "b.png";

/// Mask preview intensity for selected pixels
pub const MASK_SELECTED: u8 = 0;
/// Mask preview intensity for unselected pixels
pub const MASK_UNSELECTED: u8 = 255;
