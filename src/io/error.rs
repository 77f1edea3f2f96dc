//! Error types for blending operations

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all blending operations
#[derive(Debug)]
pub enum BlendError {
    /// Failed to load a raster from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a raster to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Persisted region or polygon file is malformed
    Parse {
        /// File being parsed
        path: PathBuf,
        /// One-based line number, when the failure is tied to a line
        line: Option<usize>,
        /// Description of what was expected
        reason: String,
    },

    /// Selection geometry cannot be blended
    ///
    /// Raised when:
    /// - The polygon is empty or leaves the canvas
    /// - No exterior seed exists (the selection covers the whole canvas)
    /// - A translated selection no longer fits the target canvas
    Geometry {
        /// Description of the degenerate geometry
        reason: String,
    },

    /// Solver configuration validation failed
    Config {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Relaxation did not reach the tolerance
    ///
    /// Either the iteration cap was exhausted or the residual stopped being finite,
    /// usually because `w`, `r` or `s` lie outside the stable range of the method.
    Divergence {
        /// Iterations completed before giving up
        iterations: usize,
        /// Residual at the last completed iteration
        residual: f64,
    },

    /// The background solver thread panicked
    WorkerPanicked,
}

impl fmt::Display for BlendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Parse { path, line, reason } => match line {
                Some(line) => write!(
                    f,
                    "Failed to parse '{}' at line {line}: {reason}",
                    path.display()
                ),
                None => write!(f, "Failed to parse '{}': {reason}", path.display()),
            },
            Self::Geometry { reason } => {
                write!(f, "Invalid selection geometry: {reason}")
            }
            Self::Config {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Divergence {
                iterations,
                residual,
            } => {
                write!(
                    f,
                    "Solver did not converge after {iterations} iterations (residual {residual:.4})"
                )
            }
            Self::WorkerPanicked => write!(f, "Blend worker thread panicked"),
        }
    }
}

impl std::error::Error for BlendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for blending results
pub type Result<T> = std::result::Result<T, BlendError>;

impl From<image::ImageError> for BlendError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for BlendError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create a configuration error
pub fn config_error(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> BlendError {
    BlendError::Config {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a geometry error
pub fn geometry_error(reason: &impl ToString) -> BlendError {
    BlendError::Geometry {
        reason: reason.to_string(),
    }
}

/// Create a parse error tied to a line of a text file
pub fn parse_error(path: &Path, line: Option<usize>, reason: &impl ToString) -> BlendError {
    BlendError::Parse {
        path: path.to_path_buf(),
        line,
        reason: reason.to_string(),
    }
}
