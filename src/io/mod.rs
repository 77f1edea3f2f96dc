//! Input/output, configuration and error handling

/// Command-line interface and command orchestration
pub mod cli;
/// Solver constants and runtime configuration defaults
pub mod configuration;
/// Error types and context management
pub mod error;
/// Raster loading, saving and patch extraction
pub mod image;
/// Stderr backend for the `log` facade
pub mod logger;
/// Terminal progress display for running blends
pub mod progress;
/// Region persistence in the line-oriented text format
pub mod region;
