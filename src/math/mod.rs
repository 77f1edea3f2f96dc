//! Mathematical utilities for the lattice and color quantization

/// Half-up rounding, lattice interpolation and channel quantization
pub mod interpolation;
