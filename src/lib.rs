//! Gradient-domain (Poisson) image blending
//!
//! A polygon selection is encoded into a classified mask, guidance fields are
//! built from source gradients and target boundary values, and the discrete
//! Poisson equation is relaxed with one of six iterative methods until the
//! residual falls below a tolerance. The result is composited into the target.

#![forbid(unsafe_code)]

/// Blend problem, relaxation methods, convergence and the iteration loop
pub mod algorithm;
/// Guidance field construction and image similarity metrics
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Lattice rounding and channel quantization
pub mod math;
/// Coordinates, border densification and mask encoding
pub mod spatial;

pub use io::error::{BlendError, Result};
