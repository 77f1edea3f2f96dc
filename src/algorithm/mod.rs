/// Preview and output patch reconstruction
pub mod compositor;
/// Residual norms for the axis and rotated stencils
pub mod convergence;
/// Solver configuration and the iteration loop
pub mod executor;
/// Immutable blend problem and solver state
pub mod problem;
/// The six relaxation methods and the rotated-grid completion pass
pub mod relaxation;
/// Generic weighted-stencil sweep
pub mod stencil;
/// Background worker, record stream and cancellation
pub mod worker;
