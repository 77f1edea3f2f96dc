//! Iteration policy: relax, snapshot, measure, repeat
//!
//! [`BlendRun`] is an iterator of [`IterationRecord`]s. Each step polls the
//! cancel token, runs one sweep, rebuilds the preview and computes the residual
//! matching the active method. The run ends when the residual reaches the
//! tolerance (followed by the completion pass for the rotated method), when
//! it is cancelled, or with a divergence error once the iteration cap is hit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;
use ndarray::Array2;

use crate::algorithm::compositor::reconstruct;
use crate::algorithm::convergence::{residual, rotated_residual};
use crate::algorithm::problem::{BlendProblem, SolverState};
use crate::algorithm::relaxation::{Method, fill_rotated, relax};
use crate::algorithm::worker::CancelToken;
use crate::io::configuration::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, LOG_EVERY_ITERATIONS, MAX_PARAMETERS,
    PREVIEW_PUBLISH_INTERVAL,
};
use crate::io::error::{BlendError, Result, config_error};

/// Positional names of the relaxation parameters
pub const PARAMETER_NAMES: [&str; MAX_PARAMETERS] = ["w", "r", "s", "t"];

/// Runtime solver configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Relaxation method and parameters
    pub method: Method,
    /// Residual at or below which the run converges
    pub tolerance: f64,
    /// Iterations allowed before reporting divergence
    pub max_iterations: usize,
}

impl SolverConfig {
    /// Configuration with the default tolerance and iteration cap
    pub const fn new(method: Method) -> Self {
        Self {
            method,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Build a configuration from a method name and raw textual parameters
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - A parameter is not a finite number, or more than four are given
    /// - The method name is unknown or one of its parameters is missing
    /// - The tolerance or iteration cap is invalid
    pub fn from_arguments(
        method_name: &str,
        raw_parameters: &[String],
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<Self> {
        let parameters = parse_parameters(raw_parameters)?;
        let config = Self {
            method: parse_method(method_name, &parameters)?,
            tolerance,
            max_iterations,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check tolerance and iteration cap
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the tolerance is not a positive finite
    /// number or the iteration cap is zero
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(config_error(
                "tolerance",
                &self.tolerance,
                &"must be a positive finite number",
            ));
        }
        if self.max_iterations == 0 {
            return Err(config_error(
                "max_iterations",
                &self.max_iterations,
                &"must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Parse textual relaxation parameters
///
/// # Errors
///
/// Returns a configuration error if more than four parameters are given or
/// one of them is not a finite number
pub fn parse_parameters(raw: &[String]) -> Result<Vec<f64>> {
    if raw.len() > MAX_PARAMETERS {
        return Err(config_error(
            "parameters",
            &raw.join(" "),
            &format!("at most {MAX_PARAMETERS} parameters are accepted"),
        ));
    }

    raw.iter()
        .zip(PARAMETER_NAMES)
        .map(|(text, name)| {
            let value = text
                .trim()
                .parse::<f64>()
                .map_err(|e| config_error(name, text, &e))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(config_error(name, text, &"must be finite"))
            }
        })
        .collect()
}

/// Resolve a method name (case-insensitive) with its positional parameters
///
/// An empty name selects Jacobi. Parameters beyond those a method uses are ignored.
///
/// # Errors
///
/// Returns a configuration error if the name is unknown, a required parameter
/// is missing, or more than four parameters are given
pub fn parse_method(name: &str, parameters: &[f64]) -> Result<Method> {
    if parameters.len() > MAX_PARAMETERS {
        return Err(config_error(
            "parameters",
            &parameters.len(),
            &format!("at most {MAX_PARAMETERS} parameters are accepted"),
        ));
    }

    let normalized = name.trim().to_uppercase();
    let required = |index: usize| -> Result<f64> {
        let label = PARAMETER_NAMES.get(index).copied().unwrap_or("parameter");
        parameters.get(index).copied().ok_or_else(|| {
            config_error(label, &"<missing>", &format!("required by method {normalized}"))
        })
    };

    match normalized.as_str() {
        "" | "JACOBI" => Ok(Method::Jacobi),
        "GS" => Ok(Method::GaussSeidel),
        "SOR" => Ok(Method::Sor {
            omega: required(0)?,
        }),
        "AOR" => Ok(Method::Aor {
            omega: required(0)?,
            r: required(1)?,
        }),
        "TOR" => Ok(Method::Tor {
            omega: required(0)?,
            r: required(1)?,
            s: required(2)?,
        }),
        "RGS" => Ok(Method::RotatedGaussSeidel),
        _ => Err(config_error(
            "method",
            &name,
            &"expected one of JACOBI, GS, SOR, AOR, TOR, RGS",
        )),
    }
}

/// Stage of the run a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A relaxation sweep
    Relaxation,
    /// The odd-parity completion pass of the rotated method
    Completion,
}

/// Progress telemetry emitted after every step
#[derive(Debug, Clone)]
pub struct IterationRecord {
    /// Relaxation sweeps completed so far
    pub iteration: usize,
    /// Residual measured after the step
    pub residual: f64,
    /// Time since the run started
    pub elapsed: Duration,
    /// Stage the step belongs to
    pub phase: Phase,
    /// Patch reconstructed from the committed iterate
    pub preview: Arc<RgbaImage>,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Residual reached the tolerance
    Converged,
    /// Cancelled (or abandoned) before converging
    Cancelled,
}

/// Final result of a run
#[derive(Debug, Clone)]
pub struct BlendOutcome {
    /// Method that produced the result
    pub method: Method,
    /// Relaxation sweeps performed
    pub iterations: usize,
    /// Last measured residual
    pub residual: f64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// How the run ended
    pub status: Status,
    /// Final patch, opaque inside the selection
    pub patch: RgbaImage,
    /// Final committed iterate `U`
    pub solution: Array2<f64>,
}

impl BlendOutcome {
    /// Whether the run converged
    pub fn is_converged(&self) -> bool {
        self.status == Status::Converged
    }

    /// Multi-line human-readable telemetry
    pub fn summary(&self) -> String {
        format!(
            ">>> {}\nIteration: {}\nElapsed: {}\nError: {:.4}",
            self.method,
            self.iterations,
            format_elapsed(self.elapsed),
            self.residual
        )
    }
}

/// Format a duration as `m min, s sec, ms ms`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    format!(
        "{} min, {} sec, {} ms",
        total_ms / 60_000,
        (total_ms / 1000) % 60,
        total_ms % 1000
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Relaxing,
    Completing,
    Done,
}

/// A blend in progress, yielding one record per step
pub struct BlendRun<'p> {
    problem: &'p BlendProblem,
    config: SolverConfig,
    state: SolverState,
    cancel: CancelToken,
    iteration: usize,
    residual: f64,
    started: Instant,
    stage: Stage,
    status: Option<Status>,
    preview: Arc<RgbaImage>,
}

impl<'p> BlendRun<'p> {
    /// Prepare a run starting from the problem's initial guess
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration is invalid
    pub fn new(problem: &'p BlendProblem, config: SolverConfig) -> Result<Self> {
        config.validate()?;
        let state = SolverState::new(problem);
        let preview = Arc::new(reconstruct(&state.u, problem.area(), problem.bounds()));
        log::info!(
            "starting {} on {} unknowns (tolerance {}, cap {})",
            config.method,
            problem.len(),
            config.tolerance,
            config.max_iterations
        );
        Ok(Self {
            problem,
            config,
            state,
            cancel: CancelToken::new(),
            iteration: 0,
            residual: f64::INFINITY,
            started: Instant::now(),
            stage: Stage::Relaxing,
            status: None,
            preview,
        })
    }

    /// Use an externally controlled cancel token
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Current solver state
    pub const fn state(&self) -> &SolverState {
        &self.state
    }

    /// Relaxation sweeps completed so far
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Last measured residual (infinite before the first sweep)
    pub const fn residual(&self) -> f64 {
        self.residual
    }

    /// Latest preview snapshot
    pub fn preview(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.preview)
    }

    /// Drive the run to its end, handing every record to `observe`
    ///
    /// # Errors
    ///
    /// Returns a divergence error if the iteration cap is reached or the
    /// residual stops being finite
    pub fn run_with<F>(mut self, mut observe: F) -> Result<BlendOutcome>
    where
        F: FnMut(&IterationRecord),
    {
        for record in self.by_ref() {
            observe(&record?);
        }
        Ok(self.finish())
    }

    /// Drive the run to its end
    ///
    /// # Errors
    ///
    /// Returns a divergence error if the iteration cap is reached or the
    /// residual stops being finite
    pub fn run_to_end(self) -> Result<BlendOutcome> {
        self.run_with(|_| {})
    }

    /// Stop and collect the outcome; an unfinished run counts as cancelled
    pub fn finish(self) -> BlendOutcome {
        BlendOutcome {
            method: self.config.method,
            iterations: self.iteration,
            residual: self.residual,
            elapsed: self.started.elapsed(),
            status: self.status.unwrap_or(Status::Cancelled),
            patch: reconstruct(&self.state.u, self.problem.area(), self.problem.bounds()),
            solution: self.state.u,
        }
    }

    fn relax_step(&mut self) -> Option<Result<IterationRecord>> {
        if self.cancel.is_cancelled() {
            log::info!("cancelled after {} iterations", self.iteration);
            self.status = Some(Status::Cancelled);
            self.stage = Stage::Done;
            return None;
        }

        let method = self.config.method;
        relax(self.problem, &mut self.state, &method);
        self.iteration += 1;

        self.residual = if method.is_rotated() {
            rotated_residual(self.problem, &self.state.u)
        } else {
            residual(self.problem, &self.state.u)
        };

        if !self.residual.is_finite() {
            log::warn!("residual is no longer finite at iteration {}", self.iteration);
            self.stage = Stage::Done;
            return Some(Err(self.divergence()));
        }

        let converged = self.residual <= self.config.tolerance;
        if converged {
            log::info!(
                "converged after {} iterations (residual {:.4})",
                self.iteration,
                self.residual
            );
            if method.is_rotated() {
                self.stage = Stage::Completing;
            } else {
                self.stage = Stage::Done;
                self.status = Some(Status::Converged);
            }
        } else if self.iteration >= self.config.max_iterations {
            log::warn!(
                "iteration cap {} reached with residual {:.4}",
                self.config.max_iterations,
                self.residual
            );
            self.stage = Stage::Done;
            return Some(Err(self.divergence()));
        }

        if self.iteration % LOG_EVERY_ITERATIONS == 0 {
            log::debug!("iteration {} residual {:.6}", self.iteration, self.residual);
        }

        if converged || self.iteration % PREVIEW_PUBLISH_INTERVAL == 0 {
            self.refresh_preview();
        }
        Some(Ok(self.record(Phase::Relaxation)))
    }

    fn complete_step(&mut self) -> IterationRecord {
        fill_rotated(self.problem, &mut self.state);
        log::info!("odd-parity completion pass applied");
        self.stage = Stage::Done;
        self.status = Some(Status::Converged);
        self.refresh_preview();
        self.record(Phase::Completion)
    }

    fn refresh_preview(&mut self) {
        self.preview = Arc::new(reconstruct(
            &self.state.u,
            self.problem.area(),
            self.problem.bounds(),
        ));
    }

    fn record(&self, phase: Phase) -> IterationRecord {
        IterationRecord {
            iteration: self.iteration,
            residual: self.residual,
            elapsed: self.started.elapsed(),
            phase,
            preview: Arc::clone(&self.preview),
        }
    }

    const fn divergence(&self) -> BlendError {
        BlendError::Divergence {
            iterations: self.iteration,
            residual: self.residual,
        }
    }
}

impl Iterator for BlendRun<'_> {
    type Item = Result<IterationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stage {
            Stage::Relaxing => self.relax_step(),
            Stage::Completing => Some(Ok(self.complete_step())),
            Stage::Done => None,
        }
    }
}
