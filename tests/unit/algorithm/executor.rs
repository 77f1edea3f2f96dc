//! Tests for solver configuration and the iteration loop

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use image::{Rgba, RgbaImage};
    use poissonblend::BlendError;
    use poissonblend::algorithm::executor::{
        BlendRun, Phase, SolverConfig, Status, format_elapsed, parse_method, parse_parameters,
    };
    use poissonblend::algorithm::problem::BlendProblem;
    use poissonblend::algorithm::relaxation::Method;
    use poissonblend::algorithm::worker::CancelToken;
    use poissonblend::io::configuration::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
    use poissonblend::spatial::border::densify_border;
    use poissonblend::spatial::coordinate::Coordinate;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn flat_problem() -> BlendProblem {
        let border = densify_border(&[
            Coordinate::new(2, 2),
            Coordinate::new(8, 2),
            Coordinate::new(8, 7),
            Coordinate::new(2, 7),
        ]);
        let patch = RgbaImage::from_pixel(7, 6, Rgba([220, 30, 90, 255]));
        let target = RgbaImage::from_pixel(12, 11, Rgba([60, 120, 180, 255]));
        match BlendProblem::from_border(&border, &patch, &target) {
            Ok(problem) => problem,
            Err(e) => unreachable!("flat problem should assemble: {e}"),
        }
    }

    fn config(method: Method, tolerance: f64, max_iterations: usize) -> SolverConfig {
        SolverConfig {
            method,
            tolerance,
            max_iterations,
        }
    }

    // Tests method names are matched case-insensitively with positional parameters
    // Verified by matching names case-sensitively
    #[test]
    fn test_from_arguments_methods() {
        let sor = SolverConfig::from_arguments("sor", &strings(&["1.6"]), 1.0, 10);
        assert_eq!(sor.ok().map(|c| c.method), Some(Method::Sor { omega: 1.6 }));

        let tor_params = strings(&["1.1", "0.9", "0.8", "7"]);
        let tor = SolverConfig::from_arguments("Tor", &tor_params, 1.0, 10);
        assert_eq!(
            tor.ok().map(|c| c.method),
            Some(Method::Tor {
                omega: 1.1,
                r: 0.9,
                s: 0.8
            })
        );

        let rgs = SolverConfig::from_arguments("RGS", &[], 0.5, 3);
        assert_eq!(
            rgs.ok(),
            Some(config(Method::RotatedGaussSeidel, 0.5, 3))
        );
    }

    // Tests an empty method name selects Jacobi
    // Verified by rejecting empty names
    #[test]
    fn test_empty_name_is_jacobi() {
        assert_eq!(parse_method("", &[]).ok(), Some(Method::Jacobi));
        assert_eq!(parse_method("  jacobi ", &[]).ok(), Some(Method::Jacobi));
        assert_eq!(parse_method("gs", &[2.0]).ok(), Some(Method::GaussSeidel));
    }

    // Tests unknown names and missing parameters are configuration errors
    // Verified by defaulting missing parameters to 1.0
    #[test]
    fn test_invalid_methods_rejected() {
        assert!(matches!(
            parse_method("MULTIGRID", &[]),
            Err(BlendError::Config {
                parameter: "method",
                ..
            })
        ));
        assert!(matches!(
            parse_method("AOR", &[1.2]),
            Err(BlendError::Config { parameter: "r", .. })
        ));
        assert!(matches!(
            parse_method("SOR", &[]),
            Err(BlendError::Config { parameter: "w", .. })
        ));
    }

    // Tests non-numeric, non-finite and surplus parameters are rejected
    // Verified by skipping unparsable parameters
    #[test]
    fn test_parameter_parsing() {
        assert_eq!(
            parse_parameters(&strings(&[" 1.5", "2"])).ok(),
            Some(vec![1.5, 2.0])
        );
        assert!(matches!(
            parse_parameters(&strings(&["1.0", "abc"])),
            Err(BlendError::Config { parameter: "r", .. })
        ));
        assert!(parse_parameters(&strings(&["inf"])).is_err());
        assert!(parse_parameters(&strings(&["1", "2", "3", "4", "5"])).is_err());
    }

    // Tests tolerance and cap validation
    // Verified by accepting a zero tolerance
    #[test]
    fn test_config_validation() {
        assert!(SolverConfig::from_arguments("GS", &[], 0.0, 10).is_err());
        assert!(SolverConfig::from_arguments("GS", &[], f64::NAN, 10).is_err());
        assert!(matches!(
            SolverConfig::from_arguments("GS", &[], 1.0, 0),
            Err(BlendError::Config {
                parameter: "max_iterations",
                ..
            })
        ));

        let defaults = SolverConfig::new(Method::Jacobi);
        assert!((defaults.tolerance - DEFAULT_TOLERANCE).abs() < f64::EPSILON);
        assert_eq!(defaults.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(BlendRun::new(&flat_problem(), config(Method::Jacobi, -1.0, 5)).is_err());
    }

    // Tests records count up from one and the run converges
    // Verified by checking convergence before relaxing
    #[test]
    fn test_run_converges_with_ordered_records() {
        let problem = flat_problem();
        let Ok(run) = BlendRun::new(&problem, config(Method::GaussSeidel, 1e-3, 10_000)) else {
            unreachable!("valid configuration");
        };

        let mut iterations = Vec::new();
        let outcome = run.run_with(|record| iterations.push(record.iteration));

        let Ok(outcome) = outcome else {
            unreachable!("flat problem should converge");
        };
        assert_eq!(outcome.status, Status::Converged);
        assert!(outcome.is_converged());
        assert!(outcome.residual <= 1e-3);
        assert_eq!(iterations.len(), outcome.iterations);
        assert!(iterations.iter().enumerate().all(|(n, &i)| i == n + 1));
        assert_eq!(outcome.patch.dimensions(), (7, 6));
        assert_eq!(outcome.patch.get_pixel(3, 3).0, [60, 120, 180, 255]);
    }

    // Tests the rotated method ends with a completion record
    // Verified by skipping the completion pass after convergence
    #[test]
    fn test_rotated_run_ends_with_completion() {
        let problem = flat_problem();
        let Ok(run) = BlendRun::new(&problem, config(Method::RotatedGaussSeidel, 1e-3, 10_000))
        else {
            unreachable!("valid configuration");
        };

        let records: Vec<_> = run.collect();

        let phases: Vec<Phase> = records
            .iter()
            .filter_map(|r| r.as_ref().ok().map(|r| r.phase))
            .collect();
        assert_eq!(phases.last(), Some(&Phase::Completion));
        assert_eq!(
            phases.iter().filter(|&&p| p == Phase::Completion).count(),
            1
        );
        assert!(records.iter().all(Result::is_ok));
    }

    // Tests the iteration cap reports divergence
    // Verified by returning the last record instead of an error
    #[test]
    fn test_cap_reports_divergence() {
        let problem = flat_problem();
        let Ok(run) = BlendRun::new(&problem, config(Method::Jacobi, 1e-12, 3)) else {
            unreachable!("valid configuration");
        };

        let result = run.run_to_end();

        assert!(matches!(
            result,
            Err(BlendError::Divergence { iterations: 3, .. })
        ));
    }

    // Tests an unstable factor is caught as divergence rather than looping
    // Verified by removing the finiteness check
    #[test]
    fn test_unstable_factor_diverges() {
        let problem = flat_problem();
        let Ok(run) = BlendRun::new(&problem, config(Method::Sor { omega: 3.5 }, 1e-6, 5_000))
        else {
            unreachable!("valid configuration");
        };

        assert!(matches!(
            run.run_to_end(),
            Err(BlendError::Divergence { .. })
        ));
    }

    // Tests cancellation before the first sweep yields no record
    // Verified by polling the token after relaxing
    #[test]
    fn test_cancel_before_start() {
        let problem = flat_problem();
        let token = CancelToken::new();
        token.cancel();
        let Ok(mut run) = BlendRun::new(&problem, config(Method::GaussSeidel, 1e-3, 100)) else {
            unreachable!("valid configuration");
        };
        run = run.with_cancel(token);

        assert!(run.next().is_none());
        let outcome = run.finish();
        assert_eq!(outcome.status, Status::Cancelled);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(&outcome.solution, problem.initial());
    }

    // Tests an abandoned run reports as cancelled with its progress
    // Verified by reporting abandoned runs as converged
    #[test]
    fn test_finish_midway() {
        let problem = flat_problem();
        let Ok(mut run) = BlendRun::new(&problem, config(Method::Jacobi, 1e-9, 100)) else {
            unreachable!("valid configuration");
        };

        let first = run.next();
        let second = run.next();
        assert!(matches!(first, Some(Ok(ref r)) if r.iteration == 1));
        assert!(matches!(second, Some(Ok(ref r)) if r.iteration == 2));
        assert_eq!(run.iteration(), 2);

        let outcome = run.finish();
        assert_eq!(outcome.status, Status::Cancelled);
        assert_eq!(outcome.iterations, 2);
    }

    // Tests telemetry formatting
    // Verified by printing total seconds instead of the seconds remainder
    #[test]
    fn test_telemetry_format() {
        assert_eq!(
            format_elapsed(Duration::from_millis(125_042)),
            "2 min, 5 sec, 42 ms"
        );

        let problem = flat_problem();
        let Ok(run) = BlendRun::new(&problem, config(Method::Sor { omega: 1.5 }, 1e-3, 1_000))
        else {
            unreachable!("valid configuration");
        };
        let Ok(outcome) = run.run_to_end() else {
            unreachable!("flat problem should converge");
        };
        let summary = outcome.summary();

        assert!(summary.starts_with(">>> SOR, w=1.50"));
        assert!(summary.contains(&format!("Iteration: {}", outcome.iterations)));
        assert!(summary.contains(&format!("Error: {:.4}", outcome.residual)));
    }
}
