//! Tests for the relaxation methods and the rotated-grid completion pass

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use poissonblend::algorithm::problem::{BlendProblem, SolverState};
    use poissonblend::algorithm::relaxation::{Method, fill_rotated, relax};
    use poissonblend::algorithm::stencil::{Field, Read, Write, triple};
    use poissonblend::spatial::border::densify_border;
    use poissonblend::spatial::coordinate::Coordinate;

    fn textured_problem() -> BlendProblem {
        let border = densify_border(&[
            Coordinate::new(2, 2),
            Coordinate::new(9, 3),
            Coordinate::new(8, 9),
            Coordinate::new(3, 8),
        ]);
        let patch = RgbaImage::from_fn(8, 8, |x, y| {
            Rgba([(x * 29 + y * 7) as u8, (x * y * 3) as u8, (200 - y * 11) as u8, 255])
        });
        let target = RgbaImage::from_fn(14, 13, |x, y| Rgba([(x * 9) as u8, (y * 13) as u8, 77, 255]));
        match BlendProblem::from_border(&border, &patch, &target) {
            Ok(problem) => problem,
            Err(e) => unreachable!("textured problem should assemble: {e}"),
        }
    }

    fn sweep(problem: &BlendProblem, method: &Method, sweeps: usize) -> SolverState {
        let mut state = SolverState::new(problem);
        for _ in 0..sweeps {
            relax(problem, &mut state, method);
        }
        state
    }

    fn max_difference(a: &SolverState, b: &SolverState) -> f64 {
        a.u.iter()
            .zip(b.u.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    // Tests names, labels and parameter formatting
    // Verified by printing the relaxation factor with one decimal
    #[test]
    fn test_method_labels() {
        assert_eq!(Method::Jacobi.to_string(), "JACOBI");
        assert_eq!(Method::GaussSeidel.to_string(), "GS");
        assert_eq!(Method::Sor { omega: 1.6 }.to_string(), "SOR, w=1.60");
        assert_eq!(
            Method::Aor { omega: 1.2, r: 0.8 }.to_string(),
            "AOR, w=1.20, r=0.80"
        );
        assert_eq!(
            Method::Tor {
                omega: 1.0,
                r: 0.5,
                s: 0.25
            }
            .to_string(),
            "TOR, w=1.00, r=0.50, s=0.25"
        );
        assert_eq!(Method::RotatedGaussSeidel.name(), "RGS");
    }

    // Tests each method maps onto the expected stencil shape
    // Verified by giving SOR Jacobi reads
    #[test]
    fn test_method_stencils() {
        let gs = Method::GaussSeidel.stencil();
        let reads: Vec<Read> = gs.taps.iter().map(|tap| tap.read).collect();
        assert_eq!(
            reads,
            vec![Read::Next, Read::Committed, Read::Next, Read::Committed]
        );

        let sor = Method::Sor { omega: 1.3 }.stencil();
        assert_eq!(sor.taps, gs.taps);

        let jacobi = Method::Jacobi.stencil();
        assert!(jacobi.taps.iter().all(|tap| tap.read == Read::Committed));
        assert_eq!(Method::Aor { omega: 1.0, r: 0.5 }.stencil().taps, jacobi.taps);

        let rgs = Method::RotatedGaussSeidel.stencil();
        assert_eq!(rgs.field, Field::Rotated);
        assert_eq!(rgs.write, Write::Next);
        assert!(rgs.taps.iter().all(|tap| tap.offset[0] != 0 && tap.offset[1] != 0));
        assert!(Method::RotatedGaussSeidel.is_rotated());
        assert!(!Method::GaussSeidel.is_rotated());
    }

    // Tests SOR with w = 1 is Gauss-Seidel
    // Verified by dropping the (1 - w) term from the relaxed weighting
    #[test]
    fn test_sor_unit_factor_is_gauss_seidel() {
        let problem = textured_problem();
        let gs = sweep(&problem, &Method::GaussSeidel, 5);
        let sor = sweep(&problem, &Method::Sor { omega: 1.0 }, 5);

        assert!(max_difference(&gs, &sor) < 1e-9);
    }

    // Tests AOR with r = w reduces to SOR
    // Verified by reading the committed down neighbor in the extrapolation
    #[test]
    fn test_aor_equal_factors_is_sor() {
        let problem = textured_problem();
        let sor = sweep(&problem, &Method::Sor { omega: 1.3 }, 4);
        let aor = sweep(&problem, &Method::Aor { omega: 1.3, r: 1.3 }, 4);

        assert!(max_difference(&sor, &aor) < 1e-9);
    }

    // Tests TOR with r = s reduces to AOR and r = s = 0 to damped Jacobi
    // Verified by swapping the r and s weights
    #[test]
    fn test_tor_reductions() {
        let problem = textured_problem();
        let aor = sweep(&problem, &Method::Aor { omega: 1.1, r: 0.7 }, 4);
        let tor = sweep(
            &problem,
            &Method::Tor {
                omega: 1.1,
                r: 0.7,
                s: 0.7,
            },
            4,
        );
        assert!(max_difference(&aor, &tor) < 1e-9);

        let jacobi = sweep(&problem, &Method::Jacobi, 3);
        let plain = sweep(
            &problem,
            &Method::Tor {
                omega: 1.0,
                r: 0.0,
                s: 0.0,
            },
            3,
        );
        assert!(max_difference(&jacobi, &plain) < 1e-9);
    }

    // Tests TOR distinguishes the left and down weights
    // Verified by applying r to both neighbor changes
    #[test]
    fn test_tor_weights_differ() {
        let problem = textured_problem();
        let left_only = sweep(
            &problem,
            &Method::Tor {
                omega: 1.0,
                r: 1.0,
                s: 0.0,
            },
            2,
        );
        let down_only = sweep(
            &problem,
            &Method::Tor {
                omega: 1.0,
                r: 0.0,
                s: 1.0,
            },
            2,
        );

        assert!(max_difference(&left_only, &down_only) > 1e-6);
    }

    // Tests a sweep commits V into U
    // Verified by removing the commit step
    #[test]
    fn test_relax_commits() {
        let problem = textured_problem();
        let state = sweep(&problem, &Method::Jacobi, 1);

        assert_eq!(state.u, state.v);
        assert_ne!(&state.u, problem.initial());
    }

    // Tests the rotated sweep only moves even-parity pixels
    // Verified by admitting every parity in the rotated domain
    #[test]
    fn test_rotated_sweep_leaves_odd_pixels() {
        let problem = textured_problem();
        let state = sweep(&problem, &Method::RotatedGaussSeidel, 3);

        for (i, point) in problem.area().iter().enumerate() {
            if !point.is_even() {
                assert_eq!(triple(&state.u, i), triple(problem.initial(), i));
            }
        }
    }

    // Tests the completion pass moves odd pixels and keeps even ones
    // Verified by running the pass over the even half
    #[test]
    fn test_fill_rotated_updates_odd_half() {
        let problem = textured_problem();
        let mut state = sweep(&problem, &Method::RotatedGaussSeidel, 3);
        let before = state.clone();

        fill_rotated(&problem, &mut state);

        let mut odd_changed = false;
        for (i, point) in problem.area().iter().enumerate() {
            if point.is_even() {
                assert_eq!(triple(&state.u, i), triple(&before.u, i));
            } else if triple(&state.u, i) != triple(&before.u, i) {
                odd_changed = true;
            }
        }
        assert!(odd_changed);
        assert_eq!(state.u, state.v);
    }
}
