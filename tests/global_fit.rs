mod common;

use approx::assert_relative_eq;
use ndarray::Array1;
use ns_trcd_fit::prelude::*;

#[test]
fn two_exponentials_end_to_end() {
    let time = TimeAxis::linspace(0.0, 400.0, 2000).unwrap();
    let mut values = common::decay(&time, &[(2.0, 50.0), (0.5, 10.0)]);
    common::add_noise(&mut values, 1e-6, 0);
    let curves = CurveSet::single(time, vec![WavelengthCurve::delta_a(45000, values)]).unwrap();
    let lifetimes =
        bounded_lifetimes_from_triples([[1.0, 5.0, 100.0], [1.0, 8.0, 100.0]]).unwrap();

    let fit = global_fit(&curves, &lifetimes, 0.0, &LifetimeFitAlgorithm::default()).unwrap();

    let components = common::sorted_components(&fit, 0);
    assert_relative_eq!(components[0].0, 10.0, max_relative = 1e-3);
    assert_relative_eq!(components[1].0, 50.0, max_relative = 1e-3);
    assert_relative_eq!(components[0].1, 0.5, max_relative = 1e-2);
    assert_relative_eq!(components[1].1, 2.0, max_relative = 1e-2);
    assert!(fit.converged(), "stopped with {:?}", fit.status());
    for (tau, input) in fit.lifetimes().iter().zip(&lifetimes) {
        assert_eq!(tau.lower(), input.lower());
        assert_eq!(tau.upper(), input.upper());
    }
}

#[test]
fn lifetimes_stay_within_bounds() {
    let time = TimeAxis::linspace(0.0, 300.0, 600).unwrap();
    let values = common::decay(&time, &[(1.0, 80.0), (-0.5, 2.0)]);
    let curves = CurveSet::single(time, vec![WavelengthCurve::delta_a(50000, values)]).unwrap();
    let lifetimes =
        bounded_lifetimes_from_triples([[10.0, 20.0, 30.0], [3.0, 4.0, 6.0]]).unwrap();

    for niterations in [1, 2, 5, 20, 200] {
        let algorithm = CobylaLifetimeFit::new(niterations, 1.0, 0.0, 0.0, None).into();
        let fit = global_fit(&curves, &lifetimes, 0.0, &algorithm).unwrap();
        for tau in fit.lifetimes() {
            assert!(
                tau.lower() <= tau.value() && tau.value() <= tau.upper(),
                "{tau:?} after {niterations} evaluations"
            );
        }
    }
}

#[test]
fn small_budget_reports_did_not_converge() {
    let time = TimeAxis::linspace(0.0, 400.0, 500).unwrap();
    let values = common::decay(&time, &[(2.0, 50.0), (0.5, 10.0)]);
    let curves = CurveSet::single(time, vec![WavelengthCurve::delta_a(45000, values)]).unwrap();
    let lifetimes =
        bounded_lifetimes_from_triples([[1.0, 5.0, 100.0], [1.0, 8.0, 100.0]]).unwrap();
    let algorithm = CobylaLifetimeFit::new(5, 0.5, 0.0, 0.0, None).into();

    let fit = global_fit(&curves, &lifetimes, 0.0, &algorithm).unwrap();
    assert!(matches!(fit.status(), FitStatus::DidNotConverge { evaluations } if evaluations > 0));
    assert_eq!(fit.amplitudes().nlifetimes(), 2);
}

#[test]
fn underdetermined_onset() {
    let time = TimeAxis::linspace(0.0, 10.0, 101).unwrap();
    let values = common::decay(&time, &[(1.0, 3.0)]);
    let curves = CurveSet::single(time, vec![WavelengthCurve::delta_a(45000, values)]).unwrap();
    let lifetimes =
        bounded_lifetimes_from_triples([[1.0, 2.0, 5.0], [1.0, 3.0, 5.0]]).unwrap();

    assert_eq!(
        global_fit(&curves, &lifetimes, 10.0, &LifetimeFitAlgorithm::default()).unwrap_err(),
        FitError::UnderdeterminedFit {
            points: 1,
            lifetimes: 2
        }
    );
}

#[test]
fn degenerate_fixed_lifetimes_are_singular() {
    let time = TimeAxis::linspace(0.0, 10.0, 101).unwrap();
    let values = common::decay(&time, &[(1.0, 3.0)]);
    let curves = CurveSet::single(time, vec![WavelengthCurve::delta_a(45000, values)]).unwrap();
    let lifetimes = vec![
        BoundedLifetime::fixed(3.0).unwrap(),
        BoundedLifetime::fixed(3.0).unwrap(),
    ];

    let err = global_fit(&curves, &lifetimes, 0.0, &LifetimeFitAlgorithm::default()).unwrap_err();
    assert!(matches!(err, FitError::SingularBasis { ref lifetimes, .. } if lifetimes == &[3.0, 3.0]));
}

#[test]
fn instrument_response_is_deconvolved() {
    let time = TimeAxis::linspace(-20.0, 200.0, 1101).unwrap();
    let irf: Array1<f64> = time
        .iter()
        .map(|&t| f64::exp(-0.5 * (t / 2.0).powi(2)))
        .collect();
    let irf = InstrumentResponse::new(&time, irf).unwrap();

    let amplitudes = AmplitudeMatrix::new(ndarray::array![[1.5]]);
    let model = reconstruct(&amplitudes, &[25.0], &time, -20.0, 0.0, Some(&irf)).unwrap();
    let curves = CurveSet::single(
        time,
        vec![WavelengthCurve::delta_a(60000, model.row(0).to_owned())],
    )
    .unwrap()
    .with_instrument_response(irf);
    let lifetimes = bounded_lifetimes_from_triples([[1.0, 8.0, 100.0]]).unwrap();

    let fit = global_fit(&curves, &lifetimes, -20.0, &LifetimeFitAlgorithm::default()).unwrap();
    assert_relative_eq!(fit.lifetime_values()[0], 25.0, max_relative = 1e-4);
    assert_relative_eq!(fit.amplitudes().row(0)[0], 1.5, max_relative = 1e-4);
}

#[test]
fn reconstruction_round_trip() {
    let time = TimeAxis::linspace(0.0, 400.0, 1000).unwrap();
    let curves = CurveSet::single(
        time.clone(),
        vec![
            WavelengthCurve::delta_a(45000, common::decay(&time, &[(2.0, 50.0), (0.5, 10.0)])),
            WavelengthCurve::delta_a(46000, common::decay(&time, &[(-1.0, 50.0), (0.1, 10.0)])),
        ],
    )
    .unwrap();
    let lifetimes =
        bounded_lifetimes_from_triples([[1.0, 30.0, 100.0], [1.0, 5.0, 100.0]]).unwrap();
    let fit = global_fit(&curves, &lifetimes, 0.0, &LifetimeFitAlgorithm::default()).unwrap();

    let fitted = fitted_curves(&curves, fit.amplitudes(), fit.lifetimes(), 0.0, 0.0).unwrap();
    for (fitted, observed) in fitted.iter().zip(curves.curves()) {
        assert_eq!(fitted.wavelength, observed.wavelength);
        let max_residual = (&fitted.values - &observed.values)
            .iter()
            .fold(0.0_f64, |acc, x| acc.max(x.abs()));
        assert!(max_residual < 1e-4, "max residual {max_residual}");
    }
}
