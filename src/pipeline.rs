use crate::amplitudes::AmplitudeMatrix;
use crate::data::{CurveSet, ObservableBlocks, ObservableLayout};
use crate::error::FitError;
use crate::global_fit::{FitResult, global_fit};
use crate::lifetime::{BoundedLifetime, lifetime_values, validate_lifetimes};
use crate::local_fit::local_fit;
use crate::nl_fit::LifetimeFitAlgorithm;
use crate::reconstruct::{FittedCurve, fitted_curves};
use crate::spectra::{Spectrum, assemble_spectra};

use log::debug;
use ordered_float::NotNan;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which reconstructed curves a [GlobalFit] run produces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CurveExport {
    /// Curves of the initial local fit with the starting lifetimes
    pub lfit_curves: bool,
    /// Curves of the refined global fit
    pub gfit_curves: bool,
}

impl CurveExport {
    pub fn all() -> Self {
        Self {
            lfit_curves: true,
            gfit_curves: true,
        }
    }
}

/// Survey, global refinement and spectra of a curve set in one run
///
/// The run first fits amplitudes with the starting lifetimes, then refines the lifetimes with
/// `algorithm`, and finally assembles the decay-associated spectra. Outputs of a dual dA + dCD
/// curve set are split per observable.
///
/// ```
/// use ns_trcd_fit::prelude::*;
///
/// let time = TimeAxis::linspace(0.0, 100.0, 500).unwrap();
/// let values = time.iter().map(|&t| 2.0 * f64::exp(-t / 20.0)).collect::<Vec<_>>();
/// let curves = CurveSet::single(time, vec![WavelengthCurve::delta_a(45000, values)]).unwrap();
/// let lifetimes = bounded_lifetimes_from_triples([[1.0, 5.0, 100.0]]).unwrap();
///
/// let report = GlobalFit::default().run(&curves, &lifetimes).unwrap();
/// assert!((report.fit.lifetime_values()[0] - 20.0).abs() < 1e-3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct GlobalFit {
    pub algorithm: LifetimeFitAlgorithm,
    /// Only points at or after this time are fitted
    pub fit_after: NotNan<f64>,
    /// Value of reconstructed curves before `fit_after`
    pub baseline: NotNan<f64>,
    pub export: CurveExport,
}

impl GlobalFit {
    /// Create a new [GlobalFit]
    ///
    /// # Panics
    /// If `fit_after` or `baseline` is NaN
    pub fn new(
        algorithm: LifetimeFitAlgorithm,
        fit_after: f64,
        baseline: f64,
        export: CurveExport,
    ) -> Self {
        Self {
            algorithm,
            fit_after: NotNan::new(fit_after).expect("fit_after must not be NaN"),
            baseline: NotNan::new(baseline).expect("baseline must not be NaN"),
            export,
        }
    }

    #[inline]
    pub fn default_algorithm() -> LifetimeFitAlgorithm {
        LifetimeFitAlgorithm::default()
    }

    #[inline]
    pub fn default_fit_after() -> f64 {
        0.0
    }

    #[inline]
    pub fn default_baseline() -> f64 {
        0.0
    }

    #[inline]
    pub fn default_export() -> CurveExport {
        CurveExport::default()
    }

    pub fn with_algorithm(self, algorithm: impl Into<LifetimeFitAlgorithm>) -> Self {
        Self {
            algorithm: algorithm.into(),
            ..self
        }
    }

    pub fn with_fit_after(self, fit_after: f64) -> Self {
        Self::new(self.algorithm, fit_after, self.baseline.into(), self.export)
    }

    pub fn with_export(self, export: CurveExport) -> Self {
        Self { export, ..self }
    }

    /// Run the fit, `lifetimes` are the starting values and bounds
    pub fn run(
        &self,
        curves: &CurveSet,
        lifetimes: &[BoundedLifetime],
    ) -> Result<GlobalFitReport, FitError> {
        validate_lifetimes(lifetimes)?;
        let fit_after = self.fit_after.into_inner();
        let baseline = self.baseline.into_inner();
        let layout = curves.layout();
        debug!(
            "{} curves of {} points (mean step {}), fit after {fit_after}, starting lifetimes {:?}",
            curves.len(),
            curves.time().len(),
            curves.time().mean_step(),
            lifetime_values(lifetimes)
        );

        let initial_amplitudes = local_fit(curves, lifetimes, fit_after)?;
        let initial_curves = if self.export.lfit_curves {
            let fitted =
                fitted_curves(curves, &initial_amplitudes, lifetimes, fit_after, baseline)?;
            Some(layout.split(fitted))
        } else {
            None
        };

        let fit = global_fit(curves, lifetimes, fit_after, &self.algorithm)?;
        let fitted = if self.export.gfit_curves {
            let fitted = fitted_curves(
                curves,
                fit.amplitudes(),
                fit.lifetimes(),
                fit_after,
                baseline,
            )?;
            Some(layout.split(fitted))
        } else {
            None
        };
        let spectra = assemble_spectra(fit.lifetimes(), fit.amplitudes(), layout)?;

        Ok(GlobalFitReport {
            layout: layout.clone(),
            initial_amplitudes,
            initial_curves,
            fit,
            fitted_curves: fitted,
            spectra,
        })
    }
}

impl Default for GlobalFit {
    fn default() -> Self {
        Self::new(
            Self::default_algorithm(),
            Self::default_fit_after(),
            Self::default_baseline(),
            Self::default_export(),
        )
    }
}

/// Everything a [GlobalFit] run produces, ready for an external writer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalFitReport {
    /// Observables and wavelength labels of the amplitude rows
    pub layout: ObservableLayout,
    /// Local-fit amplitudes with the starting lifetimes
    pub initial_amplitudes: AmplitudeMatrix,
    pub initial_curves: Option<ObservableBlocks<Vec<FittedCurve>>>,
    pub fit: FitResult,
    pub fitted_curves: Option<ObservableBlocks<Vec<FittedCurve>>>,
    pub spectra: ObservableBlocks<Vec<Spectrum>>,
}

impl GlobalFitReport {
    /// Global-fit amplitudes split at the dA / dCD block boundary
    pub fn amplitude_blocks(&self) -> ObservableBlocks<AmplitudeMatrix> {
        split_amplitudes(self.fit.amplitudes(), &self.layout)
    }

    /// Initial local-fit amplitudes split at the dA / dCD block boundary
    pub fn initial_amplitude_blocks(&self) -> ObservableBlocks<AmplitudeMatrix> {
        split_amplitudes(&self.initial_amplitudes, &self.layout)
    }
}

fn split_amplitudes(
    amplitudes: &AmplitudeMatrix,
    layout: &ObservableLayout,
) -> ObservableBlocks<AmplitudeMatrix> {
    match layout.block_boundary() {
        None => ObservableBlocks::Single(amplitudes.clone()),
        Some(boundary) => {
            let (da, cd) = amplitudes.split_at_row(boundary);
            ObservableBlocks::Dual { da, cd }
        }
    }
}
