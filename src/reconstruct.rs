use crate::amplitudes::AmplitudeMatrix;
use crate::basis::{DecayBasis, InstrumentResponse};
use crate::data::{CurveSet, ObservableKind, TimeAxis};
use crate::error::{FitError, InvalidParameterError};
use crate::lifetime::DecayLifetime;

use ndarray::{Array1, Array2, Axis, s};
use serde::{Deserialize, Serialize};

/// Fitted model of one wavelength over the whole time axis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedCurve {
    pub wavelength: u32,
    pub kind: ObservableKind,
    pub values: Array1<f64>,
}

impl FittedCurve {
    /// `(time, value)` pairs for a text writer
    pub fn points<'a>(&'a self, time: &'a TimeAxis) -> impl Iterator<Item = (f64, f64)> + 'a {
        time.iter().copied().zip(self.values.iter().copied())
    }
}

/// Evaluate the decay model of every amplitude row on the full time axis
///
/// Points at or after `fit_after` hold `sum_l amplitudes[w, l] * basis[l]` with the basis built
/// exactly as for the fit, earlier points hold `baseline`. Output shape is
/// (wavelengths x time points).
pub fn reconstruct<L: DecayLifetime>(
    amplitudes: &AmplitudeMatrix,
    lifetimes: &[L],
    time: &TimeAxis,
    fit_after: f64,
    baseline: f64,
    instrument_response: Option<&InstrumentResponse>,
) -> Result<Array2<f64>, FitError> {
    if amplitudes.nlifetimes() != lifetimes.len() {
        return Err(InvalidParameterError::LifetimeCountMismatch {
            expected: amplitudes.nlifetimes(),
            actual: lifetimes.len(),
        }
        .into());
    }
    let basis = DecayBasis::new(time, lifetimes, fit_after, instrument_response)?;
    let start = basis.window().start;

    let mut curves = Array2::from_elem((amplitudes.nwavelengths(), time.len()), baseline);
    for (mut curve, row) in curves.axis_iter_mut(Axis(0)).zip(amplitudes.rows()) {
        curve.slice_mut(s![start..]).assign(&basis.combine(row));
    }
    Ok(curves)
}

/// [reconstruct] for the curves of a set, labelled like the input curves
pub fn fitted_curves<L: DecayLifetime>(
    curves: &CurveSet,
    amplitudes: &AmplitudeMatrix,
    lifetimes: &[L],
    fit_after: f64,
    baseline: f64,
) -> Result<Vec<FittedCurve>, FitError> {
    amplitudes.check_shape(curves.len(), lifetimes.len())?;
    let values = reconstruct(
        amplitudes,
        lifetimes,
        curves.time(),
        fit_after,
        baseline,
        curves.instrument_response(),
    )?;
    Ok(curves
        .layout()
        .rows()
        .zip(values.axis_iter(Axis(0)))
        .map(|((wavelength, kind), values)| FittedCurve {
            wavelength,
            kind,
            values: values.to_owned(),
        })
        .collect())
}
