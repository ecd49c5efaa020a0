use crate::amplitudes::AmplitudeMatrix;
use crate::basis::DecayBasis;
use crate::data::CurveSet;
use crate::error::FitError;
use crate::lifetime::{DecayLifetime, lifetime_values};
use crate::linear::LeastSquaresSolver;

use itertools::Itertools;
use ndarray::{Array2, Axis, Zip};

/// Fit every curve independently with fixed lifetimes
///
/// One [DecayBasis] is built for the whole set and every curve is solved against it, row `w` of
/// the output belongs to the `w`-th curve of `curves`. This is both the initial survey of a global
/// fit and its inner step.
pub fn local_fit<L: DecayLifetime>(
    curves: &CurveSet,
    lifetimes: &[L],
    fit_after: f64,
) -> Result<AmplitudeMatrix, FitError> {
    let basis = decay_basis(curves, lifetimes, fit_after)?;
    local_fit_with_basis(curves, &basis).map_err(|err| with_lifetimes(err, lifetimes))
}

/// Decay basis for a curve set, convolved with its instrument response if it has one
pub fn decay_basis<L: DecayLifetime>(
    curves: &CurveSet,
    lifetimes: &[L],
    fit_after: f64,
) -> Result<DecayBasis, FitError> {
    Ok(DecayBasis::new(
        curves.time(),
        lifetimes,
        fit_after,
        curves.instrument_response(),
    )?)
}

/// [local_fit] with a prebuilt basis
pub fn local_fit_with_basis(
    curves: &CurveSet,
    basis: &DecayBasis,
) -> Result<AmplitudeMatrix, FitError> {
    let solver = LeastSquaresSolver::new(basis)?;
    let mut amplitudes = Array2::zeros((curves.len(), basis.nlifetimes()));
    for (mut row, curve) in amplitudes
        .axis_iter_mut(Axis(0))
        .zip_eq(curves.iter_values())
    {
        row.assign(&solver.solve(basis.masked(curve)?)?);
    }
    Ok(amplitudes.into())
}

/// Sum of squared residuals over all curves and all points of the fit window
pub fn sum_of_squared_residuals(
    curves: &CurveSet,
    basis: &DecayBasis,
    amplitudes: &AmplitudeMatrix,
) -> Result<f64, FitError> {
    let mut total = 0.0;
    for (curve, row) in curves.iter_values().zip_eq(amplitudes.rows()) {
        let model = basis.combine(row);
        total += Zip::from(&basis.masked(curve)?)
            .and(&model)
            .fold(0.0, |acc, &y, &m| acc + (y - m).powi(2));
    }
    Ok(total)
}

pub(crate) fn with_lifetimes<L: DecayLifetime>(err: FitError, lifetimes: &[L]) -> FitError {
    match err {
        FitError::SingularBasis {
            wavelength_index, ..
        } => FitError::SingularBasis {
            lifetimes: lifetime_values(lifetimes),
            wavelength_index,
        },
        err => err,
    }
}
