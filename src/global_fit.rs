use crate::amplitudes::AmplitudeMatrix;
use crate::data::CurveSet;
use crate::error::FitError;
use crate::lifetime::{BoundedLifetime, DecayLifetime, lifetime_values, validate_lifetimes};
use crate::local_fit::{decay_basis, local_fit_with_basis, sum_of_squared_residuals, with_lifetimes};
use crate::nl_fit::{LifetimeFitAlgorithm, LifetimeFitTrait};

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

/// Whether the optimizer met its own stopping criterion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitStatus {
    Converged,
    /// Evaluation budget was exhausted or the solver gave up, the best point found is returned
    DidNotConverge { evaluations: usize },
}

/// Refined lifetimes and the amplitudes computed from them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    lifetimes: Vec<BoundedLifetime>,
    amplitudes: AmplitudeMatrix,
    residual: f64,
    status: FitStatus,
}

impl FitResult {
    /// Refined lifetimes, bounds are the same as in the input
    pub fn lifetimes(&self) -> &[BoundedLifetime] {
        &self.lifetimes
    }

    pub fn lifetime_values(&self) -> Vec<f64> {
        lifetime_values(&self.lifetimes)
    }

    pub fn amplitudes(&self) -> &AmplitudeMatrix {
        &self.amplitudes
    }

    /// Sum of squared residuals over all curves and fit-window points
    pub fn residual(&self) -> f64 {
        self.residual
    }

    pub fn status(&self) -> FitStatus {
        self.status
    }

    pub fn converged(&self) -> bool {
        self.status == FitStatus::Converged
    }
}

/// Total squared residual of all curves for the given lifetimes, and the amplitudes behind it
///
/// This is the objective of the global fit: the decay basis is rebuilt for the lifetimes, every
/// curve is solved against it, and residuals over the fit window are summed.
pub fn total_residual<L: DecayLifetime>(
    curves: &CurveSet,
    lifetimes: &[L],
    fit_after: f64,
) -> Result<(f64, AmplitudeMatrix), FitError> {
    let basis = decay_basis(curves, lifetimes, fit_after)?;
    let amplitudes =
        local_fit_with_basis(curves, &basis).map_err(|err| with_lifetimes(err, lifetimes))?;
    let residual = sum_of_squared_residuals(curves, &basis, &amplitudes)?;
    Ok((residual, amplitudes))
}

/// Refine lifetimes shared by all curves
///
/// The optimizer varies natural logarithms of the free lifetimes within their bounds, fixed
/// lifetimes (`lower == upper`) are left out of the search. Every trial point is mapped back into
/// the bounds before the objective is evaluated, and the best point seen is returned, also when
/// the optimizer runs out of its budget. A failure of the inner linear fit aborts the search.
pub fn global_fit(
    curves: &CurveSet,
    lifetimes: &[BoundedLifetime],
    fit_after: f64,
    algorithm: &LifetimeFitAlgorithm,
) -> Result<FitResult, FitError> {
    validate_lifetimes(lifetimes)?;
    let initial = lifetime_values(lifetimes);
    let (initial_residual, _) = total_residual(curves, &initial, fit_after)?;
    debug!(
        "global fit of {} curves x {} points, {} lifetimes, {} free, initial residual {:e}",
        curves.len(),
        curves.time().fit_window(fit_after)?.len,
        lifetimes.len(),
        lifetimes.iter().filter(|tau| !tau.is_fixed()).count(),
        initial_residual,
    );

    let free: Vec<usize> = (0..lifetimes.len())
        .filter(|&i| !lifetimes[i].is_fixed())
        .collect();
    let to_lifetimes = |x: &[f64]| -> Vec<f64> {
        let mut values = initial.clone();
        for (&i, &x) in free.iter().zip(x) {
            values[i] = lifetimes[i].with_value(x.exp()).value();
        }
        values
    };

    let best = RefCell::new((initial_residual, initial.clone()));
    let failure: RefCell<Option<FitError>> = RefCell::new(None);
    let evaluations = Cell::new(0_usize);

    let status = if free.is_empty() {
        FitStatus::Converged
    } else {
        let objective = |x: &[f64]| -> f64 {
            if failure.borrow().is_some() {
                return f64::MAX;
            }
            evaluations.set(evaluations.get() + 1);
            let trial = to_lifetimes(x);
            match total_residual(curves, &trial, fit_after) {
                Ok((residual, _)) => {
                    trace!("lifetimes {trial:?}: residual {residual:e}");
                    let mut best = best.borrow_mut();
                    if residual < best.0 {
                        *best = (residual, trial);
                    }
                    residual
                }
                Err(err) => {
                    *failure.borrow_mut() = Some(err);
                    f64::MAX
                }
            }
        };
        let x0: Vec<f64> = free.iter().map(|&i| initial[i].ln()).collect();
        let bounds: Vec<(f64, f64)> = free
            .iter()
            .map(|&i| (lifetimes[i].lower().ln(), lifetimes[i].upper().ln()))
            .collect();
        let outcome = algorithm.minimize(&x0, &bounds, &objective);
        if let Some(err) = failure.take() {
            return Err(err);
        }
        if outcome.success {
            FitStatus::Converged
        } else {
            FitStatus::DidNotConverge {
                evaluations: evaluations.get(),
            }
        }
    };

    let (residual, values) = best.into_inner();
    let refined: Vec<BoundedLifetime> = lifetimes
        .iter()
        .zip(&values)
        .map(|(tau, &value)| tau.with_value(value))
        .collect();
    let (_, amplitudes) = total_residual(curves, &refined, fit_after)?;

    match status {
        FitStatus::Converged => info!(
            "global fit converged after {} evaluations: lifetimes {:?}, residual {:e}",
            evaluations.get(),
            values,
            residual
        ),
        FitStatus::DidNotConverge { evaluations } => warn!(
            "global fit did not converge in {evaluations} evaluations, best lifetimes {values:?} with residual {residual:e}"
        ),
    }

    Ok(FitResult {
        lifetimes: refined,
        amplitudes,
        residual,
        status,
    })
}
