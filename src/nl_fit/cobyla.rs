use crate::nl_fit::bounds::clamp_to_bounds;
use crate::nl_fit::lifetime_fit::{LifetimeFitAlgorithm, LifetimeFitTrait, MinimizeResult};

use cobyla::{Func, RhoBeg, StopTols, minimize};
use ordered_float::NotNan;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// COBYLA (Constrained Optimization BY Linear Approximations) bounded minimizer
///
/// COBYLA is a derivative-free algorithm, it builds linear approximations of the objective from
/// the values at a simplex of points and never needs the Jacobian of the decay model. It is
/// deterministic: the same start point gives the same sequence of trial points. Bounds are
/// handled natively, trial points are additionally clamped into the box before the objective is
/// evaluated.
///
/// Optionally, if `fine_tuning_algorithm` is `Some`, it sends the best guess from COBYLA to the
/// next optimization as an initial guess and returns its result.
///
/// The algorithm is described in M.J.D. Powell's 1994 paper "A direct search optimization method
/// that models the objective and constraint functions by linear interpolation".
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename = "Cobyla")]
pub struct CobylaLifetimeFit {
    pub niterations: u32,
    pub rhobeg: NotNan<f64>,
    pub ftol_rel: NotNan<f64>,
    pub xtol_rel: NotNan<f64>,
    pub fine_tuning_algorithm: Option<Box<LifetimeFitAlgorithm>>,
}

impl CobylaLifetimeFit {
    /// Create a new [CobylaLifetimeFit].
    ///
    /// # Arguments
    /// - `niterations`: maximum number of objective evaluations
    /// - `rhobeg`: initial change of the optimized parameters, the global fit optimizes natural
    ///   logarithms of the lifetimes, so `0.5` is a step of about 65%
    /// - `ftol_rel`: relative tolerance on the objective for convergence
    /// - `xtol_rel`: relative tolerance on the parameters for convergence
    /// - `fine_tuning_algorithm`: optional algorithm to refine COBYLA's result
    pub fn new(
        niterations: u32,
        rhobeg: f64,
        ftol_rel: f64,
        xtol_rel: f64,
        fine_tuning_algorithm: Option<LifetimeFitAlgorithm>,
    ) -> Self {
        assert!(niterations > 0, "niterations must be positive");
        assert!(rhobeg > 0.0, "rhobeg must be positive");
        assert!(rhobeg.is_finite(), "rhobeg must be finite");
        assert!(ftol_rel >= 0.0, "ftol_rel must be non-negative");
        assert!(ftol_rel.is_finite(), "ftol_rel must be finite");
        assert!(xtol_rel >= 0.0, "xtol_rel must be non-negative");
        assert!(xtol_rel.is_finite(), "xtol_rel must be finite");
        Self {
            niterations,
            rhobeg: NotNan::new(rhobeg).expect("rhobeg must be finite and not NaN"),
            ftol_rel: NotNan::new(ftol_rel).expect("ftol_rel must be finite and not NaN"),
            xtol_rel: NotNan::new(xtol_rel).expect("xtol_rel must be finite and not NaN"),
            fine_tuning_algorithm: fine_tuning_algorithm.map(|x| x.into()),
        }
    }

    #[inline]
    pub fn default_niterations() -> u32 {
        2000
    }

    #[inline]
    pub fn default_rhobeg() -> f64 {
        0.5
    }

    #[inline]
    pub fn default_ftol_rel() -> f64 {
        1e-8
    }

    #[inline]
    pub fn default_xtol_rel() -> f64 {
        1e-6
    }

    #[inline]
    pub fn default_fine_tuning_algorithm() -> Option<LifetimeFitAlgorithm> {
        None
    }
}

impl Default for CobylaLifetimeFit {
    fn default() -> Self {
        Self::new(
            Self::default_niterations(),
            Self::default_rhobeg(),
            Self::default_ftol_rel(),
            Self::default_xtol_rel(),
            Self::default_fine_tuning_algorithm(),
        )
    }
}

impl LifetimeFitTrait for CobylaLifetimeFit {
    fn minimize<F>(&self, x0: &[f64], bounds: &[(f64, f64)], objective: &F) -> MinimizeResult
    where
        F: Fn(&[f64]) -> f64,
    {
        let func = |x: &[f64], _user_data: &mut ()| objective(&clamp_to_bounds(x, bounds));

        // No additional constraints beyond bounds
        let constraints: Vec<&dyn Func<()>> = vec![];

        let stop_tol = StopTols {
            ftol_rel: self.ftol_rel.into(),
            xtol_rel: self.xtol_rel.into(),
            ..StopTols::default()
        };

        let result = minimize(
            func,
            x0,
            bounds,
            &constraints,
            (),
            self.niterations as usize,
            RhoBeg::All(self.rhobeg.into()),
            Some(stop_tol),
        );

        let cobyla_result = match result {
            Ok((status, x, value)) => MinimizeResult {
                x: clamp_to_bounds(&x, bounds),
                value,
                success: matches!(
                    status,
                    cobyla::SuccessStatus::Success
                        | cobyla::SuccessStatus::FtolReached
                        | cobyla::SuccessStatus::XtolReached
                ),
            },
            Err((_status, x, value)) => MinimizeResult {
                x: clamp_to_bounds(&x, bounds),
                value,
                success: false,
            },
        };

        match &self.fine_tuning_algorithm {
            Some(fine_tuning_algorithm) => {
                fine_tuning_algorithm.minimize(&cobyla_result.x, bounds, objective)
            }
            None => cobyla_result,
        }
    }
}
