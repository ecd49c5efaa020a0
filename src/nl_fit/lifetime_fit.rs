use crate::nl_fit::cobyla::CobylaLifetimeFit;

use enum_dispatch::enum_dispatch;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Terminal point of a bounded minimization
#[derive(Clone, Debug, PartialEq)]
pub struct MinimizeResult {
    /// Last point reported by the solver, always within the bounds
    pub x: Vec<f64>,
    /// Objective at `x`
    pub value: f64,
    /// `false` if the solver stopped on its evaluation budget or failed
    pub success: bool,
}

/// Bounded minimizer of a scalar objective
///
/// Implementations must be deterministic and must never call `objective` outside of `bounds`.
#[enum_dispatch]
pub trait LifetimeFitTrait: Clone + Debug + Serialize + DeserializeOwned {
    fn minimize<F>(&self, x0: &[f64], bounds: &[(f64, f64)], objective: &F) -> MinimizeResult
    where
        F: Fn(&[f64]) -> f64;
}

/// Optimization algorithm used to refine the shared lifetimes
#[enum_dispatch(LifetimeFitTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum LifetimeFitAlgorithm {
    Cobyla(CobylaLifetimeFit),
}

impl Default for LifetimeFitAlgorithm {
    fn default() -> Self {
        CobylaLifetimeFit::default().into()
    }
}
