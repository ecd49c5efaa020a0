#![doc = include_str!("../README.md")]


mod amplitudes;
pub use amplitudes::AmplitudeMatrix;

mod basis;
pub use basis::{DecayBasis, InstrumentResponse};

mod data;
pub use data::{
    CurveSet, FitWindow, ObservableBlocks, ObservableKind, ObservableLayout, TimeAxis,
    WavelengthCurve,
};

mod error;
pub use error::{FitError, InvalidParameterError};

mod global_fit;
pub use global_fit::{FitResult, FitStatus, global_fit, total_residual};

mod lifetime;
pub use lifetime::{
    BoundedLifetime, DecayLifetime, bounded_lifetimes_from_triples, lifetime_values,
    validate_lifetimes,
};

mod linear;
pub use linear::{LeastSquaresSolver, solve_least_squares};

mod local_fit;
pub use local_fit::{decay_basis, local_fit, local_fit_with_basis, sum_of_squared_residuals};

pub mod nl_fit;
pub use nl_fit::{CobylaLifetimeFit, LifetimeFitAlgorithm, LifetimeFitTrait, MinimizeResult};

mod pipeline;
pub use pipeline::{CurveExport, GlobalFit, GlobalFitReport};

pub mod prelude;

mod reconstruct;
pub use reconstruct::{FittedCurve, fitted_curves, reconstruct};

mod spectra;
pub use spectra::{Spectrum, assemble_spectra};

pub use ndarray;
