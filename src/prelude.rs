pub use crate::amplitudes::AmplitudeMatrix;
pub use crate::basis::{DecayBasis, InstrumentResponse};
pub use crate::data::{
    CurveSet, FitWindow, ObservableBlocks, ObservableKind, ObservableLayout, TimeAxis,
    WavelengthCurve,
};
pub use crate::error::{FitError, InvalidParameterError};
pub use crate::global_fit::{FitResult, FitStatus, global_fit};
pub use crate::lifetime::{BoundedLifetime, DecayLifetime, bounded_lifetimes_from_triples};
pub use crate::linear::solve_least_squares;
pub use crate::local_fit::local_fit;
pub use crate::nl_fit::{CobylaLifetimeFit, LifetimeFitAlgorithm, LifetimeFitTrait};
pub use crate::pipeline::{CurveExport, GlobalFit, GlobalFitReport};
pub use crate::reconstruct::{FittedCurve, fitted_curves, reconstruct};
pub use crate::spectra::{Spectrum, assemble_spectra};
