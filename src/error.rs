/// Error returned from the basis builder, the linear solver and the fitters
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FitError {
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),

    #[error(
        "{points} time points after the fit onset are not enough to fit {lifetimes} lifetimes"
    )]
    UnderdeterminedFit { points: usize, lifetimes: usize },

    #[error(
        "decay basis is singular for lifetimes {:?}{}",
        .lifetimes,
        wavelength_suffix(.wavelength_index)
    )]
    SingularBasis {
        lifetimes: Vec<f64>,
        wavelength_index: Option<usize>,
    },
}

fn wavelength_suffix(wavelength_index: &Option<usize>) -> String {
    match wavelength_index {
        Some(i) => format!(" (wavelength #{i})"),
        None => String::new(),
    }
}

/// Configuration and input-shape errors, detected before any optimization starts
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidParameterError {
    #[error("lifetime #{index} must be positive, got {value}")]
    NonPositiveLifetime { index: usize, value: f64 },

    #[error("lifetime #{index} must be finite, got {value}")]
    NonFiniteLifetime { index: usize, value: f64 },

    #[error("lifetime #{index} violates lower <= value <= upper: ({lower}, {value}, {upper})")]
    MalformedBounds {
        index: usize,
        lower: f64,
        value: f64,
        upper: f64,
    },

    #[error("at least one lifetime is required")]
    EmptyLifetimes,

    #[error("lifetime #{index} must be given as (lower, lifetime, upper), got {len} values")]
    WrongLifetimeTriple { index: usize, len: usize },

    #[error("expected {expected} lifetimes, got {actual}")]
    LifetimeCountMismatch { expected: usize, actual: usize },

    #[error("fit onset {onset} is outside of the time axis range [{first}, {last}]")]
    OnsetOutOfRange { onset: f64, first: f64, last: f64 },

    #[error("curve #{index} has {actual} points, but the time axis has {expected}")]
    LengthMismatch {
        index: usize,
        actual: usize,
        expected: usize,
    },

    #[error("curve #{index} has a non-finite value at point #{point}")]
    NonFiniteCurve { index: usize, point: usize },

    #[error("amplitude matrix has {actual} rows, but {expected} curves are given")]
    AmplitudeRowsMismatch { expected: usize, actual: usize },

    #[error("at least one wavelength curve is required")]
    NoCurves,

    #[error("curve #{index} is {actual}, but {expected} curves are expected")]
    MixedObservables {
        index: usize,
        actual: crate::ObservableKind,
        expected: crate::ObservableKind,
    },

    #[error("instrument response must be finite and have a non-zero sum")]
    InvalidInstrumentResponse,

    #[error("time axis must increase strictly monotonically, violated at point #{index}")]
    UnsortedTimeAxis { index: usize },

    #[error("time axis must be finite, got {value} at point #{index}")]
    NonFiniteTime { index: usize, value: f64 },

    #[error("time axis must have at least one point")]
    ShortTimeAxis,
}
