mod curve_set;
pub use curve_set::{CurveSet, ObservableBlocks, ObservableLayout};

mod time_axis;
pub use time_axis::{FitWindow, TimeAxis};

mod wavelength_curve;
pub(crate) use wavelength_curve::wavelength_nanometers;
pub use wavelength_curve::{ObservableKind, WavelengthCurve};
