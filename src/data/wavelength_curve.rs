use ndarray::Array1;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical observable a curve was computed as
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum ObservableKind {
    /// Differential absorption
    #[serde(rename = "dA")]
    DeltaAbsorbance,
    /// Differential circular dichroism
    #[serde(rename = "dCD")]
    DeltaCircularDichroism,
}

impl fmt::Display for ObservableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeltaAbsorbance => write!(f, "dA"),
            Self::DeltaCircularDichroism => write!(f, "dCD"),
        }
    }
}

/// Observed dA or dCD curve of a single probe wavelength
///
/// `wavelength` is the probe wavelength in hundredths of nanometre, e.g. `85000` for 850 nm,
/// the same integer label the data directories use for file names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WavelengthCurve {
    pub wavelength: u32,
    pub kind: ObservableKind,
    pub values: Array1<f64>,
}

impl WavelengthCurve {
    pub fn new(wavelength: u32, kind: ObservableKind, values: impl Into<Array1<f64>>) -> Self {
        Self {
            wavelength,
            kind,
            values: values.into(),
        }
    }

    pub fn delta_a(wavelength: u32, values: impl Into<Array1<f64>>) -> Self {
        Self::new(wavelength, ObservableKind::DeltaAbsorbance, values)
    }

    pub fn delta_cd(wavelength: u32, values: impl Into<Array1<f64>>) -> Self {
        Self::new(wavelength, ObservableKind::DeltaCircularDichroism, values)
    }

    /// Wavelength in nanometres
    pub fn nanometers(&self) -> f64 {
        wavelength_nanometers(self.wavelength)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub(crate) fn wavelength_nanometers(label: u32) -> f64 {
    f64::from(label) / 100.0
}
