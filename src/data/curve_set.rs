use crate::basis::InstrumentResponse;
use crate::data::{ObservableKind, TimeAxis, WavelengthCurve};
use crate::error::InvalidParameterError;

use itertools::Itertools;
use ndarray::{Array2, ArrayView1, Axis};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the rows of a curve collection map onto observables
///
/// A dual layout holds the dA block first and the dCD block second, the block boundary is the
/// number of dA wavelengths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ObservableLayout {
    Single {
        kind: ObservableKind,
        wavelengths: Vec<u32>,
    },
    Dual {
        da_wavelengths: Vec<u32>,
        cd_wavelengths: Vec<u32>,
    },
}

impl ObservableLayout {
    /// Total number of rows
    pub fn len(&self) -> usize {
        match self {
            Self::Single { wavelengths, .. } => wavelengths.len(),
            Self::Dual {
                da_wavelengths,
                cd_wavelengths,
            } => da_wavelengths.len() + cd_wavelengths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row where the second block starts, `None` for a single observable
    pub fn block_boundary(&self) -> Option<usize> {
        match self {
            Self::Single { .. } => None,
            Self::Dual { da_wavelengths, .. } => Some(da_wavelengths.len()),
        }
    }

    /// Wavelength labels and observable of every row, in row order
    pub fn rows(&self) -> impl Iterator<Item = (u32, ObservableKind)> + '_ {
        let (first, second) = match self {
            Self::Single { kind, wavelengths } => ((wavelengths.as_slice(), *kind), None),
            Self::Dual {
                da_wavelengths,
                cd_wavelengths,
            } => (
                (da_wavelengths.as_slice(), ObservableKind::DeltaAbsorbance),
                Some((
                    cd_wavelengths.as_slice(),
                    ObservableKind::DeltaCircularDichroism,
                )),
            ),
        };
        std::iter::once(first)
            .chain(second)
            .flat_map(|(wavelengths, kind)| wavelengths.iter().map(move |&w| (w, kind)))
    }

    /// Split a row-ordered collection at the block boundary
    pub fn split<T>(&self, mut items: Vec<T>) -> ObservableBlocks<Vec<T>> {
        match self.block_boundary() {
            None => ObservableBlocks::Single(items),
            Some(boundary) => {
                let cd = items.split_off(boundary);
                ObservableBlocks::Dual { da: items, cd }
            }
        }
    }
}

/// Per-observable view of a fit output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ObservableBlocks<T> {
    Single(T),
    Dual { da: T, cd: T },
}

impl<T> ObservableBlocks<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> ObservableBlocks<U> {
        match self {
            Self::Single(x) => ObservableBlocks::Single(f(x)),
            Self::Dual { da, cd } => ObservableBlocks::Dual {
                da: f(da),
                cd: f(cd),
            },
        }
    }

    pub fn as_ref(&self) -> ObservableBlocks<&T> {
        match self {
            Self::Single(x) => ObservableBlocks::Single(x),
            Self::Dual { da, cd } => ObservableBlocks::Dual { da, cd },
        }
    }
}

/// Ordered collection of wavelength curves sharing one time axis
///
/// Row order of every amplitude matrix, reconstructed curve list and spectrum derived from the
/// set is the order of the curves given to the constructor.
#[derive(Clone, Debug)]
pub struct CurveSet {
    time: TimeAxis,
    curves: Vec<WavelengthCurve>,
    layout: ObservableLayout,
    instrument_response: Option<InstrumentResponse>,
}

impl CurveSet {
    /// Curves of a single observable
    pub fn single(
        time: TimeAxis,
        curves: Vec<WavelengthCurve>,
    ) -> Result<Self, InvalidParameterError> {
        let kind = curves.first().ok_or(InvalidParameterError::NoCurves)?.kind;
        check_curves(&time, &curves, kind, 0)?;
        let layout = ObservableLayout::Single {
            kind,
            wavelengths: curves.iter().map(|c| c.wavelength).collect(),
        };
        Ok(Self {
            time,
            curves,
            layout,
            instrument_response: None,
        })
    }

    /// Joint dA and dCD curves fit with shared lifetimes
    ///
    /// The dCD curves are appended after the dA curves.
    pub fn dual(
        time: TimeAxis,
        da_curves: Vec<WavelengthCurve>,
        cd_curves: Vec<WavelengthCurve>,
    ) -> Result<Self, InvalidParameterError> {
        if da_curves.is_empty() || cd_curves.is_empty() {
            return Err(InvalidParameterError::NoCurves);
        }
        check_curves(&time, &da_curves, ObservableKind::DeltaAbsorbance, 0)?;
        check_curves(
            &time,
            &cd_curves,
            ObservableKind::DeltaCircularDichroism,
            da_curves.len(),
        )?;
        let layout = ObservableLayout::Dual {
            da_wavelengths: da_curves.iter().map(|c| c.wavelength).collect(),
            cd_wavelengths: cd_curves.iter().map(|c| c.wavelength).collect(),
        };
        let curves = da_curves.into_iter().chain(cd_curves).collect();
        Ok(Self {
            time,
            curves,
            layout,
            instrument_response: None,
        })
    }

    /// Convolve every decay with the given instrument response
    pub fn with_instrument_response(mut self, instrument_response: InstrumentResponse) -> Self {
        self.instrument_response = Some(instrument_response);
        self
    }

    #[inline]
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    #[inline]
    pub fn curves(&self) -> &[WavelengthCurve] {
        &self.curves
    }

    #[inline]
    pub fn layout(&self) -> &ObservableLayout {
        &self.layout
    }

    #[inline]
    pub fn instrument_response(&self) -> Option<&InstrumentResponse> {
        self.instrument_response.as_ref()
    }

    /// Number of curves
    #[inline]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn wavelengths(&self) -> Vec<u32> {
        self.curves.iter().map(|c| c.wavelength).collect()
    }

    pub fn iter_values(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.curves.iter().map(|c| c.values.view())
    }

    /// Curves as a (wavelengths x time points) matrix
    pub fn values(&self) -> Array2<f64> {
        let mut values = Array2::zeros((self.len(), self.time.len()));
        values
            .axis_iter_mut(Axis(0))
            .zip_eq(self.iter_values())
            .for_each(|(mut row, curve)| row.assign(&curve));
        values
    }
}

fn check_curves(
    time: &TimeAxis,
    curves: &[WavelengthCurve],
    kind: ObservableKind,
    offset: usize,
) -> Result<(), InvalidParameterError> {
    for (i, curve) in curves.iter().enumerate() {
        let index = offset + i;
        if curve.kind != kind {
            return Err(InvalidParameterError::MixedObservables {
                index,
                actual: curve.kind,
                expected: kind,
            });
        }
        if curve.len() != time.len() {
            return Err(InvalidParameterError::LengthMismatch {
                index,
                actual: curve.len(),
                expected: time.len(),
            });
        }
        if let Some(point) = curve.values.iter().position(|x| !x.is_finite()) {
            return Err(InvalidParameterError::NonFiniteCurve { index, point });
        }
    }
    Ok(())
}
