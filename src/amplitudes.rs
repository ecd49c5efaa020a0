use crate::error::InvalidParameterError;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis, s};
use serde::{Deserialize, Serialize};

/// Least-squares amplitudes of a fit, shape (wavelengths x lifetimes)
///
/// Row order is the order of the fitted curves, column order is the order of the lifetimes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeMatrix(Array2<f64>);

impl AmplitudeMatrix {
    pub fn new(amplitudes: Array2<f64>) -> Self {
        Self(amplitudes)
    }

    #[inline]
    pub fn nwavelengths(&self) -> usize {
        self.0.nrows()
    }

    #[inline]
    pub fn nlifetimes(&self) -> usize {
        self.0.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }

    /// Amplitudes of all lifetimes for one wavelength
    pub fn row(&self, wavelength_index: usize) -> ArrayView1<'_, f64> {
        self.0.row(wavelength_index)
    }

    /// Amplitude spectrum of one lifetime
    pub fn column(&self, lifetime_index: usize) -> ArrayView1<'_, f64> {
        self.0.column(lifetime_index)
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = ArrayView1<'_, f64>> {
        self.0.axis_iter(Axis(0))
    }

    /// Split into the first `row` rows and the rest
    ///
    /// # Panics
    /// If `row` is larger than the number of rows
    pub fn split_at_row(&self, row: usize) -> (Self, Self) {
        (
            Self(self.0.slice(s![..row, ..]).to_owned()),
            Self(self.0.slice(s![row.., ..]).to_owned()),
        )
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.0
    }

    pub(crate) fn check_shape(
        &self,
        nwavelengths: usize,
        nlifetimes: usize,
    ) -> Result<(), InvalidParameterError> {
        if self.nwavelengths() != nwavelengths {
            return Err(InvalidParameterError::AmplitudeRowsMismatch {
                expected: nwavelengths,
                actual: self.nwavelengths(),
            });
        }
        if self.nlifetimes() != nlifetimes {
            return Err(InvalidParameterError::LifetimeCountMismatch {
                expected: self.nlifetimes(),
                actual: nlifetimes,
            });
        }
        Ok(())
    }
}

impl From<Array2<f64>> for AmplitudeMatrix {
    fn from(a: Array2<f64>) -> Self {
        Self(a)
    }
}
