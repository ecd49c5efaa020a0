use crate::error::InvalidParameterError;

use conv::prelude::*;
use ndarray::{ArcArray1, Array1, ArrayView1};
use std::ops::Deref;

/// Shared time axis of a fitting run
///
/// Underlying array is guaranteed to be finite, strictly increasing and contiguous. Cloning is
/// cheap: all clones share the same buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeAxis(ArcArray1<f64>);

impl TimeAxis {
    pub fn new(t: impl Into<Array1<f64>>) -> Result<Self, InvalidParameterError> {
        let t = t.into().as_standard_layout().into_owned();
        if t.is_empty() {
            return Err(InvalidParameterError::ShortTimeAxis);
        }
        if let Some((index, &value)) = t.iter().enumerate().find(|(_, x)| !x.is_finite()) {
            return Err(InvalidParameterError::NonFiniteTime { index, value });
        }
        if let Some(index) = t
            .windows(2)
            .into_iter()
            .position(|w| w[1] <= w[0])
            .map(|i| i + 1)
        {
            return Err(InvalidParameterError::UnsortedTimeAxis { index });
        }
        Ok(Self(t.into_shared()))
    }

    /// Uniform axis of `n` points from `start` to `end` inclusive
    pub fn linspace(start: f64, end: f64, n: usize) -> Result<Self, InvalidParameterError> {
        Self::new(Array1::linspace(start, end, n))
    }

    #[inline]
    pub fn first(&self) -> f64 {
        self.0[0]
    }

    #[inline]
    pub fn last(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    /// Mean sampling step, informative only
    pub fn mean_step(&self) -> f64 {
        match self.len() {
            0 | 1 => 0.0,
            n => (self.last() - self.first()) / (n - 1).approx_as::<f64>().unwrap_or(f64::NAN),
        }
    }

    /// Points at or after `fit_after`
    ///
    /// The axis is sorted, so the window is always a suffix of it. Every masked quantity in the
    /// crate is sliced with the same window.
    pub fn fit_window(&self, fit_after: f64) -> Result<FitWindow, InvalidParameterError> {
        if !(self.first()..=self.last()).contains(&fit_after) {
            return Err(InvalidParameterError::OnsetOutOfRange {
                onset: fit_after,
                first: self.first(),
                last: self.last(),
            });
        }
        let start = self.partition_point(|&t| t < fit_after);
        Ok(FitWindow {
            start,
            len: self.len() - start,
        })
    }
}

impl Deref for TimeAxis {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        // constructor makes the array contiguous
        self.0.as_slice().unwrap()
    }
}

impl AsRef<[f64]> for TimeAxis {
    fn as_ref(&self) -> &[f64] {
        self
    }
}

/// Suffix of the time axis used for fitting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitWindow {
    pub start: usize,
    pub len: usize,
}
