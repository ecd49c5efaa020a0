use crate::data::{FitWindow, TimeAxis};
use crate::error::{FitError, InvalidParameterError};
use crate::lifetime::{DecayLifetime, lifetime_values, validate_lifetimes};

use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

/// Instrument response function used as a convolution kernel
///
/// The response is sampled on the fit's time axis and normalised to unit sum, so convolution
/// keeps the decay amplitudes in the units of the unconvolved model.
#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentResponse {
    weights: Array1<f64>,
}

impl InstrumentResponse {
    pub fn new(
        time: &TimeAxis,
        values: impl Into<Array1<f64>>,
    ) -> Result<Self, InvalidParameterError> {
        let values = values.into();
        if values.len() != time.len() {
            return Err(InvalidParameterError::LengthMismatch {
                index: 0,
                actual: values.len(),
                expected: time.len(),
            });
        }
        let norm = values.sum();
        if !norm.is_finite() || norm == 0.0 || values.iter().any(|x| !x.is_finite()) {
            return Err(InvalidParameterError::InvalidInstrumentResponse);
        }
        Ok(Self {
            weights: values / norm,
        })
    }

    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }
}

/// Exponential decay columns restricted to the fit window
///
/// Matrix shape is (window length x number of lifetimes), column `l` corresponds to the `l`-th
/// lifetime of the sequence the basis was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct DecayBasis {
    window: FitWindow,
    matrix: Array2<f64>,
}

impl DecayBasis {
    /// Build the basis for time points `t >= fit_after`
    ///
    /// Without an instrument response column `l` is the causal decay `exp(-t / tau_l)` for
    /// `t >= 0` and zero before. With a response `r` it is the discrete convolution
    /// `sum_j r_j exp(-(t_i - t_j) / tau_l)` over `t_j <= t_i`, evaluated on the whole axis and
    /// then restricted to the window.
    pub fn new<L: DecayLifetime>(
        time: &TimeAxis,
        lifetimes: &[L],
        fit_after: f64,
        instrument_response: Option<&InstrumentResponse>,
    ) -> Result<Self, InvalidParameterError> {
        validate_lifetimes(lifetimes)?;
        let window = time.fit_window(fit_after)?;
        if let Some(response) = instrument_response {
            if response.weights.len() != time.len() {
                return Err(InvalidParameterError::LengthMismatch {
                    index: 0,
                    actual: response.weights.len(),
                    expected: time.len(),
                });
            }
        }

        let mut matrix = Array2::zeros((window.len, lifetimes.len()));
        for (mut column, tau) in matrix
            .axis_iter_mut(Axis(1))
            .zip_eq(lifetime_values(lifetimes))
        {
            match instrument_response {
                None => column
                    .iter_mut()
                    .zip_eq(&time[window.start..])
                    .for_each(|(x, &t)| *x = causal_decay(t, tau)),
                Some(response) => {
                    let full = convolved_decay(time, response.weights.view(), tau);
                    column.assign(&full.slice(s![window.start..]));
                }
            }
        }
        Ok(Self { window, matrix })
    }

    #[inline]
    pub fn window(&self) -> FitWindow {
        self.window
    }

    #[inline]
    pub fn matrix(&self) -> ArrayView2<'_, f64> {
        self.matrix.view()
    }

    /// Number of masked time points, i.e. matrix rows
    #[inline]
    pub fn npoints(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    pub fn nlifetimes(&self) -> usize {
        self.matrix.ncols()
    }

    /// Restrict a full-length curve to the fit window of this basis
    pub fn masked<'a>(&self, values: ArrayView1<'a, f64>) -> Result<ArrayView1<'a, f64>, FitError> {
        let expected = self.window.start + self.window.len;
        if values.len() != expected {
            return Err(InvalidParameterError::LengthMismatch {
                index: 0,
                actual: values.len(),
                expected,
            }
            .into());
        }
        Ok(values.slice_move(s![self.window.start..]))
    }

    /// Model values in the fit window for the given amplitudes
    pub fn combine(&self, amplitudes: ArrayView1<'_, f64>) -> Array1<f64> {
        self.matrix.dot(&amplitudes)
    }
}

#[inline]
fn causal_decay(t: f64, tau: f64) -> f64 {
    if t < 0.0 { 0.0 } else { f64::exp(-t / tau) }
}

// c_i = c_{i-1} exp(-(t_i - t_{i-1}) / tau) + r_i, exact for any spacing
fn convolved_decay(time: &TimeAxis, weights: ArrayView1<'_, f64>, tau: f64) -> Array1<f64> {
    let mut acc = 0.0;
    let mut t_prev = time.first();
    time.iter()
        .zip_eq(weights.iter())
        .map(|(&t, &w)| {
            acc = acc * f64::exp(-(t - t_prev) / tau) + w;
            t_prev = t;
            acc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    #[test]
    fn plain_exponentials() {
        let time = TimeAxis::linspace(0.0, 10.0, 101).unwrap();
        let basis = DecayBasis::new(&time, &[2.0, 5.0], 0.0, None).unwrap();
        assert_eq!(basis.npoints(), 101);
        assert_eq!(basis.nlifetimes(), 2);
        for (i, &t) in time.iter().enumerate() {
            assert_abs_diff_eq!(basis.matrix()[(i, 0)], f64::exp(-t / 2.0), epsilon = 1e-15);
            assert_abs_diff_eq!(basis.matrix()[(i, 1)], f64::exp(-t / 5.0), epsilon = 1e-15);
        }
    }

    #[test]
    fn window_drops_early_points() {
        let time = TimeAxis::linspace(-1.0, 9.0, 11).unwrap();
        let basis = DecayBasis::new(&time, &[3.0], 2.5, None).unwrap();
        assert_eq!(basis.window(), FitWindow { start: 4, len: 7 });
        assert_abs_diff_eq!(basis.matrix()[(0, 0)], f64::exp(-3.0 / 3.0), epsilon = 1e-12);

        let curve = Array1::from_iter(0..11).mapv(f64::from);
        let masked = basis.masked(curve.view()).unwrap();
        assert_eq!(masked.to_vec(), vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn negative_time_is_zero() {
        let time = TimeAxis::linspace(-2.0, 2.0, 5).unwrap();
        let basis = DecayBasis::new(&time, &[1.0], -2.0, None).unwrap();
        assert_eq!(basis.matrix()[(0, 0)], 0.0);
        assert_eq!(basis.matrix()[(1, 0)], 0.0);
        assert_eq!(basis.matrix()[(2, 0)], 1.0);
    }

    #[test]
    fn delta_response_is_identity() {
        let time = TimeAxis::linspace(0.0, 10.0, 51).unwrap();
        let mut delta = Array1::zeros(51);
        delta[0] = 2.0;
        let response = InstrumentResponse::new(&time, delta).unwrap();
        let convolved = DecayBasis::new(&time, &[1.5, 4.0], 0.0, Some(&response)).unwrap();
        let plain = DecayBasis::new(&time, &[1.5, 4.0], 0.0, None).unwrap();
        assert_abs_diff_eq!(convolved.matrix(), plain.matrix(), epsilon = 1e-12);
    }

    #[test]
    fn convolution_matches_direct_sum() {
        let time = TimeAxis::new(vec![0.0, 0.5, 1.5, 1.75, 3.0, 4.5]).unwrap();
        let raw = Array1::from(vec![0.1, 0.5, 1.0, 0.4, 0.2, 0.05]);
        let response = InstrumentResponse::new(&time, raw.clone()).unwrap();
        let tau = 1.3;
        let basis = DecayBasis::new(&time, &[tau], 0.0, Some(&response)).unwrap();
        let norm = raw.sum();
        for i in 0..time.len() {
            let desired: f64 = (0..=i)
                .map(|j| raw[j] / norm * f64::exp(-(time[i] - time[j]) / tau))
                .sum();
            assert_abs_diff_eq!(basis.matrix()[(i, 0)], desired, epsilon = 1e-12);
        }
    }

    #[test]
    fn invalid_response() {
        let time = TimeAxis::linspace(0.0, 1.0, 3).unwrap();
        assert_eq!(
            InstrumentResponse::new(&time, vec![1.0, -1.0, 0.0]).unwrap_err(),
            InvalidParameterError::InvalidInstrumentResponse
        );
        assert!(matches!(
            InstrumentResponse::new(&time, vec![1.0; 4]).unwrap_err(),
            InvalidParameterError::LengthMismatch { .. }
        ));
    }

    #[test]
    fn zero_lifetime_is_invalid() {
        let time = TimeAxis::linspace(0.0, 1.0, 3).unwrap();
        assert_eq!(
            DecayBasis::new(&time, &[1.0, 0.0], 0.0, None).unwrap_err(),
            InvalidParameterError::NonPositiveLifetime {
                index: 1,
                value: 0.0
            }
        );
        assert_eq!(
            DecayBasis::new(&time, &[-1.0], 0.0, None).unwrap_err(),
            InvalidParameterError::NonPositiveLifetime {
                index: 0,
                value: -1.0
            }
        );
    }
}
