//! Ordinary least squares for a fixed decay basis
//!
//! The basis is shared by every wavelength of a run, so it is decomposed once with SVD and its
//! pseudo-inverse is applied to each curve. A basis whose smallest singular value is negligible
//! compared to the largest one is rejected instead of being regularised: equal or nearly equal
//! lifetimes make the amplitudes meaningless, and the caller has to know.

use crate::basis::DecayBasis;
use crate::error::{FitError, InvalidParameterError};

use conv::prelude::*;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1};

/// Least-squares solver for one [DecayBasis]
#[derive(Clone, Debug)]
pub struct LeastSquaresSolver {
    // (lifetimes x points)
    pseudo_inverse: Array2<f64>,
}

impl LeastSquaresSolver {
    pub fn new(basis: &DecayBasis) -> Result<Self, FitError> {
        let (npoints, nlifetimes) = (basis.npoints(), basis.nlifetimes());
        if npoints < nlifetimes {
            return Err(FitError::UnderdeterminedFit {
                points: npoints,
                lifetimes: nlifetimes,
            });
        }

        let matrix = basis.matrix();
        let a = DMatrix::from_fn(npoints, nlifetimes, |i, j| matrix[(i, j)]);
        let svd = a.svd(true, true);

        let sv_max = svd.singular_values.max();
        let sv_min = svd.singular_values.min();
        let eps = sv_max * rank_tolerance(npoints);
        if !(sv_min.is_finite() && sv_max.is_finite() && sv_min > eps) {
            return Err(singular());
        }
        let pinv = svd.pseudo_inverse(eps).map_err(|_| singular())?;
        Ok(Self {
            pseudo_inverse: Array2::from_shape_fn((nlifetimes, npoints), |(i, j)| pinv[(i, j)]),
        })
    }

    /// Amplitudes minimizing the sum of squared residuals for a masked curve
    pub fn solve(&self, masked: ArrayView1<'_, f64>) -> Result<Array1<f64>, FitError> {
        let expected = self.pseudo_inverse.ncols();
        if masked.len() != expected {
            return Err(InvalidParameterError::LengthMismatch {
                index: 0,
                actual: masked.len(),
                expected,
            }
            .into());
        }
        Ok(self.pseudo_inverse.dot(&masked))
    }
}

/// One-shot OLS solve of a masked curve against a basis
pub fn solve_least_squares(
    basis: &DecayBasis,
    masked: ArrayView1<'_, f64>,
) -> Result<Array1<f64>, FitError> {
    LeastSquaresSolver::new(basis)?.solve(masked)
}

fn rank_tolerance(npoints: usize) -> f64 {
    npoints.approx_as::<f64>().unwrap_or(f64::MAX) * f64::EPSILON
}

// Lifetimes and wavelength are filled in by the caller, which knows them
fn singular() -> FitError {
    FitError::SingularBasis {
        lifetimes: vec![],
        wavelength_index: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::TimeAxis;

    use approx::assert_abs_diff_eq;
    use rand::prelude::*;
    use rand_distr::StandardNormal;

    #[test]
    fn matches_normal_equations() {
        const N: usize = 200;
        let time = TimeAxis::linspace(0.0, 20.0, N).unwrap();
        let basis = DecayBasis::new(&time, &[1.0, 4.0, 15.0], 0.0, None).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let y: Array1<f64> = Array1::from_shape_fn(N, |_| rng.sample(StandardNormal));
        let actual = solve_least_squares(&basis, y.view()).unwrap();

        // Solve (A^T A) x = A^T y with nalgebra's LU as an independent reference
        let a = basis.matrix();
        let ata = a.t().dot(&a);
        let aty = a.t().dot(&y);
        let ata = DMatrix::from_fn(3, 3, |i, j| ata[(i, j)]);
        let aty = nalgebra::DVector::from_iterator(3, aty.iter().copied());
        let desired = ata.lu().solve(&aty).unwrap();

        for i in 0..3 {
            assert_abs_diff_eq!(actual[i], desired[i], epsilon = 1e-8);
        }
    }

    #[test]
    fn exact_recovery() {
        let time = TimeAxis::linspace(0.0, 50.0, 500).unwrap();
        let basis = DecayBasis::new(&time, &[3.0, 20.0], 0.0, None).unwrap();
        let y = basis.combine(Array1::from(vec![-1.5, 0.25]).view());
        let x = solve_least_squares(&basis, y.view()).unwrap();
        assert_abs_diff_eq!(x[0], -1.5, epsilon = 1e-10);
        assert_abs_diff_eq!(x[1], 0.25, epsilon = 1e-10);
    }

    #[test]
    fn underdetermined() {
        let time = TimeAxis::linspace(0.0, 10.0, 11).unwrap();
        let basis = DecayBasis::new(&time, &[1.0, 2.0, 3.0], 9.0, None).unwrap();
        assert_eq!(basis.npoints(), 2);
        let y = Array1::zeros(2);
        assert_eq!(
            solve_least_squares(&basis, y.view()).unwrap_err(),
            FitError::UnderdeterminedFit {
                points: 2,
                lifetimes: 3
            }
        );
    }

    #[test]
    fn equal_lifetimes_are_singular() {
        let time = TimeAxis::linspace(0.0, 10.0, 100).unwrap();
        let basis = DecayBasis::new(&time, &[2.0, 2.0], 0.0, None).unwrap();
        assert!(matches!(
            LeastSquaresSolver::new(&basis).unwrap_err(),
            FitError::SingularBasis { .. }
        ));
    }

    #[test]
    fn wrong_curve_length() {
        let time = TimeAxis::linspace(0.0, 10.0, 100).unwrap();
        let basis = DecayBasis::new(&time, &[2.0], 0.0, None).unwrap();
        let solver = LeastSquaresSolver::new(&basis).unwrap();
        let y = Array1::<f64>::zeros(50);
        assert!(matches!(
            solver.solve(y.view()).unwrap_err(),
            FitError::InvalidParameter(InvalidParameterError::LengthMismatch { .. })
        ));
    }
}
