use crate::amplitudes::AmplitudeMatrix;
use crate::data::{ObservableBlocks, ObservableKind, ObservableLayout, wavelength_nanometers};
use crate::error::InvalidParameterError;
use crate::lifetime::{DecayLifetime, lifetime_values};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Amplitude of one decay component versus wavelength
///
/// Also known as a decay-associated spectrum. Points are in the order of the fitted curves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Fitted lifetime of the component
    pub lifetime: f64,
    pub kind: ObservableKind,
    pub wavelengths: Vec<u32>,
    pub amplitudes: Array1<f64>,
}

impl Spectrum {
    /// `(wavelength label, amplitude)` pairs
    pub fn points(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.wavelengths
            .iter()
            .copied()
            .zip(self.amplitudes.iter().copied())
    }

    /// Same as [Spectrum::points] with wavelengths in nanometres
    pub fn points_nm(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points().map(|(w, a)| (wavelength_nanometers(w), a))
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }
}

/// One spectrum per lifetime column, per observable
///
/// In the dual layout the first block of amplitude rows becomes the dA spectra and the rest the
/// dCD spectra, both labelled with the same shared lifetimes.
pub fn assemble_spectra<L: DecayLifetime>(
    lifetimes: &[L],
    amplitudes: &AmplitudeMatrix,
    layout: &ObservableLayout,
) -> Result<ObservableBlocks<Vec<Spectrum>>, InvalidParameterError> {
    amplitudes.check_shape(layout.len(), lifetimes.len())?;
    let lifetimes = lifetime_values(lifetimes);
    let spectra = match layout {
        ObservableLayout::Single { kind, wavelengths } => {
            ObservableBlocks::Single(block_spectra(&lifetimes, amplitudes, *kind, wavelengths))
        }
        ObservableLayout::Dual {
            da_wavelengths,
            cd_wavelengths,
        } => {
            let (da, cd) = amplitudes.split_at_row(da_wavelengths.len());
            ObservableBlocks::Dual {
                da: block_spectra(
                    &lifetimes,
                    &da,
                    ObservableKind::DeltaAbsorbance,
                    da_wavelengths,
                ),
                cd: block_spectra(
                    &lifetimes,
                    &cd,
                    ObservableKind::DeltaCircularDichroism,
                    cd_wavelengths,
                ),
            }
        }
    };
    Ok(spectra)
}

fn block_spectra(
    lifetimes: &[f64],
    amplitudes: &AmplitudeMatrix,
    kind: ObservableKind,
    wavelengths: &[u32],
) -> Vec<Spectrum> {
    lifetimes
        .iter()
        .enumerate()
        .map(|(l, &lifetime)| Spectrum {
            lifetime,
            kind,
            wavelengths: wavelengths.to_vec(),
            amplitudes: amplitudes.column(l).to_owned(),
        })
        .collect()
}
