use ns_trcd_fit::prelude::*;
use rand::prelude::*;
use rand_distr::StandardNormal;

pub fn decay(time: &TimeAxis, components: &[(f64, f64)]) -> Vec<f64> {
    time.iter()
        .map(|&t| {
            components
                .iter()
                .map(|&(a, tau)| a * f64::exp(-t / tau))
                .sum()
        })
        .collect()
}

pub fn add_noise(values: &mut [f64], sigma: f64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for x in values.iter_mut() {
        let eps: f64 = rng.sample(StandardNormal);
        *x += sigma * eps;
    }
}

/// `(lifetime, amplitude)` pairs of a fit sorted by lifetime
#[allow(dead_code)]
pub fn sorted_components(fit: &FitResult, wavelength_index: usize) -> Vec<(f64, f64)> {
    let mut components: Vec<_> = fit
        .lifetime_values()
        .into_iter()
        .zip(fit.amplitudes().row(wavelength_index).iter().copied())
        .collect();
    components.sort_by(|a, b| a.0.total_cmp(&b.0));
    components
}
