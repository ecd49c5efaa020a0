#[cfg(test)]
pub(crate) fn within_bounds(x: &[f64], bounds: &[(f64, f64)]) -> bool {
    x.len() == bounds.len()
        && x
            .iter()
            .zip(bounds)
            .all(|(&x, &(lower, upper))| lower <= x && x <= upper)
}

pub(crate) fn clamp_to_bounds(x: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    x.iter()
        .zip(bounds)
        .map(|(&x, &(lower, upper))| x.clamp(lower, upper))
        .collect()
}
