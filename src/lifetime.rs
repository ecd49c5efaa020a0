use crate::error::InvalidParameterError;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Anything a decay column can be built from
///
/// Plain `f64` values are used for the local survey, [BoundedLifetime] inside the global fit,
/// both go through the same basis builder.
pub trait DecayLifetime {
    fn lifetime(&self) -> f64;
}

impl DecayLifetime for f64 {
    #[inline]
    fn lifetime(&self) -> f64 {
        *self
    }
}

impl DecayLifetime for BoundedLifetime {
    #[inline]
    fn lifetime(&self) -> f64 {
        self.value
    }
}

/// Decay lifetime constrained to a closed interval
///
/// `0 < lower <= value <= upper < inf` holds for every instance. A lifetime with `lower == upper`
/// is fixed: the global fit never changes it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(
    try_from = "BoundedLifetimeParameters",
    into = "BoundedLifetimeParameters"
)]
pub struct BoundedLifetime {
    lower: f64,
    #[serde(rename = "lifetime")]
    value: f64,
    upper: f64,
}

impl BoundedLifetime {
    pub fn new(lower: f64, value: f64, upper: f64) -> Result<Self, InvalidParameterError> {
        Self::with_index(0, lower, value, upper)
    }

    /// Same as [BoundedLifetime::new], `index` is only used in the error
    pub fn with_index(
        index: usize,
        lower: f64,
        value: f64,
        upper: f64,
    ) -> Result<Self, InvalidParameterError> {
        for x in [lower, value, upper] {
            if !x.is_finite() {
                return Err(InvalidParameterError::NonFiniteLifetime { index, value: x });
            }
            if x <= 0.0 {
                return Err(InvalidParameterError::NonPositiveLifetime { index, value: x });
            }
        }
        if !(lower <= value && value <= upper) {
            return Err(InvalidParameterError::MalformedBounds {
                index,
                lower,
                value,
                upper,
            });
        }
        Ok(Self {
            lower,
            value,
            upper,
        })
    }

    /// Lifetime that the global fit keeps constant
    pub fn fixed(value: f64) -> Result<Self, InvalidParameterError> {
        Self::new(value, value, value)
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.lower == self.upper
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        (self.lower..=self.upper).contains(&x)
    }

    /// Same bounds, new value clamped into them
    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value: value.clamp(self.lower, self.upper),
            ..*self
        }
    }
}

/// Current values of the lifetimes, in order
pub fn lifetime_values<L: DecayLifetime>(lifetimes: &[L]) -> Vec<f64> {
    lifetimes.iter().map(DecayLifetime::lifetime).collect()
}

/// Parse `(lower, lifetime, upper)` triples, one per lifetime
///
/// Accepts anything that yields three numbers per lifetime, e.g. the values of repeated
/// `--lifetime lower lifetime upper` command-line options.
pub fn bounded_lifetimes_from_triples<I, T>(
    triples: I,
) -> Result<Vec<BoundedLifetime>, InvalidParameterError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[f64]>,
{
    let lifetimes = triples
        .into_iter()
        .enumerate()
        .map(|(index, triple)| match *triple.as_ref() {
            [lower, value, upper] => BoundedLifetime::with_index(index, lower, value, upper),
            ref other => Err(InvalidParameterError::WrongLifetimeTriple {
                index,
                len: other.len(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    validate_lifetimes(&lifetimes)?;
    Ok(lifetimes)
}

/// Check a lifetime sequence before a fit starts
pub fn validate_lifetimes<L: DecayLifetime>(lifetimes: &[L]) -> Result<(), InvalidParameterError> {
    if lifetimes.is_empty() {
        return Err(InvalidParameterError::EmptyLifetimes);
    }
    for (index, value) in lifetimes.iter().map(DecayLifetime::lifetime).enumerate() {
        if !value.is_finite() {
            return Err(InvalidParameterError::NonFiniteLifetime { index, value });
        }
        if value <= 0.0 {
            return Err(InvalidParameterError::NonPositiveLifetime { index, value });
        }
    }
    Ok(())
}

#[derive(Serialize, Deserialize)]
#[serde(rename = "BoundedLifetime")]
struct BoundedLifetimeParameters {
    lower: f64,
    lifetime: f64,
    upper: f64,
}

impl From<BoundedLifetime> for BoundedLifetimeParameters {
    fn from(f: BoundedLifetime) -> Self {
        Self {
            lower: f.lower,
            lifetime: f.value,
            upper: f.upper,
        }
    }
}

impl TryFrom<BoundedLifetimeParameters> for BoundedLifetime {
    type Error = InvalidParameterError;

    fn try_from(f: BoundedLifetimeParameters) -> Result<Self, Self::Error> {
        Self::new(f.lower, f.lifetime, f.upper)
    }
}
