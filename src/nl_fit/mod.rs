//! Bounded non-linear minimization used to refine shared lifetimes
//!
//! The global fit is a separable least-squares problem: for fixed lifetimes the amplitudes are
//! the solution of a linear problem, so the minimizer only sees the lifetimes. It works on
//! natural logarithms of the lifetimes ("internal" parameters), which keeps the problem well
//! scaled when lifetimes span orders of magnitude and maps positive bounds to finite ones.
//!
//! ```text
//! internal = ln(lifetime)        lifetime = clamp(exp(internal), lower, upper)
//! ```
//!
//! Algorithms implement [LifetimeFitTrait] and are collected in the [LifetimeFitAlgorithm] enum:
//!
//! - [CobylaLifetimeFit]: derivative-free, deterministic, handles bounds natively.

mod bounds;

pub mod cobyla;
pub use cobyla::CobylaLifetimeFit;

pub mod lifetime_fit;
pub use lifetime_fit::{LifetimeFitAlgorithm, LifetimeFitTrait, MinimizeResult};
