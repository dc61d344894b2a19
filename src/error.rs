use crate::{CoefficientKey, Time};
use thiserror::Error;

/// Errors produced by curves and their containers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("{times} times were given with {values} values")]
    SizeMismatch { times: usize, values: usize },

    #[error("time {time} is outside the curve range [{min}, {max}]")]
    TimeOutOfBounds { time: Time, min: Time, max: Time },

    #[error("the curve holds no coefficients")]
    NotFound,

    #[error("no coefficient is stored under key {0:?}")]
    UnknownKey(CoefficientKey),

    #[error("expected storage for {expected} coefficients, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("infeasible boundary conditions: {0}")]
    InfeasibleBoundaryConditions(String),

    #[error("a coefficient already exists at time {time}")]
    DuplicateTimeConflict { time: Time },

    #[error("{0} is not implemented")]
    Unimplemented(&'static str),
}

impl CurveError {
    /// Whether the caller can sensibly retry with adjusted input.
    ///
    /// Size and dimension mismatches are programming errors on the
    /// caller's side and are reported as unrecoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CurveError::SizeMismatch { .. } | CurveError::DimensionMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CurveError>;

/// Fails with [CurveError::SizeMismatch] unless both slices have the same length.
pub(crate) fn check_sizes<A, B>(times: &[A], values: &[B]) -> Result<()> {
    if times.len() != values.len() {
        return Err(CurveError::SizeMismatch {
            times: times.len(),
            values: values.len(),
        });
    }
    Ok(())
}
