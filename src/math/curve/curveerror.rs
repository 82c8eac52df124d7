use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("x-domain mismatch: expected {expected} points, found {actual} (or differing x values)")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("x and y lengths differ: {xs} x values, {ys} y values")]
    LengthMismatch { xs: usize, ys: usize },

    #[error("sequence must contain at least one point")]
    Empty,

    #[error("x values must be strictly ascending (violated at index {0})")]
    Unsorted(usize),

    #[error("y values are not monotonic in the requested direction (violated at index {0})")]
    NonMonotonicInput(usize),
}
