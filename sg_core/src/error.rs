//! Errors raised while building the computation graph.

use thiserror::Error;

/// Failure to construct a node.
///
/// Numeric singularities (division by zero, `0^-1`, ...) are not errors: they
/// produce `Inf`/`NaN` values that flow through the graph like ordinary
/// floating-point results.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GraphError {
    /// `pow` was called with a NaN or infinite exponent.
    #[error("invalid exponent {exponent}: power requires a finite real exponent")]
    InvalidExponent { exponent: f64 },
}

pub type Result<T> = std::result::Result<T, GraphError>;
