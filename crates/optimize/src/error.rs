//! Error types for the optimization tiers.

use thiserror::Error;

/// Failure modes across the static LP, dynamic DP, and rolling-horizon
/// tiers. Infeasibility and solver faults are not treated as Rust errors
/// when they can be represented as a `SolverStatus` in the result (see
/// `voyage_schedule::SolverStatus`); this enum covers cases that prevent a
/// result from being produced at all.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("route must have at least two nodes")]
    EmptyRoute,
    #[error("static_det.segments config ({expected}) does not match the route's actual segment count ({actual})")]
    SegmentCountMismatch { expected: usize, actual: usize },
    #[error("unknown solver backend '{0}'")]
    UnknownBackend(String),
    #[error("LP solver error: {0}")]
    Solver(String),
    #[error("weather store error: {0}")]
    Store(#[from] voyage_store::StoreError),
}
