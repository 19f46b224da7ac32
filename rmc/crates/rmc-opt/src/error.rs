//! Optimizer error definitions. All map to exit code 5.
//!
//! These are internal errors: a well-formed instruction stream can never
//! trigger them.

use thiserror::Error;

/// Errors raised while building blocks or running the optimizer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptError {
    #[error("05 || Optimization error [05.02] -> Maximum limit of basic blocks reached")]
    BlockLimit,

    #[error("05 || Optimization error [05.06] -> Label ({label}) defined more than once")]
    DuplicateLabel { label: String },

    #[error("05 || Optimization error [05.07] -> Jump target ({label}) has no defining label")]
    UnknownLabel { label: String },

    #[error("05 || Optimization error [05.08] -> Dataflow did not reach a fixed point within the iteration bound")]
    FixedPointNotReached,
}
