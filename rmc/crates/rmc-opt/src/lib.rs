//! rmc-opt - Basic Blocks, Dataflow and Optimization
//!
//! Consumes the linear TAC stream and produces, in order: basic blocks, the
//! control-flow graph, reaching-definitions and live-variable sets, and the
//! optimized stream. Blocks and dataflow are rebuilt from scratch whenever
//! the underlying instructions change, so rebuilding after optimization
//! reproduces exactly the sets the final iteration used.

mod block;
mod cfg;
mod error;
mod liveness;
mod passes;
mod reaching;

pub use block::{BasicBlock, BlockId, FlowGraph, MAX_BLOCKS};
pub use cfg::build_flow_graph;
pub use error::OptError;
pub use liveness::{live_variables, LiveSets};
pub use passes::{optimize, MAX_OPT_ITERATIONS};
pub use reaching::{reaching_definitions, ReachingSets};

#[cfg(test)]
mod tests;
