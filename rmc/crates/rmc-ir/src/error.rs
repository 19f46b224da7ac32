//! IR generation error definitions. All map to exit code 4.

use thiserror::Error;

/// Errors raised while lowering the AST to three-address code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IrError {
    #[error("04 || ICG error [04.05] -> Maximum limit of three-address code instructions reached")]
    InstructionLimit,

    #[error("04 || ICG error [04.06] -> Unexpected node in lowering")]
    UnexpectedNode,
}
