//! Code-generation error definitions. All map to exit code 6.

use thiserror::Error;

/// Errors raised while building the stack map or emitting assembly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("06 || Target Code Generation error [06.01] -> Assembly buffer is full - maximum instruction limit reached")]
    AsmBufferLimit,

    #[error("06 || Target Code Generation error [06.03] -> Variable stack map is full - maximum variable limit reached")]
    StackMapLimit,

    #[error("06 || Target Code Generation error [06.04] -> Double literal ({value}) is not supported in code generation")]
    DoubleLiteral { value: String },

    #[error("06 || Target Code Generation error [06.05] -> Array ({name}) has no literal size")]
    BadArraySize { name: String },

    #[error("06 || Target Code Generation error [06.06] -> Operand ({name}) has no stack slot")]
    UnmappedOperand { name: String },
}
