//! rmc-ir - Intermediate Code Generation
//!
//! Lowers the validated AST into a linear three-address code stream. The
//! stream is the optimizer's working representation and the code
//! generator's input; this crate owns the instruction set, the arena it
//! lives in, and the operand classification helpers shared by both.

mod error;
mod lower;
mod tac;

pub use error::IrError;
pub use lower::{lower, Lowerer};
pub use tac::{
    is_bool_literal, is_char_literal, is_constant, is_double_literal, is_int_literal, is_label,
    is_string_literal, is_temp, is_variable, InstrId, TacInstr, TacProgram, MAX_INSTRUCTIONS,
};
