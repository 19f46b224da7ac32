//! rmc-gen - x86-64 Code Generation
//!
//! Turns the optimized TAC stream into an AT&T-syntax assembly listing for
//! the GNU assembler, System V x86-64. All storage is stack-resident: the
//! stack map assigns every variable and temporary a slot below `%rbp`, and
//! every instruction template moves values through `%rax`.

mod asm;
mod error;
mod stack_map;

pub use asm::{generate, AsmEmitter, MAX_ASM_LINES};
pub use error::CodegenError;
pub use stack_map::{Slot, StackMap, MAX_SLOTS};
