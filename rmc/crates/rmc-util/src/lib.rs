//! rmc-util - Core Utilities and Foundation Types
//!
//! This crate provides the foundation types shared by every phase of the
//! rmc compiler: source spans, the diagnostic handler that accumulates
//! warnings across phases, and typed index vectors used for the basic-block
//! and instruction arenas.
//!
//! DESIGN PRINCIPLES:
//! ------------------
//! 1. ZERO-COST ABSTRACTIONS
//!    Typed indices compile down to plain `u32` arithmetic; the arenas are
//!    plain vectors underneath.
//!
//! 2. TYPE SAFETY
//!    `InstrId` and `BlockId` live in different index spaces. The `Idx`
//!    trait and `IndexVec` make it a compile error to index the instruction
//!    arena with a block id.
//!
//! 3. SINGLE-THREADED BY DESIGN
//!    The pipeline runs one phase at a time from start to finish, so the
//!    diagnostic handler uses plain interior mutability instead of locks.

mod diagnostic;
mod index_vec;
mod span;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;

// Re-export commonly used collection types so phase crates agree on hashers.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
