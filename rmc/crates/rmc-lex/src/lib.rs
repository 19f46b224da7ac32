//! rmc-lex - Lexical Analyzer
//!
//! The first phase of the pipeline: a byte stream in, a token sequence out.
//!
//! The scanner is table-driven at the character level. Every byte is mapped
//! to a character class (letter, digit, operator, bracket, punctuation,
//! whitespace, unknown) and lexemes are formed from runs of identical class,
//! with three refinements:
//!
//! - a `'` or `"` opens a quoted literal terminated by the matching quote;
//! - a `.` inside a digit run is absorbed, forming a double literal;
//! - an operator run is cut after an `=` that is not followed by another
//!   `=`, so `==`, `!=`, `<=`, `>=` stay whole while `=` followed by
//!   anything else stands alone.
//!
//! Everything before the first `{` of the file is a free-form preamble
//! (includes, comments, preprocessor lines) and is discarded; the main scan
//! starts at the byte after that `{`.

mod classify;
mod cursor;
#[cfg(test)]
mod edge_cases;
mod error;
mod lexer;
mod token;

pub use classify::{class_of, CharClass};
pub use cursor::Cursor;
pub use error::LexError;
pub use lexer::{tokenize, Lexer};
pub use token::Token;
