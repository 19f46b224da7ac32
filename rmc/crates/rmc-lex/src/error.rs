//! Lexical error definitions.

use rmc_util::Span;
use thiserror::Error;

/// Errors raised during lexical analysis. All map to exit code 2.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    /// A character outside the classification table.
    #[error("01 || Syntax error [01.01] -> Unknown character '{found}' at {span}")]
    UnknownCharacter { found: char, span: Span },

    /// A `'` with no closing `'` before end of file.
    #[error("01 || Syntax error [01.02] -> Unterminated character literal at {span}")]
    UnterminatedChar { span: Span },

    /// A `"` with no closing `"` before end of file.
    #[error("01 || Syntax error [01.03] -> Unterminated string literal at {span}")]
    UnterminatedString { span: Span },

    /// A literal that scanned but does not parse (two dots, oversized int,
    /// multi-character char literal).
    #[error("01 || Syntax error [01.04] -> Malformed literal '{lexeme}' at {span}")]
    MalformedLiteral { lexeme: String, span: Span },
}
