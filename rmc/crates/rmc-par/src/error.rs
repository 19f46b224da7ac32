//! Parse error definitions.
//!
//! Every variant carries the numbered code printed in the diagnostic; the
//! numbering follows the original compiler's `[02.nn]` scheme so failures
//! are greppable against the report.

use thiserror::Error;

/// Errors raised by the parser. All map to exit code 2.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("02 || Syntax error [02.01] -> Invalid token at start of statement: {found}")]
    InvalidStatementStart { found: String },

    #[error("02 || Syntax error [02.02] -> Expected variable name for declaration")]
    ExpectedDeclName,

    #[error("02 || Syntax error [02.05] -> Size of array is invalid")]
    InvalidArraySize,

    #[error("02 || Syntax error [02.06] -> Expected ] after array size")]
    ExpectedRBracketInDecl,

    #[error("02 || Syntax error [02.07] -> Array initializer requires a literal size")]
    InitializerNeedsLiteralSize,

    #[error("02 || Syntax error [02.08] -> Missing {{ for array initialization")]
    ExpectedInitBrace,

    #[error("02 || Syntax error [02.11] -> Expected either = or ; after array declaration")]
    ExpectedEqOrSemiAfterArray,

    #[error("02 || Syntax error [02.12] -> Expected either = or [ or ; in declaration")]
    ExpectedDeclContinuation,

    #[error("02 || Syntax error [02.13] -> Index of array must be either int or variable")]
    BadIndexStart,

    #[error("02 || Syntax error [02.14] -> Expected ] after array index")]
    ExpectedRBracketAfterIndex,

    #[error("02 || Syntax error [02.15] -> Expected )")]
    ExpectedRParenAfterGroup,

    #[error("02 || Syntax error [02.16] -> Expected lvalue after unary operator")]
    ExpectedLvalueAfterUnary,

    #[error("02 || Syntax error [02.17] -> Unexpected token found in expression: {found}")]
    UnexpectedExpressionToken { found: String },

    #[error("02 || Syntax error [02.18] -> Expected ) before ;")]
    SemiWhileExpectingRParen,

    #[error("02 || Syntax error [02.19] -> Expected ] before ;")]
    SemiWhileExpectingRBracket,

    #[error("02 || Syntax error [02.20] -> Unexpected ) found in expression")]
    UnexpectedRParen,

    #[error("02 || Syntax error [02.21] -> Unexpected ] found in expression")]
    UnexpectedRBracket,

    #[error("02 || Syntax error [02.22] -> Unexpected }} found in expression")]
    UnexpectedRBrace,

    #[error("02 || Syntax error [02.23] -> Unexpected , found in expression")]
    UnexpectedComma,

    #[error("02 || Syntax error [02.24] -> Expected binary operator in expression, found {found}")]
    ExpectedOperator { found: String },

    #[error("02 || Syntax error [02.25] -> Expected }} to close array initializer")]
    ExpectedInitCloseBrace,

    #[error("02 || Syntax error [02.26] -> Expected ;")]
    ExpectedSemi,

    #[error("02 || Syntax error [02.27] -> Expected ] after assignment index")]
    ExpectedRBracketInAssign,

    #[error("02 || Syntax error [02.28] -> Expected = after array element")]
    ExpectedEqAfterArrayElement,

    #[error("02 || Syntax error [02.29] -> Expected = or [ after identifier")]
    ExpectedEqOrBracket,

    #[error("02 || Syntax error [02.30] -> Expected ( after if")]
    ExpectedLParenAfterIf,

    #[error("02 || Syntax error [02.31] -> Expected ) after if condition")]
    ExpectedRParenAfterIf,

    #[error("02 || Syntax error [02.32] -> Expected {{ after if")]
    ExpectedLBraceAfterIf,

    #[error("02 || Syntax error [02.33] -> Expected if or {{ after else")]
    ExpectedIfOrBraceAfterElse,

    #[error("02 || Syntax error [02.34] -> ! NOT allowed in post-fix")]
    NotInPostfix,

    #[error("02 || Syntax error [02.35] -> Expected ; after post-fix operator")]
    ExpectedSemiAfterPostfix,

    #[error("02 || Syntax error [02.36] -> ! NOT allowed in post-fix")]
    NotAfterArrayElement,

    #[error("02 || Syntax error [02.37] -> Expected ; after array post-fix")]
    ExpectedSemiAfterArrayPostfix,

    #[error("02 || Syntax error [02.38] -> Expected lvalue")]
    ExpectedLvalue,

    #[error("02 || Syntax error [02.39] -> Expected ( after while")]
    ExpectedLParenAfterWhile,

    #[error("02 || Syntax error [02.40] -> Expected ) after while condition")]
    ExpectedRParenAfterWhile,

    #[error("02 || Syntax error [02.41] -> Expected {{ after while")]
    ExpectedLBraceAfterWhile,

    #[error("02 || Syntax error [02.42] -> Expected ( after for")]
    ExpectedLParenAfterFor,

    #[error("02 || Syntax error [02.43] -> ! NOT allowed in update section of FOR")]
    NotInForUpdate,

    #[error("02 || Syntax error [02.44] -> Expected increment/decrement/assignment in update section of FOR")]
    BadForUpdate,

    #[error("02 || Syntax error [02.45] -> Expected ) after for update")]
    ExpectedRParenAfterFor,

    #[error("02 || Syntax error [02.46] -> Expected {{ after for")]
    ExpectedLBraceAfterFor,

    #[error("02 || Syntax error [02.47] -> Unexpected end of file")]
    UnexpectedEof,
}
