//! Semantic error definitions, numbered `[03.nn]`. All map to exit code 3.

use thiserror::Error;

/// Errors raised by the semantic checker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SemanticError {
    #[error("03 || Semantic Check error [03.02] -> Declaration type error for ({name})")]
    DeclTypeMismatch { name: String },

    #[error("03 || Semantic Check error [03.03] -> Assignment type error")]
    AssignTypeMismatch,

    #[error("03 || Semantic Check error [03.11] -> Index of array MUST be int")]
    NonIntArrayIndex,

    #[error("03 || Semantic Check error [03.12] -> Expected INT/DOUBLE around binop")]
    ArithOperandType,

    #[error("03 || Semantic Check error [03.13] -> Expected INT/DOUBLE/BOOLEON around binop")]
    CompareOperandType,

    #[error("03 || Semantic Check error [03.15] -> Expected BOOLEON around binop")]
    LogicalOperandType,

    #[error("03 || Semantic Check error [03.17] -> Expected BOOLEON after !")]
    NotOperandType,

    #[error("03 || Semantic Check error [03.18] -> Expected INT around ++/--")]
    IncDecOperandType,

    #[error("03 || Semantic Check error [03.21] -> Unknown AST found in expression")]
    UnknownAstNode,

    #[error("03 || Semantic Check error [03.22] -> Variable ({name}) already exists in current scope")]
    Redeclaration { name: String },

    #[error("03 || Semantic Check error [03.22] -> Division by zero detected")]
    DivisionByZero,

    #[error("03 || Semantic Check error [03.23] -> Index symbol ({name}) is undefined")]
    UndefinedSizeSymbol { name: String },

    #[error("03 || Semantic Check error [03.24] -> Index symbol ({name}) MUST be of type INT")]
    NonIntSizeSymbol { name: String },

    #[error("03 || Semantic Check error [03.27] -> ! NOT allowed in update section of FOR")]
    NotInForUpdate,

    #[error("03 || Semantic Check error [03.28] -> Expected either INCREMENT/DECREMENT/ASSIGNMENT in update section of FOR")]
    BadForUpdate,

    #[error("03 || Semantic Check error [03.29] -> Symbol ({name}) does NOT exist")]
    UndeclaredSymbol { name: String },
}
