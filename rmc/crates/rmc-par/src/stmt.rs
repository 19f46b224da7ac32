//! Statement parsing.
//!
//! The statement level dispatches on the current token: a type keyword
//! opens a declaration, an identifier opens an assignment or postfix
//! statement, `if`/`while`/`for` open control statements, and a prefix
//! unary operator opens an expression statement. Every statement consumes
//! its own terminating `;` (or closing `}` for control bodies).

use crate::ast::{AstNode, BaseType, UnOp};
use crate::error::ParseError;
use crate::expr::StopSet;
use crate::Parser;
use rmc_lex::Token;

impl Parser {
    /// Parses one statement.
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        match self.current() {
            t if t.is_type_keyword() => self.parse_declaration(),
            Token::Ident(_) => self.parse_assignment_stmt(),
            Token::KwIf => self.parse_if(),
            Token::KwWhile => self.parse_while(),
            Token::KwFor => self.parse_for(),
            Token::Not | Token::PlusPlus | Token::MinusMinus => self.parse_prefix_unary_stmt(),
            other => Err(ParseError::InvalidStatementStart {
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Parses the statements of a `{ ... }` body whose `{` has already been
    /// consumed; consumes the closing `}`.
    fn parse_block_body(&mut self) -> Result<AstNode, ParseError> {
        let mut statements = Vec::new();
        while *self.current() != Token::RBrace {
            if *self.current() == Token::Eof {
                return Err(ParseError::UnexpectedEof);
            }
            statements.push(self.parse_statement()?);
        }
        self.advance();
        Ok(AstNode::Block(statements))
    }

    /// Parses `T name;`, `T name = expr;`, `T name[size];` and
    /// `T name[size] = { e1, ... };`.
    fn parse_declaration(&mut self) -> Result<AstNode, ParseError> {
        let ty = match self.current() {
            Token::KwInt => BaseType::Int,
            Token::KwChar => BaseType::Char,
            Token::KwDouble => BaseType::Double,
            Token::KwBool => BaseType::Bool,
            _ => unreachable!("caller dispatched on a type keyword"),
        };

        let name = match self.nth(1) {
            Token::Ident(name) => name.clone(),
            _ => return Err(ParseError::ExpectedDeclName),
        };

        match self.nth(2).clone() {
            Token::Assign => {
                self.advance_by(3);
                let init = self.parse_expression(0, StopSet::NONE)?;
                self.expect_semi()?;
                Ok(AstNode::Decl {
                    name,
                    ty,
                    init: Some(Box::new(init)),
                    is_array: false,
                    array_size: None,
                })
            }
            Token::LBracket => self.parse_array_declaration(name, ty),
            Token::Semi => {
                self.advance_by(3);
                Ok(AstNode::Decl {
                    name,
                    ty,
                    init: None,
                    is_array: false,
                    array_size: None,
                })
            }
            _ => Err(ParseError::ExpectedDeclContinuation),
        }
    }

    /// Parses the `[size]` tail of a declaration, with or without an
    /// initializer list. An initializer list requires a literal size.
    fn parse_array_declaration(
        &mut self,
        name: String,
        ty: BaseType,
    ) -> Result<AstNode, ParseError> {
        let (size_lexeme, literal_size) = match self.nth(3) {
            Token::Int(n) => (n.to_string(), Some(*n)),
            Token::Ident(s) => (s.clone(), None),
            _ => return Err(ParseError::InvalidArraySize),
        };

        if *self.nth(4) != Token::RBracket {
            return Err(ParseError::ExpectedRBracketInDecl);
        }

        match self.nth(5) {
            Token::Assign => {
                let Some(n) = literal_size else {
                    return Err(ParseError::InitializerNeedsLiteralSize);
                };
                if *self.nth(6) != Token::LBrace {
                    return Err(ParseError::ExpectedInitBrace);
                }
                self.advance_by(7);
                let init = self.parse_array_init(n.max(0) as usize)?;
                Ok(AstNode::Decl {
                    name,
                    ty,
                    init: Some(Box::new(init)),
                    is_array: true,
                    array_size: Some(size_lexeme),
                })
            }
            Token::Semi => {
                self.advance_by(6);
                Ok(AstNode::Decl {
                    name,
                    ty,
                    init: None,
                    is_array: true,
                    array_size: Some(size_lexeme),
                })
            }
            _ => Err(ParseError::ExpectedEqOrSemiAfterArray),
        }
    }

    /// Parses exactly `count` initializer elements, the closing `}` and the
    /// terminating `;`. Returns the elements as a block node.
    fn parse_array_init(&mut self, count: usize) -> Result<AstNode, ParseError> {
        let mut elements = Vec::new();
        for i in 0..count {
            let stops = if i + 1 == count {
                StopSet::RBRACE
            } else {
                StopSet::COMMA
            };
            elements.push(self.parse_expression(0, stops)?);
            if i + 1 < count && *self.current() == Token::Comma {
                self.advance();
            }
        }

        if *self.current() != Token::RBrace {
            return Err(ParseError::ExpectedInitCloseBrace);
        }
        self.advance();
        if *self.current() != Token::Semi {
            return Err(ParseError::ExpectedSemi);
        }
        self.advance();
        Ok(AstNode::Block(elements))
    }

    /// Parses a statement that starts with an identifier: a scalar or array
    /// assignment, or a postfix increment/decrement statement.
    fn parse_assignment_stmt(&mut self) -> Result<AstNode, ParseError> {
        let name = match self.current() {
            Token::Ident(name) => name.clone(),
            _ => unreachable!("caller dispatched on an identifier"),
        };

        match self.nth(1).clone() {
            Token::Assign => {
                self.advance_by(2);
                let value = self.parse_expression(0, StopSet::NONE)?;
                self.expect_semi()?;
                Ok(AstNode::Assign {
                    target: Box::new(AstNode::Var(name)),
                    value: Box::new(value),
                })
            }
            Token::LBracket => {
                self.advance_by(2);
                let index = self.parse_expression(0, StopSet::RBRACKET)?;
                if *self.current() != Token::RBracket {
                    return Err(ParseError::ExpectedRBracketInAssign);
                }
                self.advance();
                let target = AstNode::ArrayAccess {
                    name,
                    index: Box::new(index),
                };

                match self.current().clone() {
                    Token::Not => Err(ParseError::NotAfterArrayElement),
                    Token::PlusPlus | Token::MinusMinus => {
                        let op = if *self.current() == Token::PlusPlus {
                            UnOp::Inc
                        } else {
                            UnOp::Dec
                        };
                        self.advance();
                        if *self.current() != Token::Semi {
                            return Err(ParseError::ExpectedSemiAfterArrayPostfix);
                        }
                        self.advance();
                        Ok(AstNode::Unary {
                            op,
                            expr: Box::new(target),
                            is_prefix: false,
                        })
                    }
                    Token::Assign => {
                        self.advance();
                        let value = self.parse_expression(0, StopSet::NONE)?;
                        self.expect_semi()?;
                        Ok(AstNode::Assign {
                            target: Box::new(target),
                            value: Box::new(value),
                        })
                    }
                    _ => Err(ParseError::ExpectedEqAfterArrayElement),
                }
            }
            Token::PlusPlus | Token::MinusMinus => {
                let op = if *self.nth(1) == Token::PlusPlus {
                    UnOp::Inc
                } else {
                    UnOp::Dec
                };
                if *self.nth(2) != Token::Semi {
                    return Err(ParseError::ExpectedSemiAfterPostfix);
                }
                self.advance_by(3);
                Ok(AstNode::Unary {
                    op,
                    expr: Box::new(AstNode::Var(name)),
                    is_prefix: false,
                })
            }
            Token::Not => Err(ParseError::NotInPostfix),
            _ => Err(ParseError::ExpectedEqOrBracket),
        }
    }

    /// Parses a prefix `++`/`--`/`!` expression statement. The operand must
    /// be an lvalue.
    fn parse_prefix_unary_stmt(&mut self) -> Result<AstNode, ParseError> {
        let op = match self.current() {
            Token::Not => UnOp::Not,
            Token::PlusPlus => UnOp::Inc,
            Token::MinusMinus => UnOp::Dec,
            _ => unreachable!("caller dispatched on a unary operator"),
        };
        self.advance();

        let operand = self.parse_expression(9, StopSet::NONE)?;
        if !operand.is_lvalue() {
            return Err(ParseError::ExpectedLvalue);
        }
        self.expect_semi()?;

        Ok(AstNode::Unary {
            op,
            expr: Box::new(operand),
            is_prefix: true,
        })
    }

    /// Parses `if (cond) { ... }` with an optional `else` clause.
    fn parse_if(&mut self) -> Result<AstNode, ParseError> {
        self.advance(); // if
        if *self.current() != Token::LParen {
            return Err(ParseError::ExpectedLParenAfterIf);
        }
        self.advance();

        let cond = self.parse_expression(0, StopSet::RPAREN)?;
        if *self.current() != Token::RParen {
            return Err(ParseError::ExpectedRParenAfterIf);
        }
        self.advance();

        if *self.current() != Token::LBrace {
            return Err(ParseError::ExpectedLBraceAfterIf);
        }
        self.advance();
        let then_block = self.parse_block_body()?;

        if *self.current() == Token::KwElse {
            let else_block = self.parse_else()?;
            return Ok(AstNode::IfElse {
                cond: Box::new(cond),
                then_block: Box::new(then_block),
                else_block: Box::new(else_block),
            });
        }

        Ok(AstNode::If {
            cond: Box::new(cond),
            then_block: Box::new(then_block),
        })
    }

    /// Parses an `else` clause: either a braced block or a chained `if`.
    fn parse_else(&mut self) -> Result<AstNode, ParseError> {
        self.advance(); // else
        match self.current() {
            Token::KwIf => {
                let nested = self.parse_if()?;
                Ok(AstNode::Block(vec![nested]))
            }
            Token::LBrace => {
                self.advance();
                self.parse_block_body()
            }
            _ => Err(ParseError::ExpectedIfOrBraceAfterElse),
        }
    }

    /// Parses `while (cond) { ... }`.
    fn parse_while(&mut self) -> Result<AstNode, ParseError> {
        self.advance(); // while
        if *self.current() != Token::LParen {
            return Err(ParseError::ExpectedLParenAfterWhile);
        }
        self.advance();

        let cond = self.parse_expression(0, StopSet::RPAREN)?;
        if *self.current() != Token::RParen {
            return Err(ParseError::ExpectedRParenAfterWhile);
        }
        self.advance();

        if *self.current() != Token::LBrace {
            return Err(ParseError::ExpectedLBraceAfterWhile);
        }
        self.advance();
        let body = self.parse_block_body()?;

        Ok(AstNode::While {
            cond: Box::new(cond),
            body: Box::new(body),
        })
    }

    /// Parses `for (init; cond; update) { ... }`.
    ///
    /// The update must be an assignment or an increment/decrement; `!` in
    /// particular is rejected here rather than at semantic check.
    fn parse_for(&mut self) -> Result<AstNode, ParseError> {
        self.advance(); // for
        if *self.current() != Token::LParen {
            return Err(ParseError::ExpectedLParenAfterFor);
        }
        self.advance();

        let init = self.parse_statement()?;

        let cond = self.parse_expression(0, StopSet::NONE)?;
        self.expect_semi()?;

        let update = self.parse_expression(0, StopSet::RPAREN)?;
        match &update {
            AstNode::Assign { .. } => {}
            AstNode::Unary {
                op: UnOp::Inc | UnOp::Dec,
                ..
            } => {}
            AstNode::Unary { op: UnOp::Not, .. } => return Err(ParseError::NotInForUpdate),
            _ => return Err(ParseError::BadForUpdate),
        }

        if *self.current() != Token::RParen {
            return Err(ParseError::ExpectedRParenAfterFor);
        }
        self.advance();

        if *self.current() != Token::LBrace {
            return Err(ParseError::ExpectedLBraceAfterFor);
        }
        self.advance();
        let body = self.parse_block_body()?;

        Ok(AstNode::For {
            init: Box::new(init),
            cond: Box::new(cond),
            update: Box::new(update),
            body: Box::new(body),
        })
    }
}
