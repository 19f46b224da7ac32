//! AST to three-address code lowering.
//!
//! Every expression lowers to exactly one instruction whose result operand
//! names its value (a fresh `T<k>`, or the target name for assignments).
//! Temporaries and labels come from two disjoint monotonic counters and are
//! never reused.
//!
//! Control lowering layouts:
//!
//! ```text
//! if (c) { B }            T = <c>; ifFalse T goto L; <B>; L:
//! if (c) { B1 } else B2   T = <c>; ifFalse T goto L1; <B1>; goto L2; L1:; <B2>; L2:
//! while (c) { B }         L1:; T = <c>; ifFalse T goto L2; <B>; goto L1; L2:
//! for (i; c; u) { B }     <i>; L1:; T = <c>; ifFalse T goto L2; <B>; <u>; goto L1; L2:
//! ```

use crate::error::IrError;
use crate::tac::{TacInstr, TacProgram};
use rmc_par::{AstNode, UnOp};

/// Lowering state: the growing program plus the fresh-name counters.
pub struct Lowerer {
    program: TacProgram,
    temps_used: u32,
    labels_used: u32,
}

impl Lowerer {
    pub fn new() -> Self {
        Self {
            program: TacProgram::new(),
            temps_used: 0,
            labels_used: 0,
        }
    }

    /// Lowers a whole program and returns the instruction stream.
    pub fn lower_program(mut self, program: &[AstNode]) -> Result<TacProgram, IrError> {
        for statement in program {
            self.lower_stmt(statement)?;
        }
        Ok(self.program)
    }

    fn fresh_temp(&mut self) -> String {
        let name = format!("T{}", self.temps_used);
        self.temps_used += 1;
        name
    }

    fn fresh_label(&mut self) -> String {
        let name = format!("L{}", self.labels_used);
        self.labels_used += 1;
        name
    }

    fn emit(&mut self, instr: TacInstr) -> Result<(), IrError> {
        self.program.push(instr)?;
        Ok(())
    }

    /// Lowers one statement.
    fn lower_stmt(&mut self, node: &AstNode) -> Result<(), IrError> {
        match node {
            AstNode::Decl {
                name,
                init: Some(init),
                is_array,
                ..
            } => {
                if *is_array {
                    // Initializer list: one array write per element.
                    let AstNode::Block(elements) = &**init else {
                        return Err(IrError::UnexpectedNode);
                    };
                    for (k, element) in elements.iter().enumerate() {
                        let value = self.lower_expr(element)?;
                        self.emit(TacInstr::ArrayWrite {
                            array: name.clone(),
                            index: k.to_string(),
                            value,
                        })?;
                    }
                } else {
                    let value = self.lower_expr(init)?;
                    self.emit(TacInstr::Assign {
                        result: name.clone(),
                        arg: value,
                    })?;
                }
                Ok(())
            }

            // A bare declaration produces no code.
            AstNode::Decl { init: None, .. } => Ok(()),

            AstNode::Assign { .. } | AstNode::Unary { .. } => {
                self.lower_expr(node)?;
                Ok(())
            }

            AstNode::If { cond, then_block } => {
                let cond = self.lower_expr(cond)?;
                let end = self.fresh_label();
                self.emit(TacInstr::IfFalse {
                    cond,
                    label: end.clone(),
                })?;
                self.lower_stmt(then_block)?;
                self.emit(TacInstr::Label { name: end })
            }

            AstNode::IfElse {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.lower_expr(cond)?;
                let else_label = self.fresh_label();
                self.emit(TacInstr::IfFalse {
                    cond,
                    label: else_label.clone(),
                })?;
                self.lower_stmt(then_block)?;
                let end_label = self.fresh_label();
                self.emit(TacInstr::Goto {
                    label: end_label.clone(),
                })?;
                self.emit(TacInstr::Label { name: else_label })?;
                self.lower_stmt(else_block)?;
                self.emit(TacInstr::Label { name: end_label })
            }

            AstNode::While { cond, body } => {
                let head = self.fresh_label();
                self.emit(TacInstr::Label { name: head.clone() })?;
                let cond = self.lower_expr(cond)?;
                let exit = self.fresh_label();
                self.emit(TacInstr::IfFalse {
                    cond,
                    label: exit.clone(),
                })?;
                self.lower_stmt(body)?;
                self.emit(TacInstr::Goto { label: head })?;
                self.emit(TacInstr::Label { name: exit })
            }

            AstNode::For {
                init,
                cond,
                update,
                body,
            } => {
                self.lower_stmt(init)?;
                let head = self.fresh_label();
                self.emit(TacInstr::Label { name: head.clone() })?;
                let cond = self.lower_expr(cond)?;
                let exit = self.fresh_label();
                self.emit(TacInstr::IfFalse {
                    cond,
                    label: exit.clone(),
                })?;
                self.lower_stmt(body)?;
                self.lower_expr(update)?;
                self.emit(TacInstr::Goto { label: head })?;
                self.emit(TacInstr::Label { name: exit })
            }

            AstNode::Block(statements) => {
                for statement in statements {
                    self.lower_stmt(statement)?;
                }
                Ok(())
            }

            other => {
                self.lower_expr(other)?;
                Ok(())
            }
        }
    }

    /// Lowers an expression; returns the operand naming its value.
    fn lower_expr(&mut self, node: &AstNode) -> Result<String, IrError> {
        match node {
            AstNode::Int(v) => self.assign_fresh(v.to_string()),
            AstNode::Double(v) => self.assign_fresh(format!("{v:.6}")),
            AstNode::Bool(v) => self.assign_fresh(v.to_string()),
            AstNode::Char(c) => self.assign_fresh(format!("'{c}'")),

            AstNode::Var(name) => self.assign_fresh(name.clone()),

            AstNode::ArrayAccess { name, index } => {
                let index = self.lower_expr(index)?;
                let result = self.fresh_temp();
                self.emit(TacInstr::ArrayRead {
                    result: result.clone(),
                    array: name.clone(),
                    index,
                })?;
                Ok(result)
            }

            AstNode::Binary { op, left, right } => {
                let arg1 = self.lower_expr(left)?;
                let arg2 = self.lower_expr(right)?;
                let result = self.fresh_temp();
                self.emit(TacInstr::BinOp {
                    result: result.clone(),
                    arg1,
                    op: op.as_str().to_string(),
                    arg2,
                })?;
                Ok(result)
            }

            AstNode::Unary {
                op: UnOp::Not,
                expr,
                ..
            } => {
                let arg = self.lower_expr(expr)?;
                let result = self.fresh_temp();
                self.emit(TacInstr::UnOp {
                    result: result.clone(),
                    op: "!".into(),
                    arg,
                })?;
                Ok(result)
            }

            AstNode::Unary {
                op,
                expr,
                is_prefix,
            } => {
                // ++/--: read, adjust by one, write back. Prefix yields the
                // new value, postfix the old one.
                let old = self.lower_expr(expr)?;
                let new = self.fresh_temp();
                let op_str = if *op == UnOp::Inc { "+" } else { "-" };
                self.emit(TacInstr::BinOp {
                    result: new.clone(),
                    arg1: old.clone(),
                    op: op_str.into(),
                    arg2: "1".into(),
                })?;
                self.write_back(expr, new.clone())?;
                Ok(if *is_prefix { new } else { old })
            }

            AstNode::Assign { target, value } => {
                let value = self.lower_expr(value)?;
                match &**target {
                    AstNode::Var(name) => {
                        self.emit(TacInstr::Assign {
                            result: name.clone(),
                            arg: value,
                        })?;
                        // The value of an assignment expression is its
                        // assigned lvalue.
                        Ok(name.clone())
                    }
                    AstNode::ArrayAccess { name, index } => {
                        let index = self.lower_expr(index)?;
                        self.emit(TacInstr::ArrayWrite {
                            array: name.clone(),
                            index,
                            value: value.clone(),
                        })?;
                        Ok(value)
                    }
                    _ => Err(IrError::UnexpectedNode),
                }
            }

            _ => Err(IrError::UnexpectedNode),
        }
    }

    /// Emits `T = arg` for a fresh temporary and returns it.
    fn assign_fresh(&mut self, arg: String) -> Result<String, IrError> {
        let result = self.fresh_temp();
        self.emit(TacInstr::Assign {
            result: result.clone(),
            arg,
        })?;
        Ok(result)
    }

    /// Stores `value` back into an lvalue. Array indices are re-evaluated.
    fn write_back(&mut self, lvalue: &AstNode, value: String) -> Result<(), IrError> {
        match lvalue {
            AstNode::Var(name) => self.emit(TacInstr::Assign {
                result: name.clone(),
                arg: value,
            }),
            AstNode::ArrayAccess { name, index } => {
                let index = self.lower_expr(index)?;
                self.emit(TacInstr::ArrayWrite {
                    array: name.clone(),
                    index,
                    value,
                })
            }
            _ => Err(IrError::UnexpectedNode),
        }
    }
}

impl Default for Lowerer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowers a checked program to three-address code.
pub fn lower(program: &[AstNode]) -> Result<TacProgram, IrError> {
    Lowerer::new().lower_program(program)
}
