//! rmc-sem - Semantic Checker
//!
//! Walks the AST, building the symbol table, validating types, and
//! accumulating warnings. The first hard error terminates the phase;
//! warnings never do.
//!
//! SCOPING MODEL:
//! --------------
//! Each `if`, `if-else` arm, `while` and `for` introduces one block id,
//! drawn from a monotonically increasing counter and pushed on a stack for
//! the duration of the construct. Scope depth increases by one for the
//! condition and by one more for the body, and is restored symmetrically on
//! exit. Name resolution consults only symbol-table entries whose block id
//! is on the current stack and whose declaration depth does not exceed the
//! current depth; names must be unique within the active stack.
//!
//! TYPING RULES:
//! -------------
//! - `+ - * /` require int/double on both sides; the result is double if
//!   either side is double. A literal zero divisor is a hard error.
//! - `== != < > <= >=` require int/double/bool on both sides and produce
//!   bool; differing operand types produce a warning, not an error.
//! - `&& ||` require bool on both sides.
//! - `!` requires bool; `++ --` require an int lvalue.
//! - Non-bool conditions in `if`/`while`/`for`, uninitialized array-size
//!   symbols, and `=` nested inside an expression are warnings.

mod error;
mod symbol;

pub use error::SemanticError;
pub use symbol::{Symbol, SymbolTable};

use rmc_par::{AstNode, BaseType, BinOp, UnOp};
use rmc_util::{Handler, Span};

/// Semantic checker state.
pub struct SemanticChecker<'a> {
    table: SymbolTable,
    handler: &'a Handler,
    curr_scope: i32,
    curr_block_id: i32,
    block_stack: Vec<i32>,
}

impl<'a> SemanticChecker<'a> {
    /// Creates a checker; block 0 is always active.
    pub fn new(handler: &'a Handler) -> Self {
        Self {
            table: SymbolTable::new(),
            handler,
            curr_scope: 0,
            curr_block_id: 0,
            block_stack: vec![0],
        }
    }

    /// Checks the whole program and returns the completed symbol table.
    pub fn check_program(mut self, program: &[AstNode]) -> Result<SymbolTable, SemanticError> {
        for statement in program {
            self.check_stmt(statement)?;
        }
        Ok(self.table)
    }

    fn warn(&self, code: &str, message: &str) {
        self.handler.warn(
            format!("03 || Semantic Check WARNING [W || {code}] -> {message}"),
            Span::DUMMY,
        );
    }

    fn enter_block(&mut self) {
        self.curr_block_id += 1;
        self.block_stack.push(self.curr_block_id);
    }

    fn exit_block(&mut self) {
        self.block_stack.pop();
    }

    /// Checks one statement.
    fn check_stmt(&mut self, node: &AstNode) -> Result<(), SemanticError> {
        match node {
            AstNode::Decl {
                name,
                ty,
                init,
                is_array,
                array_size,
            } => {
                let initialized = init.is_some();
                if let Some(init) = init {
                    match (&**init, *is_array) {
                        (AstNode::Block(elements), true) => {
                            for element in elements {
                                if self.type_of(element)? != *ty {
                                    return Err(SemanticError::DeclTypeMismatch {
                                        name: name.clone(),
                                    });
                                }
                            }
                        }
                        (expr, _) => {
                            if self.type_of(expr)? != *ty {
                                return Err(SemanticError::DeclTypeMismatch {
                                    name: name.clone(),
                                });
                            }
                        }
                    }
                }
                self.add_symbol(name, *ty, *is_array, array_size.as_deref(), initialized)
            }

            AstNode::Assign { target, value } => {
                let target_ty = self.type_of(target)?;
                if self.type_of(value)? != target_ty {
                    return Err(SemanticError::AssignTypeMismatch);
                }
                Ok(())
            }

            AstNode::If { cond, then_block } => {
                self.enter_block();
                self.curr_scope += 1;
                if self.type_of(cond)? != BaseType::Bool {
                    self.warn("03.04", "Expected BOOL in condition of IF");
                }
                self.curr_scope += 1;
                self.check_stmt(then_block)?;
                self.curr_scope -= 2;
                self.exit_block();
                Ok(())
            }

            AstNode::IfElse {
                cond,
                then_block,
                else_block,
            } => {
                self.enter_block();
                self.curr_scope += 1;
                if self.type_of(cond)? != BaseType::Bool {
                    self.warn("03.05", "Expected BOOL in condition of IF-ELSE");
                }
                self.curr_scope += 1;
                self.check_stmt(then_block)?;
                self.exit_block();
                self.curr_scope -= 1;

                // The else arm gets its own block id at the same depth.
                self.enter_block();
                self.curr_scope += 1;
                self.check_stmt(else_block)?;
                self.curr_scope -= 2;
                self.exit_block();
                Ok(())
            }

            AstNode::While { cond, body } => {
                self.enter_block();
                self.curr_scope += 1;
                if self.type_of(cond)? != BaseType::Bool {
                    self.warn("03.06", "Expected BOOL in condition of WHILE");
                }
                self.curr_scope += 1;
                self.check_stmt(body)?;
                self.curr_scope -= 2;
                self.exit_block();
                Ok(())
            }

            AstNode::For {
                init,
                cond,
                update,
                body,
            } => {
                self.enter_block();
                self.curr_scope += 1;
                self.check_stmt(init)?;
                if self.type_of(cond)? != BaseType::Bool {
                    self.warn("03.07", "Expected BOOL in condition of FOR");
                }
                self.check_for_update(update)?;
                self.curr_scope += 1;
                self.check_stmt(body)?;
                self.curr_scope -= 2;
                self.exit_block();
                Ok(())
            }

            AstNode::Unary { op, expr, .. } => match op {
                UnOp::Not => {
                    if self.type_of(expr)? != BaseType::Bool {
                        return Err(SemanticError::NotOperandType);
                    }
                    Ok(())
                }
                UnOp::Inc | UnOp::Dec => {
                    if self.type_of(expr)? != BaseType::Int {
                        return Err(SemanticError::IncDecOperandType);
                    }
                    Ok(())
                }
            },

            AstNode::Block(statements) => {
                for statement in statements {
                    self.check_stmt(statement)?;
                }
                Ok(())
            }

            // An expression in statement position still gets type-checked.
            other => self.type_of(other).map(|_| ()),
        }
    }

    /// The `for` update must be an assignment or an int increment/decrement.
    fn check_for_update(&mut self, update: &AstNode) -> Result<(), SemanticError> {
        match update {
            AstNode::Assign { .. } => self.check_stmt(update),
            AstNode::Unary { op: UnOp::Not, .. } => Err(SemanticError::NotInForUpdate),
            AstNode::Unary { .. } => self.check_stmt(update),
            _ => Err(SemanticError::BadForUpdate),
        }
    }

    /// Computes the type of an expression, validating it along the way.
    fn type_of(&mut self, node: &AstNode) -> Result<BaseType, SemanticError> {
        match node {
            AstNode::Int(_) => Ok(BaseType::Int),
            AstNode::Double(_) => Ok(BaseType::Double),
            AstNode::Char(_) => Ok(BaseType::Char),
            AstNode::Bool(_) => Ok(BaseType::Bool),

            AstNode::Var(name) => self
                .table
                .resolve(name, false, self.curr_scope, &self.block_stack)
                .map(|s| s.ty)
                .ok_or_else(|| SemanticError::UndeclaredSymbol { name: name.clone() }),

            AstNode::ArrayAccess { name, index } => {
                if self.type_of(index)? != BaseType::Int {
                    return Err(SemanticError::NonIntArrayIndex);
                }
                self.table
                    .resolve(name, true, self.curr_scope, &self.block_stack)
                    .map(|s| s.ty)
                    .ok_or_else(|| SemanticError::UndeclaredSymbol { name: name.clone() })
            }

            AstNode::Binary { op, left, right } => {
                let lt = self.type_of(left)?;
                let rt = self.type_of(right)?;
                match op {
                    BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                        let numeric =
                            |t: BaseType| matches!(t, BaseType::Int | BaseType::Double);
                        if !numeric(lt) || !numeric(rt) {
                            return Err(SemanticError::ArithOperandType);
                        }
                        if *op == BinOp::Div {
                            match &**right {
                                AstNode::Int(0) => return Err(SemanticError::DivisionByZero),
                                AstNode::Double(v) if *v == 0.0 => {
                                    return Err(SemanticError::DivisionByZero)
                                }
                                _ => {}
                            }
                        }
                        if lt == BaseType::Int && rt == BaseType::Int {
                            Ok(BaseType::Int)
                        } else {
                            Ok(BaseType::Double)
                        }
                    }
                    BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                        let comparable = |t: BaseType| {
                            matches!(t, BaseType::Int | BaseType::Double | BaseType::Bool)
                        };
                        if !comparable(lt) || !comparable(rt) {
                            return Err(SemanticError::CompareOperandType);
                        }
                        if lt != rt {
                            self.warn("03.14", "Different data type found around binop");
                        }
                        Ok(BaseType::Bool)
                    }
                    BinOp::And | BinOp::Or => {
                        if lt != BaseType::Bool || rt != BaseType::Bool {
                            return Err(SemanticError::LogicalOperandType);
                        }
                        Ok(BaseType::Bool)
                    }
                }
            }

            AstNode::Unary { op, expr, .. } => match op {
                UnOp::Not => {
                    if self.type_of(expr)? != BaseType::Bool {
                        return Err(SemanticError::NotOperandType);
                    }
                    Ok(BaseType::Bool)
                }
                UnOp::Inc | UnOp::Dec => {
                    if self.type_of(expr)? != BaseType::Int {
                        return Err(SemanticError::IncDecOperandType);
                    }
                    Ok(BaseType::Int)
                }
            },

            AstNode::Assign { target, .. } => {
                // Assignment used as a value; legal, but worth flagging.
                self.warn("03.20", "Unexpected = found in expression");
                self.check_stmt(node)?;
                self.type_of(target)
            }

            _ => Err(SemanticError::UnknownAstNode),
        }
    }

    /// Validates and appends a declaration to the symbol table.
    fn add_symbol(
        &mut self,
        name: &str,
        ty: BaseType,
        is_array: bool,
        array_size: Option<&str>,
        is_initialized: bool,
    ) -> Result<(), SemanticError> {
        if self
            .table
            .is_declared(name, is_array, self.curr_scope, &self.block_stack)
        {
            return Err(SemanticError::Redeclaration { name: name.into() });
        }

        if is_array {
            let size = array_size.unwrap_or("");
            if !size.chars().all(|c| c.is_ascii_digit()) {
                // Symbolic size: must resolve to a declared int.
                let (size_ty, size_initialized) = match self
                    .table
                    .resolve(size, false, self.curr_scope, &self.block_stack)
                {
                    Some(symbol) => (symbol.ty, symbol.is_initialized),
                    None => {
                        return Err(SemanticError::UndefinedSizeSymbol { name: size.into() })
                    }
                };
                if size_ty != BaseType::Int {
                    return Err(SemanticError::NonIntSizeSymbol { name: size.into() });
                }
                if !size_initialized {
                    self.warn(
                        "03.25",
                        &format!("Index symbol ({size}) is NOT initialized"),
                    );
                }
            }
        }

        let block_id = if self.curr_scope == 0 {
            0
        } else {
            self.curr_block_id
        };

        self.table.push(Symbol {
            name: name.into(),
            ty,
            is_array,
            array_size: array_size.map(str::to_owned),
            is_initialized,
            scope: self.curr_scope,
            block_id,
        });
        Ok(())
    }
}

/// Checks a program, returning its symbol table. Warnings go to `handler`.
pub fn check(program: &[AstNode], handler: &Handler) -> Result<SymbolTable, SemanticError> {
    SemanticChecker::new(handler).check_program(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmc_util::Handler;

    fn check_body(body: &str) -> (Result<SymbolTable, SemanticError>, Vec<String>) {
        let tokens = rmc_lex::tokenize(&format!("{{ {body}")).expect("lexing failed");
        let ast = rmc_par::parse(tokens).expect("parsing failed");
        let handler = Handler::new();
        let result = check(&ast, &handler);
        let warnings = handler.warnings();
        (result, warnings)
    }

    #[test]
    fn test_simple_declarations() {
        let (result, warnings) = check_body("int a = 5; int b = 10; int c = a + b; }");
        let table = result.unwrap();
        assert_eq!(table.len(), 3);
        assert!(warnings.is_empty());
        assert!(table.iter().all(|s| s.scope == 0 && s.block_id == 0));
    }

    #[test]
    fn test_redeclaration_rejected() {
        let (result, _) = check_body("int a; int a; }");
        assert_eq!(
            result.unwrap_err(),
            SemanticError::Redeclaration { name: "a".into() }
        );
    }

    #[test]
    fn test_shadowing_in_sibling_blocks_allowed() {
        // The two declarations live in different, non-overlapping blocks.
        let (result, _) =
            check_body("bool t = true; if (t) { int x = 1; } if (t) { int x = 2; } }");
        let table = result.unwrap();
        assert_eq!(table.iter().filter(|s| s.name == "x").count(), 2);
    }

    #[test]
    fn test_block_local_symbol_invisible_outside() {
        let (result, _) = check_body("bool t = true; if (t) { int x = 1; } x = 2; }");
        assert_eq!(
            result.unwrap_err(),
            SemanticError::UndeclaredSymbol { name: "x".into() }
        );
    }

    #[test]
    fn test_outer_symbol_visible_inside_block() {
        let (result, _) = check_body("int x = 1; bool t = true; if (t) { x = 2; } }");
        assert!(result.is_ok());
    }

    #[test]
    fn test_decl_type_mismatch() {
        let (result, _) = check_body("int a = true; }");
        assert!(matches!(
            result.unwrap_err(),
            SemanticError::DeclTypeMismatch { .. }
        ));
    }

    #[test]
    fn test_assignment_type_mismatch() {
        let (result, _) = check_body("int a = 1; bool b = true; a = b; }");
        assert_eq!(result.unwrap_err(), SemanticError::AssignTypeMismatch);
    }

    #[test]
    fn test_mixed_arith_promotes_to_double() {
        let (result, _) = check_body("double d = 1.5; double e = d * 2.0; }");
        assert!(result.is_ok());
    }

    #[test]
    fn test_literal_division_by_zero() {
        let (result, _) = check_body("int a = 1 / 0; }");
        assert_eq!(result.unwrap_err(), SemanticError::DivisionByZero);
    }

    #[test]
    fn test_logical_requires_bool() {
        let (result, _) = check_body("int a = 1; bool b = a && true; }");
        assert_eq!(result.unwrap_err(), SemanticError::LogicalOperandType);
    }

    #[test]
    fn test_not_requires_bool() {
        let (result, _) = check_body("int a = 1; bool b = !a; }");
        assert_eq!(result.unwrap_err(), SemanticError::NotOperandType);
    }

    #[test]
    fn test_incdec_requires_int() {
        let (result, _) = check_body("bool b = true; b++; }");
        assert_eq!(result.unwrap_err(), SemanticError::IncDecOperandType);
    }

    #[test]
    fn test_array_index_must_be_int() {
        let (result, _) = check_body("int arr[3]; bool b = true; arr[b] = 1; }");
        assert_eq!(result.unwrap_err(), SemanticError::NonIntArrayIndex);
    }

    #[test]
    fn test_non_bool_if_condition_warns() {
        let (result, warnings) = check_body("int x; if (x) { x = 1; } }");
        assert!(result.is_ok());
        assert!(warnings
            .iter()
            .any(|w| w.contains("03.04") && w.contains("Expected BOOL in condition of IF")));
    }

    #[test]
    fn test_mixed_compare_warns() {
        let (result, warnings) = check_body("int a = 1; bool c = a == true; }");
        assert!(result.is_ok());
        assert!(warnings.iter().any(|w| w.contains("03.14")));
    }

    #[test]
    fn test_embedded_assignment_warns() {
        let (result, warnings) = check_body("int a = 1; int b = 2; a = b = 3; }");
        assert!(result.is_ok());
        assert!(warnings.iter().any(|w| w.contains("03.20")));
    }

    #[test]
    fn test_symbolic_array_size() {
        let (result, warnings) = check_body("int n = 4; int arr[n]; }");
        assert!(result.is_ok());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_uninitialized_size_symbol_warns() {
        let (result, warnings) = check_body("int n; int arr[n]; }");
        assert!(result.is_ok());
        assert!(warnings.iter().any(|w| w.contains("03.25")));
    }

    #[test]
    fn test_non_int_size_symbol_rejected() {
        let (result, _) = check_body("bool n = true; int arr[n]; }");
        assert_eq!(
            result.unwrap_err(),
            SemanticError::NonIntSizeSymbol { name: "n".into() }
        );
    }

    #[test]
    fn test_undefined_size_symbol_rejected() {
        let (result, _) = check_body("int arr[n]; }");
        assert_eq!(
            result.unwrap_err(),
            SemanticError::UndefinedSizeSymbol { name: "n".into() }
        );
    }

    #[test]
    fn test_uninitialized_flag_recorded() {
        let (result, _) = check_body("int x; }");
        let table = result.unwrap();
        let x = table.iter().find(|s| s.name == "x").unwrap();
        assert!(!x.is_initialized);
    }

    #[test]
    fn test_if_else_arms_get_distinct_blocks() {
        let (result, _) = check_body(
            "bool t = true; if (t) { int x = 1; } else { int x = 2; } }",
        );
        let table = result.unwrap();
        let blocks: Vec<i32> = table
            .iter()
            .filter(|s| s.name == "x")
            .map(|s| s.block_id)
            .collect();
        assert_eq!(blocks.len(), 2);
        assert_ne!(blocks[0], blocks[1]);
    }
}
