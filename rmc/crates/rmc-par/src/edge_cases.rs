//! Edge-case tests for the parser.

use crate::{parse, AstNode, BinOp, ParseError, UnOp};

fn parse_body(body: &str) -> Result<Vec<AstNode>, ParseError> {
    let tokens = rmc_lex::tokenize(&format!("{{ {body}")).expect("lexing failed");
    parse(tokens)
}

#[test]
fn test_deeply_nested_parens() {
    let ast = parse_body("int x = ((((1)))); }").unwrap();
    match &ast[0] {
        AstNode::Decl { init: Some(e), .. } => assert_eq!(**e, AstNode::Int(1)),
        other => panic!("expected declaration, got {other:?}"),
    }
}

#[test]
fn test_parenthesized_group_overrides_precedence() {
    // (a + b) * c puts the add under the mul.
    let ast = parse_body("int x = (a + b) * c; }").unwrap();
    match &ast[0] {
        AstNode::Decl { init: Some(e), .. } => match &**e {
            AstNode::Binary { op, left, .. } => {
                assert_eq!(*op, BinOp::Mul);
                assert!(matches!(&**left, AstNode::Binary { op: BinOp::Add, .. }));
            }
            other => panic!("expected mul at root, got {other:?}"),
        },
        other => panic!("expected declaration, got {other:?}"),
    }
}

#[test]
fn test_logical_operators_bind_loosest() {
    // a < b && c < d parses as (a < b) && (c < d).
    let ast = parse_body("bool x = a < b && c < d; }").unwrap();
    match &ast[0] {
        AstNode::Decl { init: Some(e), .. } => match &**e {
            AstNode::Binary { op, left, right } => {
                assert_eq!(*op, BinOp::And);
                assert!(matches!(&**left, AstNode::Binary { op: BinOp::Lt, .. }));
                assert!(matches!(&**right, AstNode::Binary { op: BinOp::Lt, .. }));
            }
            other => panic!("expected && at root, got {other:?}"),
        },
        other => panic!("expected declaration, got {other:?}"),
    }
}

#[test]
fn test_not_of_parenthesized_expression() {
    let ast = parse_body("bool x = !(a && b); }").unwrap();
    match &ast[0] {
        AstNode::Decl { init: Some(e), .. } => match &**e {
            AstNode::Unary { op, expr, .. } => {
                assert_eq!(*op, UnOp::Not);
                assert!(matches!(&**expr, AstNode::Binary { op: BinOp::And, .. }));
            }
            other => panic!("expected ! at root, got {other:?}"),
        },
        other => panic!("expected declaration, got {other:?}"),
    }
}

#[test]
fn test_nested_array_index() {
    // The index of one access may itself be an access.
    let ast = parse_body("x = arr[arr[0]]; }").unwrap();
    match &ast[0] {
        AstNode::Assign { value, .. } => match &**value {
            AstNode::ArrayAccess { index, .. } => {
                assert!(matches!(&**index, AstNode::ArrayAccess { .. }));
            }
            other => panic!("expected array access, got {other:?}"),
        },
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_index_must_start_with_int_or_name() {
    let err = parse_body("x = arr[(i)]; }").unwrap_err();
    assert_eq!(err, ParseError::BadIndexStart);
}

#[test]
fn test_control_statements_nest() {
    let ast = parse_body(
        "while (a < b) { if (a == 0) { a = 1; } else { for (i = 0; i < 2; i++) { a = a + i; } } } }",
    )
    .unwrap();
    assert_eq!(ast.len(), 1);
    assert!(matches!(ast[0], AstNode::While { .. }));
}

#[test]
fn test_declaration_name_must_be_identifier() {
    let err = parse_body("int 5; }").unwrap_err();
    assert_eq!(err, ParseError::ExpectedDeclName);
}

#[test]
fn test_truncated_expression_hits_eof() {
    let err = parse_body("int a = 1 +").unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedEof | ParseError::UnexpectedExpressionToken { .. }
    ));
}

#[test]
fn test_postfix_requires_lvalue() {
    let err = parse_body("x = (a + b)++; }").unwrap_err();
    assert_eq!(err, ParseError::ExpectedLvalueAfterUnary);
}

#[test]
fn test_prefix_increment_requires_lvalue() {
    let err = parse_body("x = ++3; }").unwrap_err();
    assert_eq!(err, ParseError::ExpectedLvalueAfterUnary);
}

#[test]
fn test_assignment_target_must_be_lvalue() {
    let err = parse_body("x = (a + 1 = b); }").unwrap_err();
    assert_eq!(err, ParseError::ExpectedLvalue);
}

#[test]
fn test_else_without_brace_or_if() {
    let err = parse_body("if (a) { } else b = 1; }").unwrap_err();
    assert_eq!(err, ParseError::ExpectedIfOrBraceAfterElse);
}

#[test]
fn test_initializer_count_must_match_size() {
    // Too few elements: the parser meets `}` while expecting another
    // element.
    let err = parse_body("int arr[3] = {1, 2}; }").unwrap_err();
    assert_eq!(err, ParseError::UnexpectedRBrace);

    // Too many: the parser meets `,` after the declared last element.
    let err = parse_body("int arr[2] = {1, 2, 3}; }").unwrap_err();
    assert_eq!(err, ParseError::UnexpectedComma);
}

#[test]
fn test_initializer_elements_may_be_expressions() {
    let ast = parse_body("int arr[2] = {1 + 2, n * 3}; }").unwrap();
    match &ast[0] {
        AstNode::Decl { init: Some(init), .. } => match &**init {
            AstNode::Block(elems) => {
                assert!(matches!(elems[0], AstNode::Binary { op: BinOp::Add, .. }));
                assert!(matches!(elems[1], AstNode::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("expected initializer block, got {other:?}"),
        },
        other => panic!("expected declaration, got {other:?}"),
    }
}

#[test]
fn test_while_body_may_be_empty() {
    let ast = parse_body("while (a) { } }").unwrap();
    match &ast[0] {
        AstNode::While { body, .. } => assert_eq!(**body, AstNode::Block(vec![])),
        other => panic!("expected while, got {other:?}"),
    }
}

#[test]
fn test_unknown_lexeme_rejected_at_statement_level() {
    // `<-` scans as one unknown lexeme, so the statement never finds its
    // `=` or `[`.
    let err = parse_body("a <- b; }").unwrap_err();
    assert_eq!(err, ParseError::ExpectedEqOrBracket);
}
