//! Edge-case tests for the scanner.

use crate::{tokenize, LexError, Token};

fn lex(body: &str) -> Vec<Token> {
    tokenize(&format!("{{ {body}")).expect("lexing failed")
}

#[test]
fn test_source_without_brace_is_empty() {
    assert_eq!(tokenize("int main()").unwrap(), vec![Token::Eof]);
    assert_eq!(tokenize("").unwrap(), vec![Token::Eof]);
}

#[test]
fn test_whitespace_only_body() {
    assert_eq!(lex("  \t\r\n  \n"), vec![Token::Eof]);
}

#[test]
fn test_keyword_must_match_exactly() {
    // Keywords are whole-lexeme matches; a longer letter run is a name.
    assert_eq!(lex("iffy"), vec![Token::Ident("iffy".into()), Token::Eof]);
    assert_eq!(lex("intx"), vec![Token::Ident("intx".into()), Token::Eof]);
    assert_eq!(lex("If"), vec![Token::Ident("If".into()), Token::Eof]);
}

#[test]
fn test_no_whitespace_between_tokens() {
    assert_eq!(
        lex("a=1+2;"),
        vec![
            Token::Ident("a".into()),
            Token::Assign,
            Token::Int(1),
            Token::Plus,
            Token::Int(2),
            Token::Semi,
            Token::Eof,
        ]
    );
}

#[test]
fn test_underscore_identifiers() {
    assert_eq!(
        lex("_tmp __x"),
        vec![
            Token::Ident("_tmp".into()),
            Token::Ident("__x".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_char_literal_space() {
    assert_eq!(lex("' '"), vec![Token::CharLit(' '), Token::Eof]);
}

#[test]
fn test_string_with_spaces() {
    assert_eq!(
        lex("\"two words\""),
        vec![Token::StrLit("two words".into()), Token::Eof]
    );
}

#[test]
fn test_preamble_brace_in_hash_line_is_ignored() {
    let tokens = tokenize("#define BLOCK { 1 }\nint main() { int a = 1;").unwrap();
    assert_eq!(tokens[0], Token::KwInt);
    assert_eq!(tokens[1], Token::Ident("a".into()));
}

#[test]
fn test_unmatched_operator_run_is_unknown() {
    // "<-" forms one operator run with no table entry.
    let tokens = lex("a <- b;");
    assert!(tokens.contains(&Token::Unknown("<-".into())));
}

#[test]
fn test_double_semicolon_is_unknown() {
    // ";;" is one run of the semicolon class and matches nothing.
    let tokens = lex("a = 1;;");
    assert!(tokens.contains(&Token::Unknown(";;".into())));
}

#[test]
fn test_crlf_line_endings() {
    let tokens = tokenize("{ int a = 1;\r\nint b = 2;\r\n").unwrap();
    assert_eq!(tokens.iter().filter(|t| **t == Token::KwInt).count(), 2);
}

#[test]
fn test_comment_at_end_of_file() {
    let tokens = tokenize("{ int a = 1; // no newline after this").unwrap();
    assert_eq!(tokens.last(), Some(&Token::Eof));
    assert!(tokens.contains(&Token::Semi));
}

#[test]
fn test_unterminated_block_comment_consumes_rest() {
    let tokens = tokenize("{ int a = 1; /* open").unwrap();
    assert!(tokens.contains(&Token::Semi));
    assert_eq!(tokens.last(), Some(&Token::Eof));
}

#[test]
fn test_oversized_integer_is_malformed() {
    let err = tokenize("{ a = 99999999999999999999;").unwrap_err();
    assert!(matches!(err, LexError::MalformedLiteral { .. }));
}

#[test]
fn test_error_reports_line() {
    let err = tokenize("{\n\n@").unwrap_err();
    match err {
        LexError::UnknownCharacter { found, span } => {
            assert_eq!(found, '@');
            assert_eq!(span.line, 3);
        }
        other => panic!("expected unknown character, got {other:?}"),
    }
}
