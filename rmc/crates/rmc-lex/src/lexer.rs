//! Core scanner implementation.
//!
//! `tokenize` is the phase entry point: it skips the preamble, then scans
//! tokens until end of file. The scanner forms lexemes from runs of
//! identical character class and classifies them afterwards: pure digits
//! become integer literals, a digit run with one embedded dot becomes a
//! double, quoted forms become char/string literals, exact table matches
//! become keywords/operators/punctuation, and anything left is an
//! identifier.

use crate::classify::{class_of, CharClass};
use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::Token;
use rmc_util::Span;

/// Lexer state: a cursor plus the start position of the token being
/// scanned, kept for diagnostics.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    token_start: usize,
    token_start_line: u32,
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// The span of the token currently being scanned.
    fn token_span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }

    /// Discards everything up to and including the first `{`.
    ///
    /// The preamble is treated as a free-form comment region: `#` lines,
    /// `//` and `/* */` comments are honored so that a `{` inside them does
    /// not start the scan, and any other byte is ignored.
    pub fn skip_preamble(&mut self) {
        while !self.cursor.is_at_end() {
            match self.cursor.current_char() {
                '{' => {
                    self.cursor.advance();
                    return;
                }
                '#' => self.skip_to_line_end(),
                '/' if self.cursor.peek_char(1) == '/' => self.skip_to_line_end(),
                '/' if self.cursor.peek_char(1) == '*' => self.skip_block_comment(),
                _ => self.cursor.advance(),
            }
        }
    }

    /// Returns the next token, or `Token::Eof` at end of input.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();
        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(Token::Eof);
        }

        let c = self.cursor.current_char();
        match c {
            '(' => Ok(self.single(Token::LParen)),
            ')' => Ok(self.single(Token::RParen)),
            '{' => Ok(self.single(Token::LBrace)),
            '}' => Ok(self.single(Token::RBrace)),
            '[' => Ok(self.single(Token::LBracket)),
            ']' => Ok(self.single(Token::RBracket)),
            '\'' => self.lex_char_literal(),
            '"' => self.lex_string_literal(),
            _ => match class_of(c) {
                CharClass::Digit => self.lex_number(),
                CharClass::Letter => Ok(self.lex_word()),
                CharClass::Operator => Ok(self.lex_operator()),
                CharClass::Semi | CharClass::Comma | CharClass::Full => {
                    Ok(self.lex_punct_run(class_of(c)))
                }
                CharClass::Whitespace => unreachable!("whitespace skipped above"),
                _ => Err(LexError::UnknownCharacter {
                    found: c,
                    span: self.token_span(),
                }),
            },
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.cursor.advance();
        token
    }

    /// Scans a digit run, absorbing embedded dots, then classifies it as an
    /// integer or double literal.
    fn lex_number(&mut self) -> Result<Token, LexError> {
        let mut lexeme = String::new();
        let mut dots = 0usize;

        loop {
            let c = self.cursor.current_char();
            if class_of(c) == CharClass::Digit {
                lexeme.push(c);
                self.cursor.advance();
            } else if c == '.' {
                dots += 1;
                lexeme.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        match dots {
            0 => lexeme
                .parse::<i64>()
                .map(Token::Int)
                .map_err(|_| self.malformed(lexeme)),
            1 => lexeme
                .parse::<f64>()
                .map(Token::Double)
                .map_err(|_| self.malformed(lexeme)),
            _ => Err(self.malformed(lexeme)),
        }
    }

    /// Scans a letter/underscore run: keyword, boolean literal, or
    /// identifier.
    fn lex_word(&mut self) -> Token {
        let mut lexeme = String::new();
        while class_of(self.cursor.current_char()) == CharClass::Letter {
            lexeme.push(self.cursor.current_char());
            self.cursor.advance();
        }
        Token::from_lexeme(&lexeme).unwrap_or(Token::Ident(lexeme))
    }

    /// Scans an operator run.
    ///
    /// The run is cut after an `=` that is not followed by another `=`, so
    /// `==` `!=` `<=` `>=` stay whole while a lone `=` does not swallow the
    /// operator that follows it (`a=-b` scans as `=` then `-`).
    fn lex_operator(&mut self) -> Token {
        let mut lexeme = String::new();
        let mut prev = '\0';
        loop {
            let c = self.cursor.current_char();
            if class_of(c) != CharClass::Operator {
                break;
            }
            if prev == '=' && c != '=' {
                break;
            }
            lexeme.push(c);
            self.cursor.advance();
            prev = c;
        }
        Token::from_lexeme(&lexeme).unwrap_or(Token::Unknown(lexeme))
    }

    /// Scans a run of `;` / `,` / `.` characters.
    fn lex_punct_run(&mut self, class: CharClass) -> Token {
        let mut lexeme = String::new();
        while class_of(self.cursor.current_char()) == class {
            lexeme.push(self.cursor.current_char());
            self.cursor.advance();
        }
        Token::from_lexeme(&lexeme).unwrap_or(Token::Unknown(lexeme))
    }

    /// Scans `'x'`.
    fn lex_char_literal(&mut self) -> Result<Token, LexError> {
        self.cursor.advance(); // opening quote
        let mut content = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedChar {
                    span: self.token_span(),
                });
            }
            let c = self.cursor.current_char();
            self.cursor.advance();
            if c == '\'' {
                break;
            }
            content.push(c);
        }

        let mut chars = content.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Token::CharLit(c)),
            _ => Err(self.malformed(format!("'{content}'"))),
        }
    }

    /// Scans `"..."`.
    fn lex_string_literal(&mut self) -> Result<Token, LexError> {
        self.cursor.advance(); // opening quote
        let mut content = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString {
                    span: self.token_span(),
                });
            }
            let c = self.cursor.current_char();
            self.cursor.advance();
            if c == '"' {
                break;
            }
            content.push(c);
        }
        Ok(Token::StrLit(content))
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let c = self.cursor.current_char();
            if class_of(c) == CharClass::Whitespace && !self.cursor.is_at_end() {
                self.cursor.advance();
            } else if c == '/' && self.cursor.peek_char(1) == '/' {
                self.skip_to_line_end();
            } else if c == '/' && self.cursor.peek_char(1) == '*' {
                self.skip_block_comment();
            } else {
                break;
            }
        }
    }

    fn skip_to_line_end(&mut self) {
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        self.cursor.advance(); // '/'
        self.cursor.advance(); // '*'
        while !self.cursor.is_at_end() {
            if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                return;
            }
            self.cursor.advance();
        }
    }

    fn malformed(&self, lexeme: String) -> LexError {
        LexError::MalformedLiteral {
            lexeme,
            span: self.token_span(),
        }
    }
}

/// Lexes a whole source file: preamble skip, then tokens through `Eof`.
///
/// The returned sequence always ends with exactly one `Token::Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    lexer.skip_preamble();

    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(body: &str) -> Vec<Token> {
        tokenize(&format!("{{ {body}")).expect("lexing failed")
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(lex(""), vec![Token::Eof]);
    }

    #[test]
    fn test_simple_declaration() {
        let tokens = lex("int a = 5;");
        assert_eq!(
            tokens,
            vec![
                Token::KwInt,
                Token::Ident("a".into()),
                Token::Assign,
                Token::Int(5),
                Token::Semi,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_compound_operators_stay_whole() {
        let tokens = lex("a == b != c <= d >= e && f || g");
        let ops: Vec<_> = tokens
            .iter()
            .filter(|t| !matches!(t, Token::Ident(_) | Token::Eof))
            .cloned()
            .collect();
        assert_eq!(
            ops,
            vec![
                Token::EqEq,
                Token::NotEq,
                Token::LtEq,
                Token::GtEq,
                Token::AndAnd,
                Token::OrOr,
            ]
        );
    }

    #[test]
    fn test_equal_cut_before_following_operator() {
        // '=' must not swallow the '-' that follows it.
        let tokens = lex("a=-b;");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("a".into()),
                Token::Assign,
                Token::Minus,
                Token::Ident("b".into()),
                Token::Semi,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_double_literal() {
        let tokens = lex("double d = 3.14;");
        assert!(tokens.contains(&Token::Double(3.14)));
    }

    #[test]
    fn test_char_and_string_literals() {
        let tokens = lex("char c = 'A'; b = \"hey\";");
        assert!(tokens.contains(&Token::CharLit('A')));
        assert!(tokens.contains(&Token::StrLit("hey".into())));
    }

    #[test]
    fn test_bool_literals() {
        let tokens = lex("bool f = true; g = false;");
        assert!(tokens.contains(&Token::Bool(true)));
        assert!(tokens.contains(&Token::Bool(false)));
    }

    #[test]
    fn test_increment_tokens() {
        let tokens = lex("++a; b--;");
        assert!(tokens.contains(&Token::PlusPlus));
        assert!(tokens.contains(&Token::MinusMinus));
    }

    #[test]
    fn test_preamble_is_discarded() {
        let source = "#include <stdio.h>\n// comment with { brace\n/* and { here */\nint main() {\nint a = 1;";
        let direct = tokenize("{ int a = 1;").unwrap();
        assert_eq!(tokenize(source).unwrap(), direct);
    }

    #[test]
    fn test_interior_comments_are_skipped() {
        let tokens = lex("int a = 1; // trailing\n/* block */ int b = 2;");
        assert_eq!(
            tokens.iter().filter(|t| **t == Token::KwInt).count(),
            2,
            "both declarations survive comment skipping"
        );
    }

    #[test]
    fn test_unterminated_char_literal() {
        let err = tokenize("{ char c = 'A").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedChar { .. }));
    }

    #[test]
    fn test_unterminated_string_literal() {
        let err = tokenize("{ a = \"oops").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn test_unknown_character() {
        let err = tokenize("{ int a = @;").unwrap_err();
        assert!(matches!(
            err,
            LexError::UnknownCharacter { found: '@', .. }
        ));
    }

    #[test]
    fn test_two_dot_literal_is_malformed() {
        let err = tokenize("{ a = 1.2.3;").unwrap_err();
        assert!(matches!(err, LexError::MalformedLiteral { .. }));
    }

    #[test]
    fn test_brackets_always_single_tokens() {
        let tokens = lex("arr[[0]]");
        let brackets = tokens
            .iter()
            .filter(|t| matches!(t, Token::LBracket | Token::RBracket))
            .count();
        assert_eq!(brackets, 4);
    }
}
