//! Lexer implementation.
//!
//! Scans source text into tokens (keywords/identifiers/literals/operators/
//! delimiters) on demand, holding exactly one lookahead token. Operators are
//! matched greedily against the static operator set; `#` starts a line
//! comment; positions are tracked as 1-based row/column.
use crate::keywords::{KEYWORDS, OPERATORS, is_operator_char, is_symbol_char};
use kora_syntax::{Pos, Token, TokenKind, is_digit, is_name_continue, is_name_start};

/// Kora lexer.
pub struct Lexer<'a> {
    input: &'a str,
    i: usize,
    row: u32,
    col: u32,
    token: Token,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer. No token is produced until the first `next()`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            i: 0,
            row: 1,
            col: 1,
            token: Token::end(Pos::start()),
        }
    }

    /// The last token produced by `next()`, without consuming anything.
    pub fn peek(&self) -> &Token {
        &self.token
    }

    /// True once the lookahead token is the end-of-input marker.
    pub fn at_end(&self) -> bool {
        self.token.kind == TokenKind::End
    }

    /// Consume and return the next token, skipping whitespace and comments.
    pub fn next(&mut self) -> &Token {
        self.skip_white();
        let pos = Pos::new(self.row, self.col);

        let Some(c) = self.peek_char() else {
            self.token = Token::end(pos);
            return &self.token;
        };

        self.token = if c == '\'' || c == '"' {
            self.read_string(pos)
        } else if is_digit(c) {
            self.read_number(pos)
        } else if is_name_start(c) {
            self.read_name(pos)
        } else if is_operator_char(c) {
            self.read_operator(pos)
        } else if is_symbol_char(c) {
            self.advance();
            Token {
                kind: TokenKind::Symbol,
                text: c.to_string(),
                number: 0.0,
                pos,
            }
        } else {
            self.advance();
            self.make_error(format!("Invalid character '{c}'"), pos)
        };
        &self.token
    }

    fn skip_white(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\n' | '\r' | '\u{8}' | '\u{7}' | '\u{b}') => {
                    self.advance();
                }
                Some('#') => {
                    while let Some(c) = self.peek_char() {
                        self.advance();
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn read_string(&mut self, pos: Pos) -> Token {
        let quote = self.peek_char().unwrap();
        self.advance();
        let mut text = String::new();
        loop {
            let Some(c) = self.peek_char() else {
                return self.make_error("Could not find the end of the string".to_string(), pos);
            };
            self.advance();
            if c == quote {
                break;
            }
            if c == '\\' {
                let Some(esc) = self.peek_char() else {
                    return self
                        .make_error("Could not find the end of the string".to_string(), pos);
                };
                self.advance();
                match esc {
                    'a' => text.push('\u{7}'),
                    'b' => text.push('\u{8}'),
                    'n' => text.push('\n'),
                    'v' => text.push('\u{b}'),
                    'r' => text.push('\r'),
                    't' => text.push('\t'),
                    c if c == quote => text.push(quote),
                    other => {
                        // Unknown escapes keep the backslash verbatim.
                        text.push('\\');
                        text.push(other);
                    }
                }
            } else {
                text.push(c);
            }
        }
        Token {
            kind: TokenKind::Str,
            text,
            number: 0.0,
            pos,
        }
    }

    fn read_number(&mut self, pos: Pos) -> Token {
        let start = self.i;
        while matches!(self.peek_char(), Some(c) if is_digit(c)) {
            self.advance();
        }
        // A trailing '.' with no digit after it is not part of the number.
        if self.peek_char() == Some('.') && matches!(self.peek_char_at(1), Some(c) if is_digit(c)) {
            self.advance();
            while matches!(self.peek_char(), Some(c) if is_digit(c)) {
                self.advance();
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let mut ahead = 1;
            if matches!(self.peek_char_at(1), Some('+' | '-')) {
                ahead = 2;
            }
            if matches!(self.peek_char_at(ahead), Some(c) if is_digit(c)) {
                for _ in 0..=ahead {
                    self.advance();
                }
                while matches!(self.peek_char(), Some(c) if is_digit(c)) {
                    self.advance();
                }
            }
        }

        let text = &self.input[start..self.i];
        let number = text.parse::<f64>().unwrap_or(0.0);
        Token {
            kind: TokenKind::Number,
            text: text.to_string(),
            number,
            pos,
        }
    }

    fn read_name(&mut self, pos: Pos) -> Token {
        let start = self.i;
        self.advance();
        while matches!(self.peek_char(), Some(c) if is_name_continue(c)) {
            self.advance();
        }
        let text = &self.input[start..self.i];
        let kind = if KEYWORDS.contains(text) {
            TokenKind::Keyword
        } else {
            TokenKind::Variable
        };
        Token {
            kind,
            text: text.to_string(),
            number: 0.0,
            pos,
        }
    }

    fn read_operator(&mut self, pos: Pos) -> Token {
        let start = self.i;
        self.advance();
        while let Some(c) = self.peek_char() {
            if !is_operator_char(c) {
                break;
            }
            let candidate = &self.input[start..self.i + c.len_utf8()];
            if !OPERATORS.contains(candidate) {
                break;
            }
            self.advance();
        }
        Token {
            kind: TokenKind::Operator,
            text: self.input[start..self.i].to_string(),
            number: 0.0,
            pos,
        }
    }

    fn make_error(&self, message: String, pos: Pos) -> Token {
        Token {
            kind: TokenKind::Error,
            text: format!("{message} {pos}"),
            number: 0.0,
            pos,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.i..].chars().next()
    }

    fn peek_char_at(&self, n: usize) -> Option<char> {
        self.input[self.i..].chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == '\n' {
                self.row += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }
}
