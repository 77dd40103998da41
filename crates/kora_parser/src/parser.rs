//! Parser core: token cursor, operator tables, delimited-list helpers.
use kora_ir::{Node, ParseError};
use kora_lexer::Lexer;
use kora_syntax::{Token, TokenKind};

/// Operator precedence, low to high. Zero means "not a binary operator".
pub(crate) fn precedence(op: &str) -> u8 {
    match op {
        "=" => 1,
        "." => 2,
        "in" | "++" | "--" => 3,
        "||" => 4,
        "&&" => 5,
        "<" | ">" | "<=" | ">=" | "==" | "!=" | "<>" | "|" | "&" | "<<" | ">>" | "~" | "^" => 8,
        "!" => 9,
        "+" | "-" => 10,
        "*" | "/" | "%" => 20,
        "**" => 25,
        ":" => 30,
        _ => 0,
    }
}

/// Prefix-only operators: never climb past themselves on the right.
pub(crate) fn no_right(op: &str) -> bool {
    matches!(op, "++" | "--" | "!")
}

/// Operators valid with no left operand; an implicit `Ignore` left operand
/// is synthesized when an expression begins with one of these.
pub(crate) fn no_left(op: &str) -> bool {
    matches!(op, "+" | "-" | "++" | "--" | "~")
}

/// Kora parser. Streams tokens straight off the lexer's single lookahead.
pub struct Parser<'a> {
    pub(crate) tokens: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            tokens: Lexer::new(source),
        }
    }

    /// Parse the whole input into a statement-block node, or the first
    /// error encountered.
    pub fn parse(mut self) -> Node {
        let mut stmts: Vec<Node> = Vec::with_capacity(8);

        self.tokens.next();
        while !self.tokens.at_end() {
            let node = self.parse_expression();
            if node.is_error() {
                return node;
            }
            if !self.tokens.at_end() {
                self.skip_symbol(";");
            }
            stmts.push(node);
        }

        Node::Context(stmts.into_boxed_slice())
    }

    /// Comma/semicolon-separated expression list bounded by `start`/`stop`.
    /// With `op` set the delimiters are operator tokens (`[` `]`) instead of
    /// symbols. Separators between elements are optional, matching the
    /// statement separator rule.
    pub(crate) fn delimited_nodes(
        &mut self,
        nodes: &mut Vec<Node>,
        start: &str,
        stop: &str,
        separator: &str,
        op: bool,
    ) -> bool {
        let opened = if op {
            self.skip_operator(start)
        } else {
            self.skip_symbol(start)
        };
        if !opened {
            return false;
        }
        let mut first = true;
        while !self.tokens.at_end() {
            if self.at_stop(stop, op) {
                break;
            }
            if first {
                first = false;
            } else {
                self.skip_symbol(separator);
            }
            if self.at_stop(stop, op) {
                break;
            }
            let node = self.parse_expression();
            if node.is_error() {
                return false;
            }
            nodes.push(node);
        }
        if op {
            self.skip_operator(stop)
        } else {
            self.skip_symbol(stop)
        }
    }

    /// Name list with the same delimiter rules as `delimited_nodes`. With
    /// `types` set, keywords are accepted too (marshaling type names include
    /// `none`).
    pub(crate) fn delimited_names(
        &mut self,
        names: &mut Vec<String>,
        start: &str,
        stop: &str,
        separator: &str,
        types: bool,
    ) -> bool {
        if !self.skip_symbol(start) {
            return false;
        }
        let mut first = true;
        while !self.tokens.at_end() {
            if self.is_symbol(stop) {
                break;
            }
            if first {
                first = false;
            } else {
                self.skip_symbol(separator);
            }
            if self.is_symbol(stop) {
                break;
            }
            let name = if types {
                self.parse_type_name()
            } else {
                self.parse_var_name()
            };
            let Some(name) = name else {
                return false;
            };
            names.push(name);
        }
        self.skip_symbol(stop)
    }

    fn at_stop(&self, stop: &str, op: bool) -> bool {
        if op {
            self.is_operator(stop)
        } else {
            self.is_symbol(stop)
        }
    }

    /// Consume the current token; `None` unless it is an identifier.
    pub(crate) fn parse_var_name(&mut self) -> Option<String> {
        let tok = self.tokens.peek().clone();
        self.tokens.next();
        if tok.kind != TokenKind::Variable {
            return None;
        }
        Some(tok.text)
    }

    /// Like `parse_var_name` but also accepts keywords (`none` is a valid
    /// marshaling type name).
    pub(crate) fn parse_type_name(&mut self) -> Option<String> {
        let tok = self.tokens.peek().clone();
        self.tokens.next();
        if tok.kind != TokenKind::Variable && tok.kind != TokenKind::Keyword {
            return None;
        }
        Some(tok.text)
    }

    pub(crate) fn make_error(&self, message: &str, token: &Token) -> Node {
        Node::Error(Box::new(ParseError {
            message: format!("{message} {{ {token} }} {}", token.pos),
            pos: token.pos,
        }))
    }

    pub(crate) fn error_here(&self, message: &str) -> Node {
        self.make_error(message, &self.tokens.peek().clone())
    }

    pub(crate) fn is_symbol(&self, symbol: &str) -> bool {
        let tok = self.tokens.peek();
        tok.kind == TokenKind::Symbol && (symbol.is_empty() || tok.text == symbol)
    }

    pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
        let tok = self.tokens.peek();
        tok.kind == TokenKind::Keyword && (keyword.is_empty() || tok.text == keyword)
    }

    pub(crate) fn is_operator(&self, op: &str) -> bool {
        let tok = self.tokens.peek();
        tok.kind == TokenKind::Operator && (op.is_empty() || tok.text == op)
    }

    pub(crate) fn skip_symbol(&mut self, symbol: &str) -> bool {
        if self.is_symbol(symbol) {
            self.tokens.next();
            return true;
        }
        false
    }

    pub(crate) fn skip_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.tokens.next();
            return true;
        }
        false
    }

    pub(crate) fn skip_operator(&mut self, op: &str) -> bool {
        if self.is_operator(op) {
            self.tokens.next();
            return true;
        }
        false
    }
}
