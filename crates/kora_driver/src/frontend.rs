//!
//!
use kora_ir::{DecodeError, Node};
use kora_lexer::Lexer;
use kora_syntax::{Token, TokenKind};

/// Front-end pipeline: parsing and the persisted program form.
#[derive(Default)]
pub struct Driver;

impl Driver {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize source text eagerly (diagnostic tooling; the parser itself
    /// streams tokens lazily).
    pub fn lex_text(&self, input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next().clone();
            if token.kind == TokenKind::End {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    /// Parse source text; the first failure comes back as an `Error` node.
    pub fn parse_text(&self, input: &str) -> Node {
        kora_parser::parse(input)
    }

    pub fn parse_file(&self, path: &str) -> Result<Node, String> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read file {path}: {e}"))?;
        Ok(self.parse_text(&input))
    }

    /// Compile mode: parse and persist in the binary encoding.
    pub fn compile_text(&self, input: &str) -> Result<Vec<u8>, String> {
        let node = self.parse_text(input);
        if let Node::Error(e) = &node {
            return Err(e.message.clone());
        }
        Ok(kora_ir::encode(&node))
    }

    /// Load a persisted program.
    pub fn load_program(&self, data: &[u8]) -> Result<Node, DecodeError> {
        kora_ir::decode(data)
    }
}

impl kora_ir::Frontend for Driver {
    fn parse_text(&self, input: &str) -> Node {
        Driver::parse_text(self, input)
    }
}
