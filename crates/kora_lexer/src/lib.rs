//! kora_lexer: lexer crate.
//!
//! Turns source text into a lazy token stream with one lookahead token.
//! Entry point: `Lexer::new(input)`, then `next()`/`peek()`.
mod keywords;
mod lexer;

pub use keywords::{KEYWORDS, OPERATORS, is_operator_char, is_symbol_char};
pub use lexer::Lexer;
