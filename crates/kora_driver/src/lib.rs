//! kora_driver: front-end pipeline.
//!
//! Source text → AST, plus the compile mode that persists parsed programs
//! in the binary form and loads them back.
mod frontend;

pub use frontend::Driver;
