//! kora_ir: AST definitions and the persisted binary form.
mod ast;
mod encode;
mod frontend;

pub use ast::{
    AssignExpr, BinaryExpr, CallExpr, CatchClause, ClassDecl, DictEntry, ExtensionDecl, ForExpr,
    FuncDecl, IfExpr, ImportExpr, ImportItem, ImportTarget, IndexExpr, LetExpr, NativeDecl, Node,
    ParseError, TryExpr, WhileExpr,
};
pub use encode::{DecodeError, decode, encode};
pub use frontend::Frontend;
