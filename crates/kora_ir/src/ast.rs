//!
//!
use kora_syntax::Pos;
use std::rc::Rc;

/// AST node. One variant per construct; a node owns its children
/// exclusively and is never mutated after parsing. Function-like variants
/// hold their declaration behind `Rc` so a closure can capture it by
/// reference once evaluated.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Ignore,
    Error(Box<ParseError>),
    None,
    Variable(String),
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Box<[Node]>),
    Dict(Box<[DictEntry]>),
    Index(Box<IndexExpr>),
    Assign(Box<AssignExpr>),
    Binary(Box<BinaryExpr>),
    Return(Box<Node>),
    Let(Box<LetExpr>),
    Lambda(Rc<FuncDecl>),
    Function(Rc<FuncDecl>),
    NativeDef(Box<NativeDecl>),
    Extension(Box<ExtensionDecl>),
    If(Box<IfExpr>),
    For(Box<ForExpr>),
    While(Box<WhileExpr>),
    DoWhile(Box<WhileExpr>),
    Context(Box<[Node]>),
    Call(Box<CallExpr>),
    Import(Box<ImportExpr>),
    Try(Box<TryExpr>),
    Class(Box<ClassDecl>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DictEntry {
    pub key: String,
    pub value: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexExpr {
    pub base: Node,
    pub args: Box<[Node]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignExpr {
    pub target: Node,
    pub value: Node,
}

/// Binary operation. Carries the operator text and up to three operand
/// slots; `middle` is only used by the ternary form of the range operator
/// (`a:step:b`). Prefix-only operators leave `left` as `Node::Ignore`.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub op: String,
    pub left: Option<Node>,
    pub middle: Option<Node>,
    pub right: Option<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LetExpr {
    pub bindings: Box<[Node]>,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub params: Box<[String]>,
    pub body: Node,
}

/// Native function descriptor: parameter slots hold marshaling type names,
/// `ret` the return marshaling type.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeDecl {
    pub name: String,
    pub params: Box<[String]>,
    pub ret: String,
}

/// `func Type.name(...)`: registers `func` as a method on the named type.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtensionDecl {
    pub target: String,
    pub func: Rc<FuncDecl>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfExpr {
    pub cond: Node,
    pub then: Node,
    pub els: Option<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForExpr {
    pub clauses: Box<[Node]>,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileExpr {
    pub cond: Node,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: Node,
    pub args: Box<[Node]>,
    /// True for `new Name(...)` construction calls.
    pub construct: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportExpr {
    pub native: bool,
    pub items: Box<[ImportItem]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportItem {
    pub name: String,
    pub target: ImportTarget,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImportTarget {
    /// Bind under the module's own name.
    Name,
    /// `import x as y`
    Alias(String),
    /// `import x global`: merge the module's bindings into the importer.
    Global,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TryExpr {
    pub body: Node,
    pub handler: Option<CatchClause>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub var: Option<String>,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub bases: Box<[String]>,
    pub body: Node,
}

impl Node {
    pub fn is_error(&self) -> bool {
        matches!(self, Node::Error(_))
    }

    /// A parsed empty block; also what `for` with a falsy initial condition
    /// evaluates instead of its body.
    pub fn false_literal() -> Node {
        Node::Bool(false)
    }
}
