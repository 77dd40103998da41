use kora_ir::*;
use kora_syntax::Pos;
use std::rc::Rc;

fn roundtrip(node: &Node) {
    let data = encode(node);
    let back = decode(&data).expect("decode");
    assert_eq!(&back, node);
}

fn var(name: &str) -> Node {
    Node::Variable(name.to_string())
}

#[test]
fn leaf_nodes() {
    roundtrip(&Node::Ignore);
    roundtrip(&Node::None);
    roundtrip(&Node::Bool(true));
    roundtrip(&Node::Bool(false));
    roundtrip(&Node::Number(3.5));
    roundtrip(&Node::Number(-0.0));
    roundtrip(&Node::Str("hi \u{1b}[0m".to_string()));
    roundtrip(&var("counter"));
    roundtrip(&Node::Error(Box::new(ParseError {
        message: "Unexpected { Symbol: } }".to_string(),
        pos: Pos::new(4, 12),
    })));
}

#[test]
fn containers_and_operators() {
    roundtrip(&Node::Array(Box::new([
        Node::Number(1.0),
        Node::Str("two".into()),
        Node::Array(Box::new([])),
    ])));
    roundtrip(&Node::Dict(Box::new([
        DictEntry {
            key: "x".into(),
            value: Node::Number(1.0),
        },
        DictEntry {
            key: "y".into(),
            value: var("z"),
        },
    ])));
    roundtrip(&Node::Index(Box::new(IndexExpr {
        base: var("m"),
        args: Box::new([Node::Number(0.0), var("cols")]),
    })));
    roundtrip(&Node::Assign(Box::new(AssignExpr {
        target: var("x"),
        value: Node::Number(9.0),
    })));
    // Binary with all three operand shapes: plain, unary (ignore left),
    // ternary range.
    roundtrip(&Node::Binary(Box::new(BinaryExpr {
        op: "+".into(),
        left: Some(var("a")),
        middle: None,
        right: Some(var("b")),
    })));
    roundtrip(&Node::Binary(Box::new(BinaryExpr {
        op: "-".into(),
        left: Some(Node::Ignore),
        middle: None,
        right: Some(var("n")),
    })));
    roundtrip(&Node::Binary(Box::new(BinaryExpr {
        op: ":".into(),
        left: Some(Node::Number(1.0)),
        middle: Some(Node::Number(2.0)),
        right: Some(Node::Number(9.0)),
    })));
}

#[test]
fn declarations_and_control_flow() {
    let body = Node::Context(Box::new([var("a"), Node::Return(Box::new(var("a")))]));
    roundtrip(&Node::Function(Rc::new(FuncDecl {
        name: "f".into(),
        params: Box::new(["a".into(), "b".into()]),
        body: body.clone(),
    })));
    roundtrip(&Node::Lambda(Rc::new(FuncDecl {
        name: String::new(),
        params: Box::new([]),
        body: Node::Bool(false),
    })));
    roundtrip(&Node::Extension(Box::new(ExtensionDecl {
        target: "string".into(),
        func: Rc::new(FuncDecl {
            name: "shout".into(),
            params: Box::new([]),
            body: body.clone(),
        }),
    })));
    roundtrip(&Node::NativeDef(Box::new(NativeDecl {
        name: "cosine".into(),
        params: Box::new(["double".into()]),
        ret: "double".into(),
    })));
    roundtrip(&Node::If(Box::new(IfExpr {
        cond: var("c"),
        then: Node::Number(1.0),
        els: Some(Node::Number(2.0)),
    })));
    roundtrip(&Node::If(Box::new(IfExpr {
        cond: var("c"),
        then: Node::Number(1.0),
        els: None,
    })));
    roundtrip(&Node::For(Box::new(ForExpr {
        clauses: Box::new([Node::Assign(Box::new(AssignExpr {
            target: var("i"),
            value: Node::Number(0.0),
        }))]),
        body: body.clone(),
    })));
    roundtrip(&Node::While(Box::new(WhileExpr {
        cond: Node::Bool(true),
        body: body.clone(),
    })));
    roundtrip(&Node::DoWhile(Box::new(WhileExpr {
        cond: var("more"),
        body,
    })));
    roundtrip(&Node::Let(Box::new(LetExpr {
        bindings: Box::new([Node::Assign(Box::new(AssignExpr {
            target: var("a"),
            value: Node::Number(1.0),
        }))]),
        body: var("a"),
    })));
}

#[test]
fn calls_imports_try_class() {
    roundtrip(&Node::Call(Box::new(CallExpr {
        callee: var("f"),
        args: Box::new([Node::Number(1.0), var("x")]),
        construct: false,
    })));
    roundtrip(&Node::Call(Box::new(CallExpr {
        callee: var("Point"),
        args: Box::new([]),
        construct: true,
    })));
    roundtrip(&Node::Import(Box::new(ImportExpr {
        native: true,
        items: Box::new([
            ImportItem {
                name: "math".into(),
                target: ImportTarget::Name,
            },
            ImportItem {
                name: "net".into(),
                target: ImportTarget::Alias("n".into()),
            },
            ImportItem {
                name: "prelude".into(),
                target: ImportTarget::Global,
            },
        ]),
    })));
    roundtrip(&Node::Try(Box::new(TryExpr {
        body: var("risky"),
        handler: Some(CatchClause {
            var: Some("e".into()),
            body: var("e"),
        }),
    })));
    roundtrip(&Node::Try(Box::new(TryExpr {
        body: var("risky"),
        handler: None,
    })));
    roundtrip(&Node::Class(Box::new(ClassDecl {
        name: "Point".into(),
        bases: Box::new(["Base".into()]),
        body: Node::Context(Box::new([])),
    })));
}

#[test]
fn truncated_input_is_rejected() {
    let data = encode(&Node::Str("hello".into()));
    assert_eq!(decode(&data[..data.len() - 1]), Err(DecodeError::UnexpectedEof));
    assert!(matches!(decode(&[0xff, 0, 0, 0]), Err(DecodeError::BadTag(_))));
    // Trailing garbage after a complete node is also rejected.
    let mut padded = encode(&Node::None);
    padded.push(0);
    assert_eq!(decode(&padded), Err(DecodeError::UnexpectedEof));
}
