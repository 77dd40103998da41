use kora_ir::{ImportTarget, Node};
use kora_parser::parse;

fn parse_one(src: &str) -> Node {
    match parse(src) {
        Node::Context(stmts) => {
            let mut stmts = stmts.into_vec();
            assert_eq!(stmts.len(), 1, "expected one statement in {src:?}");
            stmts.pop().unwrap()
        }
        other => panic!("parse failed: {other:?}"),
    }
}

#[test]
fn empty_block_is_the_false_literal() {
    assert_eq!(parse_one("{}"), Node::Bool(false));
}

#[test]
fn single_statement_block_unwraps() {
    assert_eq!(parse_one("{ 42 }"), Node::Number(42.0));
}

#[test]
fn multi_statement_block_keeps_its_shape() {
    let Node::Context(stmts) = parse_one("{ 1; 2; 3 }") else {
        panic!("expected context");
    };
    assert_eq!(stmts.len(), 3);
}

#[test]
fn array_and_dict_literals() {
    assert!(matches!(parse_one("[1, 2, 3]"), Node::Array(items) if items.len() == 3));
    let Node::Dict(entries) = parse_one("[x = 1, y = 2]") else {
        panic!("expected dict");
    };
    assert_eq!(entries[0].key, "x");
    assert_eq!(entries[1].key, "y");
    // An empty literal is an empty dict.
    assert!(matches!(parse_one("[]"), Node::Dict(entries) if entries.is_empty()));
    // A single non-assignment element keeps it an array.
    assert!(matches!(parse_one("[x]"), Node::Array(_)));
}

#[test]
fn function_and_lambda_forms() {
    let Node::Function(decl) = parse_one("func add(a, b) { return a + b }") else {
        panic!("expected function");
    };
    assert_eq!(decl.name, "add");
    assert_eq!(decl.params.as_ref(), ["a".to_string(), "b".to_string()]);

    let Node::Lambda(decl) = parse_one("@(x) x") else {
        panic!("expected lambda");
    };
    assert_eq!(decl.params.len(), 1);

    // Nameless `func` is a lambda too.
    assert!(matches!(parse_one("func (x) x"), Node::Lambda(_)));
}

#[test]
fn dotted_function_name_is_an_extension() {
    let Node::Extension(ext) = parse_one("func string.shout() { this }") else {
        panic!("expected extension");
    };
    assert_eq!(ext.target, "string");
    assert_eq!(ext.func.name, "shout");
}

#[test]
fn for_loop_clauses() {
    let Node::For(f) = parse_one("for (i = 0; i < 3; i++) { i }") else {
        panic!("expected for");
    };
    assert_eq!(f.clauses.len(), 3);

    let Node::For(f) = parse_one("for (c in \"ab\") { c }") else {
        panic!("expected for");
    };
    assert_eq!(f.clauses.len(), 1);
    assert!(matches!(&f.clauses[0], Node::Binary(b) if b.op == "in"));
}

#[test]
fn while_and_do_while() {
    assert!(matches!(parse_one("while x { x }"), Node::While(_)));
    assert!(matches!(parse_one("do { x } while x"), Node::DoWhile(_)));
}

#[test]
fn import_targets() {
    let Node::Import(import) = parse_one("import a, b as c, d global") else {
        panic!("expected import");
    };
    assert!(!import.native);
    assert_eq!(import.items.len(), 3);
    assert_eq!(import.items[0].target, ImportTarget::Name);
    assert_eq!(import.items[1].target, ImportTarget::Alias("c".into()));
    assert_eq!(import.items[2].target, ImportTarget::Global);

    let Node::Import(import) = parse_one("import native calc") else {
        panic!("expected import");
    };
    assert!(import.native);
}

#[test]
fn native_descriptor() {
    let Node::NativeDef(decl) = parse_one("native hypot(double, double) double") else {
        panic!("expected native descriptor");
    };
    assert_eq!(decl.name, "hypot");
    assert_eq!(decl.params.as_ref(), ["double".to_string(), "double".to_string()]);
    assert_eq!(decl.ret, "double");
}

#[test]
fn try_catch_forms() {
    let Node::Try(t) = parse_one("try { x } catch(e) { e }") else {
        panic!("expected try");
    };
    assert_eq!(t.handler.as_ref().unwrap().var.as_deref(), Some("e"));
    let Node::Try(t) = parse_one("try { x } catch { 0 }") else {
        panic!("expected try");
    };
    assert_eq!(t.handler.as_ref().unwrap().var, None);
    let Node::Try(t) = parse_one("try { x }") else {
        panic!("expected try");
    };
    assert!(t.handler.is_none());
}

#[test]
fn class_and_new() {
    let Node::Class(class) = parse_one("class Point { x = 0 }") else {
        panic!("expected class");
    };
    assert_eq!(class.name, "Point");
    assert!(class.bases.is_empty());

    let Node::Class(class) = parse_one("class Point3(Point) { z = 0 }") else {
        panic!("expected class");
    };
    assert_eq!(class.bases.as_ref(), ["Point".to_string()]);

    let Node::Call(call) = parse_one("new Point(1, 2)") else {
        panic!("expected call");
    };
    assert!(call.construct);
}

#[test]
fn first_error_aborts_the_parse() {
    let node = parse("x = 1; if ; y = 2");
    let Node::Error(err) = node else {
        panic!("expected error, got {node:?}");
    };
    assert!(err.message.contains("Line"), "{}", err.message);
}

#[test]
fn lexical_errors_surface_as_parse_errors() {
    assert!(parse("a $ b").is_error());
    assert!(parse("\"unterminated").is_error());
}
