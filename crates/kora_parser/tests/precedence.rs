use kora_ir::Node;
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

fn binary(node: &Node) -> &kora_ir::BinaryExpr {
    match node {
        Node::Binary(b) => b,
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let node = parse_one("1 + 2 * 3");
    let add = binary(&node);
    assert_eq!(add.op, "+");
    assert_eq!(add.left, Some(Node::Number(1.0)));
    let mul = binary(add.right.as_ref().unwrap());
    assert_eq!(mul.op, "*");
    assert_eq!(mul.left, Some(Node::Number(2.0)));
    assert_eq!(mul.right, Some(Node::Number(3.0)));
}

#[test]
fn power_chains_to_the_right() {
    let node = parse_one("2 ** 3 ** 2");
    let outer = binary(&node);
    assert_eq!(outer.op, "**");
    assert_eq!(outer.left, Some(Node::Number(2.0)));
    let inner = binary(outer.right.as_ref().unwrap());
    assert_eq!(inner.op, "**");
    assert_eq!(inner.left, Some(Node::Number(3.0)));
    assert_eq!(inner.right, Some(Node::Number(2.0)));
}

#[test]
fn comparison_binds_looser_than_arithmetic() {
    let node = parse_one("a + 1 < b * 2");
    let cmp = binary(&node);
    assert_eq!(cmp.op, "<");
    assert_eq!(binary(cmp.left.as_ref().unwrap()).op, "+");
    assert_eq!(binary(cmp.right.as_ref().unwrap()).op, "*");
}

#[test]
fn assignment_builds_an_assign_node() {
    let node = parse_one("x = 1 + 2");
    let Node::Assign(assign) = node else {
        panic!("expected assign");
    };
    assert_eq!(assign.target, Node::Variable("x".into()));
    assert_eq!(binary(&assign.value).op, "+");
}

#[test]
fn leading_minus_gets_an_ignore_operand() {
    let node = parse_one("-x");
    let neg = binary(&node);
    assert_eq!(neg.op, "-");
    assert_eq!(neg.left, Some(Node::Ignore));
    assert_eq!(neg.right, Some(Node::Variable("x".into())));
}

#[test]
fn increment_is_valid_on_both_sides() {
    let post = binary(&parse_one("i++"));
    assert_eq!(post.op, "++");
    assert_eq!(post.left, Some(Node::Variable("i".into())));
    assert_eq!(post.right, Some(Node::Ignore));

    let pre = binary(&parse_one("++i"));
    assert_eq!(pre.left, Some(Node::Ignore));
    assert_eq!(pre.right, Some(Node::Variable("i".into())));
}

#[test]
fn range_collapses_into_ternary_form() {
    let plain = binary(&parse_one("1:9"));
    assert_eq!(plain.op, ":");
    assert_eq!(plain.middle, None);

    let stepped = binary(&parse_one("1:2:9"));
    assert_eq!(stepped.op, ":");
    assert_eq!(stepped.left, Some(Node::Number(1.0)));
    assert_eq!(stepped.middle, Some(Node::Number(2.0)));
    assert_eq!(stepped.right, Some(Node::Number(9.0)));
}

#[test]
fn indexing_is_postfix() {
    let node = parse_one("xs[1, 2]");
    let Node::Index(ix) = node else {
        panic!("expected index");
    };
    assert_eq!(ix.base, Node::Variable("xs".into()));
    assert_eq!(ix.args.len(), 2);
}

#[test]
fn member_access_wraps_trailing_calls() {
    let node = parse_one("a.b(1)");
    let dot = binary(&node);
    assert_eq!(dot.op, ".");
    assert_eq!(dot.left, Some(Node::Variable("a".into())));
    let Some(Node::Call(call)) = &dot.right else {
        panic!("expected call on the right of '.'");
    };
    assert_eq!(call.callee, Node::Variable("b".into()));
}
