use kora_driver::Driver;
use kora_ir::Node;
use kora_syntax::TokenKind;

#[test]
fn lex_parse_compile_load() {
    let driver = Driver::new();
    let src = "func add(a, b) { return a + b }; println(add(2, 3))";

    let tokens = driver.lex_text(src);
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Keyword && t.text == "func"));

    let parsed = driver.parse_text(src);
    assert!(!parsed.is_error());

    let bytes = driver.compile_text(src).expect("compile");
    let loaded = driver.load_program(&bytes).expect("load");
    assert_eq!(loaded, parsed);
}

#[test]
fn compile_rejects_bad_source() {
    let driver = Driver::new();
    let err = driver.compile_text("func 1()").unwrap_err();
    assert!(err.contains("Invalid function name"), "{err}");
}

#[test]
fn load_rejects_garbage() {
    let driver = Driver::new();
    assert!(driver.load_program(&[1, 2, 3]).is_err());
}

#[test]
fn parse_errors_carry_positions() {
    let driver = Driver::new();
    let Node::Error(err) = driver.parse_text("x = ;") else {
        panic!("expected an error node");
    };
    assert_eq!(err.pos.row, 1);
    assert!(err.message.contains("Unexpected"));
}
