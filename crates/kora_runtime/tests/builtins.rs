mod common;
use common::{run, run_output, run_value};

#[test]
fn print_joins_with_single_spaces() {
    assert_eq!(run_output("print(1, \"a\", true)"), "1 a true");
    assert_eq!(run_output("print(\"no newline\")"), "no newline");
}

#[test]
fn println_resets_styling_and_breaks_the_line() {
    assert_eq!(run_output("println(\"hi\")"), "hi\u{1b}[0m\n");
    assert_eq!(run_output("println()"), "\u{1b}[0m\n");
}

#[test]
fn style_sequences_suppress_the_joining_space() {
    assert_eq!(
        run_output("print(\"\u{1b}[31m\", \"red\")"),
        "\u{1b}[31mred"
    );
}

#[test]
fn print_renders_containers() {
    assert_eq!(run_output("print([1, 2], [k = 3])"), "[1, 2] [k = 3]");
}

#[test]
fn a_tostring_extension_overrides_printing() {
    let src = "
        func number.toString() { return \"num!\" };
        print(42)
    ";
    assert_eq!(run_output(src), "num!");
}

#[test]
fn type_reports_names() {
    assert_eq!(run_value("type(1)"), "number");
    assert_eq!(run_value("type(\"s\")"), "string");
    assert_eq!(run_value("type([1])"), "array");
    assert_eq!(run_value("type([k = 1])"), "dict");
    assert_eq!(run_value("type(true)"), "bool");
    assert_eq!(run_value("type(none)"), "none");
    assert_eq!(run_value("f = @() 0; type(f)"), "func");
    assert_eq!(run_value("type()"), "none");
    assert_eq!(run_value("type(1, \"a\")"), "[number, string]");
}

#[test]
fn del_takes_bare_identifiers() {
    let result = run("x = 5; del(x); x");
    assert_eq!(result.value, "exception(Undefined variable 'x')");
}

#[test]
fn del_local_clears_the_current_scope() {
    let result = run("a = 1; b = 2; del(local); a");
    assert_eq!(result.value, "exception(Undefined variable 'a')");
}

#[test]
fn env_dumps_the_current_scope_as_a_dict() {
    assert_eq!(run_value("a = 1; b = \"two\"; env()"), "[a = 1, b = two]");
}

#[test]
fn env_dump_is_a_snapshot() {
    assert_eq!(run_value("a = 1; d = env(); a = 2; d.a"), "1");
}
