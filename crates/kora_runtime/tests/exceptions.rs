mod common;
use common::{run, run_value};

#[test]
fn type_mismatch_raises() {
    let result = run("1 + \"a\"");
    assert_eq!(
        result.value,
        "exception(Cannot apply the operator '+' to 'number' and 'string')"
    );
    assert_eq!(result.exit_code, 1);
    assert!(!result.continue_running);
}

#[test]
fn uncaught_exceptions_abort_later_statements() {
    let result = run("x = 1; 1 + \"a\"; x = 99");
    assert_eq!(result.exit_code, 1);
    assert!(result.value.starts_with("exception("));
}

#[test]
fn interactive_mode_keeps_running_after_an_exception() {
    let mut rt = common::runtime();
    let result = rt.run("1 + \"a\"", true);
    assert_eq!(result.exit_code, 0);
    assert!(result.continue_running);
    // The session is still usable.
    assert_eq!(rt.run("2 + 2", true).value, "4");
}

#[test]
fn exceptions_short_circuit_argument_lists() {
    let result = run("print(1 + \"a\", exit(7))");
    // The call never dispatched: exit's code was not applied.
    assert_eq!(result.exit_code, 1);
    assert!(result.value.starts_with("exception("));
}

#[test]
fn exceptions_short_circuit_container_literals() {
    let result = run("[1, 1 + \"a\", 3]");
    assert!(result.value.starts_with("exception("));
}

#[test]
fn catch_yields_the_exception_value_without_terminating() {
    let result = run("try { 1 + \"a\" } catch(e) { e }");
    assert_eq!(
        result.value,
        "exception(Cannot apply the operator '+' to 'number' and 'string')"
    );
    assert_eq!(result.exit_code, 0);
    assert!(result.continue_running);
}

#[test]
fn catch_without_a_variable_still_recovers() {
    assert_eq!(run_value("try { 1 + \"a\" } catch { \"saved\" }"), "saved");
}

#[test]
fn try_without_catch_swallows_the_exception() {
    assert_eq!(run_value("try { 1 + \"a\" }; \"after\""), "after");
}

#[test]
fn successful_try_pastes_bindings_back() {
    assert_eq!(run_value("x = 1; try { x = 2; y = 3 }; x + y"), "5");
}

#[test]
fn failed_try_leaves_the_environment_untouched() {
    assert_eq!(run_value("x = 1; try { x = 2; 1 + \"a\" }; x"), "1");
}

#[test]
fn handler_exception_supersedes_the_original() {
    let result = run("try { 1 + \"a\" } catch(e) { none + 1 }");
    assert_eq!(
        result.value,
        "exception(Cannot apply the operator '+' to 'none' and 'number')"
    );
    assert_eq!(result.exit_code, 1);
}

#[test]
fn exceptions_cross_call_boundaries() {
    let src = "
        func inner() { 1 + \"a\" };
        func outer() { inner(); \"unreached\" };
        try { outer() } catch(e) { \"caught\" }
    ";
    assert_eq!(run_value(src), "caught");
}

#[test]
fn deep_recursion_raises_a_catchable_exception() {
    let src = "
        func spin() { spin() };
        try { spin() } catch(e) { e }
    ";
    assert_eq!(run_value(src), "exception(Evaluation too deep)");
}

#[test]
fn loop_conditions_propagate_exceptions() {
    let result = run("while 1 + \"a\" { 0 }");
    assert!(result.value.starts_with("exception("));
    let result = run("for (i = 0; 1 + \"a\"; i++) { 0 }");
    assert!(result.value.starts_with("exception("));
}

#[test]
fn parse_errors_report_position_and_fail() {
    let result = run("x = ;");
    assert!(result.value.starts_with("exception("));
    assert!(result.value.contains("Line 1"));
    assert_eq!(result.exit_code, 1);
}
