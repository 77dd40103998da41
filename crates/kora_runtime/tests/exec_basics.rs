mod common;
use common::{run, run_value};

#[test]
fn arithmetic_precedence() {
    assert_eq!(run_value("1 + 2 * 3"), "7");
    assert_eq!(run_value("(1 + 2) * 3"), "9");
    assert_eq!(run_value("2 ** 3 ** 2"), "512");
    assert_eq!(run_value("10 % 3"), "1");
    assert_eq!(run_value("7 / 2"), "3.5");
}

#[test]
fn unary_forms() {
    assert_eq!(run_value("-5 + 2"), "-3");
    assert_eq!(run_value("x = 4; -x"), "-4");
    assert_eq!(run_value("~0"), "-1");
}

#[test]
fn string_operations() {
    assert_eq!(run_value("\"ab\" + \"cd\""), "abcd");
    assert_eq!(run_value("\"n = \" + 3"), "n = 3");
    assert_eq!(run_value("\"ab\" * 3"), "ababab");
    assert_eq!(run_value("\"yes\" * true"), "yes");
}

#[test]
fn comparisons_and_logic() {
    assert_eq!(run_value("1 < 2"), "true");
    assert_eq!(run_value("2 <= 2"), "true");
    assert_eq!(run_value("1 == 1 && 2 == 2"), "true");
    assert_eq!(run_value("1 == 2 || 2 == 2"), "true");
    assert_eq!(run_value("1 <> 2"), "true");
    assert_eq!(run_value("1 != 1"), "false");
    // Ordering of strings and arrays is by size.
    assert_eq!(run_value("\"abc\" > \"z\""), "true");
    assert_eq!(run_value("[1, 2] < [1, 2, 3]"), "true");
}

#[test]
fn equality_is_structural() {
    assert_eq!(run_value("[1, [2, 3]] == [1, [2, 3]]"), "true");
    assert_eq!(run_value("[x = 1] == [x = 1]"), "true");
    assert_eq!(run_value("[x = 1] == [x = 2]"), "false");
    assert_eq!(run_value("1 == \"1\""), "false");
}

#[test]
fn bitwise_on_numbers() {
    assert_eq!(run_value("6 & 3"), "2");
    assert_eq!(run_value("6 | 3"), "7");
    assert_eq!(run_value("6 ^ 3"), "5");
    assert_eq!(run_value("1 << 4"), "16");
    assert_eq!(run_value("16 >> 2"), "4");
}

#[test]
fn ranges_materialize_inclusive_arrays() {
    assert_eq!(run_value("1:5"), "[1, 2, 3, 4, 5]");
    assert_eq!(run_value("5:1"), "[5, 4, 3, 2, 1]");
    assert_eq!(run_value("1:2:9"), "[1, 3, 5, 7, 9]");
    assert_eq!(run_value("x = 3; 1:x"), "[1, 2, 3]");
}

#[test]
fn indexing() {
    assert_eq!(run_value("\"abc\"[1]"), "b");
    assert_eq!(run_value("\"abc\"[-1]"), "c");
    assert_eq!(run_value("\"abcd\"[0, 2]"), "ac");
    assert_eq!(run_value("[10, 20, 30][1]"), "20");
    assert_eq!(run_value("[10, 20, 30][0, 2]"), "[10, 30]");
    assert_eq!(run_value("[10, 20, 30][-1]"), "30");
    assert_eq!(run_value("m = [[1, 2], [3, 4]]; m[1][0]"), "3");
    assert_eq!(run_value("d = [x = 1, y = 2]; d[\"y\"]"), "2");
}

#[test]
fn index_errors() {
    let result = run("[1, 2][5]");
    assert_eq!(result.value, "exception(Index '5' out of bounds)");
    assert_eq!(result.exit_code, 1);
    let result = run("d = [x = 1]; d[\"nope\"]");
    assert_eq!(result.value, "exception(Index 'nope' does not exists)");
}

#[test]
fn membership() {
    assert_eq!(run_value("2 in [1, 2, 3]"), "true");
    assert_eq!(run_value("\"a\" in \"cab\""), "true");
    assert_eq!(run_value("\"x\" in [x = 1, y = 2]"), "true");
    assert_eq!(run_value("5 in [1, 2, 3]"), "false");
}

#[test]
fn dict_member_access() {
    assert_eq!(run_value("d = [x = 1, y = 2]; d.x + d.y"), "3");
    let result = run("d = [x = 1]; d.z");
    assert_eq!(result.value, "exception(Index 'z' does not exists)");
}

#[test]
fn container_values_are_copies() {
    // Assignment of a bound container copies it.
    assert_eq!(run_value("a = [1, 2]; b = a; b + 3; a"), "[1, 2]");
    // A literal captures copies of its element values.
    assert_eq!(run_value("x = 1; xs = [x]; x = 2; xs"), "[1]");
}

#[test]
fn printable_forms() {
    assert_eq!(run_value("none"), "none");
    assert_eq!(run_value("true"), "true");
    assert_eq!(run_value("[1, \"a\", [2]]"), "[1, a, [2]]");
    assert_eq!(run_value("[k = 1, j = 2]"), "[k = 1, j = 2]");
    assert_eq!(run_value("func f() 1"), "func(f)");
    assert_eq!(run_value("3.5 + 0.25"), "3.75");
}
