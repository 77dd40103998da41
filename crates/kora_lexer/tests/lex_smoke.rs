use kora_lexer::Lexer;
use kora_syntax::TokenKind;

fn kinds(src: &str) -> Vec<(TokenKind, String)> {
    let mut lexer = Lexer::new(src);
    let mut out = Vec::new();
    loop {
        let tok = lexer.next().clone();
        if tok.kind == TokenKind::End {
            break;
        }
        out.push((tok.kind, tok.text));
    }
    out
}

#[test]
fn classifies_basic_tokens() {
    let toks = kinds("x = 1 + y; # trailing comment\nprintln('hi')");
    let texts: Vec<&str> = toks.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(texts, ["x", "=", "1", "+", "y", ";", "println", "(", "hi", ")"]);
    assert_eq!(toks[0].0, TokenKind::Variable);
    assert_eq!(toks[1].0, TokenKind::Operator);
    assert_eq!(toks[2].0, TokenKind::Number);
    assert_eq!(toks[5].0, TokenKind::Symbol);
    assert_eq!(toks[8].0, TokenKind::Str);
}

#[test]
fn keywords_are_recognized() {
    for kw in ["if", "else", "func", "while", "for", "in", "let", "try", "catch", "class", "new"] {
        let toks = kinds(kw);
        assert_eq!(toks[0].0, TokenKind::Keyword, "{kw}");
    }
    // Not a keyword, merely prefixed by one.
    assert_eq!(kinds("iffy")[0].0, TokenKind::Variable);
}

#[test]
fn operators_match_greedily() {
    let toks = kinds("a ** b <= c >> d <> e && f");
    let ops: Vec<&str> = toks
        .iter()
        .filter(|(k, _)| *k == TokenKind::Operator)
        .map(|(_, t)| t.as_str())
        .collect();
    assert_eq!(ops, ["**", "<=", ">>", "<>", "&&"]);
}

#[test]
fn adjacent_operators_split_on_longest_match() {
    // `***` is `**` then `*`; `&&&` is `&&` then `&`.
    let toks = kinds("***");
    assert_eq!(toks[0].1, "**");
    assert_eq!(toks[1].1, "*");
    let toks = kinds("&&&");
    assert_eq!(toks[0].1, "&&");
    assert_eq!(toks[1].1, "&");
}

#[test]
fn positions_are_tracked() {
    let mut lexer = Lexer::new("a\n  b");
    let a = lexer.next().clone();
    assert_eq!((a.pos.row, a.pos.col), (1, 1));
    let b = lexer.next().clone();
    assert_eq!((b.pos.row, b.pos.col), (2, 3));
}

#[test]
fn unknown_character_is_an_error_token() {
    let toks = kinds("a $ b");
    assert_eq!(toks[1].0, TokenKind::Error);
    assert!(toks[1].1.contains("Invalid character '$'"));
    assert!(toks[1].1.contains("[Line 1, Column: 3]"));
    // Lexing continues after the error.
    assert_eq!(toks[2].1, "b");
}

#[test]
fn at_signs_start_names() {
    let toks = kinds("@(x) x");
    assert_eq!(toks[0].0, TokenKind::Keyword);
    assert_eq!(toks[0].1, "@");
}
