//! Static keyword and operator tables.

pub static KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "if",
    "else",
    "func",
    "@",
    "true",
    "false",
    "none",
    "return",
    "for",
    "while",
    "in",
    "let",
    "do",
    "import",
    "as",
    "global",
    "native",
    "try",
    "catch",
    "class",
    "new",
};

/// Multi-character operators are matched greedily against this set, always
/// preferring the longest prefix that is still a member.
pub static OPERATORS: phf::Set<&'static str> = phf::phf_set! {
    ".",
    "+",
    "++",
    "-",
    "--",
    "*",
    "/",
    "%",
    "!",
    "=",
    "==",
    "!=",
    "<>",
    ">=",
    "<=",
    ">",
    "<",
    "[",
    "]",
    "^",
    "~",
    "|",
    "||",
    "&",
    "&&",
    ":",
    "**",
    ">>",
    "<<",
};

pub fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '/' | '*' | '%' | '!' | '=' | '>' | '<' | '[' | ']' | '^' | '~' | '|' | '&'
            | ':' | '.'
    )
}

pub fn is_symbol_char(c: char) -> bool {
    matches!(c, '{' | '}' | '(' | ')' | ',' | ';')
}
