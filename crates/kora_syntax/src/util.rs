pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_name_start(c: char) -> bool {
    is_letter(c) || c == '_' || c == '@'
}

pub fn is_name_continue(c: char) -> bool {
    is_letter(c) || is_digit(c) || c == '_'
}
