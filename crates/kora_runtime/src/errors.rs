//! Runtime exception messages.

pub mod messages {
    pub const TOO_DEEP: &str = "Evaluation too deep";
    pub const INVALID_FOR_ARGS: &str = "Invalid for arguments for 'for' loop";
    pub const INVALID_IN_TARGET: &str = "Invalid type for 'in' operator";
    pub const DIVISION_BY_ZERO: &str = "Division by zero";
    pub const NATIVE_CONTEXT_ONLY: &str =
        "Cannot create a function definition in this context (just native context)";
}

pub fn undefined_variable(name: &str) -> String {
    format!("Undefined variable '{name}'")
}

pub fn cannot_apply(op: &str, ty: &str) -> String {
    format!("Cannot apply the operator '{op}' to '{ty}'")
}

pub fn cannot_apply2(op: &str, left: &str, right: &str) -> String {
    format!("Cannot apply the operator '{op}' to '{left}' and '{right}'")
}

pub fn index_out_of_bounds(index: i64) -> String {
    format!("Index '{index}' out of bounds")
}

pub fn index_missing(key: &str) -> String {
    format!("Index '{key}' does not exists")
}

pub fn not_callable(name: &str) -> String {
    format!("'{name}' is not callable")
}

pub fn not_a_method(name: &str, ty: &str) -> String {
    format!("'{name}' is not a method of '{ty}'")
}

pub fn unsupported_assignment(what: &str) -> String {
    format!("Cannot assign to {what}")
}

pub fn import_failed(name: &str, reason: &str) -> String {
    format!("Cannot import '{name}': {reason}")
}
