//! Front-end boundary.
//!
//! The runtime parses program text (top-level runs, imports) through this
//! trait so it never depends on the parser crate directly.
use crate::Node;

pub trait Frontend {
    /// Parse a complete source text; parse failures come back as an
    /// `Error` node (fail-fast).
    fn parse_text(&self, input: &str) -> Node;
}
