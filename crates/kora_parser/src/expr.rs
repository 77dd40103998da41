//! Expression parsing: atoms, precedence climbing, postfix calls and
//! indexing, array/dict literals.
use crate::parser::{Parser, no_left, no_right, precedence};
use kora_ir::{
    AssignExpr, BinaryExpr, CallExpr, DictEntry, IndexExpr, Node, ParseError,
};
use kora_syntax::TokenKind;

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) -> Node {
        let atom = self.parse_atom();
        if atom.is_error() {
            return atom;
        }
        let bin = self.maybe_binary(atom, 0);
        if bin.is_error() {
            return bin;
        }
        self.maybe_call(bin)
    }

    /// Precedence climbing over the operator table. `[` after an expression
    /// is indexing; `=` builds an assignment node; two nested `:` nodes
    /// collapse into the ternary range form.
    pub(crate) fn maybe_binary(&mut self, left: Node, prec: u8) -> Node {
        if self.is_operator("") || self.is_keyword("in") {
            let tok = self.tokens.peek().clone();
            if tok.text == "[" {
                let mut args = Vec::new();
                if !self.delimited_nodes(&mut args, "[", "]", ",", true) {
                    return self.error_here("Invalid array index");
                }
                let node = Node::Index(Box::new(IndexExpr {
                    base: left,
                    args: args.into_boxed_slice(),
                }));
                return self.maybe_binary(node, prec);
            }

            let nprec = precedence(&tok.text);
            if nprec > prec {
                self.tokens.next();
                let ignore_left = matches!(left, Node::Ignore);
                // `**` chains to the right: its right side climbs operators
                // of the same precedence before the left resolves.
                let climb = if tok.text == "**" { nprec - 1 } else { nprec };
                let right = if !no_right(&tok.text) || (ignore_left && no_left(&tok.text)) {
                    let atom = self.parse_atom();
                    if atom.is_error() {
                        return atom;
                    }
                    self.maybe_binary(atom, climb)
                } else {
                    Node::Ignore
                };
                if right.is_error() {
                    return right;
                }

                let node = if tok.text == "=" {
                    Node::Assign(Box::new(AssignExpr {
                        target: left,
                        value: right,
                    }))
                } else if tok.text == ":" {
                    match left {
                        // `a:b:c` becomes one ternary range node.
                        Node::Binary(lb) if lb.op == ":" && lb.middle.is_none() => {
                            let BinaryExpr {
                                left: range_left,
                                right: range_step,
                                ..
                            } = *lb;
                            Node::Binary(Box::new(BinaryExpr {
                                op: tok.text,
                                left: range_left,
                                middle: range_step,
                                right: Some(right),
                            }))
                        }
                        other => Node::Binary(Box::new(BinaryExpr {
                            op: tok.text,
                            left: Some(other),
                            middle: None,
                            right: Some(right),
                        })),
                    }
                } else {
                    Node::Binary(Box::new(BinaryExpr {
                        op: tok.text,
                        left: Some(left),
                        middle: None,
                        right: Some(right),
                    }))
                };
                return self.maybe_binary(node, prec);
            }
        }
        left
    }

    pub(crate) fn maybe_call(&mut self, expr: Node) -> Node {
        if self.is_symbol("(") {
            return self.parse_call(expr);
        }
        expr
    }

    pub(crate) fn parse_call(&mut self, callee: Node) -> Node {
        let mut args = Vec::new();
        if !self.delimited_nodes(&mut args, "(", ")", ",", false) {
            return self.error_here("Invalid function call");
        }
        Node::Call(Box::new(CallExpr {
            callee,
            args: args.into_boxed_slice(),
            construct: false,
        }))
    }

    pub(crate) fn parse_atom(&mut self) -> Node {
        let node = if self.is_symbol("(") {
            self.tokens.next();
            let inner = self.parse_expression();
            if inner.is_error() {
                return inner;
            }
            if !self.skip_symbol(")") {
                return self.error_here("Expected symbol ')'");
            }
            inner
        } else if self.is_symbol("{") {
            self.parse_context()
        } else if self.is_keyword("if") {
            self.parse_if()
        } else if self.is_keyword("true") || self.is_keyword("false") {
            let value = self.tokens.peek().text == "true";
            self.tokens.next();
            Node::Bool(value)
        } else if self.is_keyword("let") {
            self.tokens.next();
            self.parse_let()
        } else if self.is_keyword("@") {
            self.tokens.next();
            self.parse_lambda()
        } else if self.is_keyword("func") {
            self.tokens.next();
            self.parse_function()
        } else if self.is_keyword("native") {
            self.tokens.next();
            self.parse_native_def()
        } else if self.is_keyword("for") {
            self.tokens.next();
            self.parse_for()
        } else if self.is_keyword("while") {
            self.tokens.next();
            self.parse_while()
        } else if self.is_keyword("do") {
            self.tokens.next();
            self.parse_do_while()
        } else if self.is_keyword("return") {
            self.tokens.next();
            let body = self.parse_expression();
            if body.is_error() {
                return body;
            }
            Node::Return(Box::new(body))
        } else if self.is_keyword("import") {
            self.tokens.next();
            self.parse_import()
        } else if self.is_keyword("try") {
            self.tokens.next();
            self.parse_try()
        } else if self.is_keyword("class") {
            self.tokens.next();
            self.parse_class()
        } else if self.is_keyword("new") {
            self.tokens.next();
            let callee = self.parse_atom();
            if callee.is_error() {
                return callee;
            }
            match callee {
                Node::Call(mut call) => {
                    call.construct = true;
                    Node::Call(call)
                }
                _ => return self.error_here("Expected a constructor call after 'new'"),
            }
        } else if self.is_keyword("none") {
            self.tokens.next();
            Node::None
        } else if self.is_operator("") && no_left(&self.tokens.peek().text) {
            self.maybe_binary(Node::Ignore, 0)
        } else if self.is_operator("[") {
            self.parse_array()
        } else {
            let tok = self.tokens.peek().clone();
            self.tokens.next();
            match tok.kind {
                TokenKind::Variable => Node::Variable(tok.text),
                TokenKind::Number => Node::Number(tok.number),
                TokenKind::Str => Node::Str(tok.text),
                TokenKind::Error => Node::Error(Box::new(ParseError {
                    message: tok.text,
                    pos: tok.pos,
                })),
                _ => return self.make_error("Unexpected", &tok),
            }
        };
        if node.is_error() {
            return node;
        }
        self.maybe_call(node)
    }

    /// `[...]` literal. If every element is an assignment to a bare name the
    /// literal is a dict, otherwise an array.
    pub(crate) fn parse_array(&mut self) -> Node {
        let mut items = Vec::new();
        if !self.delimited_nodes(&mut items, "[", "]", ",", true) {
            return self.error_here("Invalid array definition");
        }

        // An empty literal is an (empty) dict, same as one whose elements
        // are all `name = expr` pairs.
        let is_dict = items.iter().all(|item| matches!(item, Node::Assign(_)));
        if !is_dict {
            return Node::Array(items.into_boxed_slice());
        }

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let Node::Assign(assign) = item else {
                unreachable!()
            };
            let AssignExpr { target, value } = *assign;
            let Node::Variable(key) = target else {
                return self.error_here("Invalid dict key");
            };
            entries.push(DictEntry { key, value });
        }
        Node::Dict(entries.into_boxed_slice())
    }
}
