//! Keyword-led forms: blocks, conditionals, loops, bindings, functions,
//! imports, try/catch, classes, native descriptors.
use crate::parser::Parser;
use kora_ir::{
    CatchClause, ClassDecl, ExtensionDecl, ForExpr, FuncDecl, IfExpr, ImportExpr, ImportItem,
    ImportTarget, LetExpr, NativeDecl, Node, TryExpr, WhileExpr,
};
use std::rc::Rc;

impl Parser<'_> {
    /// `{ stmt; stmt; ... }`. Zero statements reduce to the literal `false`,
    /// a single statement to itself.
    pub(crate) fn parse_context(&mut self) -> Node {
        let mut stmts = Vec::new();
        if !self.delimited_nodes(&mut stmts, "{", "}", ";", false) {
            return self.error_here("Unexpected symbol in context");
        }
        match stmts.len() {
            0 => Node::false_literal(),
            1 => stmts.pop().unwrap(),
            _ => Node::Context(stmts.into_boxed_slice()),
        }
    }

    pub(crate) fn parse_if(&mut self) -> Node {
        if !self.skip_keyword("if") {
            return self.error_here("Expected keyword 'if'");
        }
        let cond = self.parse_expression();
        if cond.is_error() {
            return cond;
        }
        let then = self.parse_expression();
        if then.is_error() {
            return then;
        }
        let els = if self.skip_keyword("else") {
            let els = self.parse_expression();
            if els.is_error() {
                return els;
            }
            Some(els)
        } else {
            None
        };
        Node::If(Box::new(IfExpr { cond, then, els }))
    }

    pub(crate) fn parse_let(&mut self) -> Node {
        let mut bindings = Vec::new();
        if !self.delimited_nodes(&mut bindings, "(", ")", ",", false) {
            return self.error_here("Invalid let argument");
        }
        let body = self.parse_expression();
        if body.is_error() {
            return body;
        }
        Node::Let(Box::new(LetExpr {
            bindings: bindings.into_boxed_slice(),
            body,
        }))
    }

    pub(crate) fn parse_lambda(&mut self) -> Node {
        let mut params = Vec::new();
        if !self.delimited_names(&mut params, "(", ")", ",", false) {
            return self.error_here("Invalid lambda argument");
        }
        let body = self.parse_expression();
        if body.is_error() {
            return body;
        }
        Node::Lambda(Rc::new(FuncDecl {
            name: String::new(),
            params: params.into_boxed_slice(),
            body,
        }))
    }

    /// `func name(params) body`, or `func Type.name(params) body` which
    /// registers a method on the named type instead of a plain binding.
    pub(crate) fn parse_function(&mut self) -> Node {
        // `func (params) body` with no name is just a lambda.
        if self.is_symbol("(") {
            return self.parse_lambda();
        }
        let first = self.parse_var_name();
        if self.is_operator(".") {
            let Some(target) = first else {
                return self.error_here("Invalid extension type name");
            };
            self.tokens.next();
            let Some(name) = self.parse_var_name() else {
                return self.error_here("Invalid extension name");
            };
            return match self.parse_func_tail(name) {
                Ok(func) => Node::Extension(Box::new(ExtensionDecl { target, func })),
                Err(err) => err,
            };
        }
        let Some(name) = first else {
            return self.error_here("Invalid function name");
        };
        match self.parse_func_tail(name) {
            Ok(func) => Node::Function(func),
            Err(err) => err,
        }
    }

    fn parse_func_tail(&mut self, name: String) -> Result<Rc<FuncDecl>, Node> {
        let mut params = Vec::new();
        if !self.delimited_names(&mut params, "(", ")", ",", false) {
            return Err(self.error_here("Invalid lambda argument"));
        }
        let body = self.parse_expression();
        if body.is_error() {
            return Err(body);
        }
        Ok(Rc::new(FuncDecl {
            name,
            params: params.into_boxed_slice(),
            body,
        }))
    }

    /// `native name(paramtypes...) rettype`: a descriptor for one symbol of
    /// a native library, only meaningful while that library is loading.
    pub(crate) fn parse_native_def(&mut self) -> Node {
        let Some(name) = self.parse_var_name() else {
            return self.error_here("Invalid native function name");
        };
        let mut params = Vec::new();
        if !self.delimited_names(&mut params, "(", ")", ",", true) {
            return self.error_here("Invalid native parameter type");
        }
        let Some(ret) = self.parse_type_name() else {
            return self.error_here("Invalid native return type");
        };
        Node::NativeDef(Box::new(NativeDecl {
            name,
            params: params.into_boxed_slice(),
            ret,
        }))
    }

    pub(crate) fn parse_for(&mut self) -> Node {
        let mut clauses = Vec::new();
        if !self.delimited_nodes(&mut clauses, "(", ")", ";", false) {
            return self.error_here("Invalid for arguments");
        }
        let body = self.parse_expression();
        if body.is_error() {
            return body;
        }
        Node::For(Box::new(ForExpr {
            clauses: clauses.into_boxed_slice(),
            body,
        }))
    }

    pub(crate) fn parse_while(&mut self) -> Node {
        let cond = self.parse_expression();
        if cond.is_error() {
            return cond;
        }
        let body = self.parse_expression();
        if body.is_error() {
            return body;
        }
        Node::While(Box::new(WhileExpr { cond, body }))
    }

    pub(crate) fn parse_do_while(&mut self) -> Node {
        let body = self.parse_expression();
        if body.is_error() {
            return body;
        }
        if !self.skip_keyword("while") {
            return self.error_here("Expected keyword 'while'");
        }
        let cond = self.parse_expression();
        if cond.is_error() {
            return cond;
        }
        Node::DoWhile(Box::new(WhileExpr { cond, body }))
    }

    /// `import [native] name [as nick | global], ...`
    pub(crate) fn parse_import(&mut self) -> Node {
        let native = self.skip_keyword("native");
        let mut items = Vec::new();
        let mut first = true;
        while !self.tokens.at_end() {
            if first {
                first = false;
            } else if !self.skip_symbol(",") {
                break;
            }
            let Some(name) = self.parse_var_name() else {
                return self.error_here("Invalid import name");
            };
            let target = if self.skip_keyword("as") {
                match self.parse_var_name() {
                    Some(nick) => ImportTarget::Alias(nick),
                    None => return self.error_here("Invalid import nickname"),
                }
            } else if self.skip_keyword("global") {
                ImportTarget::Global
            } else {
                ImportTarget::Name
            };
            items.push(ImportItem { name, target });
        }
        Node::Import(Box::new(ImportExpr {
            native,
            items: items.into_boxed_slice(),
        }))
    }

    pub(crate) fn parse_try(&mut self) -> Node {
        let body = self.parse_expression();
        if body.is_error() {
            return body;
        }
        let handler = if self.skip_keyword("catch") {
            let var = if self.is_symbol("(") {
                let mut vars = Vec::new();
                if !self.delimited_names(&mut vars, "(", ")", ",", false) || vars.len() > 1 {
                    return self
                        .error_here("Invalid number of arguments for try/catch (must be 1)");
                }
                vars.pop()
            } else {
                None
            };
            let hbody = self.parse_expression();
            if hbody.is_error() {
                return hbody;
            }
            Some(CatchClause { var, body: hbody })
        } else {
            None
        };
        Node::Try(Box::new(TryExpr { body, handler }))
    }

    /// `class Name [(bases...)] body`
    pub(crate) fn parse_class(&mut self) -> Node {
        let Some(name) = self.parse_var_name() else {
            return self.error_here("Invalid class name");
        };
        let mut bases = Vec::new();
        if self.is_symbol("(") && !self.delimited_names(&mut bases, "(", ")", ",", false) {
            return self.error_here("Invalid class base");
        }
        let body = self.parse_expression();
        if body.is_error() {
            return body;
        }
        Node::Class(Box::new(ClassDecl {
            name,
            bases: bases.into_boxed_slice(),
            body,
        }))
    }
}
