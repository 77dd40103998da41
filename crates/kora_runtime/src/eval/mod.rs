//! Tree-walking evaluator.
//!
//! `evaluate(node, env, caller)` is the single entry point, exhaustive over
//! the node tag set. Runtime failures flow back as first-class `Exception`
//! objects through the ordinary return channel; every compound evaluation
//! checks each sub-result and stops on the first exception or on a result
//! carrying the `returned` flag.
mod call;
mod expr;
mod ops;
mod stmt;

use crate::core::env::Env;
use crate::core::heap::ObjectId;
use crate::core::object::ObjKind;
use crate::errors::messages;
use crate::runtime::Runtime;
use kora_ir::Node;

impl Runtime {
    pub(crate) fn evaluate(&mut self, node: &Node, env: &Env, caller: Option<ObjectId>) -> ObjectId {
        if self.exit_requested {
            // `exit` stops evaluation outright; keep unwinding.
            let stop = self.heap.alloc(ObjKind::Object);
            self.heap.get_mut(stop).returned = true;
            return stop;
        }
        if self.depth >= self.config.max_depth {
            return self.exception(messages::TOO_DEEP);
        }
        self.depth += 1;
        let result = self.eval_node(node, env, caller);
        self.depth -= 1;
        result
    }

    fn eval_node(&mut self, node: &Node, env: &Env, caller: Option<ObjectId>) -> ObjectId {
        match node {
            Node::Ignore => self.heap.alloc(ObjKind::Object),
            Node::Error(e) => self.exception(e.message.clone()),
            Node::None => {
                self.echo = true;
                self.heap.alloc(ObjKind::None)
            }
            Node::Bool(b) => {
                self.echo = true;
                self.heap.alloc(ObjKind::Bool(*b))
            }
            Node::Number(n) => {
                self.echo = true;
                self.heap.alloc(ObjKind::Number(*n))
            }
            Node::Str(s) => {
                self.echo = true;
                self.heap.alloc(ObjKind::Str(s.clone()))
            }
            Node::Variable(name) => self.eval_variable(name, env),
            Node::Array(items) => self.eval_array(items, env),
            Node::Dict(entries) => self.eval_dict(entries, env),
            Node::Index(ix) => self.eval_index(ix, env),
            Node::Assign(assign) => self.eval_assign(assign, env),
            Node::Binary(binary) => self.eval_binary(binary, env),
            Node::Return(body) => self.eval_return(body, env),
            Node::Let(l) => self.eval_let(l, env),
            Node::Lambda(decl) => self.eval_lambda(decl, env),
            Node::Function(decl) => self.eval_function(decl, env),
            Node::NativeDef(decl) => self.eval_native_def(decl, caller),
            Node::Extension(ext) => self.eval_extension(ext, env),
            Node::If(i) => self.eval_if(i, env),
            Node::For(f) => self.eval_for(f, env),
            Node::While(w) => self.eval_while(w, env),
            Node::DoWhile(w) => self.eval_do_while(w, env),
            Node::Context(stmts) => self.eval_context(stmts, env, caller),
            Node::Call(call) => self.eval_call(call, env, caller),
            Node::Import(import) => self.eval_import(import, env),
            Node::Try(t) => self.eval_try(t, env),
            Node::Class(class) => self.eval_class(class, env),
        }
    }

    pub(crate) fn is_exception(&self, id: ObjectId) -> bool {
        self.heap.get(id).is_exception()
    }

    pub(crate) fn is_returned(&self, id: ObjectId) -> bool {
        self.heap.get(id).returned
    }

    pub(crate) fn truthy(&self, id: ObjectId) -> bool {
        self.heap.get(id).is_true()
    }
}
