//! Statement-like forms: blocks, conditionals, loops, bindings, try/catch,
//! declarations, imports, classes.
use crate::core::env::Env;
use crate::core::heap::ObjectId;
use crate::core::object::{ClassCore, Closure, LibData, NativeBinding, ObjKind};
use crate::errors::{self, messages};
use crate::runtime::Runtime;
use kora_ir::{
    ClassDecl, ExtensionDecl, ForExpr, FuncDecl, ImportExpr, ImportItem, ImportTarget, LetExpr,
    NativeDecl, Node, TryExpr, WhileExpr,
};
use std::rc::Rc;

impl Runtime {
    /// Statements run in order; an exception aborts the block, a `returned`
    /// result stops it and propagates upward without visiting later
    /// siblings.
    pub(crate) fn eval_context(
        &mut self,
        stmts: &[Node],
        env: &Env,
        caller: Option<ObjectId>,
    ) -> ObjectId {
        self.echo = false;
        let mut result = self.heap.alloc(ObjKind::Object);
        for stmt in stmts {
            result = self.evaluate(stmt, env, caller);
            if self.is_exception(result) || self.is_returned(result) {
                break;
            }
        }
        result
    }

    pub(crate) fn eval_return(&mut self, body: &Node, env: &Env) -> ObjectId {
        let value = self.evaluate(body, env, None);
        if !self.is_exception(value) {
            self.heap.get_mut(value).returned = true;
        }
        value
    }

    pub(crate) fn eval_if(&mut self, i: &kora_ir::IfExpr, env: &Env) -> ObjectId {
        let result = self.eval_if_inner(i, env);
        self.echo = false;
        result
    }

    fn eval_if_inner(&mut self, i: &kora_ir::IfExpr, env: &Env) -> ObjectId {
        let cond = self.evaluate(&i.cond, env, None);
        if self.is_exception(cond) {
            return cond;
        }
        if self.truthy(cond) {
            self.evaluate(&i.then, env, None)
        } else if let Some(els) = &i.els {
            self.evaluate(els, env, None)
        } else {
            self.heap.alloc(ObjKind::Object)
        }
    }

    pub(crate) fn eval_let(&mut self, l: &LetExpr, env: &Env) -> ObjectId {
        let let_env = env.extend();
        for binding in l.bindings.iter() {
            let value = self.evaluate(binding, &let_env, None);
            if self.is_exception(value) {
                self.echo = true;
                return value;
            }
        }
        let result = self.evaluate(&l.body, &let_env, None);
        self.echo = true;
        result
    }

    /// Loop bodies run in one extended child scope reused across
    /// iterations. A falsy initial condition yields the condition value
    /// itself without running the body.
    pub(crate) fn eval_while(&mut self, w: &WhileExpr, env: &Env) -> ObjectId {
        let result = self.eval_while_inner(w, env);
        self.echo = false;
        result
    }

    fn eval_while_inner(&mut self, w: &WhileExpr, env: &Env) -> ObjectId {
        let loop_env = env.extend();
        let mut cond = self.evaluate(&w.cond, &loop_env, None);
        if self.is_exception(cond) || !self.truthy(cond) {
            return cond;
        }
        let mut result;
        loop {
            result = self.evaluate(&w.body, &loop_env, None);
            if self.is_exception(result) || self.is_returned(result) {
                break;
            }
            cond = self.evaluate(&w.cond, &loop_env, None);
            if self.is_exception(cond) {
                result = cond;
                break;
            }
            if !self.truthy(cond) {
                break;
            }
        }
        result
    }

    pub(crate) fn eval_do_while(&mut self, w: &WhileExpr, env: &Env) -> ObjectId {
        let result = self.eval_do_while_inner(w, env);
        self.echo = false;
        result
    }

    fn eval_do_while_inner(&mut self, w: &WhileExpr, env: &Env) -> ObjectId {
        let loop_env = env.extend();
        let mut result;
        loop {
            result = self.evaluate(&w.body, &loop_env, None);
            if self.is_exception(result) || self.is_returned(result) {
                break;
            }
            let cond = self.evaluate(&w.cond, &loop_env, None);
            if self.is_exception(cond) {
                result = cond;
                break;
            }
            if !self.truthy(cond) {
                break;
            }
        }
        result
    }

    pub(crate) fn eval_for(&mut self, f: &ForExpr, env: &Env) -> ObjectId {
        let result = self.eval_for_inner(f, env);
        self.echo = false;
        result
    }

    fn eval_for_inner(&mut self, f: &ForExpr, env: &Env) -> ObjectId {
        if f.clauses.is_empty() || f.clauses.len() > 3 {
            return self.exception(messages::INVALID_FOR_ARGS);
        }
        let for_env = env.extend();

        // `for (x in seq) body`
        if f.clauses.len() == 1 {
            if let Node::Binary(b) = &f.clauses[0] {
                if b.op == "in" {
                    let Some(Node::Variable(var)) = &b.left else {
                        return self.exception(messages::INVALID_IN_TARGET);
                    };
                    let Some(seq_node) = &b.right else {
                        return self.exception(messages::INVALID_IN_TARGET);
                    };
                    let seq = self.evaluate(seq_node, &for_env, None);
                    if self.is_exception(seq) {
                        return seq;
                    }
                    let parts = self.heap.split(seq);
                    let mut result = self.heap.alloc(ObjKind::Object);
                    for part in parts {
                        for_env.def(&mut self.heap, var, part);
                        result = self.evaluate(&f.body, &for_env, None);
                        if self.is_exception(result) || self.is_returned(result) {
                            break;
                        }
                    }
                    return result;
                }
            }
        }

        // `for (init; cond; step) body`, trailing clauses optional.
        let init = self.evaluate(&f.clauses[0], &for_env, None);
        if self.is_exception(init) {
            return init;
        }
        let cond_node = f.clauses.get(1);
        let step_node = f.clauses.get(2);
        if let Some(cn) = cond_node {
            let cond = self.evaluate(cn, &for_env, None);
            if self.is_exception(cond) {
                return cond;
            }
            if !self.truthy(cond) {
                return self.heap.alloc(ObjKind::Object);
            }
        }
        let mut result;
        loop {
            result = self.evaluate(&f.body, &for_env, None);
            if self.is_exception(result) || self.is_returned(result) {
                break;
            }
            if let Some(sn) = step_node {
                let step = self.evaluate(sn, &for_env, None);
                if self.is_exception(step) {
                    result = step;
                    break;
                }
            }
            if let Some(cn) = cond_node {
                let cond = self.evaluate(cn, &for_env, None);
                if self.is_exception(cond) {
                    result = cond;
                    break;
                }
                if !self.truthy(cond) {
                    break;
                }
            }
        }
        result
    }

    /// The body runs against a flattened copy of the caller's environment.
    /// On success the copy's bindings are pasted back; on failure the catch
    /// clause (if any) runs in a fresh copy with the exception bound to the
    /// named variable, and its result — including its own exception —
    /// becomes the try's result.
    pub(crate) fn eval_try(&mut self, t: &TryExpr, env: &Env) -> ObjectId {
        let snapshot = env.copy(&mut self.heap);
        let body = self.evaluate(&t.body, &snapshot, None);
        let result = if !self.is_exception(body) {
            env.paste(&mut self.heap, &snapshot);
            body
        } else if let Some(handler) = &t.handler {
            // Intercepted: the exception stops unwinding here, whatever
            // value the handler produces.
            self.propagating = false;
            let catch_env = env.copy(&mut self.heap);
            if let Some(var) = &handler.var {
                catch_env.def(&mut self.heap, var, body);
            }
            self.evaluate(&handler.body, &catch_env, None)
        } else {
            self.propagating = false;
            self.heap.alloc(ObjKind::Object)
        };
        self.echo = true;
        result
    }

    pub(crate) fn eval_function(&mut self, decl: &Rc<FuncDecl>, env: &Env) -> ObjectId {
        let func = self.heap.alloc(ObjKind::Func(Closure {
            decl: decl.clone(),
            env: env.clone(),
        }));
        env.def(&mut self.heap, &decl.name, func);
        self.echo = true;
        func
    }

    pub(crate) fn eval_lambda(&mut self, decl: &Rc<FuncDecl>, env: &Env) -> ObjectId {
        self.echo = true;
        self.heap.alloc(ObjKind::Func(Closure {
            decl: decl.clone(),
            env: env.clone(),
        }))
    }

    /// `func Type.name(...)` registers a method for the named type.
    pub(crate) fn eval_extension(&mut self, ext: &ExtensionDecl, env: &Env) -> ObjectId {
        let func = self.heap.alloc(ObjKind::Func(Closure {
            decl: ext.func.clone(),
            env: env.clone(),
        }));
        self.heap.get_mut(func).saved = true;
        self.extensions.insert(
            (
                crate::core::object::TypeTag::from_name(&ext.target),
                ext.func.name.clone(),
            ),
            func,
        );
        self.echo = true;
        func
    }

    /// A native descriptor is only legal while a library descriptor is
    /// being evaluated; it appends a `Def` to the loading library and
    /// yields the library itself.
    pub(crate) fn eval_native_def(
        &mut self,
        decl: &NativeDecl,
        caller: Option<ObjectId>,
    ) -> ObjectId {
        self.echo = true;
        let Some(lib) = caller else {
            return self.exception(messages::NATIVE_CONTEXT_ONLY);
        };
        if !matches!(self.heap.get(lib).kind, ObjKind::Lib(_)) {
            return self.exception(messages::NATIVE_CONTEXT_ONLY);
        }
        let def = self.heap.alloc(ObjKind::Def(Box::new(NativeBinding {
            name: decl.name.clone(),
            params: decl.params.clone(),
            ret: decl.ret.clone(),
            lib,
        })));
        self.heap.get_mut(def).saved = true;
        if let ObjKind::Lib(data) = &mut self.heap.get_mut(lib).kind {
            data.defs.push(def);
        }
        lib
    }

    /// The body runs in a child scope that becomes the class's member
    /// scope. Base classes copy their members in first, so the body's own
    /// bindings shadow them.
    pub(crate) fn eval_class(&mut self, class: &ClassDecl, env: &Env) -> ObjectId {
        let class_env = env.extend();
        for base in class.bases.iter() {
            let Some(base_id) = env.get(base) else {
                return self.exception(errors::undefined_variable(base));
            };
            let ObjKind::Class(core) = self.heap.get(base_id).kind.clone() else {
                let ty = self.heap.get(base_id).type_name();
                return self.exception(errors::cannot_apply2("class", &class.name, &ty));
            };
            for (name, value) in core.env.bindings_snapshot() {
                let copied = self.heap.deep_copy(value);
                class_env.def(&mut self.heap, &name, copied);
            }
        }
        let body = self.evaluate(&class.body, &class_env, None);
        if self.is_exception(body) {
            return body;
        }
        let class_obj = self.heap.alloc(ObjKind::Class(Box::new(ClassCore {
            name: class.name.clone(),
            env: class_env,
        })));
        env.def(&mut self.heap, &class.name, class_obj);
        self.echo = true;
        class_obj
    }

    pub(crate) fn eval_import(&mut self, import: &ImportExpr, env: &Env) -> ObjectId {
        let mut result = self.heap.alloc(ObjKind::Object);
        for item in import.items.iter() {
            result = if import.native {
                self.import_native(item, env)
            } else {
                self.import_module(item, env)
            };
            if self.is_exception(result) {
                break;
            }
        }
        self.echo = false;
        result
    }

    /// Script import: resolve the module source through the injected
    /// loader, evaluate it in a child of the root environment, then bind a
    /// dict of its bindings (or paste them for a global import).
    fn import_module(&mut self, item: &ImportItem, env: &Env) -> ObjectId {
        let source = match self.module_loader.load(&item.name) {
            Ok(source) => source,
            Err(reason) => return self.exception(errors::import_failed(&item.name, &reason)),
        };
        let root = match self.frontend.as_ref() {
            Some(frontend) => frontend.parse_text(&source),
            None => {
                return self.exception(errors::import_failed(&item.name, "no front end installed"));
            }
        };
        if let Node::Error(e) = &root {
            return self.exception(errors::import_failed(&item.name, &e.message));
        }
        let module_env = self.env.extend();
        let module_result = self.evaluate(&root, &module_env, None);
        if self.is_exception(module_result) {
            return module_result;
        }
        match &item.target {
            ImportTarget::Global => {
                env.paste(&mut self.heap, &module_env);
                self.heap.alloc(ObjKind::None)
            }
            target => {
                let members = module_env.to_members(&mut self.heap);
                let dict = self.heap.alloc(ObjKind::Dict(members));
                let bind_as = match target {
                    ImportTarget::Alias(nick) => nick.as_str(),
                    _ => item.name.as_str(),
                };
                env.def(&mut self.heap, bind_as, dict);
                dict
            }
        }
    }

    /// Native import: open the library through the host boundary, then run
    /// its descriptor (if the loader finds one) with the library as the
    /// caller so `native ...` declarations register against it.
    fn import_native(&mut self, item: &ImportItem, env: &Env) -> ObjectId {
        let handle = match self.native_host.load(&item.name) {
            Ok(handle) => handle,
            Err(reason) => return self.exception(errors::import_failed(&item.name, &reason)),
        };
        let lib = self.heap.alloc(ObjKind::Lib(Box::new(LibData {
            name: item.name.clone(),
            handle,
            defs: Vec::new(),
        })));
        if let Ok(source) = self.module_loader.load(&item.name) {
            let root = match self.frontend.as_ref() {
                Some(frontend) => frontend.parse_text(&source),
                None => Node::Context(Box::new([])),
            };
            if let Node::Error(e) = &root {
                return self.exception(errors::import_failed(&item.name, &e.message));
            }
            let lib_env = self.env.extend();
            let result = self.evaluate(&root, &lib_env, Some(lib));
            if self.is_exception(result) {
                return result;
            }
        }
        let bind_as = match &item.target {
            ImportTarget::Alias(nick) => nick.as_str(),
            _ => item.name.as_str(),
        };
        env.def(&mut self.heap, bind_as, lib);
        lib
    }
}
