//! Call dispatch.
//!
//! Resolution order: the fixed builtin table first, then the callee name
//! through the environment — a `Func` runs in a fresh child of its captured
//! declaration chain, a `Class` instantiates, a `Def` crosses the native
//! boundary. Arguments evaluate left to right and the first exception
//! aborts the call before dispatch.
use crate::builtins::DIRECT_FUNCTIONS;
use crate::core::env::Env;
use crate::core::heap::ObjectId;
use crate::core::object::{ClassCore, ObjKind, TypeTag};
use crate::errors;
use crate::native::{NativeSig, native_to_object, object_to_native};
use crate::runtime::Runtime;
use kora_ir::{CallExpr, Node};
use smallvec::SmallVec;

type Args = SmallVec<[ObjectId; 8]>;

impl Runtime {
    pub(crate) fn eval_call(
        &mut self,
        call: &CallExpr,
        env: &Env,
        caller: Option<ObjectId>,
    ) -> ObjectId {
        let Node::Variable(name) = &call.callee else {
            return self.exception("Cannot call this like a function".to_string());
        };

        let mut args: Args = SmallVec::new();
        if DIRECT_FUNCTIONS.contains(&name.as_str()) {
            // These builtins receive their arguments as raw identifier
            // text, not evaluated values.
            for node in call.args.iter() {
                let text = match node {
                    Node::Variable(text) | Node::Str(text) => text.clone(),
                    _ => String::new(),
                };
                args.push(self.heap.alloc(ObjKind::Str(text)));
            }
        } else {
            for node in call.args.iter() {
                let value = self.evaluate(node, env, None);
                if self.is_exception(value) {
                    return value;
                }
                args.push(value);
            }
        }

        if let Some(result) = self.call_builtin(name, &args, env) {
            return result;
        }

        let Some(target) = env.get(name) else {
            return self.exception(errors::undefined_variable(name));
        };
        match self.heap.get(target).tag() {
            TypeTag::Class => self.instantiate(target, &args),
            _ if call.construct => self.exception(errors::not_callable(name)),
            TypeTag::Func => self.call_function(target, &args, caller),
            TypeTag::Def => self.call_native(target, &args),
            _ => self.exception(errors::not_callable(name)),
        }
    }

    /// Run a script function: fresh child of the captured declaration
    /// environment, positional parameters (missing ones bound to none), a
    /// synthetic `args` array of the actuals, and `this` when a caller
    /// object is supplied. The result's `returned` flag is consumed here.
    pub(crate) fn call_function(
        &mut self,
        func: ObjectId,
        args: &[ObjectId],
        caller: Option<ObjectId>,
    ) -> ObjectId {
        self.call_function_in(func, args, caller, None)
    }

    /// Like `call_function`, but with `home` overriding the chain the call
    /// frame extends — instance methods run against the instance's scope
    /// rather than the class body's.
    pub(crate) fn call_function_in(
        &mut self,
        func: ObjectId,
        args: &[ObjectId],
        caller: Option<ObjectId>,
        home: Option<Env>,
    ) -> ObjectId {
        let ObjKind::Func(closure) = self.heap.get(func).kind.clone() else {
            return self.exception(errors::not_callable("this value"));
        };
        let base = home.unwrap_or_else(|| closure.env.clone());
        let func_env = base.extend();
        if let Some(this) = caller {
            func_env.def(&mut self.heap, "this", this);
        }
        for (i, param) in closure.decl.params.iter().enumerate() {
            let value = match args.get(i) {
                Some(id) => *id,
                None => self.heap.alloc(ObjKind::None),
            };
            func_env.def(&mut self.heap, param, value);
        }
        let actuals: Vec<ObjectId> = args.iter().map(|a| self.heap.deep_copy(*a)).collect();
        let args_array = self.heap.alloc(ObjKind::Array(actuals));
        func_env.def(&mut self.heap, "args", args_array);

        let result = self.evaluate(&closure.decl.body, &func_env, None);
        self.heap.get_mut(result).returned = false;
        result
    }

    /// Construct a class instance: copy the class body's scope, then run
    /// the member function named like the class (if any) as the
    /// constructor with `this` bound to the new instance.
    pub(crate) fn instantiate(&mut self, class: ObjectId, args: &[ObjectId]) -> ObjectId {
        let ObjKind::Class(core) = self.heap.get(class).kind.clone() else {
            return self.exception(errors::not_callable("this value"));
        };
        let instance_env = core.env.clone_scope(&mut self.heap);
        let ctor = instance_env
            .get(&core.name)
            .filter(|id| matches!(self.heap.get(*id).kind, ObjKind::Func(_)));
        let instance = self.heap.alloc(ObjKind::Instance(Box::new(ClassCore {
            name: core.name.clone(),
            env: instance_env.clone(),
        })));
        if let Some(ctor) = ctor {
            let result = self.call_function_in(ctor, args, Some(instance), Some(instance_env));
            if self.is_exception(result) {
                return result;
            }
        }
        instance
    }

    /// Method dispatch for `receiver.name(...)`: the receiver's own
    /// callable members first, then native methods registered for the
    /// type, then script extensions.
    pub(crate) fn call_method(
        &mut self,
        receiver: ObjectId,
        name: &str,
        args: &[ObjectId],
    ) -> ObjectId {
        match self.try_call_method(receiver, name, args) {
            Some(result) => result,
            None => {
                let ty = self.heap.get(receiver).type_name();
                self.exception(errors::not_a_method(name, &ty))
            }
        }
    }

    pub(crate) fn try_call_method(
        &mut self,
        receiver: ObjectId,
        name: &str,
        args: &[ObjectId],
    ) -> Option<ObjectId> {
        let mut home: Option<Env> = None;
        let member = match &self.heap.get(receiver).kind {
            ObjKind::Dict(map) => map.get(name).copied(),
            ObjKind::Instance(core) => {
                home = Some(core.env.clone());
                core.env.get(name)
            }
            ObjKind::Lib(lib) => lib.defs.iter().copied().find(|def| {
                matches!(&self.heap.get(*def).kind, ObjKind::Def(b) if b.name == name)
            }),
            _ => None,
        };
        if let Some(member) = member {
            match self.heap.get(member).tag() {
                TypeTag::Func => {
                    return Some(self.call_function_in(member, args, Some(receiver), home));
                }
                TypeTag::Def => return Some(self.call_native(member, args)),
                _ => {}
            }
        }

        let tag = self.heap.get(receiver).tag();
        if let Some(method) = self.methods.get(&(tag, name.to_string())).copied() {
            return Some(match method(self, receiver, args) {
                Ok(value) => value,
                Err(message) => self.exception(message),
            });
        }
        if let Some(func) = self.extensions.get(&(tag, name.to_string())).copied() {
            return Some(self.call_function(func, args, Some(receiver)));
        }
        None
    }

    /// Cross the native boundary: marshal the arguments by the declared
    /// parameter type names, invoke through the host, marshal the result
    /// back by the declared return type.
    pub(crate) fn call_native(&mut self, def: ObjectId, args: &[ObjectId]) -> ObjectId {
        let ObjKind::Def(binding) = self.heap.get(def).kind.clone() else {
            return self.exception(errors::not_callable("this value"));
        };
        let handle = match &self.heap.get(binding.lib).kind {
            ObjKind::Lib(lib) => Some(lib.handle),
            _ => None,
        };
        let Some(handle) = handle else {
            return self.exception(errors::not_callable(&binding.name));
        };
        let mut marshaled = Vec::with_capacity(binding.params.len());
        for (i, ty) in binding.params.iter().enumerate() {
            match object_to_native(&self.heap, args.get(i).copied(), ty) {
                Ok(value) => marshaled.push(value),
                Err(message) => return self.exception(message),
            }
        }
        let sig = NativeSig {
            name: &binding.name,
            params: &binding.params,
            ret: &binding.ret,
        };
        match self.native_host.invoke(handle, &sig, &marshaled) {
            Ok(value) => native_to_object(&mut self.heap, value),
            Err(message) => self.exception(message),
        }
    }
}
