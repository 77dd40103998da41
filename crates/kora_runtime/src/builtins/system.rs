//! `exit`, `del`, `env`.
use crate::core::env::Env;
use crate::core::heap::ObjectId;
use crate::core::object::ObjKind;
use crate::runtime::Runtime;

impl Runtime {
    /// Stop evaluation, optionally with a numeric exit code. The result
    /// carries the `returned` flag so enclosing blocks unwind.
    pub(crate) fn builtin_exit(&mut self, args: &[ObjectId]) -> ObjectId {
        self.exit_requested = true;
        self.exit_code = 0;
        if let Some(first) = args.first() {
            if let ObjKind::Number(code) = self.heap.get(*first).kind {
                self.exit_code = code as i32;
            }
        }
        let result = self.heap.alloc(ObjKind::Object);
        self.heap.get_mut(result).returned = true;
        self.echo = false;
        result
    }

    /// Delete bindings by name; `del(local)` clears the current scope,
    /// `del(all)` the whole chain.
    pub(crate) fn builtin_del(&mut self, args: &[ObjectId], env: &Env) -> ObjectId {
        for arg in args {
            if let ObjKind::Str(name) = self.heap.get(*arg).kind.clone() {
                env.del(&name);
            }
        }
        self.echo = false;
        self.heap.alloc(ObjKind::None)
    }

    /// Dump the current scope as a dict.
    pub(crate) fn builtin_env(&mut self, env: &Env) -> ObjectId {
        let members = env.to_members(&mut self.heap);
        self.echo = true;
        self.heap.alloc(ObjKind::Dict(members))
    }
}
