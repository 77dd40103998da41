//! Lexical environments.
//!
//! A chain of shared, mutable scopes mapping names to heap objects. Scopes
//! are created per block (`let`, loop body, function call) and shared by
//! reference: a closure keeps its declaration chain alive, and assignments
//! through the chain are visible to every holder.
use super::heap::{Heap, ObjectId};
use super::object::Members;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Clone)]
pub struct Env(Rc<RefCell<Scope>>);

struct Scope {
    bindings: IndexMap<String, ObjectId>,
    parent: Option<Env>,
}

impl Env {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: IndexMap::new(),
            parent: None,
        })))
    }

    /// A fresh child scope whose parent is `self`.
    pub fn extend(&self) -> Env {
        Self(Rc::new(RefCell::new(Scope {
            bindings: IndexMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Walk self and ancestors; the first scope containing `name`.
    pub fn lookup(&self, name: &str) -> Option<Env> {
        let mut scope = Some(self.clone());
        while let Some(env) = scope {
            if env.0.borrow().bindings.contains_key(name) {
                return Some(env);
            }
            scope = env.0.borrow().parent.clone();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().bindings.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.lookup(name)
            .and_then(|scope| scope.0.borrow().bindings.get(name).copied())
    }

    /// Overwrite an existing binding wherever the chain defines it;
    /// otherwise define the name in the current scope (late binding is
    /// deliberate — callers wanting strict-undeclared semantics must check
    /// existence first). The bound object becomes a persistent root.
    pub fn set(&self, heap: &mut Heap, name: &str, value: ObjectId) {
        heap.get_mut(value).saved = true;
        match self.lookup(name) {
            Some(scope) => {
                scope.0.borrow_mut().bindings.insert(name.to_string(), value);
            }
            None => {
                self.0.borrow_mut().bindings.insert(name.to_string(), value);
            }
        }
    }

    /// Create/overwrite a binding in the current scope only.
    pub fn def(&self, heap: &mut Heap, name: &str, value: ObjectId) {
        heap.get_mut(value).saved = true;
        self.0.borrow_mut().bindings.insert(name.to_string(), value);
    }

    /// Delete a binding. The special names `local` and `all` clear the
    /// current scope and the whole chain respectively.
    pub fn del(&self, name: &str) -> bool {
        if let Some(scope) = self.lookup(name) {
            scope.0.borrow_mut().bindings.shift_remove(name);
            return true;
        }
        if name == "local" {
            self.0.borrow_mut().bindings.clear();
            return true;
        }
        if name == "all" {
            let mut scope = Some(self.clone());
            while let Some(env) = scope {
                env.0.borrow_mut().bindings.clear();
                scope = env.0.borrow().parent.clone();
            }
            return true;
        }
        false
    }

    /// Flattened snapshot of the whole chain with deep-copied values,
    /// innermost binding winning. Used by `try` so a failed body leaves the
    /// real environment untouched.
    pub fn copy(&self, heap: &mut Heap) -> Env {
        let snapshot = Env::new();
        let mut scope = Some(self.clone());
        while let Some(env) = scope {
            let entries: Vec<(String, ObjectId)> = env
                .0
                .borrow()
                .bindings
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect();
            for (name, value) in entries {
                if !snapshot.contains(&name) {
                    let copied = heap.deep_copy(value);
                    snapshot.def(heap, &name, copied);
                }
            }
            scope = env.0.borrow().parent.clone();
        }
        snapshot
    }

    /// Copy of the current scope only (deep-copied values, same parent).
    /// Used when a class is instantiated so constructor writes land on the
    /// instance's own scope.
    pub fn clone_scope(&self, heap: &mut Heap) -> Env {
        let cloned = Env(Rc::new(RefCell::new(Scope {
            bindings: IndexMap::new(),
            parent: self.0.borrow().parent.clone(),
        })));
        for (name, value) in self.bindings_snapshot() {
            let copied = heap.deep_copy(value);
            cloned.def(heap, &name, copied);
        }
        cloned
    }

    /// Merge a snapshot's bindings back through chain-aware `set`.
    pub fn paste(&self, heap: &mut Heap, snapshot: &Env) {
        for (name, value) in snapshot.bindings_snapshot() {
            self.set(heap, &name, value);
        }
    }

    /// The current scope's bindings, in insertion order.
    pub fn bindings_snapshot(&self) -> Vec<(String, ObjectId)> {
        self.0
            .borrow()
            .bindings
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Dict view of the current scope (deep copies, like any container
    /// construction).
    pub fn to_members(&self, heap: &mut Heap) -> Members {
        let mut members = Members::new();
        for (name, value) in self.bindings_snapshot() {
            let copied = heap.deep_copy(value);
            members.insert(name, copied);
        }
        members
    }

    /// Push every binding reachable through this chain into `out`, visiting
    /// each shared scope once. Shared and cyclic scope references are fine.
    pub fn collect_roots(&self, seen: &mut HashSet<usize>, out: &mut Vec<ObjectId>) {
        let mut scope = Some(self.clone());
        while let Some(env) = scope {
            if !seen.insert(Rc::as_ptr(&env.0) as usize) {
                return;
            }
            out.extend(env.0.borrow().bindings.values().copied());
            scope = env.0.borrow().parent.clone();
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
