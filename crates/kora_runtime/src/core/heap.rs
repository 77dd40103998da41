//! Garbage collection and heap management.
//!
//! The heap owns every live `Object`, an explicit operand root stack, and a
//! live-object counter with an adaptive collection threshold. Collection is
//! mark-and-sweep and only runs at explicit safe points between top-level
//! evaluations (see `Runtime::run`), never mid-expression, so transient
//! objects held in ordinary locals stay valid within one evaluation. The
//! root stack is for values that must survive *across* safe points; the
//! long-lived roots proper are the environment chains handed to `collect`.
use super::env::Env;
use super::object::{ObjKind, Object, format_number};
use std::collections::HashSet;

/// Handle to a heap-allocated object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// Operand root stack capacity.
pub const STACK_MAX: usize = 4096;

/// Default floor for the adaptive collection threshold.
pub const GC_FLOOR: usize = 256;

pub struct Heap {
    objects: Vec<Option<Object>>,
    free_list: Vec<usize>,
    stack: Vec<ObjectId>,
    live: usize,
    threshold: usize,
    floor: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::with_floor(GC_FLOOR)
    }

    pub fn with_floor(floor: usize) -> Self {
        let floor = floor.max(1);
        Self {
            objects: Vec::with_capacity(1024),
            free_list: Vec::new(),
            stack: Vec::new(),
            live: 0,
            threshold: floor,
            floor,
        }
    }

    /// Allocate a new object. Flags start clear; nothing is rooted.
    pub fn alloc(&mut self, kind: ObjKind) -> ObjectId {
        self.live += 1;
        let obj = Object::new(kind);
        if let Some(slot) = self.free_list.pop() {
            self.objects[slot] = Some(obj);
            ObjectId(slot)
        } else {
            let slot = self.objects.len();
            self.objects.push(Some(obj));
            ObjectId(slot)
        }
    }

    pub fn get(&self, id: ObjectId) -> &Object {
        self.objects[id.0]
            .as_ref()
            .expect("object was garbage collected")
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut Object {
        self.objects[id.0]
            .as_mut()
            .expect("object was garbage collected")
    }

    pub fn kind(&self, id: ObjectId) -> &ObjKind {
        &self.get(id).kind
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.get(id.0).is_some_and(|slot| slot.is_some())
    }

    pub fn live(&self) -> usize {
        self.live
    }

    /// Root an object across future safe points.
    pub fn push(&mut self, id: ObjectId) {
        assert!(self.stack.len() < STACK_MAX, "root stack overflow");
        self.stack.push(id);
    }

    pub fn pop(&mut self) -> Option<ObjectId> {
        self.stack.pop()
    }

    /// True once the live population crossed the adaptive threshold.
    pub fn should_collect(&self) -> bool {
        self.live >= self.threshold
    }

    /// Mark-and-sweep over everything reachable from the root stack,
    /// `extra_roots`, and the supplied environment chains. Returns how many
    /// objects were freed. Unmarked objects are freed; survivors are
    /// unmarked again; the next threshold is twice the post-sweep
    /// population, floored.
    pub fn collect(&mut self, extra_roots: &[ObjectId], envs: &[&Env]) -> usize {
        let mut pending: Vec<ObjectId> = Vec::with_capacity(64);
        let mut seen_scopes: HashSet<usize> = HashSet::new();

        pending.extend(self.stack.iter().copied());
        pending.extend(extra_roots.iter().copied());
        for env in envs {
            env.collect_roots(&mut seen_scopes, &mut pending);
        }

        while let Some(id) = pending.pop() {
            let Some(obj) = self.objects.get_mut(id.0).and_then(|slot| slot.as_mut()) else {
                continue;
            };
            if obj.marked {
                continue;
            }
            obj.marked = true;

            let mut env_to_scan: Option<Env> = None;
            match &obj.kind {
                ObjKind::Array(items) => pending.extend(items.iter().copied()),
                ObjKind::Dict(map) => pending.extend(map.values().copied()),
                ObjKind::Class(core) | ObjKind::Instance(core) => {
                    env_to_scan = Some(core.env.clone());
                }
                ObjKind::Lib(lib) => pending.extend(lib.defs.iter().copied()),
                ObjKind::Def(def) => pending.push(def.lib),
                ObjKind::Func(closure) => env_to_scan = Some(closure.env.clone()),
                _ => {}
            }
            if let Some(env) = env_to_scan {
                env.collect_roots(&mut seen_scopes, &mut pending);
            }
        }

        let mut freed = 0;
        for slot in 0..self.objects.len() {
            let survives = match &mut self.objects[slot] {
                Some(obj) if obj.marked => {
                    obj.marked = false;
                    true
                }
                Some(_) => false,
                None => continue,
            };
            if !survives {
                self.objects[slot] = None;
                self.free_list.push(slot);
                freed += 1;
            }
        }
        self.live -= freed;
        self.threshold = (self.live * 2).max(self.floor);
        freed
    }

    /// Value copy, recursive through containers. Closures and native
    /// descriptors share their immutable payloads; the copy's flags start
    /// clear.
    pub fn deep_copy(&mut self, id: ObjectId) -> ObjectId {
        let kind = self.get(id).kind.clone();
        let copied = match kind {
            ObjKind::Array(items) => {
                let items = items.iter().map(|item| self.deep_copy(*item)).collect();
                ObjKind::Array(items)
            }
            ObjKind::Dict(map) => {
                let map = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.deep_copy(*v)))
                    .collect();
                ObjKind::Dict(map)
            }
            ObjKind::Class(core) => ObjKind::Class(Box::new(crate::core::object::ClassCore {
                name: core.name.clone(),
                env: core.env.clone_scope(self),
            })),
            ObjKind::Instance(core) => {
                ObjKind::Instance(Box::new(crate::core::object::ClassCore {
                    name: core.name.clone(),
                    env: core.env.clone_scope(self),
                }))
            }
            other => other,
        };
        self.alloc(copied)
    }

    /// Structural equality. Dicts compare as key sets; closures compare by
    /// declaration identity.
    pub fn structural_eq(&self, a: ObjectId, b: ObjectId) -> bool {
        match (&self.get(a).kind, &self.get(b).kind) {
            (ObjKind::Object, ObjKind::Object) => true,
            (ObjKind::None, ObjKind::None) => true,
            (ObjKind::Bool(x), ObjKind::Bool(y)) => x == y,
            (ObjKind::Number(x), ObjKind::Number(y)) => x == y,
            (ObjKind::Str(x), ObjKind::Str(y)) => x == y,
            (ObjKind::Exception(x), ObjKind::Exception(y)) => x == y,
            (ObjKind::Array(xs), ObjKind::Array(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys.iter())
                        .all(|(x, y)| self.structural_eq(*x, *y))
            }
            (ObjKind::Dict(xm), ObjKind::Dict(ym)) => {
                xm.len() == ym.len()
                    && xm.iter().all(|(k, v)| {
                        ym.get(k).is_some_and(|other| self.structural_eq(*v, *other))
                    })
            }
            (ObjKind::Func(x), ObjKind::Func(y)) => std::rc::Rc::ptr_eq(&x.decl, &y.decl),
            _ => false,
        }
    }

    /// The for-in enumeration coercion. Bool/Number become a one-element
    /// array of themselves, strings split into characters, arrays enumerate
    /// their elements, dicts their keys in insertion order; anything else
    /// is a one-element array holding a copy of itself.
    pub fn split(&mut self, id: ObjectId) -> Vec<ObjectId> {
        match self.get(id).kind.clone() {
            ObjKind::Bool(b) => vec![self.alloc(ObjKind::Bool(b))],
            ObjKind::Number(n) => vec![self.alloc(ObjKind::Number(n))],
            ObjKind::Str(s) => s
                .chars()
                .map(|c| self.alloc(ObjKind::Str(c.to_string())))
                .collect(),
            ObjKind::Array(items) => items,
            ObjKind::Dict(map) => map
                .keys()
                .map(|k| self.alloc(ObjKind::Str(k.clone())))
                .collect(),
            _ => vec![self.deep_copy(id)],
        }
    }

    /// Render a value the way the REPL echoes it.
    pub fn printable(&self, id: ObjectId) -> String {
        match &self.get(id).kind {
            ObjKind::Object => "object".to_string(),
            ObjKind::None => "none".to_string(),
            ObjKind::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            ObjKind::Number(n) => format_number(*n),
            ObjKind::Str(s) => s.clone(),
            ObjKind::Array(items) => {
                let parts: Vec<String> = items.iter().map(|item| self.printable(*item)).collect();
                format!("[{}]", parts.join(", "))
            }
            ObjKind::Dict(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{k} = {}", self.printable(*v)))
                    .collect();
                format!("[{}]", parts.join(", "))
            }
            ObjKind::Func(closure) => format!("func({})", closure.decl.name),
            ObjKind::Def(def) => format!("def({})", def.name),
            ObjKind::Class(core) => format!("class({})", core.name),
            ObjKind::Instance(core) => format!("object({})", core.name),
            ObjKind::Lib(lib) => format!("lib({})", lib.name),
            ObjKind::Exception(msg) => format!("exception({msg})"),
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
