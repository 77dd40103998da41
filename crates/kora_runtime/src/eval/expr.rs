//! Expression evaluation: literals, containers, names, assignment,
//! indexing, and the operator forms that need more than a value-level
//! dispatch (short-circuits, member access, ranges, stepping).
use crate::core::env::Env;
use crate::core::heap::ObjectId;
use crate::core::object::{Members, ObjKind};
use crate::errors;
use crate::runtime::Runtime;
use kora_ir::{AssignExpr, BinaryExpr, DictEntry, IndexExpr, Node};

fn is_ignore(node: &Option<Node>) -> bool {
    matches!(node, None | Some(Node::Ignore))
}

impl Runtime {
    pub(crate) fn eval_variable(&mut self, name: &str, env: &Env) -> ObjectId {
        self.echo = true;
        match env.get(name) {
            Some(id) => id,
            None => self.exception(errors::undefined_variable(name)),
        }
    }

    /// Children evaluate left to right; the first exception becomes the
    /// literal's result. Container construction copies its values.
    pub(crate) fn eval_array(&mut self, items: &[Node], env: &Env) -> ObjectId {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let value = self.evaluate(item, env, None);
            if self.is_exception(value) {
                self.echo = true;
                return value;
            }
            values.push(value);
        }
        let copies: Vec<ObjectId> = values.iter().map(|v| self.heap.deep_copy(*v)).collect();
        self.echo = true;
        self.heap.alloc(ObjKind::Array(copies))
    }

    pub(crate) fn eval_dict(&mut self, entries: &[DictEntry], env: &Env) -> ObjectId {
        let mut members = Members::new();
        for entry in entries {
            let value = self.evaluate(&entry.value, env, None);
            if self.is_exception(value) {
                self.echo = true;
                return value;
            }
            let copied = self.heap.deep_copy(value);
            members.insert(entry.key.clone(), copied);
        }
        self.echo = true;
        self.heap.alloc(ObjKind::Dict(members))
    }

    /// Only a plain variable target is supported. A bound value that is
    /// already a persistent root is copied first, so assignment never
    /// aliases another binding.
    pub(crate) fn eval_assign(&mut self, assign: &AssignExpr, env: &Env) -> ObjectId {
        let Node::Variable(name) = &assign.target else {
            return self.exception(errors::unsupported_assignment("this expression"));
        };
        let value = self.evaluate(&assign.value, env, None);
        if self.is_exception(value) {
            return value;
        }
        let value = if self.heap.get(value).saved {
            self.heap.deep_copy(value)
        } else {
            value
        };
        env.set(&mut self.heap, name, value);
        self.heap.get_mut(value).returned = false;
        value
    }

    /// Index expressions flatten any argument that evaluates to an array,
    /// so `m[rows]` with `rows = [0, 2]` picks multiple elements.
    pub(crate) fn eval_index(&mut self, ix: &IndexExpr, env: &Env) -> ObjectId {
        let base = self.evaluate(&ix.base, env, None);
        if self.is_exception(base) {
            return base;
        }
        let mut flat: Vec<ObjectId> = Vec::with_capacity(ix.args.len());
        for arg in ix.args.iter() {
            let value = self.evaluate(arg, env, None);
            if self.is_exception(value) {
                return value;
            }
            match &self.heap.get(value).kind {
                ObjKind::Array(items) => flat.extend(items.iter().copied()),
                _ => flat.push(value),
            }
        }
        self.apply_index(base, &flat)
    }

    pub(crate) fn eval_binary(&mut self, binary: &BinaryExpr, env: &Env) -> ObjectId {
        let op = binary.op.as_str();
        match op {
            "&&" => {
                let left = self.eval_operand(&binary.left, op, env);
                if self.is_exception(left) {
                    return left;
                }
                if !self.truthy(left) {
                    return self.heap.alloc(ObjKind::Bool(false));
                }
                let right = self.eval_operand(&binary.right, op, env);
                if self.is_exception(right) {
                    return right;
                }
                let truth = self.truthy(right);
                self.heap.alloc(ObjKind::Bool(truth))
            }
            "||" => {
                let left = self.eval_operand(&binary.left, op, env);
                if self.is_exception(left) {
                    return left;
                }
                if self.truthy(left) {
                    return self.heap.alloc(ObjKind::Bool(true));
                }
                let right = self.eval_operand(&binary.right, op, env);
                if self.is_exception(right) {
                    return right;
                }
                let truth = self.truthy(right);
                self.heap.alloc(ObjKind::Bool(truth))
            }
            "." => self.eval_member(binary, env),
            ":" => self.eval_range(binary, env),
            "in" => {
                let left = self.eval_operand(&binary.left, op, env);
                if self.is_exception(left) {
                    return left;
                }
                let right = self.eval_operand(&binary.right, op, env);
                if self.is_exception(right) {
                    return right;
                }
                let parts = self.heap.split(right);
                let found = parts.iter().any(|part| self.heap.structural_eq(left, *part));
                self.heap.alloc(ObjKind::Bool(found))
            }
            "++" | "--" => self.eval_step(binary, env),
            "!" => {
                let operand = if !is_ignore(&binary.left) {
                    &binary.left
                } else {
                    &binary.right
                };
                let value = self.eval_operand(operand, op, env);
                if self.is_exception(value) {
                    return value;
                }
                let falsy = self.heap.get(value).is_false();
                self.heap.alloc(ObjKind::Bool(falsy))
            }
            _ => {
                if is_ignore(&binary.left) && matches!(op, "+" | "-" | "~") {
                    let value = self.eval_operand(&binary.right, op, env);
                    if self.is_exception(value) {
                        return value;
                    }
                    return self.apply_unary(op, value);
                }
                if is_ignore(&binary.right) && op == "~" {
                    let value = self.eval_operand(&binary.left, op, env);
                    if self.is_exception(value) {
                        return value;
                    }
                    return self.apply_unary(op, value);
                }
                let left = self.eval_operand(&binary.left, op, env);
                if self.is_exception(left) {
                    return left;
                }
                let right = self.eval_operand(&binary.right, op, env);
                if self.is_exception(right) {
                    return right;
                }
                self.apply_binary(op, left, right)
            }
        }
    }

    fn eval_operand(&mut self, operand: &Option<Node>, op: &str, env: &Env) -> ObjectId {
        match operand {
            Some(node) => self.evaluate(node, env, None),
            None => self.exception(errors::cannot_apply(op, "nothing")),
        }
    }

    /// `a.name` reads a member; `a.name(...)` dispatches a method with the
    /// receiver bound to `this`.
    fn eval_member(&mut self, binary: &BinaryExpr, env: &Env) -> ObjectId {
        let receiver = self.eval_operand(&binary.left, ".", env);
        if self.is_exception(receiver) {
            return receiver;
        }
        match &binary.right {
            Some(Node::Variable(name)) => self.member_get(receiver, name),
            Some(Node::Call(call)) => {
                let Node::Variable(method) = &call.callee else {
                    let ty = self.heap.get(receiver).type_name();
                    return self.exception(errors::cannot_apply2(".", &ty, "this operand"));
                };
                let method = method.clone();
                let mut args = Vec::with_capacity(call.args.len());
                for arg in call.args.iter() {
                    let value = self.evaluate(arg, env, None);
                    if self.is_exception(value) {
                        return value;
                    }
                    args.push(value);
                }
                self.call_method(receiver, &method, &args)
            }
            _ => {
                let ty = self.heap.get(receiver).type_name();
                self.exception(errors::cannot_apply2(".", &ty, "this operand"))
            }
        }
    }

    pub(crate) fn member_get(&mut self, receiver: ObjectId, name: &str) -> ObjectId {
        enum Found {
            Member(ObjectId),
            Missing,
            WrongType(String),
        }
        let found = match &self.heap.get(receiver).kind {
            ObjKind::Dict(map) => match map.get(name) {
                Some(id) => Found::Member(*id),
                None => Found::Missing,
            },
            ObjKind::Instance(core) => match core.env.get(name) {
                Some(id) => Found::Member(id),
                None => Found::Missing,
            },
            ObjKind::Lib(lib) => {
                let mut member = Found::Missing;
                for def in &lib.defs {
                    if let ObjKind::Def(binding) = &self.heap.get(*def).kind {
                        if binding.name == name {
                            member = Found::Member(*def);
                            break;
                        }
                    }
                }
                member
            }
            other => Found::WrongType(other.tag().name().to_string()),
        };
        match found {
            Found::Member(id) => id,
            Found::Missing => self.exception(errors::index_missing(name)),
            Found::WrongType(ty) => self.exception(errors::cannot_apply2(".", &ty, "a name")),
        }
    }

    /// `a:b` / `a:step:b` materializes the inclusive range as an array.
    fn eval_range(&mut self, binary: &BinaryExpr, env: &Env) -> ObjectId {
        let from = self.eval_operand(&binary.left, ":", env);
        if self.is_exception(from) {
            return from;
        }
        let step = match &binary.middle {
            Some(node) => {
                let step = self.evaluate(node, env, None);
                if self.is_exception(step) {
                    return step;
                }
                Some(step)
            }
            None => None,
        };
        let to = self.eval_operand(&binary.right, ":", env);
        if self.is_exception(to) {
            return to;
        }

        let (Some(from_n), Some(to_n)) = (self.number_of(from), self.number_of(to)) else {
            let lt = self.heap.get(from).type_name();
            let rt = self.heap.get(to).type_name();
            return self.exception(errors::cannot_apply2(":", &lt, &rt));
        };
        let step_n = match step {
            Some(id) => match self.number_of(id) {
                Some(n) => n,
                None => {
                    let ty = self.heap.get(id).type_name();
                    return self.exception(errors::cannot_apply2(":", "number", &ty));
                }
            },
            None => {
                if from_n > to_n {
                    -1.0
                } else {
                    1.0
                }
            }
        };
        if step_n == 0.0 {
            return self.exception(errors::cannot_apply2(":", "number", "a zero step"));
        }

        let mut items = Vec::new();
        let mut v = from_n;
        while (step_n > 0.0 && v <= to_n) || (step_n < 0.0 && v >= to_n) {
            items.push(self.heap.alloc(ObjKind::Number(v)));
            v += step_n;
        }
        self.heap.alloc(ObjKind::Array(items))
    }

    /// Prefix/postfix `++`/`--`. On a plain variable operand the stepped
    /// value is stored back through the environment.
    fn eval_step(&mut self, binary: &BinaryExpr, env: &Env) -> ObjectId {
        let op = binary.op.as_str();
        let delta = if op == "++" { 1.0 } else { -1.0 };
        let operand = if !is_ignore(&binary.left) {
            &binary.left
        } else {
            &binary.right
        };
        if let Some(Node::Variable(name)) = operand {
            let Some(current) = env.get(name) else {
                return self.exception(errors::undefined_variable(name));
            };
            let Some(n) = self.number_of(current) else {
                let ty = self.heap.get(current).type_name();
                return self.exception(errors::cannot_apply(op, &ty));
            };
            let stepped = self.heap.alloc(ObjKind::Number(n + delta));
            env.set(&mut self.heap, name, stepped);
            return stepped;
        }
        let value = self.eval_operand(operand, op, env);
        if self.is_exception(value) {
            return value;
        }
        match self.number_of(value) {
            Some(n) => self.heap.alloc(ObjKind::Number(n + delta)),
            None => {
                let ty = self.heap.get(value).type_name();
                self.exception(errors::cannot_apply(op, &ty))
            }
        }
    }

    pub(crate) fn number_of(&self, id: ObjectId) -> Option<f64> {
        match &self.heap.get(id).kind {
            ObjKind::Number(n) => Some(*n),
            ObjKind::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}
