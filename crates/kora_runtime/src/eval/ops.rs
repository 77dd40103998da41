//! Value-level operator implementations.
//!
//! Dispatch is on operator text; each operator applies a type matrix and
//! mismatches raise `Cannot apply the operator ...` exceptions. Ordering
//! comparisons work by value for numbers and bools and by size for
//! strings, arrays and dicts; equality is structural.
use crate::core::heap::ObjectId;
use crate::core::object::{Members, ObjKind, format_number};
use crate::errors::{self, messages};
use crate::runtime::Runtime;

impl Runtime {
    pub(crate) fn apply_binary(&mut self, op: &str, left: ObjectId, right: ObjectId) -> ObjectId {
        match op {
            "+" => self.op_add(left, right),
            "-" | "/" | "%" | "**" => self.op_arith(op, left, right),
            "*" => self.op_mul(left, right),
            "==" => {
                let eq = self.heap.structural_eq(left, right);
                self.heap.alloc(ObjKind::Bool(eq))
            }
            "!=" | "<>" => {
                let eq = self.heap.structural_eq(left, right);
                self.heap.alloc(ObjKind::Bool(!eq))
            }
            ">" | "<" | ">=" | "<=" => self.op_compare(op, left, right),
            "|" | "&" | "^" | "<<" | ">>" => self.op_bitwise(op, left, right),
            other => self.mismatch(other, left, right),
        }
    }

    pub(crate) fn apply_unary(&mut self, op: &str, value: ObjectId) -> ObjectId {
        match (op, self.number_of(value)) {
            ("+", Some(n)) => self.heap.alloc(ObjKind::Number(n)),
            ("-", Some(n)) => self.heap.alloc(ObjKind::Number(-n)),
            ("~", Some(n)) => self.heap.alloc(ObjKind::Number(!(n as i64) as f64)),
            _ => {
                let ty = self.heap.get(value).type_name();
                self.exception(errors::cannot_apply(op, &ty))
            }
        }
    }

    fn mismatch(&mut self, op: &str, left: ObjectId, right: ObjectId) -> ObjectId {
        let lt = self.heap.get(left).type_name();
        let rt = self.heap.get(right).type_name();
        self.exception(errors::cannot_apply2(op, &lt, &rt))
    }

    fn op_add(&mut self, left: ObjectId, right: ObjectId) -> ObjectId {
        use ObjKind::*;
        let pair = (
            self.heap.get(left).kind.clone(),
            self.heap.get(right).kind.clone(),
        );
        match pair {
            (Bool(x), Bool(y)) => self.heap.alloc(Bool(x || y)),
            (Bool(x), Number(y)) => self.heap.alloc(Number(bool_num(x) + y)),
            (Number(x), Bool(y)) => self.heap.alloc(Number(x + bool_num(y))),
            (Number(x), Number(y)) => self.heap.alloc(Number(x + y)),
            // Concatenation is string-led only; a scalar on the left of a
            // string is a type error.
            (Str(x), Bool(y)) => self.heap.alloc(Str(format!("{x}{}", bool_str(y)))),
            (Str(x), Number(y)) => self.heap.alloc(Str(format!("{x}{}", format_number(y)))),
            (Str(x), Str(y)) => self.heap.alloc(Str(format!("{x}{y}"))),
            (Array(xs), Array(ys)) => {
                let mut items = Vec::with_capacity(xs.len() + ys.len());
                for id in xs.iter().chain(ys.iter()) {
                    items.push(self.heap.deep_copy(*id));
                }
                self.heap.alloc(Array(items))
            }
            (Array(xs), Bool(_) | Number(_) | Str(_)) => {
                let mut items = Vec::with_capacity(xs.len() + 1);
                for id in &xs {
                    items.push(self.heap.deep_copy(*id));
                }
                items.push(self.heap.deep_copy(right));
                self.heap.alloc(Array(items))
            }
            (Dict(xm), Dict(ym)) => {
                // Existing keys win, merge only brings in new ones.
                let mut members = Members::new();
                for (k, v) in xm.iter().chain(ym.iter()) {
                    if !members.contains_key(k) {
                        let copied = self.heap.deep_copy(*v);
                        members.insert(k.clone(), copied);
                    }
                }
                self.heap.alloc(Dict(members))
            }
            _ => self.mismatch("+", left, right),
        }
    }

    fn op_arith(&mut self, op: &str, left: ObjectId, right: ObjectId) -> ObjectId {
        if op == "-" {
            let bool_pair = match (&self.heap.get(left).kind, &self.heap.get(right).kind) {
                (ObjKind::Bool(x), ObjKind::Bool(y)) => Some(*x != *y),
                _ => None,
            };
            if let Some(diff) = bool_pair {
                return self.heap.alloc(ObjKind::Bool(diff));
            }
        }
        let (Some(x), Some(y)) = (self.number_of(left), self.number_of(right)) else {
            return self.mismatch(op, left, right);
        };
        let result = match op {
            "-" => x - y,
            "/" => x / y,
            "%" => {
                let divisor = y as i64;
                if divisor == 0 {
                    return self.exception(messages::DIVISION_BY_ZERO);
                }
                ((x as i64) % divisor) as f64
            }
            "**" => x.powf(y),
            _ => unreachable!("op_arith called with '{op}'"),
        };
        self.heap.alloc(ObjKind::Number(result))
    }

    fn op_mul(&mut self, left: ObjectId, right: ObjectId) -> ObjectId {
        use ObjKind::*;
        let pair = (
            self.heap.get(left).kind.clone(),
            self.heap.get(right).kind.clone(),
        );
        match pair {
            (Bool(x), Bool(y)) => self.heap.alloc(Bool(x && y)),
            (Bool(x), Number(y)) => self.heap.alloc(Number(bool_num(x) * y)),
            (Number(x), Bool(y)) => self.heap.alloc(Number(x * bool_num(y))),
            (Number(x), Number(y)) => self.heap.alloc(Number(x * y)),
            (Str(s), Number(n)) | (Number(n), Str(s)) => {
                let count = if n > 0.0 { n as usize } else { 0 };
                self.heap.alloc(Str(s.repeat(count)))
            }
            (Str(s), Bool(b)) | (Bool(b), Str(s)) => {
                self.heap.alloc(Str(if b { s } else { String::new() }))
            }
            (Array(items), Number(_)) | (Number(_), Array(items)) => {
                let scalar = if matches!(self.heap.get(left).kind, Array(_)) {
                    right
                } else {
                    left
                };
                let mut scaled = Vec::with_capacity(items.len());
                for item in &items {
                    let v = self.op_mul(scalar, *item);
                    if self.is_exception(v) {
                        return v;
                    }
                    scaled.push(v);
                }
                self.heap.alloc(Array(scaled))
            }
            _ => self.mismatch("*", left, right),
        }
    }

    fn op_compare(&mut self, op: &str, left: ObjectId, right: ObjectId) -> ObjectId {
        use ObjKind::*;
        let result = match (&self.heap.get(left).kind, &self.heap.get(right).kind) {
            (Bool(x), Bool(y)) => cmp(op, bool_num(*x), bool_num(*y)),
            (Number(x), Number(y)) => cmp(op, *x, *y),
            (Str(x), Str(y)) => cmp(op, x.len() as f64, y.len() as f64),
            (Array(x), Array(y)) => cmp(op, x.len() as f64, y.len() as f64),
            (Dict(x), Dict(y)) => cmp(op, x.len() as f64, y.len() as f64),
            (None, None) | (Object, Object) => matches!(op, ">=" | "<="),
            _ => false,
        };
        self.heap.alloc(ObjKind::Bool(result))
    }

    fn op_bitwise(&mut self, op: &str, left: ObjectId, right: ObjectId) -> ObjectId {
        let (Some(x), Some(y)) = (self.number_of(left), self.number_of(right)) else {
            return self.mismatch(op, left, right);
        };
        let (xi, yi) = (x as i64, y as i64);
        let result = match op {
            "|" => xi | yi,
            "&" => xi & yi,
            "^" => xi ^ yi,
            "<<" => xi << (yi & 63),
            ">>" => xi >> (yi & 63),
            _ => unreachable!("op_bitwise called with '{op}'"),
        };
        self.heap.alloc(ObjKind::Number(result as f64))
    }

    /// The index matrix. Strings and arrays take numeric indices (negative
    /// values wrap once from the end); dicts take string keys. A single
    /// pick yields the element, several yield a container of the picks.
    pub(crate) fn apply_index(&mut self, base: ObjectId, indices: &[ObjectId]) -> ObjectId {
        match self.heap.get(base).kind.clone() {
            ObjKind::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let mut picked = String::new();
                for id in indices {
                    match self.resolve_numeric_index(*id, chars.len(), "string") {
                        Ok(i) => picked.push(chars[i]),
                        Err(e) => return e,
                    }
                }
                self.heap.alloc(ObjKind::Str(picked))
            }
            ObjKind::Array(items) => {
                let mut picks = Vec::with_capacity(indices.len());
                for id in indices {
                    match self.resolve_numeric_index(*id, items.len(), "array") {
                        Ok(i) => picks.push(items[i]),
                        Err(e) => return e,
                    }
                }
                if picks.len() == 1 {
                    picks[0]
                } else {
                    let copies = picks.iter().map(|p| self.heap.deep_copy(*p)).collect();
                    self.heap.alloc(ObjKind::Array(copies))
                }
            }
            ObjKind::Dict(map) => {
                if indices.is_empty() {
                    return self.heap.alloc(ObjKind::None);
                }
                let mut picks: Vec<(String, ObjectId)> = Vec::with_capacity(indices.len());
                for id in indices {
                    let key = match &self.heap.get(*id).kind {
                        ObjKind::Str(key) => Ok(key.clone()),
                        other => Err(other.tag().name().to_string()),
                    };
                    match key {
                        Ok(key) => match map.get(&key) {
                            Some(value) => picks.push((key, *value)),
                            None => return self.exception(errors::index_missing(&key)),
                        },
                        Err(ty) => {
                            return self.exception(errors::cannot_apply2("[]", "dict", &ty));
                        }
                    }
                }
                if picks.len() == 1 {
                    picks[0].1
                } else {
                    let mut members = Members::new();
                    for (key, value) in picks {
                        let copied = self.heap.deep_copy(value);
                        members.insert(key, copied);
                    }
                    self.heap.alloc(ObjKind::Dict(members))
                }
            }
            other => {
                let ty = other.tag().name();
                self.exception(errors::cannot_apply("[]", ty))
            }
        }
    }

    fn resolve_numeric_index(
        &mut self,
        id: ObjectId,
        len: usize,
        base_ty: &str,
    ) -> Result<usize, ObjectId> {
        let raw = match self.number_of(id) {
            Some(n) => n as i64,
            None => {
                let ty = self.heap.get(id).type_name();
                return Err(self.exception(errors::cannot_apply2("[]", base_ty, &ty)));
            }
        };
        let idx = if raw >= 0 { raw } else { raw + len as i64 };
        if idx >= 0 && (idx as usize) < len {
            Ok(idx as usize)
        } else {
            Err(self.exception(errors::index_out_of_bounds(raw)))
        }
    }
}

fn bool_num(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn bool_str(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

fn cmp(op: &str, x: f64, y: f64) -> bool {
    match op {
        ">" => x > y,
        "<" => x < y,
        ">=" => x >= y,
        "<=" => x <= y,
        _ => false,
    }
}
