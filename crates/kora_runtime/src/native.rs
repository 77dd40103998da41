//! Native-extension boundary.
//!
//! The evaluator reaches native code through `NativeHost`: `load` turns a
//! library path into an opaque handle, `invoke` calls one symbol with
//! arguments marshaled by the primitive type names a library descriptor
//! declares (`none bool int char float double string`). `DlHost` backs the
//! boundary with `dlopen`/`dlsym` and supports the common C signatures
//! over those primitives; embedders with richer needs supply their own
//! host. Extension-module internals stay outside the core.
use crate::core::heap::{Heap, ObjectId};
use crate::core::object::{ObjKind, format_number};
use std::ffi::{CStr, CString, c_void};

#[derive(Clone, Debug, PartialEq)]
pub enum NativeValue {
    None,
    Bool(bool),
    Int(i64),
    Char(char),
    Float(f32),
    Double(f64),
    Str(String),
}

/// One symbol's declared marshaling signature.
pub struct NativeSig<'a> {
    pub name: &'a str,
    pub params: &'a [String],
    pub ret: &'a str,
}

pub trait NativeHost {
    /// `(library path) → handle`.
    fn load(&mut self, path: &str) -> Result<usize, String>;
    /// `(handle, signature, marshaled args) → marshaled result`.
    fn invoke(
        &mut self,
        handle: usize,
        sig: &NativeSig<'_>,
        args: &[NativeValue],
    ) -> Result<NativeValue, String>;
}

/// `dlopen`/`dlsym`-backed host. Handles are indices into the open-library
/// table; libraries stay open for the process lifetime.
#[derive(Default)]
pub struct DlHost {
    libs: Vec<*mut c_void>,
}

impl DlHost {
    fn open(&mut self, path: &str) -> Result<usize, String> {
        let c_path =
            CString::new(path).map_err(|_| format!("Invalid library path '{path}'"))?;
        let lib = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW) };
        if lib.is_null() {
            let err = unsafe { libc::dlerror() };
            let reason = if err.is_null() {
                "dlopen failed".to_string()
            } else {
                unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
            };
            return Err(reason);
        }
        self.libs.push(lib);
        Ok(self.libs.len())
    }

    fn symbol(&self, handle: usize, name: &str) -> Result<*mut c_void, String> {
        let lib = self
            .libs
            .get(handle.wrapping_sub(1))
            .copied()
            .ok_or_else(|| format!("Unknown library handle {handle}"))?;
        let c_name = CString::new(name).map_err(|_| format!("Invalid symbol name '{name}'"))?;
        let sym = unsafe { libc::dlsym(lib, c_name.as_ptr()) };
        if sym.is_null() {
            return Err(format!("Symbol '{name}' not found"));
        }
        Ok(sym)
    }
}

impl NativeHost for DlHost {
    fn load(&mut self, path: &str) -> Result<usize, String> {
        // Try the path as given, then the conventional shared-object name.
        match self.open(path) {
            Ok(handle) => Ok(handle),
            Err(first) => self.open(&format!("lib{path}.so")).map_err(|_| first),
        }
    }

    fn invoke(
        &mut self,
        handle: usize,
        sig: &NativeSig<'_>,
        args: &[NativeValue],
    ) -> Result<NativeValue, String> {
        let sym = self.symbol(handle, sig.name)?;
        let params: Vec<&str> = sig.params.iter().map(|p| p.as_str()).collect();
        let arg = |i: usize| args.get(i).cloned().unwrap_or(NativeValue::None);

        unsafe {
            use std::mem::transmute;
            match (sig.ret, params.as_slice()) {
                ("none", []) => {
                    let f: unsafe extern "C" fn() = transmute(sym);
                    f();
                    Ok(NativeValue::None)
                }
                ("bool", []) => {
                    let f: unsafe extern "C" fn() -> libc::c_int = transmute(sym);
                    Ok(NativeValue::Bool(f() != 0))
                }
                ("int", []) => {
                    let f: unsafe extern "C" fn() -> libc::c_int = transmute(sym);
                    Ok(NativeValue::Int(f() as i64))
                }
                ("double", []) => {
                    let f: unsafe extern "C" fn() -> f64 = transmute(sym);
                    Ok(NativeValue::Double(f()))
                }
                ("string", []) => {
                    let f: unsafe extern "C" fn() -> *const libc::c_char = transmute(sym);
                    Ok(c_str_value(f()))
                }
                ("double", ["double"]) => {
                    let f: unsafe extern "C" fn(f64) -> f64 = transmute(sym);
                    Ok(NativeValue::Double(f(as_double(&arg(0)))))
                }
                ("double", ["double", "double"]) => {
                    let f: unsafe extern "C" fn(f64, f64) -> f64 = transmute(sym);
                    Ok(NativeValue::Double(f(as_double(&arg(0)), as_double(&arg(1)))))
                }
                ("int", ["int"]) => {
                    let f: unsafe extern "C" fn(libc::c_int) -> libc::c_int = transmute(sym);
                    Ok(NativeValue::Int(f(as_int(&arg(0)) as libc::c_int) as i64))
                }
                ("int", ["int", "int"]) => {
                    let f: unsafe extern "C" fn(libc::c_int, libc::c_int) -> libc::c_int =
                        transmute(sym);
                    Ok(NativeValue::Int(f(
                        as_int(&arg(0)) as libc::c_int,
                        as_int(&arg(1)) as libc::c_int,
                    ) as i64))
                }
                ("none", ["string"]) => {
                    let text = as_cstring(&arg(0))?;
                    let f: unsafe extern "C" fn(*const libc::c_char) = transmute(sym);
                    f(text.as_ptr());
                    Ok(NativeValue::None)
                }
                ("int", ["string"]) => {
                    let text = as_cstring(&arg(0))?;
                    let f: unsafe extern "C" fn(*const libc::c_char) -> libc::c_int =
                        transmute(sym);
                    Ok(NativeValue::Int(f(text.as_ptr()) as i64))
                }
                ("string", ["string"]) => {
                    let text = as_cstring(&arg(0))?;
                    let f: unsafe extern "C" fn(*const libc::c_char) -> *const libc::c_char =
                        transmute(sym);
                    Ok(c_str_value(f(text.as_ptr())))
                }
                _ => Err(format!(
                    "Unsupported native signature for '{}' ({} -> {})",
                    sig.name,
                    params.join(", "),
                    sig.ret
                )),
            }
        }
    }
}

fn as_double(value: &NativeValue) -> f64 {
    match value {
        NativeValue::Double(d) => *d,
        NativeValue::Float(f) => *f as f64,
        NativeValue::Int(i) => *i as f64,
        NativeValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

fn as_int(value: &NativeValue) -> i64 {
    match value {
        NativeValue::Int(i) => *i,
        NativeValue::Double(d) => *d as i64,
        NativeValue::Float(f) => *f as i64,
        NativeValue::Bool(b) => *b as i64,
        NativeValue::Char(c) => *c as i64,
        _ => 0,
    }
}

fn as_cstring(value: &NativeValue) -> Result<CString, String> {
    let text = match value {
        NativeValue::Str(s) => s.clone(),
        other => format!("{other:?}"),
    };
    CString::new(text).map_err(|_| "String argument contains a NUL byte".to_string())
}

fn c_str_value(ptr: *const libc::c_char) -> NativeValue {
    if ptr.is_null() {
        return NativeValue::None;
    }
    let text = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    NativeValue::Str(text)
}

/// Object → marshaled value, by declared type name. A missing argument
/// marshals to that type's zero value.
pub(crate) fn object_to_native(
    heap: &Heap,
    id: Option<ObjectId>,
    ty: &str,
) -> Result<NativeValue, String> {
    let Some(id) = id else {
        return Ok(match ty {
            "bool" => NativeValue::Bool(false),
            "int" => NativeValue::Int(0),
            "char" => NativeValue::Char('\0'),
            "float" => NativeValue::Float(0.0),
            "double" => NativeValue::Double(0.0),
            "string" => NativeValue::Str(String::new()),
            _ => NativeValue::None,
        });
    };
    let obj = heap.get(id);
    let number = match &obj.kind {
        ObjKind::Number(n) => Some(*n),
        ObjKind::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    match ty {
        "none" => Ok(NativeValue::None),
        "bool" => Ok(NativeValue::Bool(obj.is_true())),
        "int" => match number {
            Some(n) => Ok(NativeValue::Int(n as i64)),
            None => Err(marshal_error(obj.type_name(), ty)),
        },
        "char" => match &obj.kind {
            ObjKind::Number(n) => Ok(NativeValue::Char(
                char::from_u32(*n as u32).unwrap_or('\0'),
            )),
            ObjKind::Str(s) => Ok(NativeValue::Char(s.chars().next().unwrap_or('\0'))),
            _ => Err(marshal_error(obj.type_name(), ty)),
        },
        "float" => match number {
            Some(n) => Ok(NativeValue::Float(n as f32)),
            None => Err(marshal_error(obj.type_name(), ty)),
        },
        "double" => match number {
            Some(n) => Ok(NativeValue::Double(n)),
            None => Err(marshal_error(obj.type_name(), ty)),
        },
        "string" => match &obj.kind {
            ObjKind::Str(s) => Ok(NativeValue::Str(s.clone())),
            ObjKind::Number(n) => Ok(NativeValue::Str(format_number(*n))),
            _ => Ok(NativeValue::Str(heap.printable(id))),
        },
        other => Err(format!("Unknown native type '{other}'")),
    }
}

pub(crate) fn native_to_object(heap: &mut Heap, value: NativeValue) -> ObjectId {
    let kind = match value {
        NativeValue::None => ObjKind::None,
        NativeValue::Bool(b) => ObjKind::Bool(b),
        NativeValue::Int(i) => ObjKind::Number(i as f64),
        NativeValue::Char(c) => ObjKind::Str(c.to_string()),
        NativeValue::Float(f) => ObjKind::Number(f as f64),
        NativeValue::Double(d) => ObjKind::Number(d),
        NativeValue::Str(s) => ObjKind::Str(s),
    };
    heap.alloc(kind)
}

fn marshal_error(from: String, to: &str) -> String {
    format!("Cannot marshal '{from}' as '{to}'")
}
