//! Runtime façade.
//!
//! Owns the heap, the root environment, the per-type method registries, the
//! injectable collaborators (front end, module loader, native host) and the
//! output buffer. `run` is the whole contract toward the process front end:
//! evaluate program text, report the final value, an exit code, and whether
//! evaluation may continue.
use crate::core::env::Env;
use crate::core::heap::{GC_FLOOR, Heap, ObjectId};
use crate::core::object::{ObjKind, TypeTag};
use crate::modules::{ModuleLoader, StdModuleLoader};
use crate::native::{DlHost, NativeHost};
use ahash::RandomState;
use hashbrown::HashMap;
use kora_ir::{Frontend, Node};

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

/// A native method attached to a runtime type, callable through `value.m()`.
pub type NativeMethod = fn(&mut Runtime, ObjectId, &[ObjectId]) -> Result<ObjectId, String>;

#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Nested `evaluate` calls allowed before a catchable "too deep"
    /// exception is raised. Bounds native stack use of deep language
    /// recursion.
    pub max_depth: usize,
    /// Minimum collection threshold for the heap.
    pub gc_floor: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_depth: 512,
            gc_floor: GC_FLOOR,
        }
    }
}

/// Result of one `run` call.
#[derive(Clone, Debug)]
pub struct ExecResult {
    /// Printable form of the final object.
    pub value: String,
    /// Whether an interactive front end should echo `value`.
    pub echo: bool,
    /// Output accumulated by `print`/`println` during this run.
    pub output: String,
    pub exit_code: i32,
    pub continue_running: bool,
}

pub struct Runtime {
    pub(crate) heap: Heap,
    pub(crate) env: Env,
    pub(crate) output: String,
    pub(crate) config: RuntimeConfig,
    pub(crate) extensions: FastHashMap<(TypeTag, String), ObjectId>,
    pub(crate) methods: FastHashMap<(TypeTag, String), NativeMethod>,
    pub(crate) frontend: Option<Box<dyn Frontend>>,
    pub(crate) module_loader: Box<dyn ModuleLoader>,
    pub(crate) native_host: Box<dyn NativeHost>,
    pub(crate) exit_requested: bool,
    pub(crate) exit_code: i32,
    pub(crate) echo: bool,
    pub(crate) depth: usize,
    /// True while an exception is unwinding. `try` clears it when it
    /// intercepts, so a caught exception flowing onward as a plain value
    /// no longer reads as a failure at the top level.
    pub(crate) propagating: bool,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            heap: Heap::with_floor(config.gc_floor),
            env: Env::new(),
            output: String::new(),
            config,
            extensions: HashMap::default(),
            methods: HashMap::default(),
            frontend: None,
            module_loader: Box::new(StdModuleLoader::default()),
            native_host: Box::new(DlHost::default()),
            exit_requested: false,
            exit_code: 0,
            echo: true,
            depth: 0,
            propagating: false,
        }
    }

    pub fn set_frontend(&mut self, frontend: Box<dyn Frontend>) {
        self.frontend = Some(frontend);
    }

    pub fn set_module_loader(&mut self, loader: Box<dyn ModuleLoader>) {
        self.module_loader = loader;
    }

    pub fn set_native_host(&mut self, host: Box<dyn NativeHost>) {
        self.native_host = host;
    }

    /// Attach a native method to a runtime type; `value.name(...)` resolves
    /// it after the value's own members but before script extensions.
    pub fn register_method(&mut self, type_name: &str, name: &str, method: NativeMethod) {
        self.methods
            .insert((TypeTag::from_name(type_name), name.to_string()), method);
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn root_env(&self) -> &Env {
        &self.env
    }

    /// Evaluate program text. The process front end gets the final value's
    /// printable form, whether to echo it, buffered output, an exit code,
    /// and whether to keep running. Outside interactive mode an uncaught
    /// exception (or a parse failure) yields a non-zero exit code.
    pub fn run(&mut self, source: &str, interactive: bool) -> ExecResult {
        let Some(frontend) = self.frontend.as_ref() else {
            return ExecResult {
                value: "exception(No front end installed)".to_string(),
                echo: true,
                output: std::mem::take(&mut self.output),
                exit_code: 1,
                continue_running: false,
            };
        };
        let root = frontend.parse_text(source);
        self.run_program(&root, interactive)
    }

    /// Evaluate an already-parsed program (e.g. one decoded from the binary
    /// form).
    pub fn run_program(&mut self, root: &Node, interactive: bool) -> ExecResult {
        self.exit_requested = false;
        self.exit_code = 0;
        self.echo = true;
        self.propagating = false;

        let env = self.env.clone();
        let mut result = self.heap.alloc(ObjKind::Object);

        match root {
            Node::Context(stmts) => {
                if stmts.is_empty() {
                    self.echo = false;
                }
                for stmt in stmts.iter() {
                    self.propagating = false;
                    result = self.evaluate(stmt, &env, None);
                    let obj = self.heap.get(result);
                    if (obj.is_exception() && self.propagating) || obj.returned {
                        break;
                    }
                    // Safe point between top-level evaluations.
                    if self.heap.should_collect() {
                        self.collect_garbage(&[result]);
                    }
                }
            }
            other => {
                result = self.evaluate(other, &env, None);
            }
        }
        self.heap.get_mut(result).returned = false;
        self.collect_garbage(&[result]);

        let is_exception = self.heap.get(result).is_exception() && self.propagating;
        let value = self.heap.printable(result);
        let exit_code = if self.exit_requested {
            self.exit_code
        } else if is_exception && !interactive {
            1
        } else {
            0
        };
        ExecResult {
            value,
            echo: self.echo,
            output: std::mem::take(&mut self.output),
            exit_code,
            continue_running: !self.exit_requested && (interactive || !is_exception),
        }
    }

    /// Run a collection with the root environment, registered extensions,
    /// and `extra` as roots (plus whatever sits on the heap's own root
    /// stack).
    pub fn collect_garbage(&mut self, extra: &[ObjectId]) -> usize {
        let mut roots: Vec<ObjectId> = extra.to_vec();
        roots.extend(self.extensions.values().copied());
        let env = self.env.clone();
        self.heap.collect(&roots, &[&env])
    }

    pub(crate) fn write_output(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub(crate) fn exception(&mut self, message: impl Into<String>) -> ObjectId {
        self.propagating = true;
        self.heap.alloc(ObjKind::Exception(message.into()))
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
