mod common;
use kora_runtime::{ModuleLoader, NativeHost, NativeSig, NativeValue};

struct MapLoader(Vec<(&'static str, &'static str)>);

impl ModuleLoader for MapLoader {
    fn load(&mut self, name: &str) -> Result<String, String> {
        self.0
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, src)| src.to_string())
            .ok_or_else(|| format!("module '{name}' not found"))
    }
}

fn runtime_with_modules(modules: Vec<(&'static str, &'static str)>) -> kora_runtime::Runtime {
    let mut rt = common::runtime();
    rt.set_module_loader(Box::new(MapLoader(modules)));
    rt
}

#[test]
fn import_binds_a_dict_of_module_bindings() {
    let mut rt = runtime_with_modules(vec![("consts", "a = 1; b = 2")]);
    let result = rt.run("import consts; consts.a + consts.b", false);
    assert_eq!(result.value, "3");
}

#[test]
fn import_as_renames_the_binding() {
    let mut rt = runtime_with_modules(vec![("verylongname", "answer = 42")]);
    let result = rt.run("import verylongname as v; v.answer", false);
    assert_eq!(result.value, "42");
}

#[test]
fn global_import_pastes_bindings_into_the_importer() {
    let mut rt = runtime_with_modules(vec![("prelude", "tau = 6.28")]);
    let result = rt.run("import prelude global; tau", false);
    assert_eq!(result.value, "6.28");
}

#[test]
fn module_functions_are_callable_through_the_dict() {
    let mut rt = runtime_with_modules(vec![("mathy", "func double(n) { return n * 2 }")]);
    let result = rt.run("import mathy; mathy.double(21)", false);
    assert_eq!(result.value, "42");
}

#[test]
fn missing_modules_raise() {
    let mut rt = runtime_with_modules(vec![]);
    let result = rt.run("import nowhere", false);
    assert!(
        result.value.starts_with("exception(Cannot import 'nowhere'"),
        "{}",
        result.value
    );
    assert_eq!(result.exit_code, 1);
}

#[test]
fn module_exceptions_propagate_to_the_importer() {
    let mut rt = runtime_with_modules(vec![("broken", "1 + \"a\"")]);
    let result = rt.run("import broken", false);
    assert!(result.value.starts_with("exception(Cannot apply"));
}

/// In-process stand-in for a dynamic library: one `add` symbol.
struct AdderHost {
    loaded: Vec<String>,
}

impl NativeHost for AdderHost {
    fn load(&mut self, path: &str) -> Result<usize, String> {
        self.loaded.push(path.to_string());
        Ok(self.loaded.len())
    }

    fn invoke(
        &mut self,
        handle: usize,
        sig: &NativeSig<'_>,
        args: &[NativeValue],
    ) -> Result<NativeValue, String> {
        assert_eq!(handle, 1);
        match sig.name {
            "add" => {
                let mut total = 0.0;
                for arg in args {
                    if let NativeValue::Double(d) = arg {
                        total += d;
                    }
                }
                Ok(NativeValue::Double(total))
            }
            other => Err(format!("Symbol '{other}' not found")),
        }
    }
}

#[test]
fn native_imports_register_descriptor_symbols() {
    let mut rt = runtime_with_modules(vec![("calc", "native add(double, double) double")]);
    rt.set_native_host(Box::new(AdderHost { loaded: Vec::new() }));
    let result = rt.run("import native calc; calc.add(19, 23)", false);
    assert_eq!(result.value, "42");
}

#[test]
fn native_descriptors_outside_a_library_raise() {
    let result = common::run("native add(double, double) double");
    assert_eq!(
        result.value,
        "exception(Cannot create a function definition in this context (just native context))"
    );
}

#[test]
fn native_marshaling_checks_argument_types() {
    let mut rt = runtime_with_modules(vec![("calc", "native add(double, double) double")]);
    rt.set_native_host(Box::new(AdderHost { loaded: Vec::new() }));
    let result = rt.run("import native calc; calc.add(\"x\", 1)", false);
    assert_eq!(result.value, "exception(Cannot marshal 'string' as 'double')");
}
