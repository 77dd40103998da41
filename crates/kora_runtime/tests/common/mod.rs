use kora_driver::Driver;
use kora_runtime::{ExecResult, Runtime};

#[allow(dead_code)]
pub fn runtime() -> Runtime {
    let mut rt = Runtime::new();
    rt.set_frontend(Box::new(Driver::new()));
    rt
}

#[allow(dead_code)]
pub fn run(src: &str) -> ExecResult {
    runtime().run(src, false)
}

#[allow(dead_code)]
pub fn run_value(src: &str) -> String {
    let result = run(src);
    assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.value);
    result.value
}

#[allow(dead_code)]
pub fn run_output(src: &str) -> String {
    let result = run(src);
    assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.value);
    result.output
}
