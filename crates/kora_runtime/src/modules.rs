//! Script module loading.
//!
//! `import name` resolves module source text through this injectable
//! boundary; the runtime parses and evaluates whatever comes back.
use std::path::PathBuf;

pub trait ModuleLoader {
    fn load(&mut self, name: &str) -> Result<String, String>;
}

/// File-based loader: `<root>/<name>.kora`.
pub struct StdModuleLoader {
    pub root: PathBuf,
}

impl Default for StdModuleLoader {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl ModuleLoader for StdModuleLoader {
    fn load(&mut self, name: &str) -> Result<String, String> {
        let path = self.root.join(format!("{name}.kora"));
        std::fs::read_to_string(&path).map_err(|e| format!("{}: {e}", path.display()))
    }
}
