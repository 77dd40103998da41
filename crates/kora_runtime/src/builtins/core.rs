//! `print`/`println`, `input`, `type`.
use crate::core::heap::ObjectId;
use crate::core::object::ObjKind;
use crate::runtime::Runtime;
use std::io::BufRead;

impl Runtime {
    /// Arguments joined with a single space; the space is dropped after an
    /// argument that renders as a terminal style sequence. `println`
    /// resets styling and appends a newline. The result is a copy of the
    /// last argument.
    pub(crate) fn builtin_print(&mut self, args: &[ObjectId], newline: bool) -> ObjectId {
        let mut result = self.heap.alloc(ObjKind::Object);
        for (i, arg) in args.iter().enumerate() {
            result = self.heap.deep_copy(*arg);
            let text = self.display_string(*arg);
            let wants_space = i + 1 < args.len() && !text.starts_with('\u{1b}');
            self.write_output(&text);
            if wants_space {
                self.write_output(" ");
            }
        }
        if newline {
            self.write_output("\u{1b}[0m");
            self.write_output("\n");
        }
        self.echo = false;
        result
    }

    /// Printable form of a value, honoring a `toString` member, native
    /// method, or extension if the value's type carries one.
    pub(crate) fn display_string(&mut self, id: ObjectId) -> String {
        if let Some(result) = self.try_call_method(id, "toString", &[]) {
            if !self.is_exception(result) {
                return self.heap.printable(result);
            }
        }
        self.heap.printable(id)
    }

    /// Print the arguments as a prompt, then read one line.
    pub(crate) fn builtin_input(&mut self, args: &[ObjectId]) -> ObjectId {
        for (i, arg) in args.iter().enumerate() {
            let text = self.heap.printable(*arg);
            self.write_output(&text);
            if i + 1 < args.len() {
                self.write_output(" ");
            }
        }
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        self.echo = true;
        self.heap.alloc(ObjKind::Str(line))
    }

    /// Type name of the argument; an array of names for several arguments,
    /// none for zero.
    pub(crate) fn builtin_type(&mut self, args: &[ObjectId]) -> ObjectId {
        self.echo = true;
        match args {
            [] => self.heap.alloc(ObjKind::None),
            [single] => {
                let name = self.heap.get(*single).type_name();
                self.heap.alloc(ObjKind::Str(name))
            }
            many => {
                let names: Vec<ObjectId> = many
                    .iter()
                    .map(|arg| {
                        let name = self.heap.get(*arg).type_name();
                        self.heap.alloc(ObjKind::Str(name))
                    })
                    .collect();
                self.heap.alloc(ObjKind::Array(names))
            }
        }
    }
}
