//! Binary encoding of parsed programs.
//!
//! Depth-first pre-order: every node starts with a 4-byte little-endian tag,
//! followed by its fields in declaration order. Counts are 4-byte integers
//! written immediately before each variable-length list; strings are a
//! 4-byte length followed by raw bytes with no terminator; numbers are
//! 8-byte IEEE doubles; flags and option-presence markers are single bytes.
//! Decoding rebuilds a tree structurally and value-equal to the encoded one.
use crate::ast::*;
use kora_syntax::Pos;
use std::fmt;
use std::rc::Rc;

mod tag {
    pub const IGNORE: u32 = 1;
    pub const ERROR: u32 = 2;
    pub const NONE: u32 = 3;
    pub const VARIABLE: u32 = 4;
    pub const BOOL: u32 = 5;
    pub const NUMBER: u32 = 6;
    pub const STRING: u32 = 7;
    pub const ARRAY: u32 = 8;
    pub const DICT: u32 = 9;
    pub const INDEX: u32 = 10;
    pub const ASSIGN: u32 = 11;
    pub const BINARY: u32 = 12;
    pub const RETURN: u32 = 13;
    pub const LET: u32 = 14;
    pub const LAMBDA: u32 = 15;
    pub const FUNCTION: u32 = 16;
    pub const NATIVE_DEF: u32 = 17;
    pub const EXTENSION: u32 = 18;
    pub const IF: u32 = 19;
    pub const FOR: u32 = 20;
    pub const WHILE: u32 = 21;
    pub const DO_WHILE: u32 = 22;
    pub const CONTEXT: u32 = 23;
    pub const CALL: u32 = 24;
    pub const IMPORT: u32 = 25;
    pub const TRY: u32 = 26;
    pub const CLASS: u32 = 27;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    UnexpectedEof,
    BadTag(u32),
    InvalidUtf8,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEof => write!(f, "unexpected end of encoded program"),
            DecodeError::BadTag(t) => write!(f, "unknown node tag {t}"),
            DecodeError::InvalidUtf8 => write!(f, "invalid utf-8 in encoded string"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Encode a parsed program.
pub fn encode(node: &Node) -> Vec<u8> {
    let mut buf = Vec::new();
    write_node(&mut buf, node);
    buf
}

/// Decode an encoded program. The entire input must be consumed.
pub fn decode(data: &[u8]) -> Result<Node, DecodeError> {
    let mut r = Reader { data, i: 0 };
    let node = read_node(&mut r)?;
    if r.i != data.len() {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(node)
}

fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_flag(buf: &mut Vec<u8>, v: bool) {
    buf.push(v as u8);
}

fn write_str(buf: &mut Vec<u8>, s: &str) {
    write_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

fn write_names(buf: &mut Vec<u8>, names: &[String]) {
    write_u32(buf, names.len() as u32);
    for n in names {
        write_str(buf, n);
    }
}

fn write_nodes(buf: &mut Vec<u8>, nodes: &[Node]) {
    write_u32(buf, nodes.len() as u32);
    for n in nodes {
        write_node(buf, n);
    }
}

fn write_opt_node(buf: &mut Vec<u8>, node: Option<&Node>) {
    match node {
        Some(n) => {
            write_flag(buf, true);
            write_node(buf, n);
        }
        None => write_flag(buf, false),
    }
}

fn write_decl(buf: &mut Vec<u8>, decl: &FuncDecl) {
    write_str(buf, &decl.name);
    write_names(buf, &decl.params);
    write_node(buf, &decl.body);
}

fn write_node(buf: &mut Vec<u8>, node: &Node) {
    match node {
        Node::Ignore => write_u32(buf, tag::IGNORE),
        Node::Error(e) => {
            write_u32(buf, tag::ERROR);
            write_str(buf, &e.message);
            write_u32(buf, e.pos.row);
            write_u32(buf, e.pos.col);
        }
        Node::None => write_u32(buf, tag::NONE),
        Node::Variable(name) => {
            write_u32(buf, tag::VARIABLE);
            write_str(buf, name);
        }
        Node::Bool(b) => {
            write_u32(buf, tag::BOOL);
            write_flag(buf, *b);
        }
        Node::Number(n) => {
            write_u32(buf, tag::NUMBER);
            write_f64(buf, *n);
        }
        Node::Str(s) => {
            write_u32(buf, tag::STRING);
            write_str(buf, s);
        }
        Node::Array(items) => {
            write_u32(buf, tag::ARRAY);
            write_nodes(buf, items);
        }
        Node::Dict(entries) => {
            write_u32(buf, tag::DICT);
            write_u32(buf, entries.len() as u32);
            for e in entries.iter() {
                write_str(buf, &e.key);
                write_node(buf, &e.value);
            }
        }
        Node::Index(ix) => {
            write_u32(buf, tag::INDEX);
            write_node(buf, &ix.base);
            write_nodes(buf, &ix.args);
        }
        Node::Assign(a) => {
            write_u32(buf, tag::ASSIGN);
            write_node(buf, &a.target);
            write_node(buf, &a.value);
        }
        Node::Binary(b) => {
            write_u32(buf, tag::BINARY);
            write_str(buf, &b.op);
            write_opt_node(buf, b.left.as_ref());
            write_opt_node(buf, b.middle.as_ref());
            write_opt_node(buf, b.right.as_ref());
        }
        Node::Return(body) => {
            write_u32(buf, tag::RETURN);
            write_node(buf, body);
        }
        Node::Let(l) => {
            write_u32(buf, tag::LET);
            write_nodes(buf, &l.bindings);
            write_node(buf, &l.body);
        }
        Node::Lambda(d) => {
            write_u32(buf, tag::LAMBDA);
            write_decl(buf, d);
        }
        Node::Function(d) => {
            write_u32(buf, tag::FUNCTION);
            write_decl(buf, d);
        }
        Node::NativeDef(d) => {
            write_u32(buf, tag::NATIVE_DEF);
            write_str(buf, &d.name);
            write_names(buf, &d.params);
            write_str(buf, &d.ret);
        }
        Node::Extension(e) => {
            write_u32(buf, tag::EXTENSION);
            write_str(buf, &e.target);
            write_decl(buf, &e.func);
        }
        Node::If(i) => {
            write_u32(buf, tag::IF);
            write_node(buf, &i.cond);
            write_node(buf, &i.then);
            write_opt_node(buf, i.els.as_ref());
        }
        Node::For(f) => {
            write_u32(buf, tag::FOR);
            write_nodes(buf, &f.clauses);
            write_node(buf, &f.body);
        }
        Node::While(w) => {
            write_u32(buf, tag::WHILE);
            write_node(buf, &w.cond);
            write_node(buf, &w.body);
        }
        Node::DoWhile(w) => {
            write_u32(buf, tag::DO_WHILE);
            write_node(buf, &w.cond);
            write_node(buf, &w.body);
        }
        Node::Context(stmts) => {
            write_u32(buf, tag::CONTEXT);
            write_nodes(buf, stmts);
        }
        Node::Call(c) => {
            write_u32(buf, tag::CALL);
            write_flag(buf, c.construct);
            write_node(buf, &c.callee);
            write_nodes(buf, &c.args);
        }
        Node::Import(im) => {
            write_u32(buf, tag::IMPORT);
            write_flag(buf, im.native);
            write_u32(buf, im.items.len() as u32);
            for item in im.items.iter() {
                write_str(buf, &item.name);
                match &item.target {
                    ImportTarget::Name => buf.push(0),
                    ImportTarget::Alias(a) => {
                        buf.push(1);
                        write_str(buf, a);
                    }
                    ImportTarget::Global => buf.push(2),
                }
            }
        }
        Node::Try(t) => {
            write_u32(buf, tag::TRY);
            write_node(buf, &t.body);
            match &t.handler {
                Some(h) => {
                    write_flag(buf, true);
                    match &h.var {
                        Some(v) => {
                            write_flag(buf, true);
                            write_str(buf, v);
                        }
                        None => write_flag(buf, false),
                    }
                    write_node(buf, &h.body);
                }
                None => write_flag(buf, false),
            }
        }
        Node::Class(c) => {
            write_u32(buf, tag::CLASS);
            write_str(buf, &c.name);
            write_names(buf, &c.bases);
            write_node(buf, &c.body);
        }
    }
}

struct Reader<'a> {
    data: &'a [u8],
    i: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.i + n > self.data.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let s = &self.data[self.i..self.i + n];
        self.i += n;
        Ok(s)
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_f64(&mut self) -> Result<f64, DecodeError> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(f64::from_le_bytes(raw))
    }

    fn read_flag(&mut self) -> Result<bool, DecodeError> {
        Ok(self.take(1)?[0] != 0)
    }

    fn read_str(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    fn read_names(&mut self) -> Result<Box<[String]>, DecodeError> {
        let count = self.read_u32()? as usize;
        let mut names = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            names.push(self.read_str()?);
        }
        Ok(names.into_boxed_slice())
    }
}

fn read_nodes(r: &mut Reader<'_>) -> Result<Box<[Node]>, DecodeError> {
    let count = r.read_u32()? as usize;
    let mut nodes = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        nodes.push(read_node(r)?);
    }
    Ok(nodes.into_boxed_slice())
}

fn read_opt_node(r: &mut Reader<'_>) -> Result<Option<Node>, DecodeError> {
    if r.read_flag()? {
        Ok(Some(read_node(r)?))
    } else {
        Ok(None)
    }
}

fn read_decl(r: &mut Reader<'_>) -> Result<FuncDecl, DecodeError> {
    let name = r.read_str()?;
    let params = r.read_names()?;
    let body = read_node(r)?;
    Ok(FuncDecl { name, params, body })
}

fn read_node(r: &mut Reader<'_>) -> Result<Node, DecodeError> {
    let tag = r.read_u32()?;
    let node = match tag {
        tag::IGNORE => Node::Ignore,
        tag::ERROR => {
            let message = r.read_str()?;
            let row = r.read_u32()?;
            let col = r.read_u32()?;
            Node::Error(Box::new(ParseError {
                message,
                pos: Pos::new(row, col),
            }))
        }
        tag::NONE => Node::None,
        tag::VARIABLE => Node::Variable(r.read_str()?),
        tag::BOOL => Node::Bool(r.read_flag()?),
        tag::NUMBER => Node::Number(r.read_f64()?),
        tag::STRING => Node::Str(r.read_str()?),
        tag::ARRAY => Node::Array(read_nodes(r)?),
        tag::DICT => {
            let count = r.read_u32()? as usize;
            let mut entries = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                let key = r.read_str()?;
                let value = read_node(r)?;
                entries.push(DictEntry { key, value });
            }
            Node::Dict(entries.into_boxed_slice())
        }
        tag::INDEX => {
            let base = read_node(r)?;
            let args = read_nodes(r)?;
            Node::Index(Box::new(IndexExpr { base, args }))
        }
        tag::ASSIGN => {
            let target = read_node(r)?;
            let value = read_node(r)?;
            Node::Assign(Box::new(AssignExpr { target, value }))
        }
        tag::BINARY => {
            let op = r.read_str()?;
            let left = read_opt_node(r)?;
            let middle = read_opt_node(r)?;
            let right = read_opt_node(r)?;
            Node::Binary(Box::new(BinaryExpr {
                op,
                left,
                middle,
                right,
            }))
        }
        tag::RETURN => Node::Return(Box::new(read_node(r)?)),
        tag::LET => {
            let bindings = read_nodes(r)?;
            let body = read_node(r)?;
            Node::Let(Box::new(LetExpr { bindings, body }))
        }
        tag::LAMBDA => Node::Lambda(Rc::new(read_decl(r)?)),
        tag::FUNCTION => Node::Function(Rc::new(read_decl(r)?)),
        tag::NATIVE_DEF => {
            let name = r.read_str()?;
            let params = r.read_names()?;
            let ret = r.read_str()?;
            Node::NativeDef(Box::new(NativeDecl { name, params, ret }))
        }
        tag::EXTENSION => {
            let target = r.read_str()?;
            let func = Rc::new(read_decl(r)?);
            Node::Extension(Box::new(ExtensionDecl { target, func }))
        }
        tag::IF => {
            let cond = read_node(r)?;
            let then = read_node(r)?;
            let els = read_opt_node(r)?;
            Node::If(Box::new(IfExpr { cond, then, els }))
        }
        tag::FOR => {
            let clauses = read_nodes(r)?;
            let body = read_node(r)?;
            Node::For(Box::new(ForExpr { clauses, body }))
        }
        tag::WHILE => {
            let cond = read_node(r)?;
            let body = read_node(r)?;
            Node::While(Box::new(WhileExpr { cond, body }))
        }
        tag::DO_WHILE => {
            let cond = read_node(r)?;
            let body = read_node(r)?;
            Node::DoWhile(Box::new(WhileExpr { cond, body }))
        }
        tag::CONTEXT => Node::Context(read_nodes(r)?),
        tag::CALL => {
            let construct = r.read_flag()?;
            let callee = read_node(r)?;
            let args = read_nodes(r)?;
            Node::Call(Box::new(CallExpr {
                callee,
                args,
                construct,
            }))
        }
        tag::IMPORT => {
            let native = r.read_flag()?;
            let count = r.read_u32()? as usize;
            let mut items = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                let name = r.read_str()?;
                let target = match r.take(1)?[0] {
                    0 => ImportTarget::Name,
                    1 => ImportTarget::Alias(r.read_str()?),
                    2 => ImportTarget::Global,
                    t => return Err(DecodeError::BadTag(t as u32)),
                };
                items.push(ImportItem { name, target });
            }
            Node::Import(Box::new(ImportExpr {
                native,
                items: items.into_boxed_slice(),
            }))
        }
        tag::TRY => {
            let body = read_node(r)?;
            let handler = if r.read_flag()? {
                let var = if r.read_flag()? {
                    Some(r.read_str()?)
                } else {
                    None
                };
                let hbody = read_node(r)?;
                Some(CatchClause { var, body: hbody })
            } else {
                None
            };
            Node::Try(Box::new(TryExpr { body, handler }))
        }
        tag::CLASS => {
            let name = r.read_str()?;
            let bases = r.read_names()?;
            let body = read_node(r)?;
            Node::Class(Box::new(ClassDecl { name, bases, body }))
        }
        other => return Err(DecodeError::BadTag(other)),
    };
    Ok(node)
}
