pub mod env;
pub mod heap;
pub mod object;

pub use env::Env;
pub use heap::{Heap, ObjectId};
pub use object::{ObjKind, Object, TypeTag};
