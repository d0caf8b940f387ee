pub mod cursor;
pub mod error;
pub mod lexer;
mod macros;
pub mod node;
pub mod parser;
pub mod reader;
pub mod reflect;
mod serialization;
pub mod utils;
pub mod writer;

pub use cursor::{Cursor, Members};
pub use error::ParseError;
pub use node::{Bytes, Document, Node};
pub use reader::{Decode, Reader};
pub use reflect::{Reflect, Selector};
pub use writer::{Encode, Writer};
