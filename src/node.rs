use std::path::Path;

use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::parser::Parser;
use crate::writer::Writer;

/// An immutable parsed document. Built once by the parser and only read
/// afterwards; decoding hands out [`Cursor`]s instead of mutating the tree.
#[derive(Debug, PartialEq, Clone)]
pub struct Document {
    pub root: Node,
}

impl Document {
    /// Parses a document from JSON text.
    pub fn parse(text: &str) -> Result<Document, ParseError> {
        Parser::new(text).parse_document()
    }

    /// Parses a document from a file, read in full up front. The path
    /// becomes the source name in diagnostics.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Document, ParseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ParseError::FileRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;
        Parser::new_with_name(&text, path.display().to_string()).parse_document()
    }

    /// A cursor positioned on the root node.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::root(&self.root)
    }

    /// Renders the document as compact JSON.
    pub fn to_text(&self) -> String {
        let mut w = Writer::compact();
        w.convert("", &self.root);
        w.into_text()
    }

    /// Renders the document with newlines, indenting each level by
    /// `indent_width` copies of `indent_char`.
    pub fn to_text_pretty(&self, indent_char: char, indent_width: usize) -> String {
        let mut w = Writer::pretty(indent_char, indent_width);
        w.convert("", &self.root);
        w.into_text()
    }
}

/// A single node of a parsed document. Object members keep the order they
/// appeared in the text; duplicate keys are kept as parsed, and lookups see
/// the first occurrence. The integer kind spans two variants so that values
/// above `i64::MAX` keep their exact 64-bit magnitude.
#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Array(Vec<Node>),
    Object(Vec<(String, Node)>),
}

impl Node {
    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Int(_) | Node::Uint(_) => "integer",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
        }
    }

    /// Looks up the first member with the given key. Returns `None` for
    /// non-object nodes.
    pub fn member(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Object(members) => members
                .iter()
                .find(|(k, _)| k.as_str() == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

/// A byte buffer that crosses the codec as a string scalar: it decodes from
/// a string node's bytes and encodes as the buffer content up to the first
/// NUL byte. A `Vec<u8>` is an ordinary integer array instead.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new(bytes: Vec<u8>) -> Bytes {
        Bytes(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Bytes {
    fn from(text: &str) -> Bytes {
        Bytes(text.as_bytes().to_vec())
    }
}
