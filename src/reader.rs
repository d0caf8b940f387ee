use std::collections::{BTreeMap, BTreeSet, HashMap, LinkedList};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::node::{Bytes, Document, Node};
use crate::parser::Parser;
use crate::utils::line_and_column;

/// One value type's half of the decode dispatch: populate `self` from the
/// node under the cursor, reporting success.
///
/// Implementations exist for integers, floats, booleans, strings, the
/// standard containers, tuples, pointer wrappers, and `Option`. Aggregates
/// join through [`json_struct!`](crate::json_struct) or
/// [`reflect_impls!`](crate::reflect_impls). A failed decode leaves the
/// destination with whatever value it already held.
pub trait Decode {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool;
}

/// A decode session: parses once, keeps the source text and the resulting
/// document, and hands out cursors over it.
///
/// Construction never fails. A parse or read failure leaves the session in
/// a failed state where [`is_ok`](Reader::is_ok) is false and every
/// `convert` returns false; the failure itself is logged and kept in
/// [`error`](Reader::error).
pub struct Reader {
    source: String,
    document: Option<Document>,
    error: Option<ParseError>,
}

impl Reader {
    /// Builds a session from JSON text.
    pub fn from_text(text: &str) -> Reader {
        let source = text.to_string();
        match Document::parse(text) {
            Ok(document) => Reader {
                source,
                document: Some(document),
                error: None,
            },
            Err(error) => Reader::failed(source, error),
        }
    }

    /// Builds a session from a file, read in full up front.
    pub fn from_file(path: impl AsRef<Path>) -> Reader {
        let path = path.as_ref();
        let source = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                let error = ParseError::FileRead {
                    path: path.display().to_string(),
                    cause: e.to_string(),
                };
                return Reader::failed(String::new(), error);
            }
        };
        let mut parser = Parser::new_with_name(&source, path.display().to_string());
        match parser.parse_document() {
            Ok(document) => Reader {
                source,
                document: Some(document),
                error: None,
            },
            Err(error) => Reader::failed(source, error),
        }
    }

    fn failed(source: String, error: ParseError) -> Reader {
        match error.offset() {
            Some(offset) => {
                let (line, column) = line_and_column(&source, offset);
                log::warn!("parse failed at line {line}, column {column}: {error}");
            }
            None => log::warn!("parse failed: {error}"),
        }
        Reader {
            source,
            document: None,
            error: Some(error),
        }
    }

    /// False when the session holds no document; every decode against a
    /// failed session returns false.
    pub fn is_ok(&self) -> bool {
        self.document.is_some()
    }

    /// A cursor on the root node, when the session parsed.
    pub fn root(&self) -> Option<Cursor<'_>> {
        self.document.as_ref().map(Document::cursor)
    }

    /// Decodes the root member named `key` into `dest`; an empty key decodes
    /// the root node itself. See [`Cursor::convert`].
    pub fn convert<T: Decode>(&self, key: &str, dest: &mut T) -> bool {
        match self.root() {
            Some(root) => root.convert(key, dest),
            None => false,
        }
    }

    /// The input text the session was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }
}

/// Diagnostic channel for decode misses, shaped `key<name>: ...`. Missing
/// keys stay silent; only kind mismatches report.
#[doc(hidden)]
pub fn log_decode_miss(key: &str, expected: &str, found: &str) {
    log::debug!("key<{key}>: expected {expected}, found {found}");
}

// === Scalars ===

// Integer destinations take any integer node and narrow with `as`, keeping
// the 64-bit wrapping behavior across the signed/unsigned boundary.
macro_rules! decode_integer {
    ($($ty:ty),+) => {$(
        impl Decode for $ty {
            fn decode(&mut self, cur: &Cursor<'_>) -> bool {
                match cur.node() {
                    Node::Int(value) => {
                        *self = *value as $ty;
                        true
                    }
                    Node::Uint(value) => {
                        *self = *value as $ty;
                        true
                    }
                    other => {
                        log_decode_miss(&cur.key(), "integer", other.kind_name());
                        false
                    }
                }
            }
        }
    )+};
}

decode_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

// Float destinations require a float node; an integer node is a kind
// mismatch, not a free widening.
macro_rules! decode_float {
    ($($ty:ty),+) => {$(
        impl Decode for $ty {
            fn decode(&mut self, cur: &Cursor<'_>) -> bool {
                match cur.node() {
                    Node::Float(value) => {
                        *self = *value as $ty;
                        true
                    }
                    other => {
                        log_decode_miss(&cur.key(), "float", other.kind_name());
                        false
                    }
                }
            }
        }
    )+};
}

decode_float!(f32, f64);

impl Decode for bool {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        match cur.node() {
            Node::Bool(value) => {
                *self = *value;
                true
            }
            // Integers coerce: anything non-zero reads as true.
            Node::Int(value) => {
                *self = *value != 0;
                true
            }
            Node::Uint(value) => {
                *self = *value != 0;
                true
            }
            other => {
                log_decode_miss(&cur.key(), "boolean", other.kind_name());
                false
            }
        }
    }
}

impl Decode for String {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        match cur.node() {
            Node::String(value) => {
                self.clear();
                self.push_str(value);
                true
            }
            other => {
                log_decode_miss(&cur.key(), "string", other.kind_name());
                false
            }
        }
    }
}

impl Decode for Bytes {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        match cur.node() {
            Node::String(value) => {
                self.0 = value.as_bytes().to_vec();
                true
            }
            other => {
                log_decode_miss(&cur.key(), "string", other.kind_name());
                false
            }
        }
    }
}

// A `Node` destination accepts anything; this is the dynamic escape hatch
// for document fragments whose shape is not known statically.
impl Decode for Node {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        *self = cur.node().clone();
        true
    }
}

// === Containers ===
//
// Element decodes are best effort: a failed element keeps its default value
// and never aborts the rest of the container.

impl<T: Decode + Default> Decode for Vec<T> {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        if !cur.is_array() {
            log_decode_miss(&cur.key(), "array", cur.node().kind_name());
            return false;
        }
        let len = cur.len();
        self.clear();
        self.reserve(len);
        for index in 0..len {
            let mut element = T::default();
            if let Some(item) = cur.at(index) {
                element.decode(&item);
            }
            self.push(element);
        }
        true
    }
}

// Appends to whatever the list already holds.
impl<T: Decode + Default> Decode for LinkedList<T> {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        if !cur.is_array() {
            log_decode_miss(&cur.key(), "array", cur.node().kind_name());
            return false;
        }
        for index in 0..cur.len() {
            let mut element = T::default();
            if let Some(item) = cur.at(index) {
                element.decode(&item);
            }
            self.push_back(element);
        }
        true
    }
}

// Inserts into whatever the set already holds; duplicate elements collapse.
impl<T: Decode + Default + Ord> Decode for BTreeSet<T> {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        if !cur.is_array() {
            log_decode_miss(&cur.key(), "array", cur.node().kind_name());
            return false;
        }
        for index in 0..cur.len() {
            let mut element = T::default();
            if let Some(item) = cur.at(index) {
                element.decode(&item);
            }
            self.insert(element);
        }
        true
    }
}

macro_rules! decode_string_map {
    ($($map:ident),+) => {$(
        impl<T: Decode + Default> Decode for $map<String, T> {
            fn decode(&mut self, cur: &Cursor<'_>) -> bool {
                if !cur.is_object() {
                    log_decode_miss(&cur.key(), "object", cur.node().kind_name());
                    return false;
                }
                for (key, item) in cur.members() {
                    let mut element = T::default();
                    element.decode(&item);
                    self.insert(key.to_string(), element);
                }
                true
            }
        }
    )+};
}

decode_string_map!(BTreeMap, HashMap);

// Tuples decode positionally from an array. Arity is not checked: missing
// elements keep their previous values, extra elements are ignored.
macro_rules! decode_tuple {
    ($( ( $($idx:tt $name:ident),+ ) ),+ $(,)?) => {$(
        impl<$($name: Decode),+> Decode for ($($name,)+) {
            fn decode(&mut self, cur: &Cursor<'_>) -> bool {
                if !cur.is_array() {
                    log_decode_miss(&cur.key(), "array", cur.node().kind_name());
                    return false;
                }
                $(
                    if let Some(item) = cur.at($idx) {
                        self.$idx.decode(&item);
                    }
                )+
                true
            }
        }
    )+};
}

decode_tuple!(
    (0 A),
    (0 A, 1 B),
    (0 A, 1 B, 2 C),
    (0 A, 1 B, 2 C, 3 D),
    (0 A, 1 B, 2 C, 3 D, 4 E),
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F),
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G),
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H),
);

// === Pointer wrappers ===

impl<T: Decode> Decode for Box<T> {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        (**self).decode(cur)
    }
}

impl<T: Decode + Clone> Decode for Rc<T> {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        Rc::make_mut(self).decode(cur)
    }
}

impl<T: Decode + Clone> Decode for Arc<T> {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        Arc::make_mut(self).decode(cur)
    }
}

// `None` fills in only once the node is confirmed present; the key lookup
// in `Cursor::convert` has already happened by the time decode runs, so an
// absent member never allocates and leaves the option untouched.
impl<T: Decode + Default> Decode for Option<T> {
    fn decode(&mut self, cur: &Cursor<'_>) -> bool {
        self.get_or_insert_with(T::default).decode(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source: &str) -> Document {
        Document::parse(source).unwrap()
    }

    #[test]
    fn test_integer_narrowing_wraps() {
        let doc = doc("[300, -1]");
        let root = doc.cursor();
        let mut small = 0u8;
        assert!(small.decode(&root.at(0).unwrap()));
        assert_eq!(small, 44);
        let mut wide = 0u64;
        assert!(wide.decode(&root.at(1).unwrap()));
        assert_eq!(wide, u64::MAX);
    }

    #[test]
    fn test_u64_full_range() {
        let doc = doc("18446744073709551615");
        let mut value = 0u64;
        assert!(value.decode(&doc.cursor()));
        assert_eq!(value, u64::MAX);
    }

    #[test]
    fn test_float_rejects_integer_node() {
        let doc = doc(r#"{ "a": 3, "b": 3.5 }"#);
        let root = doc.cursor();
        let mut value = 1.5f64;
        assert!(!root.convert("a", &mut value));
        assert_eq!(value, 1.5);
        assert!(root.convert("b", &mut value));
        assert_eq!(value, 3.5);
    }

    #[test]
    fn test_bool_coerces_integers() {
        let doc = doc("[true, 0, 7, \"no\"]");
        let root = doc.cursor();
        let mut flag = false;
        assert!(flag.decode(&root.at(0).unwrap()));
        assert!(flag);
        assert!(flag.decode(&root.at(1).unwrap()));
        assert!(!flag);
        assert!(flag.decode(&root.at(2).unwrap()));
        assert!(flag);
        assert!(!flag.decode(&root.at(3).unwrap()));
        assert!(flag);
    }

    #[test]
    fn test_string_replaces_content() {
        let doc = doc(r#""fresh""#);
        let mut value = "stale".to_string();
        assert!(value.decode(&doc.cursor()));
        assert_eq!(value, "fresh");
    }

    #[test]
    fn test_bytes_from_string_node() {
        let doc = doc(r#""abc""#);
        let mut value = Bytes::default();
        assert!(value.decode(&doc.cursor()));
        assert_eq!(value.as_slice(), b"abc");
    }

    #[test]
    fn test_vec_u8_is_an_integer_array() {
        let doc = doc("[1, 2, 255]");
        let mut value: Vec<u8> = Vec::new();
        assert!(value.decode(&doc.cursor()));
        assert_eq!(value, vec![1, 2, 255]);
    }

    #[test]
    fn test_vec_rebuilds_and_defaults_bad_elements() {
        let doc = doc(r#"[1, "oops", 3]"#);
        let mut value = vec![9i32, 9, 9, 9, 9];
        assert!(value.decode(&doc.cursor()));
        assert_eq!(value, vec![1, 0, 3]);
    }

    #[test]
    fn test_vec_rejects_non_array() {
        let doc = doc(r#"{ "a": 1 }"#);
        let mut value = vec![5i32];
        assert!(!value.decode(&doc.cursor()));
        assert_eq!(value, vec![5]);
    }

    #[test]
    fn test_linked_list_appends() {
        let doc = doc("[3, 4]");
        let mut value = LinkedList::from([1i32, 2]);
        assert!(value.decode(&doc.cursor()));
        assert_eq!(value.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let doc = doc("[2, 1, 2, 3]");
        let mut value: BTreeSet<i32> = BTreeSet::new();
        assert!(value.decode(&doc.cursor()));
        assert_eq!(value.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_map_decodes_members() {
        let doc = doc(r#"{ "x": 1, "y": 2 }"#);
        let mut value: BTreeMap<String, i32> = BTreeMap::new();
        assert!(value.decode(&doc.cursor()));
        assert_eq!(value.get("x"), Some(&1));
        assert_eq!(value.get("y"), Some(&2));
    }

    #[test]
    fn test_map_inserts_default_for_bad_member() {
        let doc = doc(r#"{ "x": "oops" }"#);
        let mut value: BTreeMap<String, i32> = BTreeMap::new();
        assert!(value.decode(&doc.cursor()));
        assert_eq!(value.get("x"), Some(&0));
    }

    #[test]
    fn test_map_rejects_array() {
        let doc = doc("[1, 2]");
        let mut value: HashMap<String, i32> = HashMap::new();
        assert!(!value.decode(&doc.cursor()));
        assert!(value.is_empty());
    }

    #[test]
    fn test_tuple_positional_best_effort() {
        let full = doc(r#"[1, "two", 3.5]"#);
        let mut value = (0i32, String::new(), 0.0f64);
        assert!(value.decode(&full.cursor()));
        assert_eq!(value, (1, "two".to_string(), 3.5));

        // Short arrays leave the tail untouched.
        let short = doc("[9]");
        assert!(value.decode(&short.cursor()));
        assert_eq!(value, (9, "two".to_string(), 3.5));
    }

    #[test]
    fn test_box_decodes_in_place() {
        let doc = doc("5");
        let mut value = Box::new(0i32);
        assert!(value.decode(&doc.cursor()));
        assert_eq!(*value, 5);
    }

    #[test]
    fn test_rc_copies_on_write() {
        let doc = doc("5");
        let mut value = Rc::new(0i32);
        let witness = Rc::clone(&value);
        assert!(value.decode(&doc.cursor()));
        assert_eq!(*value, 5);
        // The previously shared handle still sees the old value.
        assert_eq!(*witness, 0);
    }

    #[test]
    fn test_option_fills_on_present_value() {
        let doc = doc(r#"{ "a": 5 }"#);
        let mut value: Option<i32> = None;
        assert!(doc.cursor().convert("a", &mut value));
        assert_eq!(value, Some(5));
    }

    #[test]
    fn test_option_stays_none_when_missing_or_null() {
        let doc = doc(r#"{ "b": null }"#);
        let mut value: Option<i32> = None;
        assert!(!doc.cursor().convert("a", &mut value));
        assert_eq!(value, None);
        assert!(!doc.cursor().convert("b", &mut value));
        assert_eq!(value, None);
    }

    #[test]
    fn test_option_of_box() {
        let doc = doc(r#"{ "a": 5 }"#);
        let mut value: Option<Box<i64>> = None;
        assert!(doc.cursor().convert("a", &mut value));
        assert_eq!(value, Some(Box::new(5)));
    }

    #[test]
    fn test_node_destination_clones_fragment() {
        let doc = doc(r#"{ "a": [1, 2] }"#);
        let mut value = Node::Null;
        assert!(doc.cursor().convert("a", &mut value));
        assert_eq!(value, Node::Array(vec![Node::Int(1), Node::Int(2)]));
    }

    #[test]
    fn test_reader_from_text() {
        let reader = Reader::from_text(r#"{ "port": 8080 }"#);
        assert!(reader.is_ok());
        assert!(reader.error().is_none());
        let mut port = 0u16;
        assert!(reader.convert("port", &mut port));
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_reader_survives_bad_input() {
        let reader = Reader::from_text("{ bad");
        assert!(!reader.is_ok());
        assert!(reader.root().is_none());
        assert!(reader.error().is_some());
        let mut port = 7u16;
        assert!(!reader.convert("port", &mut port));
        assert_eq!(port, 7);
        // The source text is retained even when parsing fails.
        assert_eq!(reader.source(), "{ bad");
    }

    #[test]
    fn test_reader_missing_file() {
        let reader = Reader::from_file("/definitely/not/here.json");
        assert!(!reader.is_ok());
        assert!(matches!(reader.error(), Some(ParseError::FileRead { .. })));
    }

    #[test]
    fn test_sibling_members_survive_one_bad_member() {
        let reader = Reader::from_text(r#"{ "a": "oops", "b": 2 }"#);
        let mut a = 0i32;
        let mut b = 0i32;
        assert!(!reader.convert("a", &mut a));
        assert!(reader.convert("b", &mut b));
        assert_eq!((a, b), (0, 2));
    }
}
