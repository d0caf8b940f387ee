use std::collections::{BTreeMap, BTreeSet, HashMap, LinkedList};
use std::fmt::Write as _;
use std::rc::Rc;
use std::sync::Arc;

use crate::node::{Bytes, Document, Node};

/// One value type's half of the encode dispatch: emit `self` into the
/// writer, under `key` when it is non-empty.
pub trait Encode {
    fn encode(&self, w: &mut Writer, key: &str);
}

/// A JSON writer with one of two rendering strategies picked at
/// construction: compact (no whitespace) or pretty (newlines and
/// indentation). Every encode call funnels through the one live emitter.
///
/// The output buffer is append-only. Encoding several values in a row
/// concatenates their renderings; [`to_text`](Writer::to_text) snapshots
/// the buffer without resetting it.
pub struct Writer {
    emitter: Emitter,
}

impl Writer {
    /// A writer that renders without any whitespace.
    pub fn compact() -> Writer {
        Writer {
            emitter: Emitter::Compact(CompactEmitter::new()),
        }
    }

    /// A writer that renders with newlines, indenting each nesting level by
    /// `indent_width` copies of `indent_char`.
    pub fn pretty(indent_char: char, indent_width: usize) -> Writer {
        Writer {
            emitter: Emitter::Pretty(PrettyEmitter::new(indent_char, indent_width)),
        }
    }

    /// Encodes `value`, under `key` when it is non-empty, and returns the
    /// writer for chaining.
    pub fn convert<T: Encode + ?Sized>(&mut self, key: &str, value: &T) -> &mut Writer {
        value.encode(self, key);
        self
    }

    /// Emits a member key. An empty key emits nothing, which leaves the
    /// writer in value position; this is how bare values and array elements
    /// are written.
    pub fn write_key(&mut self, key: &str) {
        if !key.is_empty() {
            self.emitter.key(key);
        }
    }

    /// Opens an object wrapper. Paired with [`end_object`](Writer::end_object);
    /// the writer trusts the caller to keep begins and ends balanced.
    pub fn begin_object(&mut self) {
        self.emitter.begin(Frame::Object);
    }

    pub fn end_object(&mut self) {
        self.emitter.end('}');
    }

    pub fn begin_array(&mut self) {
        self.emitter.begin(Frame::Array);
    }

    pub fn end_array(&mut self) {
        self.emitter.end(']');
    }

    /// The text produced so far. Snapshotting mid-construction yields a
    /// partial document; the buffer is never reset.
    pub fn to_text(&self) -> &str {
        self.emitter.output()
    }

    /// Finishes the session and hands over the buffer.
    pub fn into_text(self) -> String {
        match self.emitter {
            Emitter::Compact(e) => e.out,
            Emitter::Pretty(e) => e.out,
        }
    }

    pub(crate) fn put_null(&mut self) {
        self.emitter.null();
    }

    pub(crate) fn put_bool(&mut self, value: bool) {
        self.emitter.boolean(value);
    }

    pub(crate) fn put_int(&mut self, value: i64) {
        self.emitter.int(value);
    }

    pub(crate) fn put_uint(&mut self, value: u64) {
        self.emitter.uint(value);
    }

    pub(crate) fn put_float(&mut self, value: f64) {
        self.emitter.float(value);
    }

    pub(crate) fn put_string(&mut self, value: &str) {
        self.emitter.string(value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    Object,
    Array,
}

/// One open wrapper. `count` tracks the tokens emitted inside it: object
/// levels alternate key and value slots (even counts are key slots), array
/// levels are all value slots.
#[derive(Debug, Clone, Copy)]
struct Level {
    frame: Frame,
    count: usize,
}

/// The single dispatch point between the two renderings. Exactly one
/// emitter is live per writer.
enum Emitter {
    Compact(CompactEmitter),
    Pretty(PrettyEmitter),
}

impl Emitter {
    fn key(&mut self, key: &str) {
        match self {
            Emitter::Compact(e) => e.key(key),
            Emitter::Pretty(e) => e.key(key),
        }
    }

    fn string(&mut self, value: &str) {
        match self {
            Emitter::Compact(e) => e.string(value),
            Emitter::Pretty(e) => e.string(value),
        }
    }

    fn int(&mut self, value: i64) {
        match self {
            Emitter::Compact(e) => e.int(value),
            Emitter::Pretty(e) => e.int(value),
        }
    }

    fn uint(&mut self, value: u64) {
        match self {
            Emitter::Compact(e) => e.uint(value),
            Emitter::Pretty(e) => e.uint(value),
        }
    }

    fn float(&mut self, value: f64) {
        match self {
            Emitter::Compact(e) => e.float(value),
            Emitter::Pretty(e) => e.float(value),
        }
    }

    fn boolean(&mut self, value: bool) {
        match self {
            Emitter::Compact(e) => e.boolean(value),
            Emitter::Pretty(e) => e.boolean(value),
        }
    }

    fn null(&mut self) {
        match self {
            Emitter::Compact(e) => e.null(),
            Emitter::Pretty(e) => e.null(),
        }
    }

    fn begin(&mut self, frame: Frame) {
        match self {
            Emitter::Compact(e) => e.begin(frame),
            Emitter::Pretty(e) => e.begin(frame),
        }
    }

    fn end(&mut self, close: char) {
        match self {
            Emitter::Compact(e) => e.end(close),
            Emitter::Pretty(e) => e.end(close),
        }
    }

    fn output(&self) -> &str {
        match self {
            Emitter::Compact(e) => &e.out,
            Emitter::Pretty(e) => &e.out,
        }
    }
}

struct CompactEmitter {
    out: String,
    levels: Vec<Level>,
}

impl CompactEmitter {
    fn new() -> CompactEmitter {
        CompactEmitter {
            out: String::new(),
            levels: Vec::new(),
        }
    }

    fn prefix(&mut self) {
        if let Some(level) = self.levels.last_mut() {
            match level.frame {
                Frame::Object => {
                    if level.count % 2 == 0 {
                        if level.count > 0 {
                            self.out.push(',');
                        }
                    } else {
                        self.out.push(':');
                    }
                }
                Frame::Array => {
                    if level.count > 0 {
                        self.out.push(',');
                    }
                }
            }
            level.count += 1;
        }
    }

    fn key(&mut self, key: &str) {
        self.prefix();
        push_quoted(&mut self.out, key);
    }

    fn string(&mut self, value: &str) {
        self.prefix();
        push_quoted(&mut self.out, value);
    }

    fn int(&mut self, value: i64) {
        self.prefix();
        let _ = write!(self.out, "{value}");
    }

    fn uint(&mut self, value: u64) {
        self.prefix();
        let _ = write!(self.out, "{value}");
    }

    fn float(&mut self, value: f64) {
        self.prefix();
        push_float(&mut self.out, value);
    }

    fn boolean(&mut self, value: bool) {
        self.prefix();
        self.out.push_str(if value { "true" } else { "false" });
    }

    fn null(&mut self) {
        self.prefix();
        self.out.push_str("null");
    }

    fn begin(&mut self, frame: Frame) {
        self.prefix();
        self.out.push(match frame {
            Frame::Object => '{',
            Frame::Array => '[',
        });
        self.levels.push(Level { frame, count: 0 });
    }

    fn end(&mut self, close: char) {
        self.levels.pop();
        self.out.push(close);
    }
}

struct PrettyEmitter {
    out: String,
    levels: Vec<Level>,
    indent_char: char,
    indent_width: usize,
}

impl PrettyEmitter {
    fn new(indent_char: char, indent_width: usize) -> PrettyEmitter {
        PrettyEmitter {
            out: String::new(),
            levels: Vec::new(),
            indent_char,
            indent_width,
        }
    }

    fn newline_indent(&mut self, depth: usize) {
        self.out.push('\n');
        for _ in 0..depth * self.indent_width {
            self.out.push(self.indent_char);
        }
    }

    // Same slot accounting as the compact emitter, plus layout: keys and
    // array elements each start an indented line, values follow their key
    // after ": ".
    fn prefix(&mut self) {
        let depth = self.levels.len();
        if let Some(level) = self.levels.last().copied() {
            match level.frame {
                Frame::Object => {
                    if level.count % 2 == 0 {
                        if level.count > 0 {
                            self.out.push(',');
                        }
                        self.newline_indent(depth);
                    } else {
                        self.out.push_str(": ");
                    }
                }
                Frame::Array => {
                    if level.count > 0 {
                        self.out.push(',');
                    }
                    self.newline_indent(depth);
                }
            }
            if let Some(level) = self.levels.last_mut() {
                level.count += 1;
            }
        }
    }

    fn key(&mut self, key: &str) {
        self.prefix();
        push_quoted(&mut self.out, key);
    }

    fn string(&mut self, value: &str) {
        self.prefix();
        push_quoted(&mut self.out, value);
    }

    fn int(&mut self, value: i64) {
        self.prefix();
        let _ = write!(self.out, "{value}");
    }

    fn uint(&mut self, value: u64) {
        self.prefix();
        let _ = write!(self.out, "{value}");
    }

    fn float(&mut self, value: f64) {
        self.prefix();
        push_float(&mut self.out, value);
    }

    fn boolean(&mut self, value: bool) {
        self.prefix();
        self.out.push_str(if value { "true" } else { "false" });
    }

    fn null(&mut self) {
        self.prefix();
        self.out.push_str("null");
    }

    fn begin(&mut self, frame: Frame) {
        self.prefix();
        self.out.push(match frame {
            Frame::Object => '{',
            Frame::Array => '[',
        });
        self.levels.push(Level { frame, count: 0 });
    }

    fn end(&mut self, close: char) {
        // Empty wrappers close inline; anything else closes on its own line
        // at the parent depth.
        if let Some(level) = self.levels.pop() {
            if level.count > 0 {
                self.newline_indent(self.levels.len());
            }
        }
        self.out.push(close);
    }
}

fn push_quoted(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

// Non-finite values have no JSON rendering and fall back to null. Finite
// values get a `.0` marker when the shortest rendering has no fraction or
// exponent, so the text re-parses with its float kind intact.
fn push_float(out: &mut String, value: f64) {
    if !value.is_finite() {
        out.push_str("null");
        return;
    }
    let start = out.len();
    let _ = write!(out, "{value}");
    if !out[start..].contains(['.', 'e', 'E']) {
        out.push_str(".0");
    }
}

// === Scalars ===

macro_rules! encode_signed {
    ($($ty:ty),+) => {$(
        impl Encode for $ty {
            fn encode(&self, w: &mut Writer, key: &str) {
                w.write_key(key);
                w.put_int(i64::from(*self));
            }
        }
    )+};
}

encode_signed!(i8, i16, i32, i64);

macro_rules! encode_unsigned {
    ($($ty:ty),+) => {$(
        impl Encode for $ty {
            fn encode(&self, w: &mut Writer, key: &str) {
                w.write_key(key);
                w.put_uint(u64::from(*self));
            }
        }
    )+};
}

encode_unsigned!(u8, u16, u32, u64);

impl Encode for f64 {
    fn encode(&self, w: &mut Writer, key: &str) {
        w.write_key(key);
        w.put_float(*self);
    }
}

impl Encode for f32 {
    fn encode(&self, w: &mut Writer, key: &str) {
        w.write_key(key);
        w.put_float(f64::from(*self));
    }
}

impl Encode for bool {
    fn encode(&self, w: &mut Writer, key: &str) {
        w.write_key(key);
        w.put_bool(*self);
    }
}

impl Encode for String {
    fn encode(&self, w: &mut Writer, key: &str) {
        w.write_key(key);
        w.put_string(self);
    }
}

impl Encode for str {
    fn encode(&self, w: &mut Writer, key: &str) {
        w.write_key(key);
        w.put_string(self);
    }
}

impl Encode for Bytes {
    fn encode(&self, w: &mut Writer, key: &str) {
        // The buffer crosses as a string scalar, truncated at the first NUL.
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(self.0.len());
        w.write_key(key);
        w.put_string(&String::from_utf8_lossy(&self.0[..end]));
    }
}

// === Containers ===

macro_rules! encode_sequence {
    ($($container:ident),+) => {$(
        impl<T: Encode> Encode for $container<T> {
            fn encode(&self, w: &mut Writer, key: &str) {
                w.write_key(key);
                w.begin_array();
                for element in self {
                    element.encode(w, "");
                }
                w.end_array();
            }
        }
    )+};
}

encode_sequence!(Vec, LinkedList, BTreeSet);

macro_rules! encode_string_map {
    ($($map:ident),+) => {$(
        impl<T: Encode> Encode for $map<String, T> {
            fn encode(&self, w: &mut Writer, key: &str) {
                w.write_key(key);
                w.begin_object();
                for (entry_key, value) in self {
                    value.encode(w, entry_key);
                }
                w.end_object();
            }
        }
    )+};
}

encode_string_map!(BTreeMap, HashMap);

macro_rules! encode_tuple {
    ($( ( $($idx:tt $name:ident),+ ) ),+ $(,)?) => {$(
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            fn encode(&self, w: &mut Writer, key: &str) {
                w.write_key(key);
                w.begin_array();
                $( self.$idx.encode(w, ""); )+
                w.end_array();
            }
        }
    )+};
}

encode_tuple!(
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

impl<'a, T: Encode + ?Sized> Encode for &'a T {
    fn encode(&self, w: &mut Writer, key: &str) {
        (**self).encode(w, key);
    }
}

impl<T: Encode> Encode for Box<T> {
    fn encode(&self, w: &mut Writer, key: &str) {
        (**self).encode(w, key);
    }
}

impl<T: Encode> Encode for Rc<T> {
    fn encode(&self, w: &mut Writer, key: &str) {
        (**self).encode(w, key);
    }
}

impl<T: Encode> Encode for Arc<T> {
    fn encode(&self, w: &mut Writer, key: &str) {
        (**self).encode(w, key);
    }
}

// `None` is elided outright: no key, no null, no trace in the output.
impl<T: Encode> Encode for Option<T> {
    fn encode(&self, w: &mut Writer, key: &str) {
        if let Some(value) = self {
            value.encode(w, key);
        }
    }
}

// === Document re-emission ===

// Stored nodes re-emit exactly what the tree holds, member order included.
impl Encode for Node {
    fn encode(&self, w: &mut Writer, key: &str) {
        match self {
            Node::Null => {
                w.write_key(key);
                w.put_null();
            }
            Node::Bool(value) => {
                w.write_key(key);
                w.put_bool(*value);
            }
            Node::Int(value) => {
                w.write_key(key);
                w.put_int(*value);
            }
            Node::Uint(value) => {
                w.write_key(key);
                w.put_uint(*value);
            }
            Node::Float(value) => {
                w.write_key(key);
                w.put_float(*value);
            }
            Node::String(value) => {
                w.write_key(key);
                w.put_string(value);
            }
            Node::Array(items) => {
                w.write_key(key);
                w.begin_array();
                for item in items {
                    item.encode(w, "");
                }
                w.end_array();
            }
            Node::Object(members) => {
                w.write_key(key);
                w.begin_object();
                for (member_key, value) in members {
                    value.encode(w, member_key);
                }
                w.end_object();
            }
        }
    }
}

impl Encode for Document {
    fn encode(&self, w: &mut Writer, key: &str) {
        self.root.encode(w, key);
    }
}
