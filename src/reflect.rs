use crate::cursor::Cursor;
use crate::writer::Writer;

/// The contract that lets an aggregate type take part in the codec: populate
/// its members from a cursor, emit its members into a writer, and optionally
/// expose a variant selector consulted when the decoded node is an array of
/// candidates.
///
/// [`json_struct!`](crate::json_struct) derives the whole trait for plain
/// structs; hand-written implementations are paired with
/// [`reflect_impls!`](crate::reflect_impls) to join the dispatch.
pub trait Reflect {
    /// Reads the type's members from the node under `obj`. Member reads are
    /// best effort: a failed member leaves its field untouched and must not
    /// stop later members from decoding. Returns true only when every
    /// member read succeeded.
    fn populate(&mut self, obj: &Cursor<'_>) -> bool;

    /// Writes the type's members into an already-open object wrapper.
    fn emit(&self, w: &mut Writer);

    /// The variant selector slot, for types that can arrive as one of
    /// several candidates in an array. The default has no slot, which makes
    /// candidate arrays undecodable for the type.
    fn selector_slot(&mut self) -> Option<&mut Selector> {
        None
    }
}

type Predicate = Box<dyn FnMut(&Cursor<'_>) -> bool>;

/// A one-shot predicate that picks a single element out of a candidate
/// array during decode.
///
/// The caller arms the selector before the decode call; the engine takes
/// the predicate on the next aggregate decode, so it never survives the
/// attempt, whatever the outcome. Forgetting to re-arm between decodes
/// therefore fails the next candidate-array decode instead of silently
/// reusing a stale predicate.
#[derive(Default)]
pub struct Selector {
    pred: Option<Predicate>,
}

impl Selector {
    pub fn new() -> Selector {
        Selector::default()
    }

    /// Arms the selector. The predicate sees each candidate element in
    /// document order and the first one it accepts is decoded.
    pub fn set(&mut self, pred: impl FnMut(&Cursor<'_>) -> bool + 'static) {
        self.pred = Some(Box::new(pred));
    }

    /// Disarms the selector without running it.
    pub fn clear(&mut self) {
        self.pred = None;
    }

    pub fn is_set(&self) -> bool {
        self.pred.is_some()
    }

    fn take(&mut self) -> Option<Predicate> {
        self.pred.take()
    }
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("armed", &self.is_set())
            .finish()
    }
}

/// Aggregate decode shared by every [`Reflect`] type.
///
/// An object node, or an array of at most one element, populates the
/// destination directly. A longer array is a candidate list: it needs an
/// armed selector, and only the first accepted element is populated. The
/// predicate is taken up front, so it is spent even when nothing matches.
pub fn decode_with<T: Reflect>(dest: &mut T, cur: &Cursor<'_>) -> bool {
    let pred = dest.selector_slot().and_then(Selector::take);
    let len = cur.len();
    if len <= 1 {
        return dest.populate(cur);
    }
    let Some(mut pred) = pred else {
        return false;
    };
    for index in 0..len {
        match cur.at(index) {
            Some(candidate) if pred(&candidate) => return dest.populate(&candidate),
            Some(_) => {}
            None => break,
        }
    }
    false
}

/// Aggregate encode shared by every [`Reflect`] type: key, object wrapper,
/// member emission.
pub fn encode_with<T: Reflect>(value: &T, w: &mut Writer, key: &str) {
    w.write_key(key);
    w.begin_object();
    value.emit(w);
    w.end_object();
}
