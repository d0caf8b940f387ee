/// Declares a plain struct wired into the codec.
///
/// Member keys are the field names. Decode is best effort: a failed member
/// leaves its field untouched and later members still decode, with the
/// overall result true only when every member succeeded. Encode visits
/// every field in declaration order.
///
/// ```
/// use reflex_json::{json_struct, Reader, Writer};
///
/// json_struct! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Endpoint {
///         pub host: String,
///         pub port: u16,
///     }
/// }
///
/// let reader = Reader::from_text(r#"{ "host": "example.org", "port": 443 }"#);
/// let mut endpoint = Endpoint::default();
/// assert!(reader.convert("", &mut endpoint));
/// assert_eq!(endpoint.port, 443);
///
/// let mut w = Writer::compact();
/// w.convert("", &endpoint);
/// assert_eq!(w.to_text(), r#"{"host":"example.org","port":443}"#);
/// ```
#[macro_export]
macro_rules! json_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field : $fty, )+
        }

        impl $crate::Reflect for $name {
            fn populate(&mut self, obj: &$crate::Cursor<'_>) -> bool {
                let mut complete = true;
                $( complete &= obj.convert(stringify!($field), &mut self.$field); )+
                complete
            }

            fn emit(&self, w: &mut $crate::Writer) {
                $( w.convert(stringify!($field), &self.$field); )+
            }
        }

        $crate::reflect_impls!($name);
    };
}

/// Wires a hand-written [`Reflect`](crate::Reflect) implementation into the
/// codec dispatch by deriving its [`Decode`](crate::Decode) and
/// [`Encode`](crate::Encode) halves.
///
/// Use this instead of [`json_struct!`](crate::json_struct) when the type
/// needs a variant selector, renamed members, or any member handling the
/// field-per-member mapping cannot express.
#[macro_export]
macro_rules! reflect_impls {
    ($name:ty) => {
        impl $crate::Decode for $name {
            fn decode(&mut self, cur: &$crate::Cursor<'_>) -> bool {
                $crate::reflect::decode_with(self, cur)
            }
        }

        impl $crate::Encode for $name {
            fn encode(&self, w: &mut $crate::Writer, key: &str) {
                $crate::reflect::encode_with(self, w, key)
            }
        }
    };
}

/// Declares a fieldless enum carried over the wire as its underlying
/// integer representation.
///
/// Decoding an integer that is not a declared enumerator fails and reports
/// through the diagnostic channel; decode into the bare integer type
/// instead when raw pass-through is wanted.
///
/// ```
/// use reflex_json::{json_enum, Reader};
///
/// json_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq)]
///     pub enum Mode : u8 {
///         Idle = 0,
///         Active = 1,
///         Draining = 2,
///     }
/// }
///
/// let reader = Reader::from_text("2");
/// let mut mode = Mode::Idle;
/// assert!(reader.convert("", &mut mode));
/// assert_eq!(mode, Mode::Draining);
/// ```
#[macro_export]
macro_rules! json_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $crate::Decode for $name {
            fn decode(&mut self, cur: &$crate::Cursor<'_>) -> bool {
                let mut raw: $repr = 0;
                if !$crate::Decode::decode(&mut raw, cur) {
                    return false;
                }
                match raw {
                    $( x if x == $value => {
                        *self = $name::$variant;
                        true
                    } )+
                    other => {
                        $crate::reader::log_decode_miss(
                            &cur.key(),
                            "a declared enumerator",
                            &other.to_string(),
                        );
                        false
                    }
                }
            }
        }

        impl $crate::Encode for $name {
            fn encode(&self, w: &mut $crate::Writer, key: &str) {
                $crate::Encode::encode(&(*self as $repr), w, key)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::node::Document;
    use crate::reflect::Selector;
    use crate::writer::Writer;
    use crate::{Cursor, Reflect};

    crate::json_struct! {
        #[derive(Debug, Default, PartialEq)]
        struct Inner {
            label: String,
            weight: i32,
        }
    }

    crate::json_struct! {
        #[derive(Debug, Default, PartialEq)]
        struct Outer {
            name: String,
            inner: Inner,
            tags: Vec<String>,
        }
    }

    crate::json_enum! {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Color : i32 {
            Red = 1,
            Green = 2,
            Blue = 4,
        }
    }

    impl Default for Color {
        fn default() -> Color {
            Color::Red
        }
    }

    #[test]
    fn test_struct_round_trip() {
        let source = r#"{"name":"root","inner":{"label":"leaf","weight":3},"tags":["a","b"]}"#;
        let doc = Document::parse(source).unwrap();
        let mut value = Outer::default();
        assert!(doc.cursor().convert("", &mut value));
        assert_eq!(value.inner.weight, 3);
        assert_eq!(value.tags, vec!["a".to_string(), "b".to_string()]);

        let mut w = Writer::compact();
        w.convert("", &value);
        assert_eq!(w.to_text(), source);
    }

    #[test]
    fn test_struct_partial_decode_keeps_going() {
        // "weight" has the wrong kind: the result is false, but both the
        // earlier and later members still land.
        let doc = Document::parse(r#"{"label":"ok","weight":"heavy"}"#).unwrap();
        let mut value = Inner {
            label: String::new(),
            weight: -1,
        };
        assert!(!doc.cursor().convert("", &mut value));
        assert_eq!(value.label, "ok");
        assert_eq!(value.weight, -1);
    }

    #[test]
    fn test_struct_missing_member_fails_overall() {
        let doc = Document::parse(r#"{"label":"ok"}"#).unwrap();
        let mut value = Inner::default();
        assert!(!doc.cursor().convert("", &mut value));
        assert_eq!(value.label, "ok");
    }

    #[test]
    fn test_enum_round_trip() {
        let doc = Document::parse("4").unwrap();
        let mut value = Color::Red;
        assert!(doc.cursor().convert("", &mut value));
        assert_eq!(value, Color::Blue);

        let mut w = Writer::compact();
        w.convert("", &value);
        assert_eq!(w.to_text(), "4");
    }

    #[test]
    fn test_enum_rejects_undeclared_discriminant() {
        let doc = Document::parse("3").unwrap();
        let mut value = Color::Green;
        assert!(!doc.cursor().convert("", &mut value));
        assert_eq!(value, Color::Green);
    }

    #[test]
    fn test_enum_rejects_non_integer() {
        let doc = Document::parse(r#""Red""#).unwrap();
        let mut value = Color::Red;
        assert!(!doc.cursor().convert("", &mut value));
    }

    // A hand-written Reflect with a selector slot, the shape the derive
    // macros cannot produce.
    #[derive(Debug, Default)]
    struct Picked {
        kind: i32,
        payload: String,
        selector: Selector,
    }

    impl Reflect for Picked {
        fn populate(&mut self, obj: &Cursor<'_>) -> bool {
            let mut complete = true;
            complete &= obj.convert("kind", &mut self.kind);
            complete &= obj.convert("payload", &mut self.payload);
            complete
        }

        fn emit(&self, w: &mut Writer) {
            w.convert("kind", &self.kind);
            w.convert("payload", &self.payload);
        }

        fn selector_slot(&mut self) -> Option<&mut Selector> {
            Some(&mut self.selector)
        }
    }

    crate::reflect_impls!(Picked);

    const CANDIDATES: &str = r#"[
        {"kind": 1, "payload": "first"},
        {"kind": 2, "payload": "second"},
        {"kind": 2, "payload": "third"}
    ]"#;

    #[test]
    fn test_selector_picks_first_match() {
        let doc = Document::parse(CANDIDATES).unwrap();
        let mut value = Picked::default();
        value.selector.set(|cur| {
            let mut kind = 0i32;
            cur.convert("kind", &mut kind);
            kind == 2
        });
        assert!(doc.cursor().convert("", &mut value));
        assert_eq!(value.payload, "second");
    }

    #[test]
    fn test_selector_is_spent_after_decode() {
        let doc = Document::parse(CANDIDATES).unwrap();
        let mut value = Picked::default();
        value.selector.set(|_| false);
        assert!(!doc.cursor().convert("", &mut value));
        assert!(!value.selector.is_set());
        // A second decode without re-arming fails on the candidate array.
        assert!(!doc.cursor().convert("", &mut value));
    }

    #[test]
    fn test_unselected_candidate_array_fails() {
        let doc = Document::parse(CANDIDATES).unwrap();
        let mut value = Picked::default();
        assert!(!doc.cursor().convert("", &mut value));
        assert_eq!(value.payload, "");
    }

    #[test]
    fn test_short_array_populates_directly() {
        // Arrays of at most one element skip selection and go straight to
        // populate; member lookups then run against the array node itself
        // and miss, leaving the destination untouched.
        let doc = Document::parse(r#"[{"kind": 9, "payload": "only"}]"#).unwrap();
        let mut value = Picked::default();
        assert!(!doc.cursor().convert("", &mut value));
        assert_eq!(value.payload, "");
        assert_eq!(value.kind, 0);
    }
}
