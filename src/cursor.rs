use crate::node::Node;
use crate::reader::Decode;

/// A read-only view of one document node, plus the step that reached it.
///
/// Cursors are cheap and `Copy`; navigation builds a fresh cursor for each
/// child instead of mutating shared state, so any number of traversals can
/// run over the same document at once. The borrow ties every cursor to its
/// document, which keeps a cursor from outliving the tree it points into.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'doc> {
    node: &'doc Node,
    step: Step<'doc>,
}

/// How a cursor was reached from its parent. Only used for diagnostics.
#[derive(Debug, Clone, Copy)]
enum Step<'doc> {
    Root,
    Key(&'doc str),
    Index(usize),
}

impl<'doc> Cursor<'doc> {
    pub(crate) fn root(node: &'doc Node) -> Self {
        Cursor {
            node,
            step: Step::Root,
        }
    }

    /// The node this cursor points at.
    pub fn node(&self) -> &'doc Node {
        self.node
    }

    /// The key or index that reached this node, rendered for diagnostics.
    /// Empty for the root.
    pub fn key(&self) -> String {
        match self.step {
            Step::Root => String::new(),
            Step::Key(k) => k.to_string(),
            Step::Index(i) => i.to_string(),
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.node, Node::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.node, Node::Array(_))
    }

    /// True when the node is an object with the named member and that
    /// member's value is not null.
    pub fn has(&self, key: &str) -> bool {
        !matches!(self.node.member(key), None | Some(Node::Null))
    }

    /// Array length; zero for every other node kind.
    pub fn len(&self) -> usize {
        match self.node {
            Node::Array(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The array element at `index`, when the node is an array and the index
    /// is in range.
    pub fn at(&self, index: usize) -> Option<Cursor<'doc>> {
        match self.node {
            Node::Array(items) => items.get(index).map(|node| Cursor {
                node,
                step: Step::Index(index),
            }),
            _ => None,
        }
    }

    /// The member named `key`. A member whose value is null counts as
    /// absent, the same as [`has`](Cursor::has).
    pub fn child(&self, key: &str) -> Option<Cursor<'doc>> {
        match self.node {
            Node::Object(members) => members
                .iter()
                .find(|(k, _)| k.as_str() == key)
                .and_then(|(k, v)| match v {
                    Node::Null => None,
                    node => Some(Cursor {
                        node,
                        step: Step::Key(k.as_str()),
                    }),
                }),
            _ => None,
        }
    }

    /// Iterates the object's members in document order, null members
    /// included. Each call returns an independent iterator.
    pub fn members(&self) -> Members<'doc> {
        let entries = match self.node {
            Node::Object(members) => members.as_slice(),
            _ => &[],
        };
        Members {
            entries: entries.iter(),
        }
    }

    /// Decodes the member named `key` into `dest`. An empty key decodes the
    /// node under the cursor itself. Returns false when the member is
    /// missing or null, or when the node kind does not fit the destination;
    /// `dest` keeps its previous value in that case.
    pub fn convert<T: Decode>(&self, key: &str, dest: &mut T) -> bool {
        if key.is_empty() {
            dest.decode(self)
        } else {
            match self.child(key) {
                Some(child) => dest.decode(&child),
                None => false,
            }
        }
    }
}

/// Iterator over an object's members. See [`Cursor::members`].
pub struct Members<'doc> {
    entries: std::slice::Iter<'doc, (String, Node)>,
}

impl<'doc> Iterator for Members<'doc> {
    type Item = (&'doc str, Cursor<'doc>);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, node) = self.entries.next()?;
        Some((
            key.as_str(),
            Cursor {
                node,
                step: Step::Key(key.as_str()),
            },
        ))
    }
}
