//! In-memory document tree.
//!
//! Nodes own their children exclusively; traversal is always top-down, so no back
//! references are needed. Besides the value, every node keeps the comments written around
//! it and a style hint, which only matter when the tree is written back to text.

use crate::location::Location;
use crate::parse_scalars::infer_kind;

/// Kind of a scalar as inferred from its text (plain scalars) or fixed by its quoting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
}

/// How the scalar was (or should be) written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// `|` block scalar.
    Literal,
    /// `>` block scalar.
    Folded,
}

/// Block or flow layout hint for collections. Scalars ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Style {
    #[default]
    Block,
    Flow,
}

#[derive(Clone, Debug)]
pub struct Scalar {
    /// Decoded text (quotes and escapes already resolved).
    pub text: String,
    /// `None` means raw text of unknown kind; it is written as-is when that is safe.
    pub kind: Option<ScalarKind>,
    pub style: ScalarStyle,
}

impl Scalar {
    /// Plain scalar whose kind is inferred from the text.
    pub fn plain<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let kind = infer_kind(&text);
        Self {
            text,
            kind: Some(kind),
            style: ScalarStyle::Plain,
        }
    }

    /// String scalar. It gets quoted on output whenever the text would read back as
    /// something else (`"true"`, `"42"`).
    pub fn string<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            kind: Some(ScalarKind::Str),
            style: ScalarStyle::Plain,
        }
    }

    pub fn typed<S: Into<String>>(text: S, kind: ScalarKind) -> Self {
        Self {
            text: text.into(),
            kind: Some(kind),
            style: ScalarStyle::Plain,
        }
    }

    pub fn is_null(&self) -> bool {
        self.kind == Some(ScalarKind::Null)
    }

    fn is_canonical_null(&self) -> bool {
        self.is_null() && self.text == "null"
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.kind == other.kind
    }
}

/// Comments attached to a node.
///
/// Leading lines are kept without their indentation and include the `#`; an empty string
/// stands for a blank line. The inline comment is the `# ...` text after the value on the
/// same line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comments {
    pub leading: Vec<String>,
    pub inline: Option<String>,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.inline.is_none()
    }
}

#[derive(Clone, Debug)]
pub enum NodeValue {
    Null,
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

impl PartialEq for NodeValue {
    /// An empty value equals the plain `null` it is written as inside flow collections.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeValue::Null, NodeValue::Null) => true,
            (NodeValue::Null, NodeValue::Scalar(s)) | (NodeValue::Scalar(s), NodeValue::Null) => {
                s.is_canonical_null()
            }
            (NodeValue::Scalar(a), NodeValue::Scalar(b)) => a == b,
            (NodeValue::Sequence(a), NodeValue::Sequence(b)) => a == b,
            (NodeValue::Mapping(a), NodeValue::Mapping(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub value: NodeValue,
    pub comments: Comments,
    pub style: Style,
    pub(crate) location: Location,
}

impl PartialEq for Node {
    /// Structural equality: value and comments. Source positions and layout hints are
    /// not part of the document's meaning.
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.comments == other.comments
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::null()
    }
}

impl Node {
    pub fn new(value: NodeValue) -> Self {
        Self {
            value,
            comments: Comments::default(),
            style: Style::Block,
            location: Location::UNKNOWN,
        }
    }

    pub fn null() -> Self {
        Self::new(NodeValue::Null)
    }

    pub fn scalar(scalar: Scalar) -> Self {
        Self::new(NodeValue::Scalar(scalar))
    }

    /// Plain scalar with inferred kind.
    pub fn plain<S: Into<String>>(text: S) -> Self {
        Self::scalar(Scalar::plain(text))
    }

    pub fn string<S: Into<String>>(text: S) -> Self {
        Self::scalar(Scalar::string(text))
    }

    pub fn sequence(items: Vec<Node>) -> Self {
        Self::new(NodeValue::Sequence(items))
    }

    pub fn mapping(mapping: Mapping) -> Self {
        Self::new(NodeValue::Mapping(mapping))
    }

    pub fn with_leading_comment<S: Into<String>>(mut self, line: S) -> Self {
        self.comments.leading.push(line.into());
        self
    }

    pub fn with_inline_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comments.inline = Some(comment.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub(crate) fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Where the node started in the source, if it was parsed.
    pub fn location(&self) -> Option<Location> {
        self.location.is_known().then_some(self.location)
    }

    /// Replace the value, keeping this node's comments and style hint.
    pub fn replace_value(&mut self, value: NodeValue) {
        self.value = value;
    }

    /// `Null` nodes and plain `~` / `null` scalars. These count as absent when binding.
    pub fn is_null(&self) -> bool {
        match &self.value {
            NodeValue::Null => true,
            NodeValue::Scalar(s) => s.is_null(),
            _ => false,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            NodeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().map(|s| s.text.as_str())
    }

    pub fn as_sequence(&self) -> Option<&Vec<Node>> {
        match &self.value {
            NodeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.value {
            NodeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match &self.value {
            NodeValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match &mut self.value {
            NodeValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Short description for error messages.
    pub(crate) fn describe(&self) -> String {
        match &self.value {
            NodeValue::Null => "null".to_string(),
            NodeValue::Scalar(s) => format!("`{}`", s.text),
            NodeValue::Sequence(_) => "a sequence".to_string(),
            NodeValue::Mapping(_) => "a mapping".to_string(),
        }
    }
}

/// Ordered mapping with unique string keys.
///
/// Insertion order is preserved and controls the order keys are written back in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self.position(key) {
            Some(idx) => Some(&mut self.entries[idx].1),
            None => None,
        }
    }

    /// Set `key` to `node`. An existing key keeps its position and the previous node is
    /// returned (its comments are not carried over); a new key is appended.
    pub fn insert<K: Into<String>>(&mut self, key: K, node: Node) -> Option<Node> {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, node)),
            None => {
                self.entries.push((key, node));
                None
            }
        }
    }

    /// Remove `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    /// Rename `from` to `to` in place, keeping the node and its position.
    ///
    /// Does nothing and returns false if `from` is absent or `to` is already taken.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if self.contains_key(to) {
            return false;
        }
        match self.position(from) {
            Some(idx) => {
                self.entries[idx].0 = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn retain<F: FnMut(&str, &Node) -> bool>(&mut self, mut keep: F) {
        self.entries.retain(|(k, v)| keep(k, v));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Node)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn first_mut(&mut self) -> Option<&mut Node> {
        self.entries.first_mut().map(|(_, v)| v)
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_updates_in_place_and_appends_new_keys() {
        let mut m: Mapping = [("a", Node::plain("1")), ("b", Node::plain("2"))]
            .into_iter()
            .collect();
        m.insert("a", Node::plain("3"));
        m.insert("c", Node::plain("4"));
        assert_eq!(m.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(m.get("a").and_then(Node::as_str), Some("3"));
    }

    #[test]
    fn insert_drops_comments_of_replaced_node() {
        let mut m = Mapping::new();
        m.insert("a", Node::plain("1").with_inline_comment("# note"));
        let old = m.insert("a", Node::plain("2")).unwrap();
        assert_eq!(old.comments.inline.as_deref(), Some("# note"));
        assert!(m.get("a").unwrap().comments.is_empty());
    }

    #[test]
    fn rename_keeps_position_and_refuses_taken_target() {
        let mut m: Mapping = [("a", Node::plain("1")), ("b", Node::plain("2"))]
            .into_iter()
            .collect();
        assert!(m.rename("a", "z"));
        assert_eq!(m.keys().collect::<Vec<_>>(), ["z", "b"]);
        assert!(!m.rename("z", "b"));
        assert!(!m.rename("missing", "q"));
    }

    #[test]
    fn equality_ignores_location_and_style() {
        let a = Node::plain("1").at(Location::new(3, 4));
        let b = Node::plain("1").with_style(Style::Flow);
        assert_eq!(a, b);
        assert_ne!(a, Node::plain("1").with_inline_comment("# x"));
    }

    #[test]
    fn empty_value_equals_plain_null_only() {
        assert_eq!(Node::null(), Node::plain("null"));
        assert_eq!(Node::plain("null"), Node::null());
        assert_ne!(Node::null(), Node::plain("~"));
        assert_ne!(Node::null(), Node::string("null"));
    }

    #[test]
    fn plain_infers_kind() {
        assert_eq!(Scalar::plain("42").kind, Some(ScalarKind::Int));
        assert_eq!(Scalar::plain("~").kind, Some(ScalarKind::Null));
        assert_eq!(Scalar::plain("hello").kind, Some(ScalarKind::Str));
        assert!(Node::plain("null").is_null());
        assert!(!Node::string("null").is_null());
    }
}
