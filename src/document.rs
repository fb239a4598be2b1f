//! Parsed documents and dotted-path access.
//!
//! A [`Document`] owns the root node plus the comment lines written after it. Paths are
//! dotted key lists (`server.listeners.0.port`); a numeric segment indexes a sequence and is
//! an ordinary key inside a mapping.
//!
//! ```
//! use axiom::{Document, Node};
//!
//! let mut doc = Document::parse("a: 1 # comment\n").unwrap();
//! doc.set("a", Node::plain("2")).unwrap();
//! assert_eq!(doc.to_string(), "a: 2 # comment\n");
//! ```

use std::fmt;
use std::io::{Read, Write};

use serde_json::Value;
use tracing::{debug, trace};

use crate::codec::decode;
use crate::emit::emit_document;
use crate::error::Error;
use crate::node::{Mapping, Node, NodeValue};
use crate::options::Options;
use crate::parse::parse_document;
use crate::path::Path;
use crate::reader::read_to_string;
use crate::schema::Kind;
use crate::serializer_options::SerializerOptions;

/// A configuration document: the root node and trailing comment lines.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Node,
    /// Comment and blank lines after the last node.
    pub trailing: Vec<String>,
    /// The text started with an explicit `---` marker; it is written back.
    pub explicit_start: bool,
    /// Comment on the `---` line.
    pub start_comment: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// How [`Document::merge_defaults`] treats keys present on both sides.
///
/// Keys missing from the document are always copied from the defaults, comments included.
/// Existing keys without comments take the defaults' comments in every mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    /// Replace existing leaf values with the defaults' values.
    pub overwrite_values: bool,
    /// Replace the comments of existing keys with the defaults' comments, where the
    /// defaults have any.
    pub overwrite_comments: bool,
    /// Replace a scalar or sequence with the defaults' mapping when the defaults expect a
    /// section there. On by default.
    pub overwrite_invalid: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            overwrite_values: false,
            overwrite_comments: false,
            overwrite_invalid: true,
        }
    }
}

impl Document {
    /// Empty document (an empty root mapping).
    pub fn new() -> Self {
        Self::from_root(Node::mapping(Mapping::new()))
    }

    pub fn from_root(root: Node) -> Self {
        Self {
            root,
            trailing: Vec::new(),
            explicit_start: false,
            start_comment: None,
        }
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::parse_with_options(text, &Options::default())
    }

    pub fn parse_with_options(text: &str, options: &Options) -> Result<Self, Error> {
        parse_document(text, options)
    }

    /// Read and parse a whole stream. UTF-16 input is accepted when it starts with a byte
    /// order mark; `options.max_input_bytes` caps the decoded size.
    pub fn read<R: Read>(reader: R, options: &Options) -> Result<Self, Error> {
        let text = read_to_string(reader, options.max_input_bytes)?;
        Self::parse_with_options(&text, options)
    }

    pub fn serialize(&self, options: &SerializerOptions) -> Result<String, Error> {
        let mut out = String::new();
        emit_document(self, options, &mut out)?;
        trace!(bytes = out.len(), "serialized document");
        Ok(out)
    }

    pub fn write<W: Write>(&self, mut writer: W, options: &SerializerOptions) -> Result<(), Error> {
        let text = self.serialize(options)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&Node> {
        segments(path).try_fold(&self.root, |node, seg| child(node, seg))
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Node> {
        segments(path).try_fold(&mut self.root, |node, seg| child_mut(node, seg))
    }

    /// Text of the scalar at `path`. Null values and collections give `None`.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)
            .filter(|node| !node.is_null())
            .and_then(Node::as_str)
    }

    /// Integer at `path`, in any notation the codec accepts (`0x1F`, `0o17`).
    pub fn get_int(&self, path: &str) -> Result<Option<i64>, Error> {
        match self.decoded(path, &Kind::Int)? {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.mismatch(path, "an integer within i64", &value)),
        }
    }

    pub fn get_bool(&self, path: &str) -> Result<Option<bool>, Error> {
        Ok(self.decoded(path, &Kind::Bool)?.and_then(|value| value.as_bool()))
    }

    /// Scalar texts of the sequence at `path`.
    pub fn get_string_list(&self, path: &str) -> Result<Option<Vec<String>>, Error> {
        let Some(node) = self.get(path).filter(|node| !node.is_null()) else {
            return Ok(None);
        };
        let Some(items) = node.as_sequence() else {
            return Err(Error::mismatch("a sequence", node.describe()).at(&to_path(path), node.location));
        };
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::mismatch("a string", item.describe())
                        .at(&to_path(path).join(idx), item.location)
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn decoded(&self, path: &str, kind: &Kind) -> Result<Option<Value>, Error> {
        let Some(node) = self.get(path).filter(|node| !node.is_null()) else {
            return Ok(None);
        };
        let at = to_path(path);
        let scalar = node
            .as_scalar()
            .ok_or_else(|| Error::mismatch(kind.expecting(), node.describe()).at(&at, node.location))?;
        decode(scalar, kind, false)
            .map(Some)
            .map_err(|err| err.at(&at, node.location))
    }

    fn mismatch(&self, path: &str, expected: &'static str, value: &Value) -> Error {
        let location = self.get(path).map_or(Default::default(), |node| node.location);
        Error::mismatch(expected, value.to_string()).at(&to_path(path), location)
    }

    /// Set the value at `path`, creating intermediate mappings (null values on the way are
    /// replaced by mappings).
    ///
    /// When `node` has no comments of its own it takes over the comments of the value it
    /// replaces, so `a: 1 # note` stays annotated after `set("a", ..)`.
    pub fn set(&mut self, path: &str, mut node: Node) -> Result<(), Error> {
        let segs = segments(path).collect::<Vec<_>>();
        let Some((last, parents)) = segs.split_last() else {
            carry_comments(&self.root, &mut node);
            self.root = node;
            return Ok(());
        };
        let not_a_mapping = |depth: usize| {
            let at = if depth == 0 { "<root>".to_string() } else { segs[..depth].join(".") };
            Error::msg(format!("cannot set `{path}`: `{at}` is not a mapping"))
        };

        let mut cur = &mut self.root;
        for (depth, seg) in parents.iter().enumerate() {
            if cur.is_null() {
                cur.replace_value(NodeValue::Mapping(Mapping::new()));
            }
            cur = match &mut cur.value {
                NodeValue::Mapping(m) => {
                    if !m.contains_key(seg) {
                        m.insert(*seg, Node::mapping(Mapping::new()));
                    }
                    m.get_mut(seg)
                }
                NodeValue::Sequence(items) => seg.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
                _ => None,
            }
            .ok_or_else(|| not_a_mapping(depth))?;
        }

        if cur.is_null() {
            cur.replace_value(NodeValue::Mapping(Mapping::new()));
        }
        match &mut cur.value {
            NodeValue::Mapping(m) => {
                if let Some(old) = m.get(last) {
                    carry_comments(old, &mut node);
                }
                m.insert(*last, node);
                Ok(())
            }
            NodeValue::Sequence(items) => match last.parse::<usize>() {
                Ok(i) if i < items.len() => {
                    carry_comments(&items[i], &mut node);
                    items[i] = node;
                    Ok(())
                }
                Ok(i) if i == items.len() => {
                    items.push(node);
                    Ok(())
                }
                _ => Err(Error::msg(format!("cannot set `{path}`: index out of range"))),
            },
            _ => Err(not_a_mapping(parents.len())),
        }
    }

    /// Remove the value at `path` and return it.
    pub fn remove(&mut self, path: &str) -> Option<Node> {
        let (parent, last) = match path.rsplit_once('.') {
            Some((parent, last)) => (self.get_mut(parent)?, last),
            None if path.is_empty() => return None,
            None => (&mut self.root, path),
        };
        match &mut parent.value {
            NodeValue::Mapping(m) => m.remove(last),
            NodeValue::Sequence(items) => match last.parse::<usize>() {
                Ok(i) if i < items.len() => Some(items.remove(i)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Keys of the mapping at `path` (`""` is the root), in document order.
    pub fn keys(&self, path: &str) -> Vec<String> {
        self.get(path)
            .and_then(Node::as_mapping)
            .map(|m| m.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Every dotted path through nested mappings, parents before their children.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_paths(&self.root, "", &mut out);
        out
    }

    /// Fill in keys from `defaults` that this document lacks, recursing into mappings
    /// present on both sides.
    pub fn merge_defaults(&mut self, defaults: &Document, options: MergeOptions) {
        merge_node(&mut self.root, &defaults.root, options);
        if !defaults.trailing.is_empty() && (options.overwrite_comments || self.trailing.is_empty()) {
            self.trailing = defaults.trailing.clone();
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .serialize(&SerializerOptions::default())
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|_| !path.is_empty())
}

fn to_path(dotted: &str) -> Path {
    segments(dotted).fold(Path::root(), |path, seg| path.join(seg))
}

fn child<'a>(node: &'a Node, seg: &str) -> Option<&'a Node> {
    match &node.value {
        NodeValue::Mapping(m) => m.get(seg),
        NodeValue::Sequence(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Node, seg: &str) -> Option<&'a mut Node> {
    match &mut node.value {
        NodeValue::Mapping(m) => m.get_mut(seg),
        NodeValue::Sequence(items) => seg.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

fn carry_comments(old: &Node, new: &mut Node) {
    if new.comments.is_empty() {
        new.comments = old.comments.clone();
    }
}

fn collect_paths(node: &Node, prefix: &str, out: &mut Vec<String>) {
    let Some(mapping) = node.as_mapping() else {
        return;
    };
    for (key, child) in mapping.iter() {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        out.push(path.clone());
        collect_paths(child, &path, out);
    }
}

fn merge_node(target: &mut Node, defaults: &Node, options: MergeOptions) {
    let (Some(existing), Some(wanted)) = (target.as_mapping_mut(), defaults.as_mapping()) else {
        return;
    };
    for (key, default) in wanted.iter() {
        let Some(current) = existing.get_mut(key) else {
            existing.insert(key, default.clone());
            continue;
        };
        merge_comments(current, default, options.overwrite_comments);
        match (current.as_mapping().is_some(), default.as_mapping().is_some()) {
            (true, true) => merge_node(current, default, options),
            (false, true) if options.overwrite_invalid || options.overwrite_values => {
                debug!(key, "replacing a non-mapping value with the default section");
                current.replace_value(default.value.clone());
                current.style = default.style;
            }
            _ if options.overwrite_values => {
                current.replace_value(default.value.clone());
                current.style = default.style;
            }
            _ => {}
        }
    }
}

fn merge_comments(current: &mut Node, default: &Node, overwrite: bool) {
    if default.comments.is_empty() {
        return;
    }
    if overwrite {
        current.comments = default.comments.clone();
        return;
    }
    if current.comments.leading.is_empty() {
        current.comments.leading = default.comments.leading.clone();
    }
    if current.comments.inline.is_none() {
        current.comments.inline = default.comments.inline.clone();
    }
}
