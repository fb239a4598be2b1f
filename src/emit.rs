//! Node tree to YAML text.
//!
//! Comments are written where they were read: leading lines above the node at its
//! indentation, inline comments after the value on the same line. Inside flow collections
//! there is no room for them, so they are dropped.

use std::fmt::Write;

use crate::document::Document;
use crate::error::Error;
use crate::node::{Mapping, Node, NodeValue, Scalar, ScalarKind, ScalarStyle, Style};
use crate::path::Path;
use crate::ser_quoting::{
    is_plain_key_safe, is_plain_safe, plain_reads_as, single_quote_compatible,
    write_double_quoted, write_single_quoted,
};
use crate::serializer_options::SerializerOptions;

pub(crate) fn emit_document<W: Write>(
    doc: &Document,
    opts: &SerializerOptions,
    out: &mut W,
) -> Result<(), Error> {
    opts.consistent()?;
    let mut emitter = Emitter {
        out,
        opts,
        path: Path::root(),
    };
    emitter.document(doc)
}

/// How a scalar is going to be written.
enum Repr {
    Inline(String),
    Block {
        literal: bool,
        /// Chomping indicator: `-`, empty (clip) or `+`.
        chomp: &'static str,
        body: String,
        /// Blank lines kept after the body (`+` only).
        extra: usize,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Parent {
    Root,
    Key,
    Item,
}

struct Emitter<'a, W: Write> {
    out: &'a mut W,
    opts: &'a SerializerOptions,
    path: Path,
}

impl<W: Write> Emitter<'_, W> {
    fn pad(&mut self, n: usize) -> Result<(), Error> {
        write!(self.out, "{:n$}", "")?;
        Ok(())
    }

    fn item_width(&self) -> usize {
        self.opts.indent_step.max(2)
    }

    fn comments(&mut self, lines: &[String], indent: usize) -> Result<(), Error> {
        for line in lines {
            if !line.is_empty() {
                self.pad(indent)?;
                self.out.write_str(line)?;
            }
            self.out.write_char('\n')?;
        }
        Ok(())
    }

    fn inline_comment(&mut self, node: &Node) -> Result<(), Error> {
        if let Some(comment) = &node.comments.inline {
            self.out.write_char(' ')?;
            self.out.write_str(comment)?;
        }
        Ok(())
    }

    fn is_flow(&self, node: &Node) -> bool {
        if !matches!(node.value, NodeValue::Sequence(_) | NodeValue::Mapping(_)) {
            return false;
        }
        if self.opts.respect_flow_hints && node.style == Style::Flow {
            return true;
        }
        if self.opts.flow_paths.is_empty() {
            return false;
        }
        let here = self.path.to_string();
        self.opts.flow_paths.iter().any(|p| *p == here)
    }

    fn document(&mut self, doc: &Document) -> Result<(), Error> {
        if doc.explicit_start || doc.start_comment.is_some() {
            self.out.write_str("---")?;
            if let Some(comment) = &doc.start_comment {
                self.out.write_char(' ')?;
                self.out.write_str(comment)?;
            }
            self.out.write_char('\n')?;
        }
        let root = &doc.root;
        self.comments(&root.comments.leading, 0)?;
        let block = !self.is_flow(root);
        match &root.value {
            NodeValue::Null => {}
            NodeValue::Mapping(m) if m.is_empty() && root.style == Style::Block => {}
            NodeValue::Mapping(m) if block && !m.is_empty() => self.entries(m, 0)?,
            NodeValue::Sequence(items) if block && !items.is_empty() => self.items(items, 0)?,
            _ => self.value(root, 0, Parent::Root)?,
        }
        self.comments(&doc.trailing, 0)
    }

    fn key(&mut self, key: &str) -> Result<(), Error> {
        if is_plain_key_safe(key, false) {
            self.out.write_str(key)?;
        } else {
            write_double_quoted(&mut *self.out, key)?;
        }
        Ok(())
    }

    fn entry(&mut self, key: &str, child: &Node, indent: usize) -> Result<(), Error> {
        self.comments(&child.comments.leading, indent)?;
        self.pad(indent)?;
        self.key(key)?;
        self.out.write_char(':')?;
        self.path.push(key);
        self.value(child, indent, Parent::Key)?;
        self.path.pop();
        Ok(())
    }

    fn entries(&mut self, mapping: &Mapping, indent: usize) -> Result<(), Error> {
        for (key, child) in mapping.iter() {
            self.entry(key, child, indent)?;
        }
        Ok(())
    }

    fn items(&mut self, items: &[Node], indent: usize) -> Result<(), Error> {
        let width = self.item_width();
        for (idx, item) in items.iter().enumerate() {
            self.path.push(idx);
            self.comments(&item.comments.leading, indent)?;
            self.pad(indent)?;
            self.out.write_char('-')?;
            match &item.value {
                NodeValue::Mapping(m) if self.compact(item, m) => self.compact_item(m, indent + width)?,
                _ => self.value(item, indent, Parent::Item)?,
            }
            self.path.pop();
        }
        Ok(())
    }

    fn compact(&self, item: &Node, mapping: &Mapping) -> bool {
        !self.is_flow(item)
            && item.comments.inline.is_none()
            && mapping
                .iter()
                .next()
                .is_some_and(|(_, first)| first.comments.leading.is_empty())
    }

    /// `- key: value` with the remaining entries aligned under the first key at `indent`.
    fn compact_item(&mut self, mapping: &Mapping, indent: usize) -> Result<(), Error> {
        self.pad(self.item_width() - 1)?;
        for (idx, (key, child)) in mapping.iter().enumerate() {
            if idx > 0 {
                self.entry(key, child, indent)?;
                continue;
            }
            self.key(key)?;
            self.out.write_char(':')?;
            self.path.push(key);
            self.value(child, indent, Parent::Key)?;
            self.path.pop();
        }
        Ok(())
    }

    /// Write `node` after its indicator (`key:` or `-`), finish the line and write any
    /// nested block content. `indent` is the indicator's column.
    fn value(&mut self, node: &Node, indent: usize, parent: Parent) -> Result<(), Error> {
        let sep = if parent == Parent::Root { "" } else { " " };
        let flow = self.is_flow(node);
        match &node.value {
            NodeValue::Null => {
                self.inline_comment(node)?;
                self.out.write_char('\n')?;
            }
            NodeValue::Scalar(scalar) => match self.scalar_repr(scalar, false)? {
                Repr::Inline(text) => {
                    if !text.is_empty() {
                        self.out.write_str(sep)?;
                        self.out.write_str(&text)?;
                    }
                    self.inline_comment(node)?;
                    self.out.write_char('\n')?;
                }
                Repr::Block {
                    literal,
                    chomp,
                    body,
                    extra,
                } => {
                    self.out.write_str(sep)?;
                    self.out.write_char(if literal { '|' } else { '>' })?;
                    self.out.write_str(chomp)?;
                    self.inline_comment(node)?;
                    self.out.write_char('\n')?;
                    let body_indent = if parent == Parent::Root {
                        self.opts.indent_step
                    } else {
                        indent + self.opts.indent_step
                    };
                    self.block_body(&body, body_indent, literal)?;
                    for _ in 0..extra {
                        self.out.write_char('\n')?;
                    }
                }
            },
            NodeValue::Sequence(items) if flow || items.is_empty() => {
                self.out.write_str(sep)?;
                self.flow(node)?;
                self.inline_comment(node)?;
                self.out.write_char('\n')?;
            }
            NodeValue::Mapping(m) if flow || m.is_empty() => {
                self.out.write_str(sep)?;
                self.flow(node)?;
                self.inline_comment(node)?;
                self.out.write_char('\n')?;
            }
            NodeValue::Sequence(items) => {
                self.inline_comment(node)?;
                self.out.write_char('\n')?;
                let child = match parent {
                    Parent::Key if self.opts.indent_sequences => indent + self.opts.indent_step,
                    Parent::Key | Parent::Root => indent,
                    Parent::Item => indent + self.item_width(),
                };
                self.items(items, child)?;
            }
            NodeValue::Mapping(m) => {
                self.inline_comment(node)?;
                self.out.write_char('\n')?;
                let child = match parent {
                    Parent::Key => indent + self.opts.indent_step,
                    Parent::Item => indent + self.item_width(),
                    Parent::Root => indent,
                };
                self.entries(m, child)?;
            }
        }
        Ok(())
    }

    fn flow(&mut self, node: &Node) -> Result<(), Error> {
        match &node.value {
            NodeValue::Null => self.out.write_str("null")?,
            NodeValue::Scalar(scalar) => match self.scalar_repr(scalar, true)? {
                Repr::Inline(text) if text.is_empty() => self.out.write_str("null")?,
                Repr::Inline(text) => self.out.write_str(&text)?,
                Repr::Block { .. } => write_double_quoted(&mut *self.out, &scalar.text)?,
            },
            NodeValue::Sequence(items) => {
                self.out.write_char('[')?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        self.out.write_str(", ")?;
                    }
                    self.flow(item)?;
                }
                self.out.write_char(']')?;
            }
            NodeValue::Mapping(m) => {
                self.out.write_char('{')?;
                for (idx, (key, child)) in m.iter().enumerate() {
                    if idx > 0 {
                        self.out.write_str(", ")?;
                    }
                    if is_plain_key_safe(key, true) {
                        self.out.write_str(key)?;
                    } else {
                        write_double_quoted(&mut *self.out, key)?;
                    }
                    self.out.write_str(": ")?;
                    self.flow(child)?;
                }
                self.out.write_char('}')?;
            }
        }
        Ok(())
    }

    fn scalar_repr(&self, scalar: &Scalar, flow: bool) -> Result<Repr, Error> {
        let text = scalar.text.as_str();
        let is_str = scalar.kind == Some(ScalarKind::Str);
        match scalar.style {
            ScalarStyle::SingleQuoted if !self.opts.quote_all && single_quote_compatible(text) => {
                let mut out = String::with_capacity(text.len() + 2);
                write_single_quoted(&mut out, text)?;
                return Ok(Repr::Inline(out));
            }
            ScalarStyle::DoubleQuoted => return double_quoted(text),
            ScalarStyle::Literal if !flow && block_compatible(text) => return Ok(block(text, true)),
            ScalarStyle::Folded if !flow && block_compatible(text) => {
                return Ok(block(text, !foldable(text)));
            }
            _ => {}
        }
        if is_str && !flow && text.contains('\n') && self.opts.prefer_block_scalars && block_compatible(text) {
            return Ok(block(text, true));
        }
        if is_str && self.opts.quote_all {
            return double_quoted(text);
        }
        let reads_back = scalar.kind.is_none_or(|kind| plain_reads_as(text, kind));
        if is_plain_safe(text, flow) && reads_back {
            Ok(Repr::Inline(text.to_string()))
        } else if text.is_empty() && scalar.kind == Some(ScalarKind::Null) {
            Ok(Repr::Inline(String::new()))
        } else {
            double_quoted(text)
        }
    }

    fn block_body(&mut self, body: &str, indent: usize, literal: bool) -> Result<(), Error> {
        for (idx, line) in body.split('\n').enumerate() {
            if !literal && idx > 0 {
                // A single line break folds to a space, so each break is written as a
                // blank line.
                self.out.write_char('\n')?;
            }
            if !line.is_empty() {
                self.pad(indent)?;
                self.out.write_str(line)?;
            }
            if literal || !line.is_empty() {
                self.out.write_char('\n')?;
            }
        }
        Ok(())
    }
}

fn double_quoted(text: &str) -> Result<Repr, Error> {
    let mut out = String::with_capacity(text.len() + 2);
    write_double_quoted(&mut out, text)?;
    Ok(Repr::Inline(out))
}

fn block(text: &str, literal: bool) -> Repr {
    let body = text.trim_end_matches('\n');
    let newlines = text.len() - body.len();
    let (chomp, extra) = match newlines {
        0 => ("-", 0),
        1 => ("", 0),
        n => ("+", n - 1),
    };
    Repr::Block {
        literal,
        chomp,
        body: body.to_string(),
        extra,
    }
}

/// Text that reads back unchanged from a block scalar.
fn block_compatible(text: &str) -> bool {
    let body = text.trim_end_matches('\n');
    if body.is_empty() || text.contains('\r') {
        return false;
    }
    if text.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return false;
    }
    let mut lines = body.split('\n');
    // The first non-empty line fixes the content indentation.
    let first_ok = lines
        .clone()
        .find(|line| !line.is_empty())
        .is_some_and(|line| !line.starts_with([' ', '\t']));
    first_ok && lines.all(|line| line.is_empty() || !line.trim().is_empty())
}

/// Folded output only round-trips when no line is more indented and the text does not
/// start with a break.
fn foldable(text: &str) -> bool {
    !text.starts_with('\n')
        && text
            .trim_end_matches('\n')
            .split('\n')
            .all(|line| !line.starts_with([' ', '\t']) && !line.ends_with(' '))
}
