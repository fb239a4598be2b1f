//! Line-oriented parser for the configuration subset of YAML.
//!
//! The input is split into lines up front. Block structure is recognised from indentation;
//! flow collections (`[a, b]`, `{a: 1}`) are scanned with a cursor that may cross lines.
//! Comment and blank lines are buffered until the next node starts and then become that
//! node's leading comments; for mapping entries they are stored on the value node.

use tracing::trace;

use crate::document::Document;
use crate::error::Error;
use crate::location::Location;
use crate::node::{Mapping, Node, Scalar, ScalarKind, ScalarStyle, Style};
use crate::options::{DuplicateKeyPolicy, Options};

struct Line<'a> {
    /// 1-based.
    number: usize,
    raw: &'a str,
    /// Byte offset where the node content of this line starts. Sequence entries written on
    /// the same line as their `-` move it past the indicator.
    indent: usize,
}

impl<'a> Line<'a> {
    fn content(&self) -> &'a str {
        self.raw[self.indent..].trim_end()
    }
}

#[derive(Clone, Copy)]
struct Cursor {
    idx: usize,
    off: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Chomp {
    Strip,
    Clip,
    Keep,
}

pub(crate) fn parse_document(text: &str, options: &Options) -> Result<Document, Error> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let lines = text
        .lines()
        .enumerate()
        .map(|(i, raw)| Line {
            number: i + 1,
            raw,
            indent: leading_spaces(raw),
        })
        .collect::<Vec<_>>();
    trace!(lines = lines.len(), "parsing document");
    Parser {
        lines,
        pos: 0,
        pending: Vec::new(),
        options,
        depth: 0,
    }
    .document()
}

struct Parser<'a, 'o> {
    lines: Vec<Line<'a>>,
    pos: usize,
    /// Comment and blank lines seen since the last node.
    pending: Vec<String>,
    options: &'o Options,
    depth: usize,
}

impl<'a> Parser<'a, '_> {
    fn loc(&self, idx: usize, off: usize) -> Location {
        match self.lines.get(idx) {
            Some(line) => Location::new(line.number, column(line.raw, off)),
            None => Location::UNKNOWN,
        }
    }

    fn err_at<S: Into<String>>(&self, msg: S, idx: usize, off: usize) -> Error {
        Error::syntax(msg, self.loc(idx, off))
    }

    fn enter(&mut self, location: Location) -> Result<(), Error> {
        if self.depth >= self.options.max_depth {
            return Err(Error::DocumentTooDeep {
                limit: self.options.max_depth,
                location,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Indentation and "is a sequence entry" of the current line.
    fn peek_line(&self) -> Option<(usize, bool)> {
        self.lines
            .get(self.pos)
            .map(|line| (line.indent, is_seq_entry(line.content())))
    }

    /// Move comment and blank lines into `pending` and stop at the next content line.
    fn skip_trivia(&mut self) -> Result<(), Error> {
        while let Some(line) = self.lines.get(self.pos) {
            let raw = line.raw;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                self.pending.push(String::new());
            } else if trimmed.starts_with('#') {
                self.pending.push(trimmed.to_string());
            } else {
                let lead = &raw[..raw.len() - raw.trim_start().len()];
                if let Some(tab) = lead.find('\t') {
                    return Err(self.err_at("tab characters are not allowed in indentation", self.pos, tab));
                }
                return Ok(());
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn document(mut self) -> Result<Document, Error> {
        let mut explicit_start = false;
        let mut start_comment = None;
        self.skip_trivia()?;
        if let Some(line) = self.lines.get(self.pos) {
            let content = line.content();
            if content.starts_with('%') {
                return Err(self.err_at("directives are not supported", self.pos, line.indent));
            }
            if line.indent == 0 && is_marker(content, "---") {
                explicit_start = true;
                start_comment = marker_comment(content).map(str::to_string);
                self.pos += 1;
                self.skip_trivia()?;
            }
        }

        let root = match self.lines.get(self.pos) {
            Some(line) if !(line.indent == 0 && is_marker(line.content(), "...")) => {
                let content = line.content();
                let collection = is_seq_entry(content) || mapping_colon(content).is_some();
                let leading = if collection { Vec::new() } else { std::mem::take(&mut self.pending) };
                let mut root = self.block_node(0)?;
                prepend_leading(&mut root, leading);
                root
            }
            _ => Node::mapping(Mapping::new()),
        };

        self.skip_trivia()?;
        if let Some(line) = self.lines.get(self.pos) {
            if line.indent == 0 && is_marker(line.content(), "...") {
                if let Some(comment) = marker_comment(line.content()) {
                    self.pending.push(comment.to_string());
                }
                self.pos += 1;
                self.skip_trivia()?;
            }
        }
        if let Some(line) = self.lines.get(self.pos) {
            let msg = if line.indent == 0 && is_marker(line.content(), "---") {
                "multiple documents are not supported"
            } else if line.indent > 0 {
                "unexpected indentation"
            } else {
                "unexpected content after the document root"
            };
            return Err(self.err_at(msg, self.pos, line.indent));
        }

        Ok(Document {
            root,
            trailing: self.pending,
            explicit_start,
            start_comment,
        })
    }

    /// Parse the node starting on the current line. `content_min` is the smallest
    /// indentation allowed for block scalar content.
    fn block_node(&mut self, content_min: usize) -> Result<Node, Error> {
        let idx = self.pos;
        let line = &self.lines[idx];
        let (indent, content) = (line.indent, line.content());
        if is_seq_entry(content) {
            self.sequence(indent)
        } else if mapping_colon(content).is_some() {
            self.mapping(indent)
        } else {
            self.inline_value(idx, indent, content_min)
        }
    }

    fn sequence(&mut self, indent: usize) -> Result<Node, Error> {
        let start = self.loc(self.pos, indent);
        self.enter(start)?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            let Some(line) = self.lines.get(self.pos) else {
                break;
            };
            let (raw, line_indent, content) = (line.raw, line.indent, line.content());
            if line_indent < indent || (line_indent == indent && !is_seq_entry(content)) {
                break;
            }
            if line_indent > indent {
                return Err(self.err_at("unexpected indentation", self.pos, line_indent));
            }

            let leading = std::mem::take(&mut self.pending);
            let idx = self.pos;
            let after = &raw[indent + 1..];
            let rest_off = indent + 1 + (after.len() - after.trim_start_matches(' ').len());
            let rest = raw[rest_off..].trim_end();

            let mut item = if rest.is_empty() || rest.starts_with('#') {
                let inline = (!rest.is_empty()).then(|| rest.to_string());
                let at = self.loc(idx, indent);
                self.pos = idx + 1;
                self.skip_trivia()?;
                let mut node = match self.peek_line() {
                    Some((next, _)) if next > indent => self.block_node(indent + 1)?,
                    _ => Node::null().at(at),
                };
                attach_inline(&mut node, inline);
                node
            } else {
                self.lines[idx].indent = rest_off;
                self.block_node(indent + 1)?
            };
            prepend_leading(&mut item, leading);
            items.push(item);
        }
        self.leave();
        Ok(Node::sequence(items).at(start))
    }

    fn mapping(&mut self, indent: usize) -> Result<Node, Error> {
        let start = self.loc(self.pos, indent);
        self.enter(start)?;
        let mut mapping = Mapping::new();
        loop {
            self.skip_trivia()?;
            let Some(line) = self.lines.get(self.pos) else {
                break;
            };
            let (line_indent, content) = (line.indent, line.content());
            if line_indent < indent
                || (line_indent == 0 && (is_marker(content, "---") || is_marker(content, "...")))
            {
                break;
            }
            if line_indent > indent {
                return Err(self.err_at("unexpected indentation", self.pos, line_indent));
            }
            let Some(colon) = mapping_colon(content) else {
                let msg = if is_seq_entry(content) {
                    "expected a mapping key, found a sequence entry"
                } else {
                    "expected a mapping key"
                };
                return Err(self.err_at(msg, self.pos, indent));
            };

            let leading = std::mem::take(&mut self.pending);
            let idx = self.pos;
            let key_loc = self.loc(idx, indent);
            let key = parse_key(&content[..colon], key_loc)?;
            let mut value = self.entry_value(idx, indent + colon + 1, indent)?;
            prepend_leading(&mut value, leading);
            self.insert_entry(&mut mapping, key, value, key_loc)?;
        }
        self.leave();
        Ok(Node::mapping(mapping).at(start))
    }

    fn insert_entry(
        &self,
        mapping: &mut Mapping,
        key: String,
        value: Node,
        location: Location,
    ) -> Result<(), Error> {
        if mapping.contains_key(&key) {
            match self.options.duplicate_keys {
                DuplicateKeyPolicy::Error => {
                    return Err(Error::syntax(format!("duplicate mapping key `{key}`"), location));
                }
                DuplicateKeyPolicy::FirstWins => return Ok(()),
                DuplicateKeyPolicy::LastWins => {}
            }
        }
        mapping.insert(key, value);
        Ok(())
    }

    /// Value of a `key:` entry whose colon ends at byte `off` of line `idx`.
    fn entry_value(&mut self, idx: usize, off: usize, indent: usize) -> Result<Node, Error> {
        let raw = self.lines[idx].raw;
        let after = &raw[off..];
        let rest = after.trim();
        if !rest.is_empty() && !rest.starts_with('#') {
            let start = off + (after.len() - after.trim_start().len());
            return self.inline_value(idx, start, indent + 1);
        }

        let inline = (!rest.is_empty()).then(|| rest.to_string());
        let at = self.loc(idx, off);
        self.pos = idx + 1;
        self.skip_trivia()?;
        let mut node = match self.peek_line() {
            Some((next, _)) if next > indent => self.block_node(indent + 1)?,
            // `key:` followed by `- item` at the key's own indentation.
            Some((next, true)) if next == indent => self.sequence(indent)?,
            _ => Node::null().at(at),
        };
        attach_inline(&mut node, inline);
        Ok(node)
    }

    /// A value that starts at byte `off` of line `idx`: scalar, flow collection or block
    /// scalar header.
    fn inline_value(&mut self, idx: usize, off: usize, content_min: usize) -> Result<Node, Error> {
        let raw = self.lines[idx].raw;
        let text = raw[off..].trim_end();
        let at = self.loc(idx, off);
        let bytes = text.as_bytes();
        match bytes.first() {
            Some(b'[' | b'{') => return self.flow_value(idx, off),
            Some(b'|' | b'>') => return self.block_scalar(idx, off, content_min),
            Some(b'"' | b'\'') => {
                let style = if bytes[0] == b'"' {
                    ScalarStyle::DoubleQuoted
                } else {
                    ScalarStyle::SingleQuoted
                };
                let (value, end) =
                    scan_quoted(raw, off).map_err(|(msg, pos)| self.err_at(msg, idx, pos))?;
                let inline = self.trailing_comment(idx, end)?;
                self.pos = idx + 1;
                let mut node = Node::scalar(Scalar {
                    text: value,
                    kind: Some(ScalarKind::Str),
                    style,
                })
                .at(at);
                node.comments.inline = inline;
                return Ok(node);
            }
            Some(b'-') if is_seq_entry(text) => {
                return Err(Error::syntax("sequence entries are not allowed here", at));
            }
            Some(&first) => check_indicator(first, bytes.get(1).copied(), at)?,
            None => {}
        }

        let (value, comment) = split_comment(text);
        if value.contains(": ") || value.ends_with(':') {
            return Err(Error::syntax("mapping values are not allowed here", at));
        }
        self.pos = idx + 1;
        let mut node = Node::plain(value).at(at);
        node.comments.inline = comment.map(str::to_string);
        Ok(node)
    }

    /// Comment after a value that ended at byte `off`. Anything else is an error.
    fn trailing_comment(&self, idx: usize, off: usize) -> Result<Option<String>, Error> {
        let rest = &self.lines[idx].raw[off..];
        let trimmed = rest.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.starts_with('#') && rest.starts_with([' ', '\t']) {
            return Ok(Some(trimmed.to_string()));
        }
        let at = off + (rest.len() - rest.trim_start().len());
        Err(self.err_at("unexpected characters after the value", idx, at))
    }

    fn block_scalar(&mut self, idx: usize, off: usize, content_min: usize) -> Result<Node, Error> {
        let raw = self.lines[idx].raw;
        let at = self.loc(idx, off);
        let folded = raw[off..].starts_with('>');

        let header = &raw[off + 1..];
        let mut chomp = None;
        let mut explicit = None;
        let mut consumed = 0;
        for c in header.chars() {
            match c {
                '-' if chomp.is_none() => chomp = Some(Chomp::Strip),
                '+' if chomp.is_none() => chomp = Some(Chomp::Keep),
                '1'..='9' if explicit.is_none() => explicit = c.to_digit(10).map(|d| d as usize),
                _ => break,
            }
            consumed += 1;
        }
        let chomp = chomp.unwrap_or(Chomp::Clip);
        let inline = match header[consumed..].trim() {
            "" => None,
            t if t.starts_with('#') && header[consumed..].starts_with([' ', '\t']) => Some(t.to_string()),
            _ => return Err(self.err_at("invalid block scalar header", idx, off + 1 + consumed)),
        };

        let first_content = idx + 1;
        let indent = match explicit {
            Some(n) => content_min.saturating_sub(1) + n,
            None => self.lines[first_content.min(self.lines.len())..]
                .iter()
                .find(|line| !line.raw.trim().is_empty())
                .map_or(content_min, |line| leading_spaces(line.raw)),
        };

        let mut pos = first_content;
        let mut body: Vec<&str> = Vec::new();
        if indent >= content_min {
            while let Some(line) = self.lines.get(pos) {
                if line.raw.trim().is_empty() {
                    body.push("");
                } else if leading_spaces(line.raw) >= indent {
                    body.push(&line.raw[indent..]);
                } else {
                    break;
                }
                pos += 1;
            }
        }
        let mut trailing_blank = 0;
        while body.last() == Some(&"") {
            body.pop();
            trailing_blank += 1;
        }
        if chomp != Chomp::Keep {
            // Blank lines after clipped content belong to the next node.
            pos -= trailing_blank;
        }
        self.pos = pos;

        let mut text = if folded { fold_lines(&body) } else { body.join("\n") };
        match chomp {
            Chomp::Strip => {}
            Chomp::Clip => {
                if !body.is_empty() {
                    text.push('\n');
                }
            }
            Chomp::Keep => {
                if !body.is_empty() {
                    text.push('\n');
                }
                text.push_str(&"\n".repeat(trailing_blank));
            }
        }

        let mut node = Node::scalar(Scalar {
            text,
            kind: Some(ScalarKind::Str),
            style: if folded { ScalarStyle::Folded } else { ScalarStyle::Literal },
        })
        .at(at);
        node.comments.inline = inline;
        Ok(node)
    }

    fn flow_value(&mut self, idx: usize, off: usize) -> Result<Node, Error> {
        let mut cur = Cursor { idx, off };
        let open = self.loc(idx, off);
        let mut node = self.flow_node(&mut cur, open)?;
        node.comments.inline = self.trailing_comment(cur.idx, cur.off)?;
        self.pos = cur.idx + 1;
        Ok(node)
    }

    fn peek(&self, cur: &Cursor) -> Option<u8> {
        self.lines
            .get(cur.idx)
            .and_then(|line| line.raw.as_bytes().get(cur.off).copied())
    }

    /// Skip whitespace, line breaks and comments inside a flow collection.
    fn flow_ws(&self, cur: &mut Cursor, open: Location) -> Result<(), Error> {
        loop {
            let Some(line) = self.lines.get(cur.idx) else {
                return Err(Error::syntax("unterminated flow collection", open));
            };
            let rest = &line.raw[cur.off..];
            let trimmed = rest.trim_start_matches([' ', '\t']);
            cur.off += rest.len() - trimmed.len();
            let comment = trimmed.starts_with('#')
                && (cur.off == 0 || line.raw[..cur.off].ends_with([' ', '\t']));
            if trimmed.is_empty() || comment {
                cur.idx += 1;
                cur.off = 0;
                continue;
            }
            return Ok(());
        }
    }

    fn flow_node(&mut self, cur: &mut Cursor, open: Location) -> Result<Node, Error> {
        self.flow_ws(cur, open)?;
        let at = self.loc(cur.idx, cur.off);
        match self.peek(cur) {
            Some(b'[') => {
                self.enter(at)?;
                cur.off += 1;
                let mut items = Vec::new();
                loop {
                    self.flow_ws(cur, open)?;
                    if self.peek(cur) == Some(b']') {
                        cur.off += 1;
                        break;
                    }
                    items.push(self.flow_node(cur, open)?);
                    self.flow_ws(cur, open)?;
                    match self.peek(cur) {
                        Some(b',') => cur.off += 1,
                        Some(b']') => {
                            cur.off += 1;
                            break;
                        }
                        _ => return Err(self.err_at("expected `,` or `]` in flow sequence", cur.idx, cur.off)),
                    }
                }
                self.leave();
                Ok(Node::sequence(items).with_style(Style::Flow).at(at))
            }
            Some(b'{') => {
                self.enter(at)?;
                cur.off += 1;
                let mut mapping = Mapping::new();
                loop {
                    self.flow_ws(cur, open)?;
                    if self.peek(cur) == Some(b'}') {
                        cur.off += 1;
                        break;
                    }
                    let key_loc = self.loc(cur.idx, cur.off);
                    let key = self.flow_key(cur)?;
                    self.flow_ws(cur, open)?;
                    let value = match self.peek(cur) {
                        Some(b':') => {
                            cur.off += 1;
                            self.flow_ws(cur, open)?;
                            match self.peek(cur) {
                                Some(b',' | b'}') => Node::null().at(self.loc(cur.idx, cur.off)),
                                _ => self.flow_node(cur, open)?,
                            }
                        }
                        Some(b',' | b'}') => Node::null().at(key_loc),
                        _ => return Err(self.err_at("expected `:` in flow mapping", cur.idx, cur.off)),
                    };
                    self.insert_entry(&mut mapping, key, value, key_loc)?;
                    self.flow_ws(cur, open)?;
                    match self.peek(cur) {
                        Some(b',') => cur.off += 1,
                        Some(b'}') => {
                            cur.off += 1;
                            break;
                        }
                        _ => return Err(self.err_at("expected `,` or `}` in flow mapping", cur.idx, cur.off)),
                    }
                }
                self.leave();
                Ok(Node::mapping(mapping).with_style(Style::Flow).at(at))
            }
            Some(q @ (b'"' | b'\'')) => {
                let raw = self.lines[cur.idx].raw;
                let (text, end) =
                    scan_quoted(raw, cur.off).map_err(|(msg, pos)| self.err_at(msg, cur.idx, pos))?;
                cur.off = end;
                let style = if q == b'"' {
                    ScalarStyle::DoubleQuoted
                } else {
                    ScalarStyle::SingleQuoted
                };
                Ok(Node::scalar(Scalar {
                    text,
                    kind: Some(ScalarKind::Str),
                    style,
                })
                .at(at))
            }
            Some(b',' | b']' | b'}') | None => Err(Error::syntax("expected a value", at)),
            Some(first) => {
                let raw = self.lines[cur.idx].raw;
                check_indicator(first, raw.as_bytes().get(cur.off + 1).copied(), at)?;
                let len = flow_plain_len(&raw[cur.off..]);
                let text = raw[cur.off..cur.off + len].trim_end();
                if text.is_empty() {
                    return Err(Error::syntax("expected a value", at));
                }
                cur.off += text.len();
                Ok(Node::plain(text).at(at))
            }
        }
    }

    fn flow_key(&mut self, cur: &mut Cursor) -> Result<String, Error> {
        let at = self.loc(cur.idx, cur.off);
        let raw = self.lines[cur.idx].raw;
        match self.peek(cur) {
            Some(b'"' | b'\'') => {
                let (text, end) =
                    scan_quoted(raw, cur.off).map_err(|(msg, pos)| self.err_at(msg, cur.idx, pos))?;
                cur.off = end;
                Ok(text)
            }
            Some(b'[' | b'{') => Err(Error::syntax("collections cannot be used as mapping keys", at)),
            Some(first) => {
                check_indicator(first, raw.as_bytes().get(cur.off + 1).copied(), at)?;
                let len = flow_plain_len(&raw[cur.off..]);
                let text = raw[cur.off..cur.off + len].trim_end();
                if text.is_empty() {
                    return Err(Error::syntax("empty mapping key", at));
                }
                cur.off += text.len();
                Ok(text.to_string())
            }
            None => Err(Error::syntax("expected a mapping key", at)),
        }
    }
}

fn leading_spaces(raw: &str) -> usize {
    raw.len() - raw.trim_start_matches(' ').len()
}

/// 1-based character column of byte offset `off`.
fn column(raw: &str, off: usize) -> usize {
    raw.get(..off).map_or(off, |prefix| prefix.chars().count()) + 1
}

fn is_seq_entry(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// `---` / `...`, alone or followed by a comment.
fn is_marker(content: &str, marker: &str) -> bool {
    content.strip_prefix(marker).is_some_and(|rest| {
        rest.is_empty() || (rest.starts_with([' ', '\t']) && rest.trim_start().starts_with('#'))
    })
}

/// The `# ...` after a `---` / `...` marker.
fn marker_comment(content: &str) -> Option<&str> {
    let rest = content.get(3..)?.trim_start();
    rest.starts_with('#').then(|| rest.trim_end())
}

fn prepend_leading(node: &mut Node, mut leading: Vec<String>) {
    if leading.is_empty() {
        return;
    }
    leading.append(&mut node.comments.leading);
    node.comments.leading = leading;
}

fn attach_inline(node: &mut Node, inline: Option<String>) {
    if let Some(comment) = inline {
        if node.comments.inline.is_none() {
            node.comments.inline = Some(comment);
        } else {
            node.comments.leading.insert(0, comment);
        }
    }
}

/// Reject YAML features outside the supported subset.
fn check_indicator(first: u8, second: Option<u8>, at: Location) -> Result<(), Error> {
    let msg = match first {
        b'&' => "anchors are not supported",
        b'*' => "aliases are not supported",
        b'!' => "tags are not supported",
        b'%' | b'@' | b'`' => "reserved indicator cannot start a plain scalar",
        b'?' if matches!(second, None | Some(b' ')) => "complex mapping keys are not supported",
        _ => return Ok(()),
    };
    Err(Error::syntax(msg, at))
}

/// Byte offset of the `:` that makes this line a `key: value` entry.
fn mapping_colon(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let ends_key = |i: usize| matches!(bytes.get(i + 1), None | Some(b' ' | b'\t'));
    match bytes.first()? {
        &quote @ (b'"' | b'\'') => {
            let mut i = 1;
            loop {
                let b = *bytes.get(i)?;
                if quote == b'"' && b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == quote {
                    if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') {
                        i += 2;
                        continue;
                    }
                    break;
                }
                i += 1;
            }
            i += 1;
            while bytes.get(i) == Some(&b' ') {
                i += 1;
            }
            (bytes.get(i) == Some(&b':') && ends_key(i)).then_some(i)
        }
        b'[' | b'{' | b'#' => None,
        b'-' if matches!(bytes.get(1), None | Some(b' ')) => None,
        _ => {
            for i in 0..bytes.len() {
                match bytes[i] {
                    b':' if ends_key(i) => return Some(i),
                    b'#' if i > 0 && matches!(bytes[i - 1], b' ' | b'\t') => return None,
                    _ => {}
                }
            }
            None
        }
    }
}

fn parse_key(raw_key: &str, at: Location) -> Result<String, Error> {
    let key = raw_key.trim_end();
    let bytes = key.as_bytes();
    match bytes.first() {
        None => Err(Error::syntax("empty mapping key", at)),
        Some(b'"' | b'\'') => scan_quoted(key, 0)
            .map(|(text, _)| text)
            .map_err(|(msg, _)| Error::syntax(msg, at)),
        Some(&first) => {
            check_indicator(first, bytes.get(1).copied(), at)?;
            Ok(key.to_string())
        }
    }
}

/// Split `value # comment`. A `#` only starts a comment after whitespace.
fn split_comment(text: &str) -> (&str, Option<&str>) {
    let bytes = text.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i] == b'#' && matches!(bytes[i - 1], b' ' | b'\t') {
            return (text[..i].trim_end(), Some(&text[i..]));
        }
    }
    (text, None)
}

/// Length of a plain scalar inside a flow collection.
fn flow_plain_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b',' | b'[' | b']' | b'{' | b'}' => break,
            b':' if matches!(
                bytes.get(i + 1),
                None | Some(b' ' | b'\t' | b',' | b'[' | b']' | b'{' | b'}')
            ) =>
            {
                break;
            }
            b'#' if i > 0 && matches!(bytes[i - 1], b' ' | b'\t') => break,
            _ => {}
        }
        i += 1;
    }
    i
}

/// Scan a single-line quoted scalar starting at byte `start` (the opening quote).
/// Returns the decoded text and the byte offset just past the closing quote, or an error
/// message with the byte offset it refers to.
fn scan_quoted(s: &str, start: usize) -> Result<(String, usize), (&'static str, usize)> {
    let double = s.as_bytes().get(start) == Some(&b'"');
    let body = &s[start + 1..];
    let mut out = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let at = start + 1 + i;
        if !double {
            if c == '\'' {
                if chars.peek().is_some_and(|(_, next)| *next == '\'') {
                    chars.next();
                    out.push('\'');
                    continue;
                }
                return Ok((out, at + 1));
            }
            out.push(c);
            continue;
        }
        match c {
            '"' => return Ok((out, at + 1)),
            '\\' => {
                let Some((_, escape)) = chars.next() else {
                    return Err(("unterminated escape sequence", at));
                };
                let simple = match escape {
                    '0' => Some('\0'),
                    'a' => Some('\u{07}'),
                    'b' => Some('\u{08}'),
                    't' | '\t' => Some('\t'),
                    'n' => Some('\n'),
                    'v' => Some('\u{0B}'),
                    'f' => Some('\u{0C}'),
                    'r' => Some('\r'),
                    'e' => Some('\u{1B}'),
                    ' ' => Some(' '),
                    '"' => Some('"'),
                    '/' => Some('/'),
                    '\\' => Some('\\'),
                    'N' => Some('\u{85}'),
                    '_' => Some('\u{A0}'),
                    'L' => Some('\u{2028}'),
                    'P' => Some('\u{2029}'),
                    _ => None,
                };
                if let Some(ch) = simple {
                    out.push(ch);
                    continue;
                }
                let digits = match escape {
                    'x' => 2,
                    'u' => 4,
                    'U' => 8,
                    _ => return Err(("invalid escape sequence", at)),
                };
                let mut code = 0u32;
                for _ in 0..digits {
                    let digit = chars
                        .next()
                        .and_then(|(_, h)| h.to_digit(16))
                        .ok_or(("invalid escape sequence", at))?;
                    code = code * 16 + digit;
                }
                out.push(char::from_u32(code).ok_or(("invalid escape sequence", at))?);
            }
            c => out.push(c),
        }
    }
    Err(("unterminated quoted scalar", start))
}

/// Fold block scalar lines: single breaks between text lines become spaces, empty lines
/// become breaks, more-indented lines keep theirs.
fn fold_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    let mut breaks = 0usize;
    let mut prev_more: Option<bool> = None;
    for line in lines {
        if line.is_empty() {
            breaks += 1;
            continue;
        }
        let more = line.starts_with([' ', '\t']);
        match prev_more {
            None => out.push_str(&"\n".repeat(breaks)),
            Some(prev) if breaks == 0 && !prev && !more => out.push(' '),
            Some(prev) if prev || more => out.push_str(&"\n".repeat(breaks + 1)),
            Some(_) => out.push_str(&"\n".repeat(breaks)),
        }
        out.push_str(line);
        breaks = 0;
        prev_more = Some(more);
    }
    out
}
