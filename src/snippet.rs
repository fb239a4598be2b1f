//! Source snippets for error reports.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet, renderer::DecorStyle};

use crate::error::Error;
use crate::location::Location;

/// Render `error` against the text it came from, with a small source window and a caret
/// under every located failure. `path` is the display name in the snippet header.
///
/// Errors without a location fall back to their plain message.
///
/// ```
/// let text = "ports: [80, 443\n";
/// let err = axiom::Document::parse(text).unwrap_err();
/// let report = axiom::render_snippet(&err, text, "app.yaml");
/// assert!(report.contains("app.yaml"));
/// ```
pub fn render_snippet(error: &Error, source: &str, path: &str) -> String {
    // Locations are computed on text without the byte order mark.
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
    let starts = line_starts(source);
    let mut out = Vec::new();
    if let Error::Aggregate { .. } = error {
        out.push(error.message());
    }
    for leaf in error.leaves() {
        let msg = leaf.message();
        let rendered = leaf
            .location()
            .and_then(|location| render_one(source, &starts, path, &msg, location));
        out.push(rendered.unwrap_or_else(|| leaf.to_string()));
    }
    out.join("\n")
}

fn render_one(
    source: &str,
    starts: &[usize],
    path: &str,
    msg: &str,
    location: Location,
) -> Option<String> {
    let row = location.line as usize;
    let col = location.column as usize;
    let start = line_col_to_byte_offset_with_starts(source, starts, row, col)?;
    let end = match source.as_bytes().get(start) {
        Some(b'\n') | Some(b'\r') => start,
        _ => next_char_boundary(source, start).unwrap_or(start),
    };

    // Two lines before and after the error line.
    let total_lines = starts.len();
    let window_start_row = row.saturating_sub(2).max(1);
    let window_end_row = row.saturating_add(2).min(total_lines);
    let window_start = starts[window_start_row - 1];
    let window_end = if window_end_row < total_lines {
        starts[window_end_row]
    } else {
        source.len()
    };
    let window = &source[window_start..window_end];
    let local_start = start.saturating_sub(window_start).min(window.len());
    let local_end = end.saturating_sub(window_start).min(window.len());

    let report = &[Level::ERROR
        .primary_title(format!("line {row} column {col}: {msg}"))
        .element(
            Snippet::source(window)
                .line_start(window_start_row)
                .path(path)
                .fold(false)
                .annotation(AnnotationKind::Primary.span(local_start..local_end).label(msg)),
        )];
    // Plain ASCII output keeps reports stable and free of escape sequences.
    let renderer = Renderer::plain().decor_style(DecorStyle::Ascii);
    Some(renderer.render(report).to_string())
}

fn line_starts(source: &str) -> Vec<usize> {
    if source.is_empty() {
        return Vec::new();
    }
    let mut starts = vec![0usize];
    for (i, b) in source.as_bytes().iter().enumerate() {
        if *b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// Byte offset of the 1-based (row, character column) position. A trailing `\r` is not
/// counted, so column `len + 1` is the end of the line.
fn line_col_to_byte_offset_with_starts(
    source: &str,
    starts: &[usize],
    row: usize,
    col: usize,
) -> Option<usize> {
    if row == 0 || col == 0 || row > starts.len() {
        return None;
    }
    let line_start = starts[row - 1];
    let mut line_end = match starts.get(row) {
        Some(next) => next.saturating_sub(1),
        None => source.len(),
    };
    if line_end > line_start && source.as_bytes().get(line_end - 1) == Some(&b'\r') {
        line_end -= 1;
    }
    let line = &source[line_start..line_end];
    let offset = match line.char_indices().nth(col - 1) {
        Some((off, _)) => off,
        None if line.chars().count() + 1 == col => line.len(),
        None => return None,
    };
    Some(line_start + offset)
}

fn next_char_boundary(source: &str, start: usize) -> Option<usize> {
    let c = source.get(start..)?.chars().next()?;
    Some(start + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_count_characters() {
        let text = "é: 1\r\nb: ü\n";
        let starts = line_starts(text);
        assert_eq!(line_col_to_byte_offset_with_starts(text, &starts, 1, 2), Some(2));
        assert_eq!(line_col_to_byte_offset_with_starts(text, &starts, 2, 4), Some(10));
        assert_eq!(line_col_to_byte_offset_with_starts(text, &starts, 1, 5), Some(5));
        assert_eq!(line_col_to_byte_offset_with_starts(text, &starts, 1, 9), None);
    }

    #[test]
    fn renders_located_error() {
        let text = "a: 1\nb: 'open\nc: 3\n";
        let err = crate::Document::parse(text).unwrap_err();
        let report = render_snippet(&err, text, "conf.yaml");
        assert!(report.contains("line 2 column 4"), "{report}");
        assert!(report.contains("conf.yaml"), "{report}");
        assert!(report.contains("b: 'open"), "{report}");
    }

    #[test]
    fn unlocated_errors_use_their_message() {
        let err = Error::msg("nothing to point at");
        assert_eq!(render_snippet(&err, "a: 1\n", "x"), "nothing to point at");
    }
}
