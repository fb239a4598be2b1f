//! Serializer options for YAML emission.
//!
//! Controls indentation, flow-style placement and scalar styles used when a node tree is
//! written back to text.
//!
//! ```rust
//! let doc = axiom::Document::parse("tags:\n  - a\n  - b\nname: demo\n").unwrap();
//! let opts = axiom::ser_options! {
//!     indent_step: 4,
//!     flow_paths: vec!["tags".to_string()],
//! };
//! let out = doc.serialize(&opts).unwrap();
//! assert_eq!(out, "tags: [a, b]\nname: demo\n");
//! ```

use crate::error::Error;

/// Serializer options for YAML emission.
///
/// Construct `SerializerOptions` using the [`ser_options!`](crate::ser_options!)
/// macro to ensure compatibility with future updates.
#[derive(Clone, Debug)]
pub struct SerializerOptions {
    /// Number of spaces to indent per nesting level (2 by default). Must be between 1 and 9.
    pub indent_step: usize,
    /// Indent block sequences nested under a mapping key by one step (`key:\n  - a`).
    /// When false they are written at the key's column (`key:\n- a`). On by default.
    pub indent_sequences: bool,
    /// Honour the flow hint recorded on parsed (or explicitly styled) collections, so
    /// `tags: [a, b]` stays on one line. When false only `flow_paths` select flow style.
    /// On by default.
    pub respect_flow_hints: bool,
    /// Paths (as rendered by [`crate::Path`], e.g. `server.tags`) whose collections are
    /// always written in flow style.
    pub flow_paths: Vec<String>,
    /// When enabled, multi-line strings are written as literal block scalars (`|`)
    /// instead of double-quoted strings with `\n` escapes. On by default.
    pub prefer_block_scalars: bool,
    /// When enabled, quote all string scalars (double quotes). Off by default.
    pub quote_all: bool,
}

impl SerializerOptions {
    pub(crate) fn consistent(&self) -> Result<(), Error> {
        if self.indent_step == 0 || self.indent_step > 9 {
            return Err(Error::InvalidOptions(format!(
                "indent step must be between 1 and 9, got {}",
                self.indent_step
            )));
        }
        Ok(())
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            indent_step: 2,
            indent_sequences: true,
            respect_flow_hints: true,
            flow_paths: Vec::new(),
            prefer_block_scalars: true,
            quote_all: false,
        }
    }
}
