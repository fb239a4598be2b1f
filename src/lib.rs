//! Typed, comment-preserving YAML configuration.
//!
//! Text is parsed into a [`Document`] (a node tree that keeps comments, key order and style
//! hints), migrated with the registered [`migrate::Migration`] rules, and bound against a
//! static [`Schema`] into a configuration value. Saving goes the other way and updates the
//! original document in place, so hand-written comments and unknown keys survive.

pub use document::{Document, MergeOptions};
pub use error::Error;
pub use location::Location;
pub use node::{Comments, Mapping, Node, NodeValue, Scalar, ScalarKind, ScalarStyle, Style};
pub use options::Options;
pub use path::{Path, PathSegment};
pub use schema::{Field, Kind, Schema};
pub use serializer_options::SerializerOptions;
pub use snippet::render_snippet;
pub use typed::{
    Configuration, Loaded, from_document, from_reader, from_str, from_str_with_options, load,
    save, to_document, to_string, to_string_with_options,
};

pub mod bind;
mod codec;
mod document;
mod duration;
mod emit;
mod error;
mod float_format;
mod location;
mod macros;
pub mod migrate;
mod node;
pub mod options;
mod parse;
mod parse_scalars;
mod path;
mod reader;
pub mod schema;
mod ser_quoting;
mod serializer_options;
mod snippet;
mod typed;
