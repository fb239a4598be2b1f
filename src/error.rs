//! Defines error and its location
use std::{fmt, io};

use crate::location::Location;
use crate::path::Path;

/// Error type returned by parsing, binding, migration and emission.
///
/// Leaf binding errors carry the [`Path`] of the offending value and, when the value came
/// from parsed text, its [`Location`]. Independent failures found during one bind are
/// collected into [`Error::Aggregate`] instead of surfacing only the first one.
#[derive(Debug)]
pub enum Error {
    /// Malformed source text. Parse errors abort the whole read.
    Syntax { msg: String, location: Location },
    /// A schema field has neither a document value nor a default.
    MissingRequiredValue { path: Path, location: Location },
    /// The document value cannot be decoded as the field's declared kind.
    TypeMismatch {
        path: Path,
        expected: &'static str,
        found: String,
        location: Location,
    },
    /// Scalar does not name any constant of the declared enumeration (case-sensitive).
    UnknownEnumValue {
        path: Path,
        value: String,
        expected: &'static [&'static str],
        location: Location,
    },
    /// Nesting exceeded [`crate::Options::max_depth`].
    DocumentTooDeep { limit: usize, location: Location },
    /// Several independent failures found below `path`.
    Aggregate { path: Path, errors: Vec<Error> },
    /// Free-form error, used by the bridge between bound values and Rust types.
    Message { msg: String, location: Location },
    /// The schema descriptor is not internally consistent.
    InvalidSchema { msg: String },
    /// Options used would produce invalid YAML (0 indentation, etc)
    InvalidOptions(String),
    /// Unexpected I/O error while reading or writing a stream.
    IOError { cause: io::Error },
    /// Wrapper for formatting errors.
    Format { error: fmt::Error },
}

impl Error {
    pub(crate) fn syntax<S: Into<String>>(msg: S, location: Location) -> Self {
        Error::Syntax {
            msg: msg.into(),
            location,
        }
    }

    pub(crate) fn msg<S: Into<String>>(s: S) -> Self {
        Error::Message {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn mismatch<S: Into<String>>(expected: &'static str, found: S) -> Self {
        Error::TypeMismatch {
            path: Path::root(),
            expected,
            found: found.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Attach the binding path and source location to a leaf error.
    ///
    /// Aggregates keep their own path; I/O and configuration errors are returned unchanged.
    pub(crate) fn at(mut self, at_path: &Path, at_location: Location) -> Self {
        match &mut self {
            Error::MissingRequiredValue { path, location }
            | Error::TypeMismatch { path, location, .. }
            | Error::UnknownEnumValue { path, location, .. } => {
                *path = at_path.clone();
                *location = at_location;
            }
            Error::Syntax { location, .. }
            | Error::DocumentTooDeep { location, .. }
            | Error::Message { location, .. } => {
                if !location.is_known() {
                    *location = at_location;
                }
            }
            Error::Aggregate { .. }
            | Error::InvalidSchema { .. }
            | Error::InvalidOptions(_)
            | Error::IOError { .. }
            | Error::Format { .. } => {}
        }
        self
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Syntax { location, .. }
            | Error::MissingRequiredValue { location, .. }
            | Error::TypeMismatch { location, .. }
            | Error::UnknownEnumValue { location, .. }
            | Error::DocumentTooDeep { location, .. }
            | Error::Message { location, .. } => {
                if location.is_known() {
                    Some(*location)
                } else {
                    None
                }
            }
            Error::Aggregate { errors, .. } => errors.iter().find_map(Error::location),
            Error::InvalidSchema { .. }
            | Error::InvalidOptions(_)
            | Error::IOError { .. }
            | Error::Format { .. } => None,
        }
    }

    /// Binding path of the value the error refers to.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::MissingRequiredValue { path, .. }
            | Error::TypeMismatch { path, .. }
            | Error::UnknownEnumValue { path, .. }
            | Error::Aggregate { path, .. } => Some(path),
            _ => None,
        }
    }

    /// All non-aggregate errors, depth first.
    pub fn leaves(&self) -> Vec<&Error> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Error>) {
        match self {
            Error::Aggregate { errors, .. } => {
                for err in errors {
                    err.collect_leaves(out);
                }
            }
            other => out.push(other),
        }
    }

    /// Fold collected sibling errors: none is success, one surfaces unchanged, more
    /// become an aggregate rooted at `path`.
    pub(crate) fn from_siblings(path: &Path, mut errors: Vec<Error>) -> Result<(), Error> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Aggregate {
                path: path.clone(),
                errors,
            }),
        }
    }

    /// The error text without its source location.
    pub fn message(&self) -> String {
        match self {
            Error::Syntax { msg, .. } | Error::Message { msg, .. } => msg.clone(),
            Error::MissingRequiredValue { path, .. } => format!("missing required value `{path}`"),
            Error::TypeMismatch {
                path,
                expected,
                found,
                ..
            } => format!("invalid value at `{path}`: expected {expected}, found {found}"),
            Error::UnknownEnumValue {
                path,
                value,
                expected,
                ..
            } => format!(
                "unknown value `{value}` at `{path}`, expected one of: {}",
                expected.join(", ")
            ),
            Error::DocumentTooDeep { limit, .. } => {
                format!("document nesting exceeds the limit of {limit} levels")
            }
            Error::Aggregate { path, errors } => format!("{} errors at `{path}`", errors.len()),
            Error::InvalidSchema { msg } => format!("invalid schema: {msg}"),
            Error::InvalidOptions(msg) => format!("invalid options: {msg}"),
            Error::IOError { cause } => format!("IO error: {cause}"),
            Error::Format { error } => format!("formatting error: {error}"),
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Error::Aggregate { path, errors } => {
                write!(f, "{} errors at `{path}`:", errors.len())?;
                for err in errors {
                    writeln!(f)?;
                    write!(f, "{:width$}- ", "", width = depth * 2 + 2)?;
                    err.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Aggregate { .. } => self.fmt_indented(f, 0),
            other => match other.location() {
                Some(location) => write!(
                    f,
                    "{} at line {}, column {}",
                    other.message(),
                    location.line,
                    location.column
                ),
                None => f.write_str(&other.message()),
            },
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError { cause } => Some(cause),
            Error::Format { error } => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(cause: io::Error) -> Self {
        Error::IOError { cause }
    }
}

impl From<fmt::Error> for Error {
    fn from(error: fmt::Error) -> Self {
        Error::Format { error }
    }
}

