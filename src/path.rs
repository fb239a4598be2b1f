//! Key paths from the document root, used to report where binding failed.
//!
//! A path is a sequence of mapping keys and sequence indices. It renders the way operators
//! read configuration keys: `server.listeners[1].port`.

use smallvec::SmallVec;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Key(value)
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

/// Location of a value inside the document tree, independent of source positions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: SmallVec<[PathSegment; 8]>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn join<T: Into<PathSegment>>(&self, seg: T) -> Self {
        let mut out = self.clone();
        out.segments.push(seg.into());
        out
    }

    pub(crate) fn push<T: Into<PathSegment>>(&mut self, seg: T) {
        self.segments.push(seg.into());
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The last segment, if any.
    pub fn leaf(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Index of the last segment if it addresses a sequence element.
    pub fn leaf_index(&self) -> Option<usize> {
        match self.segments.last() {
            Some(PathSegment::Index(idx)) => Some(*idx),
            _ => None,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (idx, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(key) => {
                    if idx > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_keys_and_indices() {
        let path = Path::root().join("server").join("listeners").join(1usize).join("port");
        assert_eq!(path.to_string(), "server.listeners[1].port");
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn empty_path_renders_as_root() {
        assert_eq!(Path::root().to_string(), "<root>");
        assert_eq!(Path::root().join(0usize).to_string(), "[0]");
    }

    #[test]
    fn leaf_index_only_for_sequence_elements() {
        assert_eq!(Path::root().join("a").join(3usize).leaf_index(), Some(3));
        assert_eq!(Path::root().join("a").leaf_index(), None);
    }
}
