use serde::{Deserialize, Serialize};

use crate::migrate::Migrations;
use crate::serializer_options::SerializerOptions;

/// Duplicate key handling policy for mappings.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateKeyPolicy {
    /// Error out on encountering a duplicate key.
    Error,
    /// First key wins: later duplicate pairs are skipped (key, value and their comments).
    FirstWins,
    /// Last key wins: a later pair replaces the value, the first key's position is kept.
    LastWins,
}

/// Default bound on nesting of mappings and sequences.
pub(crate) const MAX_DEPTH: usize = 128;

/// Reading, binding and saving options.
///
/// Construct `Options` with the [`options!`](crate::options!) macro so call sites keep
/// compiling when fields are added.
///
/// ```rust
/// use axiom::migrate::{Migrations, Rename};
/// use axiom::options::DuplicateKeyPolicy;
///
/// let mut migrations = Migrations::new();
/// migrations.register("Server", Rename::new("max-players", "maxPlayers"));
///
/// let options = axiom::options! {
///     duplicate_keys: DuplicateKeyPolicy::LastWins,
///     max_depth: 32,
///     migrations: migrations,
/// };
/// assert_eq!(options.max_depth, 32);
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    /// Maximum nesting of collections. Deeper documents fail with
    /// [`crate::Error::DocumentTooDeep`] instead of exhausting the stack. Default: 128.
    pub max_depth: usize,
    /// Policy for duplicate keys. Default: [`DuplicateKeyPolicy::Error`].
    pub duplicate_keys: DuplicateKeyPolicy,
    /// If true, interpret only the exact literals `true` and `false` as booleans when
    /// binding; `yes`/`no`/`on`/`off` are rejected. Default: false.
    pub strict_booleans: bool,
    /// Optional hard cap on input size in bytes when reading from a stream.
    pub max_input_bytes: Option<usize>,
    /// Migration rules per schema name, applied before binding and before saving.
    pub migrations: Migrations,
    /// How documents are written back.
    pub serializer: SerializerOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            duplicate_keys: DuplicateKeyPolicy::Error,
            strict_booleans: false,
            max_input_bytes: None,
            migrations: Migrations::default(),
            serializer: SerializerOptions::default(),
        }
    }
}
