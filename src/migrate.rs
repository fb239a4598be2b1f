//! Migration rules that rewrite older on-disk documents so they bind into newer schemas.
//!
//! Rules run against one mapping, in registration order, every time a document is bound or
//! saved. Nothing records whether a document "was already migrated", so every rule must be
//! idempotent: running the whole list twice has to give the same mapping as running it
//! once. The built-in rules are idempotent; custom rules should guard `apply` with
//! `applies`.
//!
//! Registries are keyed by schema name and passed explicitly through
//! [`crate::Options::migrations`]. The binder applies the root schema's rules to the root
//! mapping and each nested schema's rules to the mappings bound with that schema.
//!
//! ```
//! use axiom::migrate::{Migrations, Rename, Remove};
//!
//! let mut migrations = Migrations::new();
//! migrations.register("Server", Rename::new("max-players", "maxPlayers"));
//! migrations.register("Server", Remove::new("legacy-motd-color"));
//! assert_eq!(migrations.for_schema("Server").map(|r| r.len()), Some(2));
//! ```

use ahash::AHashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::node::{Mapping, Node};

/// One rewrite rule over a mapping.
pub trait Migration: Send + Sync {
    /// Whether the rule has anything to do for this mapping.
    fn applies(&self, mapping: &Mapping) -> bool;

    /// Rewrite the mapping. Only called when [`Migration::applies`] returned true.
    fn apply(&self, mapping: &mut Mapping);

    /// Short human-readable description, used in logs.
    fn describe(&self) -> String {
        "custom migration".to_string()
    }
}

/// Move the value of `from` to `to`, keeping the node, its comments and its position.
///
/// Does nothing when `to` already exists, so a document edited by hand to contain both keys
/// keeps both; the old key then stays around as an unknown key.
#[derive(Clone, Debug)]
pub struct Rename {
    from: String,
    to: String,
}

impl Rename {
    pub fn new<A: Into<String>, B: Into<String>>(from: A, to: B) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Migration for Rename {
    fn applies(&self, mapping: &Mapping) -> bool {
        mapping.contains_key(&self.from) && !mapping.contains_key(&self.to)
    }

    fn apply(&self, mapping: &mut Mapping) {
        mapping.rename(&self.from, &self.to);
    }

    fn describe(&self) -> String {
        format!("rename `{}` -> `{}`", self.from, self.to)
    }
}

/// Drop a key that no schema version uses any more.
#[derive(Clone, Debug)]
pub struct Remove {
    key: String,
}

impl Remove {
    pub fn new<K: Into<String>>(key: K) -> Self {
        Self { key: key.into() }
    }
}

impl Migration for Remove {
    fn applies(&self, mapping: &Mapping) -> bool {
        mapping.contains_key(&self.key)
    }

    fn apply(&self, mapping: &mut Mapping) {
        mapping.remove(&self.key);
    }

    fn describe(&self) -> String {
        format!("remove `{}`", self.key)
    }
}

/// Rewrite the value stored under `key` in place (unit conversions and the like).
///
/// The guard decides whether the stored node still has the old shape; it must return false
/// once the conversion ran, otherwise the rule is not idempotent.
pub struct Convert<G, F> {
    key: String,
    guard: G,
    convert: F,
}

impl<G, F> Convert<G, F>
where
    G: Fn(&Node) -> bool + Send + Sync,
    F: Fn(&mut Node) + Send + Sync,
{
    pub fn new<K: Into<String>>(key: K, guard: G, convert: F) -> Self {
        Self {
            key: key.into(),
            guard,
            convert,
        }
    }
}

impl<G, F> Migration for Convert<G, F>
where
    G: Fn(&Node) -> bool + Send + Sync,
    F: Fn(&mut Node) + Send + Sync,
{
    fn applies(&self, mapping: &Mapping) -> bool {
        mapping.get(&self.key).is_some_and(|node| (self.guard)(node))
    }

    fn apply(&self, mapping: &mut Mapping) {
        if let Some(node) = mapping.get_mut(&self.key) {
            (self.convert)(node);
        }
    }

    fn describe(&self) -> String {
        format!("convert `{}`", self.key)
    }
}

struct FnMigration<A, F> {
    name: String,
    applies: A,
    apply: F,
}

impl<A, F> Migration for FnMigration<A, F>
where
    A: Fn(&Mapping) -> bool + Send + Sync,
    F: Fn(&mut Mapping) + Send + Sync,
{
    fn applies(&self, mapping: &Mapping) -> bool {
        (self.applies)(mapping)
    }

    fn apply(&self, mapping: &mut Mapping) {
        (self.apply)(mapping)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Build a rule from a guard and a rewrite closure.
pub fn migration_fn<A, F>(name: &str, applies: A, apply: F) -> impl Migration + use<A, F>
where
    A: Fn(&Mapping) -> bool + Send + Sync,
    F: Fn(&mut Mapping) + Send + Sync,
{
    FnMigration {
        name: name.to_string(),
        applies,
        apply,
    }
}

/// Ordered rules for one schema.
#[derive(Clone, Default)]
pub struct MigrationRegistry {
    rules: Vec<Arc<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<M: Migration + 'static>(&mut self, rule: M) -> &mut Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule whose guard matches, in registration order. Returns how many ran.
    pub fn apply(&self, mapping: &mut Mapping) -> usize {
        let mut applied = 0;
        for rule in &self.rules {
            if !rule.applies(mapping) {
                continue;
            }
            rule.apply(mapping);
            applied += 1;
            debug!(rule = %rule.describe(), "applied migration");
            if rule.applies(mapping) {
                warn!(
                    rule = %rule.describe(),
                    "migration still applies after running; rules must be idempotent"
                );
            }
        }
        applied
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.describe()))
            .finish()
    }
}

/// Registries keyed by schema name.
#[derive(Clone, Debug, Default)]
pub struct Migrations {
    by_schema: AHashMap<String, MigrationRegistry>,
}

impl Migrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to the registry of the schema called `schema`.
    pub fn register<M: Migration + 'static>(&mut self, schema: &str, rule: M) -> &mut Self {
        self.by_schema
            .entry(schema.to_string())
            .or_default()
            .push(rule);
        self
    }

    pub fn for_schema(&self, schema: &str) -> Option<&MigrationRegistry> {
        self.by_schema.get(schema)
    }

    pub fn is_empty(&self) -> bool {
        self.by_schema.values().all(MigrationRegistry::is_empty)
    }
}
