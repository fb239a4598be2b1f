//! Binder: walks a node tree with a [`Schema`] and produces bound values, and writes bound
//! values back into node trees.
//!
//! Bound values are `serde_json::Value`s in the shapes serde uses for the target Rust types;
//! [`crate::from_str`] and [`crate::save`] do the conversion to and from `T`.
//!
//! ```
//! use std::sync::LazyLock;
//! use axiom::schema::{Field, Kind, Schema};
//! use axiom::{Document, Options};
//!
//! static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
//!     Schema::builder("Limits")
//!         .field(Field::new("timeout", Kind::Int).default(30))
//!         .field(Field::new("retries", Kind::Int))
//!         .build()
//!         .expect("schema")
//! });
//!
//! let doc = Document::parse("retries: 3\n").unwrap();
//! let value = axiom::bind::bind(&doc.root, &SCHEMA, &Options::default()).unwrap();
//! assert_eq!(value["timeout"], 30);
//! assert_eq!(value["retries"], 3);
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::codec::{self, canonical_key, decode_inferred};
use crate::error::Error;
use crate::location::Location;
use crate::migrate::Migrations;
use crate::node::{Mapping, Node, NodeValue, ScalarKind, ScalarStyle};
use crate::options::Options;
use crate::path::Path;
use crate::schema::{Field, Kind, Schema};

/// Apply the migration registries of `schema` and of every nested schema, top-down.
///
/// Returns how many rules ran. Running it again on the result runs none, provided every
/// registered rule is idempotent.
pub fn migrate(node: &mut Node, schema: &Schema, migrations: &Migrations) -> usize {
    if migrations.is_empty() {
        return 0;
    }
    migrate_struct(node, schema, migrations)
}

fn migrate_struct(node: &mut Node, schema: &Schema, migrations: &Migrations) -> usize {
    let Some(mapping) = node.as_mapping_mut() else {
        return 0;
    };
    let mut applied = migrations
        .for_schema(schema.name())
        .map_or(0, |registry| registry.apply(mapping));
    for field in schema.fields() {
        if let Some(key) = field.key_in(mapping) {
            if let Some(child) = mapping.get_mut(key) {
                applied += migrate_kind(child, field.kind(), migrations);
            }
        }
    }
    applied
}

fn migrate_kind(node: &mut Node, kind: &Kind, migrations: &Migrations) -> usize {
    match kind {
        Kind::Struct(schema) => migrate_struct(node, schema, migrations),
        Kind::Seq(item) => node.as_sequence_mut().map_or(0, |items| {
            items
                .iter_mut()
                .map(|child| migrate_kind(child, item, migrations))
                .sum()
        }),
        Kind::Map(_, value) => node.as_mapping_mut().map_or(0, |entries| {
            entries
                .iter_mut()
                .map(|(_, child)| migrate_kind(child, value, migrations))
                .sum()
        }),
        _ => 0,
    }
}

/// Bind `node` (normally the document root mapping) against `schema`.
///
/// Migrations are not applied here; see [`migrate`].
pub fn bind(node: &Node, schema: &Schema, options: &Options) -> Result<Value, Error> {
    let mut binder = Binder {
        options,
        path: Path::root(),
        depth: 0,
    };
    binder.bind_struct(node, schema)
}

struct Binder<'o> {
    options: &'o Options,
    path: Path,
    depth: usize,
}

impl Binder<'_> {
    fn enter(&mut self, node: &Node) -> Result<(), Error> {
        if self.depth >= self.options.max_depth {
            return Err(Error::DocumentTooDeep {
                limit: self.options.max_depth,
                location: node.location,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn bind_value(&mut self, node: &Node, kind: &Kind) -> Result<Value, Error> {
        match kind {
            Kind::Struct(schema) => self.bind_struct(node, schema),
            Kind::Seq(item) => self.bind_seq(node, item),
            Kind::Map(key, value) => self.bind_map(node, key, value),
            Kind::Any => self.bind_any(node),
            _ => match &node.value {
                NodeValue::Scalar(scalar) => codec::decode(scalar, kind, self.options.strict_booleans)
                    .map_err(|e| e.at(&self.path, node.location)),
                _ => Err(Error::mismatch(kind.expecting(), node.describe()).at(&self.path, node.location)),
            },
        }
    }

    fn bind_struct(&mut self, node: &Node, schema: &Schema) -> Result<Value, Error> {
        let Some(mapping) = node.as_mapping() else {
            return Err(Error::mismatch("a mapping", node.describe()).at(&self.path, node.location));
        };
        self.enter(node)?;
        let result = self.bind_fields(mapping, schema, node.location);
        self.leave();
        result
    }

    fn bind_fields(
        &mut self,
        mapping: &Mapping,
        schema: &Schema,
        location: Location,
    ) -> Result<Value, Error> {
        let mut out = Map::new();
        let mut errors = Vec::new();
        for field in schema.fields() {
            if field.is_excluded() {
                if let Some(default) = field.default_value() {
                    out.insert(field.name().to_string(), default);
                }
                continue;
            }
            let result = match field.lookup(mapping) {
                Some((key, child)) => {
                    self.path.push(key);
                    let r = self.bind_value(child, field.kind());
                    self.path.pop();
                    r
                }
                None => {
                    self.path.push(field.name());
                    let r = self.absent(field, location);
                    self.path.pop();
                    r
                }
            };
            match result {
                Ok(value) => {
                    out.insert(field.name().to_string(), value);
                }
                Err(err) => errors.push(err),
            }
        }
        Error::from_siblings(&self.path, errors)?;
        Ok(Value::Object(out))
    }

    /// Value for a field missing from the document (or explicitly null).
    fn absent(&mut self, field: &Field, location: Location) -> Result<Value, Error> {
        if let Some(default) = field.default_value() {
            debug!(path = %self.path, "using default value");
            return Ok(default);
        }
        if field.is_optional() {
            return Ok(Value::Null);
        }
        if let Kind::Struct(schema) = field.kind() {
            // Nested structures whose fields all have defaults need not be written out.
            return self.bind_fields(&Mapping::new(), schema, location);
        }
        Err(Error::MissingRequiredValue {
            path: self.path.clone(),
            location,
        })
    }

    fn bind_seq(&mut self, node: &Node, item: &Kind) -> Result<Value, Error> {
        let Some(items) = node.as_sequence() else {
            return Err(Error::mismatch("a sequence", node.describe()).at(&self.path, node.location));
        };
        self.enter(node)?;
        let mut out = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (idx, child) in items.iter().enumerate() {
            self.path.push(idx);
            match self.bind_element(child, item) {
                Ok(value) => out.push(value),
                Err(err) => errors.push(err),
            }
            self.path.pop();
        }
        self.leave();
        if errors.is_empty() {
            Ok(Value::Array(out))
        } else {
            Err(Error::Aggregate {
                path: self.path.clone(),
                errors,
            })
        }
    }

    fn bind_map(&mut self, node: &Node, key_kind: &Kind, value_kind: &Kind) -> Result<Value, Error> {
        let Some(entries) = node.as_mapping() else {
            return Err(Error::mismatch("a mapping", node.describe()).at(&self.path, node.location));
        };
        self.enter(node)?;
        let mut out = Map::new();
        let mut errors = Vec::new();
        for (key, child) in entries.iter() {
            self.path.push(key);
            let bound = canonical_key(key, key_kind)
                .map_err(|e| e.at(&self.path, child.location))
                .and_then(|canonical| Ok((canonical, self.bind_element(child, value_kind)?)));
            match bound {
                Ok((canonical, value)) => {
                    out.insert(canonical, value);
                }
                Err(err) => errors.push(err),
            }
            self.path.pop();
        }
        self.leave();
        if errors.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(Error::Aggregate {
                path: self.path.clone(),
                errors,
            })
        }
    }

    /// Collection elements have no default; null is only accepted for `Any`.
    fn bind_element(&mut self, node: &Node, kind: &Kind) -> Result<Value, Error> {
        if node.is_null() && !matches!(kind, Kind::Any) {
            return Err(Error::MissingRequiredValue {
                path: self.path.clone(),
                location: node.location,
            });
        }
        self.bind_value(node, kind)
    }

    fn bind_any(&mut self, node: &Node) -> Result<Value, Error> {
        match &node.value {
            NodeValue::Null => Ok(Value::Null),
            NodeValue::Scalar(scalar) => Ok(decode_inferred(scalar)),
            NodeValue::Sequence(items) => {
                self.enter(node)?;
                let out: Result<Vec<_>, _> = items.iter().map(|child| self.bind_any(child)).collect();
                self.leave();
                out.map(Value::Array)
            }
            NodeValue::Mapping(entries) => {
                self.enter(node)?;
                let mut out = Map::new();
                for (key, child) in entries.iter() {
                    match self.bind_any(child) {
                        Ok(value) => {
                            out.insert(key.to_string(), value);
                        }
                        Err(err) => {
                            self.leave();
                            return Err(err);
                        }
                    }
                }
                self.leave();
                Ok(Value::Object(out))
            }
        }
    }
}

/// Build a fresh mapping for `value`, fields in declaration order.
///
/// Fields bound to `null` (absent optionals) are left out.
pub fn unbind(value: &Value, schema: &Schema) -> Result<Node, Error> {
    let mut unbinder = Unbinder { path: Path::root() };
    unbinder.fresh_struct(value, schema)
}

/// Write `value` into an existing tree, leaving comments, key order and unknown keys alone.
///
/// Scalars whose current text already decodes to the new value keep their spelling
/// (`yes`, `0x1F`, `5m`). Values found under an alias key are updated under that key.
/// Keys added to the mapping are appended, with the field comment above them.
pub fn unbind_into(value: &Value, schema: &Schema, node: &mut Node) -> Result<(), Error> {
    let mut unbinder = Unbinder { path: Path::root() };
    unbinder.update_struct(value, schema, node)
}

struct Unbinder {
    path: Path,
}

impl Unbinder {
    fn object<'v>(&self, value: &'v Value) -> Result<&'v Map<String, Value>, Error> {
        value.as_object().ok_or_else(|| {
            Error::mismatch("a mapping", codec::describe_value(value)).at(&self.path, Location::UNKNOWN)
        })
    }

    fn fresh_struct(&mut self, value: &Value, schema: &Schema) -> Result<Node, Error> {
        let object = self.object(value)?;
        let mut mapping = Mapping::new();
        for field in schema.fields() {
            if field.is_excluded() {
                continue;
            }
            match object.get(field.name()) {
                None | Some(Value::Null) => continue,
                Some(child) => {
                    self.path.push(field.name());
                    let mut node = self.fresh(child, field.kind())?;
                    self.path.pop();
                    node.comments.leading = field.comment_lines();
                    mapping.insert(field.name(), node);
                }
            }
        }
        Ok(Node::mapping(mapping))
    }

    fn fresh(&mut self, value: &Value, kind: &Kind) -> Result<Node, Error> {
        match (kind, value) {
            (_, Value::Null) => Ok(Node::null()),
            (Kind::Struct(schema), _) => self.fresh_struct(value, schema),
            (Kind::Seq(item), Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, child) in items.iter().enumerate() {
                    self.path.push(idx);
                    out.push(self.fresh(child, item)?);
                    self.path.pop();
                }
                Ok(Node::sequence(out))
            }
            (Kind::Map(key_kind, value_kind), Value::Object(entries)) => {
                let mut mapping = Mapping::new();
                for (key, child) in entries {
                    self.path.push(key.as_str());
                    let key = canonical_key(key, key_kind).map_err(|e| e.at(&self.path, Location::UNKNOWN))?;
                    mapping.insert(key, self.fresh(child, value_kind)?);
                    self.path.pop();
                }
                Ok(Node::mapping(mapping))
            }
            (Kind::Any, Value::Array(items)) => {
                let out: Result<Vec<_>, _> = items.iter().map(|child| self.fresh(child, &Kind::Any)).collect();
                Ok(Node::sequence(out?))
            }
            (Kind::Any, Value::Object(entries)) => {
                let mut mapping = Mapping::new();
                for (key, child) in entries {
                    mapping.insert(key.as_str(), self.fresh(child, &Kind::Any)?);
                }
                Ok(Node::mapping(mapping))
            }
            _ => codec::encode(value, kind)
                .map(Node::scalar)
                .map_err(|e| e.at(&self.path, Location::UNKNOWN)),
        }
    }

    fn update_struct(&mut self, value: &Value, schema: &Schema, node: &mut Node) -> Result<(), Error> {
        let object = self.object(value)?;
        let Some(mapping) = node.as_mapping_mut() else {
            let fresh = self.fresh_struct(value, schema)?;
            node.replace_value(fresh.value);
            return Ok(());
        };
        for field in schema.fields() {
            if field.is_excluded() {
                continue;
            }
            let Some(child_value) = object.get(field.name()) else {
                continue;
            };
            match field.key_in(mapping) {
                Some(key) => {
                    self.path.push(key);
                    if let Some(child) = mapping.get_mut(key) {
                        self.update(child_value, field.kind(), child)?;
                    }
                    self.path.pop();
                }
                None if child_value.is_null() => {}
                None => {
                    self.path.push(field.name());
                    let mut fresh = self.fresh(child_value, field.kind())?;
                    self.path.pop();
                    fresh.comments.leading = field.comment_lines();
                    debug!(path = %self.path.join(field.name()), "adding key to document");
                    mapping.insert(field.name(), fresh);
                }
            }
        }
        Ok(())
    }

    fn update(&mut self, value: &Value, kind: &Kind, node: &mut Node) -> Result<(), Error> {
        match (kind, value) {
            (_, Value::Null) => {
                if !node.is_null() {
                    node.replace_value(NodeValue::Null);
                }
                Ok(())
            }
            (Kind::Struct(schema), _) => self.update_struct(value, schema, node),
            (Kind::Seq(item), Value::Array(items)) => {
                let Some(existing) = node.as_sequence_mut() else {
                    let fresh = self.fresh(value, kind)?;
                    node.replace_value(fresh.value);
                    return Ok(());
                };
                existing.truncate(items.len());
                for (idx, child_value) in items.iter().enumerate() {
                    self.path.push(idx);
                    if let Some(child) = existing.get_mut(idx) {
                        self.update(child_value, item, child)?;
                    } else {
                        existing.push(self.fresh(child_value, item)?);
                    }
                    self.path.pop();
                }
                Ok(())
            }
            (Kind::Map(key_kind, value_kind), Value::Object(entries)) => {
                let Some(existing) = node.as_mapping_mut() else {
                    let fresh = self.fresh(value, kind)?;
                    node.replace_value(fresh.value);
                    return Ok(());
                };
                existing.retain(|key, _| {
                    canonical_key(key, key_kind).is_ok_and(|canonical| entries.contains_key(&canonical))
                });
                for (key, child_value) in entries {
                    self.path.push(key.as_str());
                    let canonical = canonical_key(key, key_kind).map_err(|e| e.at(&self.path, Location::UNKNOWN))?;
                    let present = existing
                        .keys()
                        .find(|k| canonical_key(k, key_kind).is_ok_and(|c| c == canonical))
                        .map(str::to_string);
                    match present.and_then(|k| existing.get_mut(&k)) {
                        Some(child) => self.update(child_value, value_kind, child)?,
                        None => {
                            let fresh = self.fresh(child_value, value_kind)?;
                            existing.insert(canonical, fresh);
                        }
                    }
                    self.path.pop();
                }
                Ok(())
            }
            (Kind::Any, _) => {
                if &generic_value(node) != value {
                    let fresh = self.fresh(value, kind)?;
                    node.replace_value(fresh.value);
                }
                Ok(())
            }
            _ => {
                if let NodeValue::Scalar(current) = &node.value {
                    if codec::decode(current, kind, false).is_ok_and(|v| &v == value) {
                        return Ok(());
                    }
                }
                let mut scalar = codec::encode(value, kind).map_err(|e| e.at(&self.path, node.location))?;
                if let NodeValue::Scalar(current) = &node.value {
                    if scalar.kind == Some(ScalarKind::Str)
                        && matches!(current.style, ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted)
                    {
                        scalar.style = current.style;
                    }
                }
                node.replace_value(NodeValue::Scalar(scalar));
                Ok(())
            }
        }
    }
}

/// Untyped value of a subtree, the way `Kind::Any` binds it.
fn generic_value(node: &Node) -> Value {
    match &node.value {
        NodeValue::Null => Value::Null,
        NodeValue::Scalar(scalar) => decode_inferred(scalar),
        NodeValue::Sequence(items) => Value::Array(items.iter().map(generic_value).collect()),
        NodeValue::Mapping(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, child)| (key.to_string(), generic_value(child)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static ITEM: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("Item")
            .field(Field::new("id", Kind::Int))
            .build()
            .unwrap()
    });

    static ROOT: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("Root")
            .field(Field::new("name", Kind::Str))
            .field(Field::new("items", Kind::seq(Kind::Struct(&ITEM))).default(Value::Array(vec![])))
            .build()
            .unwrap()
    });

    fn mapping(entries: Vec<(&str, Node)>) -> Node {
        Node::mapping(entries.into_iter().collect())
    }

    #[test]
    fn sibling_errors_are_collected() {
        let node = mapping(vec![(
            "items",
            Node::sequence(vec![mapping(vec![("id", Node::plain("x"))])]),
        )]);
        let err = bind(&node, &ROOT, &Options::default()).unwrap_err();
        let Error::Aggregate { errors, .. } = &err else {
            panic!("expected aggregate, got {err}");
        };
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], Error::MissingRequiredValue { .. }));
        assert_eq!(err.leaves().len(), 2);
    }

    #[test]
    fn fresh_unbind_follows_declaration_order() {
        let value = serde_json::json!({"items": [{"id": 1}], "name": "n"});
        let node = unbind(&value, &ROOT).unwrap();
        let keys: Vec<_> = node.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, ["name", "items"]);
    }

    #[test]
    fn update_keeps_equivalent_spelling() {
        let items = Node::sequence(vec![
            mapping(vec![("id", Node::plain("0x1F"))]),
            mapping(vec![("id", Node::plain("2"))]),
        ]);
        let mut node = mapping(vec![("name", Node::plain("n")), ("items", items)]);
        let value = serde_json::json!({"name": "n", "items": [{"id": 31}]});
        unbind_into(&value, &ROOT, &mut node).unwrap();
        let items = node.as_mapping().unwrap().get("items").unwrap().as_sequence().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_mapping().unwrap().get("id").unwrap().as_str(), Some("0x1F"));
    }
}
