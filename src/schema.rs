//! Static schema descriptors.
//!
//! A [`Schema`] lists the fields of one configuration structure in declaration order. It is
//! built once, usually in a `static LazyLock`, and handed to the binder on every call:
//!
//! ```
//! use std::sync::LazyLock;
//! use std::time::Duration;
//! use axiom::schema::{Field, Kind, Schema};
//!
//! static LISTENER: LazyLock<Schema> = LazyLock::new(|| {
//!     Schema::builder("Listener")
//!         .field(Field::new("host", Kind::Str).default("0.0.0.0"))
//!         .field(Field::new("port", Kind::Int))
//!         .build()
//!         .expect("listener schema")
//! });
//!
//! static SERVER: LazyLock<Schema> = LazyLock::new(|| {
//!     Schema::builder("Server")
//!         .field(Field::new("maxPlayers", Kind::Int).alias("max-players").default(20))
//!         .field(Field::new("timeout", Kind::Duration).default_duration(Duration::from_secs(30)))
//!         .field(Field::new("listeners", Kind::seq(Kind::Struct(&LISTENER))))
//!         .build()
//!         .expect("server schema")
//! });
//!
//! assert_eq!(SERVER.fields().len(), 3);
//! assert!(SERVER.field("maxPlayers").is_some());
//! ```

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::duration::duration_to_json;
use crate::error::Error;
use crate::node::{Mapping, Node};

/// Semantic type of a field.
#[derive(Clone)]
pub enum Kind {
    Bool,
    /// Signed or unsigned 64-bit integer.
    Int,
    Float,
    Str,
    /// One of a fixed set of case-sensitive names.
    Enum(&'static [&'static str]),
    /// `90s`, `1h30m`, `250ms`, or a bare number of seconds.
    Duration,
    Seq(Box<Kind>),
    /// Keys must be `Int`, `Str` or `Enum`.
    Map(Box<Kind>, Box<Kind>),
    Struct(&'static Schema),
    /// Any value; scalars keep their inferred kind.
    Any,
}

impl Kind {
    pub fn seq(item: Kind) -> Self {
        Kind::Seq(Box::new(item))
    }

    pub fn map(key: Kind, value: Kind) -> Self {
        Kind::Map(Box::new(key), Box::new(value))
    }

    pub fn of<T: crate::Configuration>() -> Self {
        Kind::Struct(T::schema())
    }

    pub fn enumeration(names: &'static [&'static str]) -> Self {
        Kind::Enum(names)
    }

    /// Phrase used in "expected ..." messages.
    pub(crate) fn expecting(&self) -> &'static str {
        match self {
            Kind::Bool => "a boolean",
            Kind::Int => "an integer",
            Kind::Float => "a float",
            Kind::Str => "a string",
            Kind::Enum(_) => "an enumeration constant",
            Kind::Duration => "a duration such as `30s` or `1h30m`",
            Kind::Seq(_) => "a sequence",
            Kind::Map(_, _) | Kind::Struct(_) => "a mapping",
            Kind::Any => "a value",
        }
    }

    fn is_key_kind(&self) -> bool {
        matches!(self, Kind::Int | Kind::Str | Kind::Enum(_))
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => f.write_str("Bool"),
            Kind::Int => f.write_str("Int"),
            Kind::Float => f.write_str("Float"),
            Kind::Str => f.write_str("Str"),
            Kind::Enum(names) => f.debug_tuple("Enum").field(names).finish(),
            Kind::Duration => f.write_str("Duration"),
            Kind::Seq(item) => f.debug_tuple("Seq").field(item).finish(),
            Kind::Map(k, v) => f.debug_tuple("Map").field(k).field(v).finish(),
            // Schemas may be recursive; print the name only.
            Kind::Struct(schema) => write!(f, "Struct({})", schema.name),
            Kind::Any => f.write_str("Any"),
        }
    }
}

#[derive(Clone)]
enum DefaultValue {
    Fixed(Value),
    Supplier(fn() -> Value),
}

impl DefaultValue {
    fn get(&self) -> Value {
        match self {
            DefaultValue::Fixed(v) => v.clone(),
            DefaultValue::Supplier(f) => f(),
        }
    }
}

/// One field of a [`Schema`].
#[derive(Clone)]
pub struct Field {
    name: &'static str,
    aliases: Vec<&'static str>,
    kind: Kind,
    default: Option<DefaultValue>,
    optional: bool,
    excluded: bool,
    comment: Option<&'static str>,
}

impl Field {
    pub fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            kind,
            default: None,
            optional: false,
            excluded: false,
            comment: None,
        }
    }

    /// Accept an older on-disk key for this field. Aliases are tried in declaration order
    /// when the logical name is absent.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Value used when the document has none, in the bound form (numbers, strings, ...).
    pub fn default<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(DefaultValue::Fixed(value.into()));
        self
    }

    /// Like [`Field::default`], computed on every use.
    pub fn default_with(mut self, supplier: fn() -> Value) -> Self {
        self.default = Some(DefaultValue::Supplier(supplier));
        self
    }

    pub fn default_duration(self, duration: Duration) -> Self {
        self.default(duration_to_json(duration))
    }

    /// Absent values bind as `null` instead of failing.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Never read from nor written to the document. The field binds to its default, or is
    /// left out so serde's own default applies.
    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    /// Comment written above the key when the binder adds it to a document. Several lines
    /// are separated with `\n`; the `# ` prefix is added if missing.
    pub fn comment(mut self, text: &'static str) -> Self {
        self.comment = Some(text);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn aliases(&self) -> &[&'static str] {
        &self.aliases
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    pub(crate) fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultValue::get)
    }

    /// The key under which this field is stored in `mapping`: the logical name, else the
    /// first alias present. A key holding a value wins over one left empty.
    pub(crate) fn key_in(&self, mapping: &Mapping) -> Option<&'static str> {
        let mut first_empty = None;
        for key in std::iter::once(self.name).chain(self.aliases.iter().copied()) {
            match mapping.get(key) {
                Some(node) if !node.is_null() => return Some(key),
                Some(_) if first_empty.is_none() => first_empty = Some(key),
                _ => {}
            }
        }
        first_empty
    }

    /// The non-null value bound for this field, with the key it was found under.
    pub(crate) fn lookup<'m>(&self, mapping: &'m Mapping) -> Option<(&'static str, &'m Node)> {
        let key = self.key_in(mapping)?;
        mapping.get(key).filter(|node| !node.is_null()).map(|node| (key, node))
    }

    pub(crate) fn comment_lines(&self) -> Vec<String> {
        let Some(text) = self.comment else {
            return Vec::new();
        };
        text.lines()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else if line.starts_with('#') {
                    line.to_string()
                } else {
                    format!("# {line}")
                }
            })
            .collect()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("excluded", &self.excluded)
            .finish_non_exhaustive()
    }
}

/// Ordered field table for one configuration structure.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: Vec<Field>,
}

impl Schema {
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            name,
            fields: Vec::new(),
        }
    }

    /// Name used to look up the migration registry for this schema.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub struct SchemaBuilder {
    name: &'static str,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Check the table and freeze it.
    pub fn build(self) -> Result<Schema, Error> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            for key in std::iter::once(field.name).chain(field.aliases.iter().copied()) {
                if !seen.insert(key) {
                    return Err(self.invalid(format!("key `{key}` is used by more than one field")));
                }
            }
            check_kind(&field.kind).map_err(|msg| self.invalid(format!("field `{}`: {msg}", field.name)))?;
            if let Some(default) = &field.default {
                check_default(&field.kind, &default.get())
                    .map_err(|msg| self.invalid(format!("field `{}`: {msg}", field.name)))?;
            }
        }
        Ok(Schema {
            name: self.name,
            fields: self.fields,
        })
    }

    fn invalid(&self, msg: String) -> Error {
        Error::InvalidSchema {
            msg: format!("{}: {msg}", self.name),
        }
    }
}

fn check_kind(kind: &Kind) -> Result<(), String> {
    match kind {
        Kind::Enum(names) if names.is_empty() => Err("enumeration has no constants".to_string()),
        Kind::Seq(item) => check_kind(item),
        Kind::Map(key, value) => {
            if !key.is_key_kind() {
                return Err(format!("{key:?} cannot be used as a mapping key"));
            }
            check_kind(key)?;
            check_kind(value)
        }
        _ => Ok(()),
    }
}

/// Shallow shape check of a default against the declared kind.
fn check_default(kind: &Kind, value: &Value) -> Result<(), String> {
    let ok = match (kind, value) {
        (_, Value::Null) | (Kind::Any, _) => true,
        (Kind::Bool, Value::Bool(_)) => true,
        (Kind::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (Kind::Float, Value::Number(_)) => true,
        (Kind::Str, Value::String(_)) => true,
        (Kind::Enum(names), Value::String(s)) => names.contains(&s.as_str()),
        (Kind::Duration, Value::Object(_)) => crate::duration::duration_from_json(value).is_some(),
        (Kind::Seq(_), Value::Array(_)) => true,
        (Kind::Map(_, _) | Kind::Struct(_), Value::Object(_)) => true,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(format!("default {value} is not {}", kind.expecting()))
    }
}
