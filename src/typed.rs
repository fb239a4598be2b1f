//! Typed entry points: text, streams and documents to configuration values and back.

use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::bind::{bind, migrate, unbind, unbind_into};
use crate::document::Document;
use crate::error::Error;
use crate::options::Options;
use crate::schema::Schema;

/// A configuration structure bound through a static [`Schema`].
///
/// The serde implementations convert between `Self` and the bound value; field names,
/// defaults, aliases and comments come from the schema.
///
/// ```
/// use std::sync::LazyLock;
/// use serde::{Deserialize, Serialize};
/// use axiom::schema::{Field, Kind, Schema};
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Limits {
///     timeout: u64,
///     retries: u32,
/// }
///
/// static LIMITS: LazyLock<Schema> = LazyLock::new(|| {
///     Schema::builder("Limits")
///         .field(Field::new("timeout", Kind::Int).default(30))
///         .field(Field::new("retries", Kind::Int))
///         .build()
///         .expect("limits schema")
/// });
///
/// impl axiom::Configuration for Limits {
///     fn schema() -> &'static Schema {
///         &LIMITS
///     }
/// }
///
/// let limits: Limits = axiom::from_str("retries: 3\n").unwrap();
/// assert_eq!(limits, Limits { timeout: 30, retries: 3 });
/// ```
pub trait Configuration: Serialize + DeserializeOwned {
    fn schema() -> &'static Schema;
}

/// A bound value together with the (migrated) document it came from. Pass the document
/// back to [`save`] to keep its comments, layout and unknown keys.
#[derive(Clone, Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub document: Document,
}

pub fn from_str<T: Configuration>(text: &str) -> Result<T, Error> {
    from_str_with_options(text, &Options::default())
}

pub fn from_str_with_options<T: Configuration>(text: &str, options: &Options) -> Result<T, Error> {
    let mut document = Document::parse_with_options(text, options)?;
    from_document(&mut document, options)
}

pub fn from_reader<R: Read, T: Configuration>(reader: R, options: &Options) -> Result<T, Error> {
    load(reader, options).map(|loaded| loaded.value)
}

/// Migrate `document` in place and bind it.
pub fn from_document<T: Configuration>(document: &mut Document, options: &Options) -> Result<T, Error> {
    let schema = T::schema();
    let applied = migrate(&mut document.root, schema, &options.migrations);
    if applied > 0 {
        debug!(schema = schema.name(), applied, "document migrated");
    }
    let value = bind(&document.root, schema, options)?;
    from_value(value)
}

pub fn load<R: Read, T: Configuration>(reader: R, options: &Options) -> Result<Loaded<T>, Error> {
    let mut document = Document::read(reader, options)?;
    let value = from_document(&mut document, options)?;
    Ok(Loaded { value, document })
}

/// Write `value` as YAML.
///
/// With an `existing` document the value is written into it first (after running the
/// migrations), so comments, key order and keys the schema does not know survive; the
/// document is updated in place. Without one a fresh document is built in declaration
/// order with the schema's field comments.
pub fn save<T: Configuration, W: Write>(
    value: &T,
    existing: Option<&mut Document>,
    writer: W,
    options: &Options,
) -> Result<(), Error> {
    let schema = T::schema();
    let bound = to_value(value)?;
    match existing {
        Some(document) => {
            migrate(&mut document.root, schema, &options.migrations);
            unbind_into(&bound, schema, &mut document.root)?;
            document.write(writer, &options.serializer)
        }
        None => {
            debug!(schema = schema.name(), "writing fresh document");
            Document::from_root(unbind(&bound, schema)?).write(writer, &options.serializer)
        }
    }
}

pub fn to_document<T: Configuration>(value: &T) -> Result<Document, Error> {
    let bound = to_value(value)?;
    Ok(Document::from_root(unbind(&bound, T::schema())?))
}

pub fn to_string<T: Configuration>(value: &T) -> Result<String, Error> {
    to_string_with_options(value, &Options::default())
}

pub fn to_string_with_options<T: Configuration>(value: &T, options: &Options) -> Result<String, Error> {
    to_document(value)?.serialize(&options.serializer)
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        Error::msg(format!("{path}: {}", err.into_inner()))
    })
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_path_to_error::serialize(value, serde_json::value::Serializer).map_err(|err| {
        let path = err.path().to_string();
        Error::msg(format!("{path}: {}", err.into_inner()))
    })
}
