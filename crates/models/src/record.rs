use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Name of the identity field every stored record carries.
pub const ID_FIELD: &str = "id";

/// Caller-supplied field set, in the order it was received.
pub type Fields = Map<String, Value>;

/// One element of a collection file: a JSON object with a store-assigned `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    /// Build a record with `id` first, followed by `fields`. An `id` inside `fields` is dropped.
    pub fn new_with_id(id: impl Into<String>, fields: Fields) -> Self {
        let mut map = Map::with_capacity(fields.len() + 1);
        map.insert(ID_FIELD.to_string(), Value::String(id.into()));
        for (key, value) in fields {
            if key != ID_FIELD {
                map.insert(key, value);
            }
        }
        Self(map)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Textual view of a scalar field. Numbers and booleans are rendered, other values are not text.
    pub fn text(&self, field: &str) -> Option<Cow<'_, str>> {
        match self.0.get(field)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    /// Shallow merge: keys in `patch` overwrite, everything else is kept. `id` is never overwritten.
    pub fn merge(&mut self, patch: Fields) {
        for (key, value) in patch {
            if key == ID_FIELD {
                continue;
            }
            self.0.insert(key, value);
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }
}

/// Unwrap a request body into a field set, rejecting anything but an object.
pub fn fields_from_value(value: Value) -> Result<Fields, ModelError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ModelError::NotAnObject),
    }
}

/// Required fields that are absent, `null`, or blank strings, in `required` order.
pub fn missing_fields(fields: &Fields, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|name| match fields.get(name.as_str()) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .cloned()
        .collect()
}
