//! Runtime values.
//!
//! Values are plain owned data: assigning a list or map to another variable
//! copies it, so no aliasing is observable from scripts.

use std::fmt::Display;

use num_bigint::BigInt;

pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A block or item identifier, `namespace:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Material {
    pub namespace: String,
    pub id: String,
}

impl Material {
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Material {
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    /// Parses `namespace:id`, `:id` or `id`; the latter two use the default
    /// namespace. Returns `None` for empty parts or extra separators.
    pub fn parse(text: &str) -> Option<Material> {
        let (namespace, id) = match text.split_once(':') {
            Some(("", id)) => (DEFAULT_NAMESPACE, id),
            Some((namespace, id)) => (namespace, id),
            None => (DEFAULT_NAMESPACE, text),
        };

        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '/' | '.' | '-'))
        };

        if valid(namespace) && valid(id) {
            Some(Material::new(namespace, id))
        } else {
            None
        }
    }
}

impl Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.id)
    }
}

/// An insertion-ordered map. Keys are compared with `Value` equality.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    pub fn new() -> Self {
        MapValue::default()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Inserts or replaces the value for `key`, keeping the original
    /// insertion position on replace.
    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Value, Value)> for MapValue {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        let mut map = MapValue::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(BigInt),
    Real(f64),
    Logic(bool),
    String(String),
    Material(Material),
    /// A member of a literal type.
    Literal(String),
    List(Vec<Value>),
    Map(MapValue),
    /// Result of calling a function without a return type.
    Unit,
}

impl Value {
    /// Name of the runtime representation, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Real(_) => "real",
            Value::Logic(_) => "logic",
            Value::String(_) => "string",
            Value::Material(_) => "material",
            Value::Literal(_) => "literal",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Unit => "nothing",
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(BigInt::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Logic(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(value) => write!(f, "{}", value),
            // Debug formatting keeps the trailing `.0` on whole reals
            Value::Real(value) => write!(f, "{:?}", value),
            Value::Logic(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Material(value) => write!(f, "{}", value),
            Value::Literal(value) => write!(f, "{}", value),
            Value::List(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    value.fmt_nested(f)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (index, (key, value)) in map.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    key.fmt_nested(f)?;
                    write!(f, ": ")?;
                    value.fmt_nested(f)?;
                }
                write!(f, "}}")
            }
            Value::Unit => write!(f, "nothing"),
        }
    }
}

impl Value {
    // Strings inside collections are quoted so `["a, b"]` stays readable.
    fn fmt_nested(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(value) => write!(f, "{:?}", value),
            other => write!(f, "{}", other),
        }
    }
}
