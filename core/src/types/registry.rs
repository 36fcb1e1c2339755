use indexmap::IndexMap;
use serde::Deserialize;

use crate::values::Value;

/// How a detected value is rendered into a template hole.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// JSON-encode the value.
    Json,
    /// The default string coercion.
    #[serde(rename = "string")]
    AsString,
    /// Hand the value through untouched; template rendering falls back
    /// to string coercion at the splice point.
    #[serde(rename = "object")]
    Passthrough,
}

/// Expected kind of a schema property. Unknown kinds deserialize to
/// `Other` and always pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Other(String),
}

impl<'de> Deserialize<'de> for PropKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            "string" => PropKind::String,
            "number" => PropKind::Number,
            "boolean" => PropKind::Boolean,
            "object" => PropKind::Object,
            "array" => PropKind::Array,
            _ => PropKind::Other(name),
        })
    }
}

impl PropKind {
    /// Typed check for a property that is present. NaN fails the number
    /// check; null fails every typed check.
    fn matches(&self, value: &Value) -> bool {
        match self {
            PropKind::String => matches!(value, Value::Str(_)),
            PropKind::Number => matches!(value, Value::Number(n) if !n.is_nan()),
            PropKind::Boolean => matches!(value, Value::Bool(_)),
            PropKind::Object => matches!(value, Value::Object(_)),
            PropKind::Array => matches!(value, Value::Array(_)),
            PropKind::Other(_) => true,
        }
    }
}

/// An object schema: `required` is a presence check, `properties` a typed
/// check applied only to properties that are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSchema {
    pub required: Vec<String>,
    pub properties: IndexMap<String, PropKind>,
}

impl TypeSchema {
    pub fn accepts(&self, value: &Value) -> bool {
        let Some(object) = value.as_object() else {
            return false;
        };
        for name in &self.required {
            if !object.contains_key(name) {
                return false;
            }
        }
        for (name, kind) in &self.properties {
            if let Some(present) = object.get(name) {
                if !kind.matches(present) {
                    return false;
                }
            }
        }
        true
    }
}

/// Registration payload: schema plus serialization strategy.
///
/// Deserializes from the JSON-schema-flavored config shape:
///
/// ```json
/// {
///   "schema": {
///     "type": "object",
///     "properties": { "file_id": { "type": "string" } },
///     "required": ["file_id"]
///   },
///   "serialization": "json"
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TypeConfig {
    pub schema: TypeSchema,
    pub serialization: Strategy,
}

impl TypeConfig {
    pub fn new(schema: TypeSchema, serialization: Strategy) -> Self {
        Self {
            schema,
            serialization,
        }
    }
}

impl<'de> Deserialize<'de> for TypeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawProp {
            #[serde(rename = "type")]
            kind: PropKind,
        }

        #[derive(Deserialize)]
        struct RawSchema {
            #[serde(rename = "type", default)]
            _object: Option<String>,
            #[serde(default)]
            properties: IndexMap<String, RawProp>,
            #[serde(default)]
            required: Vec<String>,
        }

        #[derive(Deserialize)]
        struct RawConfig {
            schema: RawSchema,
            serialization: Strategy,
        }

        let raw = RawConfig::deserialize(deserializer)?;
        Ok(TypeConfig {
            schema: TypeSchema {
                required: raw.schema.required,
                properties: raw
                    .schema
                    .properties
                    .into_iter()
                    .map(|(name, prop)| (name, prop.kind))
                    .collect(),
            },
            serialization: raw.serialization,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub name: String,
    pub config: TypeConfig,
}

/// Result of serializing a value under a registered type.
#[derive(Debug, Clone, PartialEq)]
pub enum Serialized {
    /// JSON text (strategy `json`). Serialization failure falls back to
    /// `Text`; it never raises.
    Json(String),
    /// Plain string coercion (strategy `string`).
    Text(String),
    /// The value itself (strategy `object`).
    Raw(Value),
}

/// Ordered store of type entries, most recently registered first.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: Vec<TypeEntry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under a name. Any prior entry with the same name
    /// is removed, and the new entry goes to the front: most recently
    /// registered wins detection.
    pub fn register(&mut self, name: impl Into<String>, config: TypeConfig) {
        let name = name.into();
        self.entries.retain(|entry| entry.name != name);
        self.entries.insert(0, TypeEntry { name, config });
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Registered names, detection order (most recent first).
    pub fn list(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the first schema accepting `value`, if any. Only plain
    /// objects are ever detected.
    pub fn detect_type(&self, value: &Value) -> Option<&str> {
        if value.as_object().is_none() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.config.schema.accepts(value))
            .map(|entry| entry.name.as_str())
    }

    /// Serialize `value` under the named type's strategy. `None` when the
    /// name is not registered.
    pub fn serialize(&self, value: &Value, name: &str) -> Option<Serialized> {
        let entry = self.entries.iter().find(|entry| entry.name == name)?;
        Some(match entry.config.serialization {
            Strategy::Json => match serde_json::to_string(&value.to_json()) {
                Ok(text) => Serialized::Json(text),
                Err(_) => Serialized::Text(value.to_string()),
            },
            Strategy::AsString => Serialized::Text(value.to_string()),
            Strategy::Passthrough => Serialized::Raw(value.clone()),
        })
    }
}
