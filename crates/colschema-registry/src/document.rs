//! # Schema Documents
//!
//! The typed tree a component's configuration schema decodes into.
//!
//! A [`SchemaNode`] mirrors the JSON Schema shape the generator emits:
//! `type`, `properties`, `items`, `description`, `deprecated`, `pattern`
//! and `format` are modelled explicitly; every other keyword (such as
//! `$schema` or `additionalProperties`) is preserved verbatim in
//! [`SchemaNode::extra`].
//!
//! ## Kind degradation
//!
//! The `type` keyword is a closed set. A missing, unknown or non-string
//! `type` decodes as [`NodeKind::Object`], matching how the generator
//! treats native types it cannot map. Degradation only affects the typed
//! tree: [`ComponentSchema`] keeps the stored document, and validation
//! compiles that, so a node without `type` still accepts any value.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use colschema_core::ComponentIdentity;
use jsonschema::Validator;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::config::DocumentFormat;
use crate::error::RegistryError;

/// The JSON type a schema node constrains its value to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "Value")]
pub enum NodeKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    #[default]
    Object,
}

impl NodeKind {
    /// The keyword value written to `type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl From<Value> for NodeKind {
    fn from(value: Value) -> Self {
        match value.as_str() {
            Some("string") => Self::String,
            Some("integer") => Self::Integer,
            Some("number") => Self::Number,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array,
            _ => Self::Object,
        }
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a schema document. The document root is always object-kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Value type; always present after decoding.
    #[serde(rename = "type", default)]
    pub kind: NodeKind,

    /// Free text taken from the declaration-site documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Set when the field is obsolete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    /// Regex a string value must match (e.g. duration strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Named string encoding (e.g. `date-time`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Child fields; meaningful only for object-kind nodes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,

    /// Element schema; meaningful only for array-kind nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,

    /// Every other keyword, kept as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaNode {
    /// A bare node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Add (or replace) a child property.
    pub fn with_property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.properties.insert(name.into(), node);
        self
    }

    /// Set the array element schema.
    pub fn with_items(mut self, node: SchemaNode) -> Self {
        self.items = Some(Box::new(node));
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the string pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Mark the node deprecated.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = Some(true);
        self
    }

    /// Whether the node carries `deprecated: true`.
    pub fn is_deprecated(&self) -> bool {
        self.deprecated == Some(true)
    }

    /// Whether the node is object-kind.
    pub fn is_object(&self) -> bool {
        self.kind == NodeKind::Object
    }

    /// The element schema, if this is an array node that declares one.
    pub fn array_items(&self) -> Option<&SchemaNode> {
        match self.kind {
            NodeKind::Array => self.items.as_deref(),
            _ => None,
        }
    }

    /// Render the node back into a JSON value.
    pub fn to_value(&self) -> Value {
        // A map-keyed struct of strings, bools and JSON values cannot fail to serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A decoded schema document bound to the component it describes.
///
/// Immutable once built; the cache hands out shared references to it.
/// The stored document is kept verbatim next to the typed tree, and
/// validation always runs against the stored form.
#[derive(Clone)]
pub struct ComponentSchema {
    /// The component this schema belongs to.
    pub identity: ComponentIdentity,
    /// The root node.
    pub document: SchemaNode,
    source: Value,
    pub(crate) validator: OnceLock<Arc<Validator>>,
}

impl ComponentSchema {
    /// Bind a typed tree to `identity`; the tree's rendering becomes the source.
    pub fn new(identity: ComponentIdentity, document: SchemaNode) -> Self {
        let source = document.to_value();
        Self {
            identity,
            document,
            source,
            validator: OnceLock::new(),
        }
    }

    /// Decode a stored JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SchemaDecode`] if the value does not have
    /// the shape of a schema node.
    pub fn from_source(identity: ComponentIdentity, source: Value) -> Result<Self, RegistryError> {
        match SchemaNode::deserialize(&source) {
            Ok(document) => Ok(Self {
                identity,
                document,
                source,
                validator: OnceLock::new(),
            }),
            Err(e) => Err(RegistryError::SchemaDecode {
                identity,
                reason: e.to_string(),
            }),
        }
    }

    /// Decode raw schema bytes stored in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SchemaDecode`] if the bytes are not a
    /// well-formed document of the expected shape.
    pub fn decode(
        identity: ComponentIdentity,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<Self, RegistryError> {
        let source = match format {
            DocumentFormat::Json => serde_json::from_slice::<Value>(bytes).map_err(|e| e.to_string()),
            DocumentFormat::Yaml => serde_yaml::from_slice::<Value>(bytes).map_err(|e| e.to_string()),
        };

        match source {
            Ok(source) => Self::from_source(identity, source),
            Err(reason) => Err(RegistryError::SchemaDecode { identity, reason }),
        }
    }

    /// The document as stored, before kind degradation.
    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Pretty-printed JSON of the document.
    pub fn to_json_pretty(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(&self.document).unwrap_or_default()
    }
}

impl fmt::Debug for ComponentSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSchema")
            .field("identity", &self.identity)
            .field("document", &self.document)
            .field("compiled", &self.validator.get().is_some())
            .finish()
    }
}

impl PartialEq for ComponentSchema {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity && self.source == other.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn otlp_identity() -> ComponentIdentity {
        ComponentIdentity::parse("receiver", "otlp", "0.138.0").unwrap()
    }

    #[test]
    fn decodes_nested_properties() {
        let node: SchemaNode = serde_json::from_value(json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "protocols": {
                    "type": "object",
                    "properties": {
                        "grpc": {"type": "object"},
                        "http": {"type": "object"}
                    }
                },
                "timeout": {
                    "type": "string",
                    "pattern": "^[0-9]+(ns|us|µs|ms|s|m|h)$",
                    "description": "Duration string (e.g., '1s', '5m', '1h')"
                }
            }
        }))
        .unwrap();

        assert!(node.is_object());
        assert_eq!(node.properties["protocols"].properties.len(), 2);
        assert_eq!(node.properties["timeout"].kind, NodeKind::String);
        assert!(node.properties["timeout"].pattern.is_some());
        assert_eq!(
            node.extra.get("$schema").and_then(Value::as_str),
            Some("https://json-schema.org/draft/2020-12/schema")
        );
    }

    #[test]
    fn unknown_or_missing_type_degrades_to_object() {
        let node: SchemaNode = serde_json::from_value(json!({
            "properties": {
                "weird": {"type": "null"},
                "multi": {"type": ["string", "null"]},
                "absent": {}
            }
        }))
        .unwrap();
        assert_eq!(node.kind, NodeKind::Object);
        for field in ["weird", "multi", "absent"] {
            assert_eq!(node.properties[field].kind, NodeKind::Object, "{field}");
        }
    }

    #[test]
    fn unmodelled_keywords_survive_reserialization() {
        let original = json!({
            "type": "object",
            "properties": {
                "headers": {
                    "type": "object",
                    "additionalProperties": {"type": "string"}
                },
                "tags": {
                    "type": "array",
                    "items": {"type": "string"}
                }
            }
        });
        let node: SchemaNode = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(node.to_value(), original);
    }

    #[test]
    fn decodes_yaml_schema_files() {
        let yaml = br#"
$schema: https://json-schema.org/draft/2020-12/schema
type: object
properties:
  brokers:
    type: array
    items:
      type: string
    deprecated: true
    description: Deprecated, use the client settings instead.
"#;
        let schema = ComponentSchema::decode(otlp_identity(), yaml, DocumentFormat::Yaml).unwrap();
        let brokers = &schema.document.properties["brokers"];
        assert_eq!(brokers.kind, NodeKind::Array);
        assert!(brokers.is_deprecated());
        assert_eq!(brokers.array_items().map(|n| n.kind), Some(NodeKind::String));
    }

    #[test]
    fn corrupt_bytes_are_a_decode_error() {
        let err = ComponentSchema::decode(otlp_identity(), b"{ not json", DocumentFormat::Json)
            .unwrap_err();
        assert!(matches!(err, RegistryError::SchemaDecode { .. }));
    }

    #[test]
    fn builders_compose() {
        let node = SchemaNode::new(NodeKind::Object).with_property(
            "a",
            SchemaNode::new(NodeKind::String)
                .with_description("old")
                .deprecated(),
        );
        let value = node.to_value();
        assert_eq!(value["properties"]["a"]["deprecated"], json!(true));
        assert_eq!(value["properties"]["a"]["type"], json!("string"));
    }

    #[test]
    fn pretty_json_is_parseable() {
        let schema = ComponentSchema::new(
            otlp_identity(),
            SchemaNode::new(NodeKind::Object)
                .with_property("endpoint", SchemaNode::new(NodeKind::String)),
        );
        let bytes = schema.to_json_pretty();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["properties"]["endpoint"]["type"], "string");
    }

    #[test]
    fn stored_source_is_kept_verbatim() {
        let json = br#"{"properties":{"any":{"description":"x"},"maybe":{"type":["string","null"]}}}"#;
        let schema = ComponentSchema::decode(otlp_identity(), json, DocumentFormat::Json).unwrap();

        assert_eq!(schema.document.properties["any"].kind, NodeKind::Object);
        assert_eq!(schema.source()["properties"]["any"], json!({"description": "x"}));
        assert_eq!(schema.source()["properties"]["maybe"]["type"], json!(["string", "null"]));
        assert!(schema.source().get("type").is_none());
    }
}
