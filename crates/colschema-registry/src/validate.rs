//! # Configuration Validation
//!
//! Validates candidate component configurations against their schema
//! documents (Draft 2020-12).
//!
//! ## One validation path
//!
//! JSON candidates are parsed and validated directly. YAML candidates are
//! parsed, converted to the same `serde_json::Value` tree, re-serialized
//! to JSON bytes and then take the JSON path, so both encodings of the
//! same content always yield the same [`ValidationResult`].
//!
//! ## Failure channels
//!
//! - Bytes that are not well-formed in their claimed format fail with
//!   [`RegistryError::Parse`] before validation runs.
//! - A structurally invalid configuration is *not* an error: it is an
//!   `Ok(ValidationResult)` with `valid == false`, listing every
//!   violation (validation never stops at the first one).
//!
//! ## Policy
//!
//! Undeclared object keys are accepted unless the schema itself sets
//! `additionalProperties: false`. No field is required unless the schema
//! lists it under `required`.

use std::fmt;
use std::sync::Arc;

use jsonschema::{Retrieve, Uri, Validator};
use serde::Serialize;
use serde_json::Value;

use crate::config::DocumentFormat;
use crate::document::ComponentSchema;
use crate::error::RegistryError;

/// Answers every external `$ref` with a permissive schema.
///
/// Component schemas are self-contained; this only guarantees that a
/// stray reference can never trigger a network request.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(uri = %uri.as_str(), "resolving external $ref to permissive schema");
        Ok(serde_json::json!({}))
    }
}

/// A single violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// JSON Pointer to the offending value; empty for the document root.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that rejected it.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Outcome of validating one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// True when `errors` is empty.
    pub valid: bool,
    /// Every violation found, in traversal order.
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Build a result from its violations.
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Number of violations.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return write!(f, "valid");
        }
        write!(f, "invalid ({} error(s))", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

/// Compile the stored schema document into a Draft 2020-12 validator.
///
/// # Errors
///
/// Returns [`RegistryError::ValidatorBuild`] if the document is not a
/// valid schema.
pub fn build_validator(schema: &ComponentSchema) -> Result<Validator, RegistryError> {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.should_validate_formats(true);
    opts.with_retriever(OfflineRetriever);

    opts.build(schema.source())
        .map_err(|e| RegistryError::ValidatorBuild {
            identity: schema.identity.clone(),
            reason: e.to_string(),
        })
}

/// The schema's validator, compiled on first use and kept with the schema.
fn compiled_validator(schema: &ComponentSchema) -> Result<&Validator, RegistryError> {
    if let Some(validator) = schema.validator.get() {
        return Ok(validator.as_ref());
    }
    let built = Arc::new(build_validator(schema)?);
    tracing::debug!(component = %schema.identity, "compiled schema validator");
    // A concurrent caller may have won the race; either validator is equivalent.
    Ok(schema.validator.get_or_init(|| built).as_ref())
}

/// Validate a parsed JSON value against a schema.
pub fn validate_value(
    schema: &ComponentSchema,
    instance: &Value,
) -> Result<ValidationResult, RegistryError> {
    let validator = compiled_validator(schema)?;

    let errors: Vec<FieldError> = validator
        .iter_errors(instance)
        .map(|e| FieldError {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    tracing::debug!(
        component = %schema.identity,
        errors = errors.len(),
        "validated configuration"
    );
    Ok(ValidationResult::from_errors(errors))
}

/// Parse JSON bytes into a value.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] for malformed JSON.
pub fn parse_json(bytes: &[u8]) -> Result<Value, RegistryError> {
    serde_json::from_slice(bytes).map_err(|e| RegistryError::Parse {
        format: DocumentFormat::Json,
        reason: e.to_string(),
    })
}

/// Normalize YAML bytes into canonical JSON bytes.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] for malformed YAML or YAML that has
/// no JSON equivalent (complex keys, non-finite floats).
pub fn yaml_to_json_bytes(bytes: &[u8]) -> Result<Vec<u8>, RegistryError> {
    let parse_error = |reason: String| RegistryError::Parse {
        format: DocumentFormat::Yaml,
        reason,
    };

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_slice(bytes).map_err(|e| parse_error(e.to_string()))?;
    let json_value = yaml_to_json_value(&yaml_value).map_err(parse_error)?;
    serde_json::to_vec(&json_value).map_err(|e| parse_error(e.to_string()))
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Configurations use the JSON-compatible subset of YAML. Scalar map keys
/// are stringified and tags are dropped.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{NodeKind, SchemaNode};
    use colschema_core::ComponentIdentity;
    use serde_json::json;

    const DURATION_PATTERN: &str = "^[0-9]+(ns|us|µs|ms|s|m|h)$";

    fn otlp_schema() -> ComponentSchema {
        let document: SchemaNode = serde_json::from_value(json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "protocols": {
                    "type": "object",
                    "properties": {
                        "grpc": {
                            "type": "object",
                            "properties": {
                                "endpoint": {"type": "string"},
                                "include_metadata": {"type": "boolean"},
                                "max_recv_msg_size_mib": {"type": "integer"},
                                "keepalive": {
                                    "type": "object",
                                    "properties": {
                                        "max_connection_idle": {
                                            "type": "string",
                                            "pattern": DURATION_PATTERN
                                        }
                                    }
                                }
                            }
                        },
                        "http": {
                            "type": "object",
                            "properties": {
                                "endpoint": {"type": "string"},
                                "cors_allowed_origins": {
                                    "type": "array",
                                    "items": {"type": "string"}
                                }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();
        ComponentSchema::new(
            ComponentIdentity::parse("receiver", "otlp", "0.138.0").unwrap(),
            document,
        )
    }

    #[test]
    fn empty_object_is_valid() {
        let result = validate_value(&otlp_schema(), &json!({})).unwrap();
        assert!(result.valid);
        assert_eq!(result.error_count(), 0);
    }

    #[test]
    fn valid_nested_configuration() {
        let config = json!({
            "protocols": {
                "grpc": {"endpoint": "0.0.0.0:4317", "keepalive": {"max_connection_idle": "30s"}},
                "http": {"endpoint": "0.0.0.0:4318", "cors_allowed_origins": ["https://*.example.com"]}
            }
        });
        let result = validate_value(&otlp_schema(), &config).unwrap();
        assert!(result.valid, "{result}");
    }

    #[test]
    fn unknown_keys_are_accepted() {
        let config = json!({"protocols": {"grpc": {"not_in_schema": 1}}, "extra": true});
        assert!(validate_value(&otlp_schema(), &config).unwrap().valid);
    }

    #[test]
    fn reports_every_violation() {
        let config = json!({
            "protocols": {
                "grpc": {
                    "endpoint": 4317,
                    "include_metadata": "invalid_boolean_value",
                    "max_recv_msg_size_mib": 4.5,
                    "keepalive": {"max_connection_idle": "invalid_duration_format"}
                },
                "http": {"cors_allowed_origins": ["ok", 7]}
            }
        });
        let result = validate_value(&otlp_schema(), &config).unwrap();
        assert!(!result.valid);
        assert!(result.error_count() >= 5, "{result}");

        let paths: Vec<&str> = result.errors.iter().map(|e| e.instance_path.as_str()).collect();
        for expected in [
            "/protocols/grpc/endpoint",
            "/protocols/grpc/include_metadata",
            "/protocols/grpc/max_recv_msg_size_mib",
            "/protocols/grpc/keepalive/max_connection_idle",
            "/protocols/http/cors_allowed_origins/1",
        ] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }
    }

    #[test]
    fn wrong_root_type_is_reported_at_root() {
        let result = validate_value(&otlp_schema(), &json!([1, 2, 3])).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors[0].instance_path, "");
        assert!(result.errors[0].to_string().starts_with("(root)"));
    }

    #[test]
    fn error_order_is_deterministic() {
        let config = json!({"protocols": {"grpc": {"endpoint": 1, "include_metadata": "x"}}});
        let a = validate_value(&otlp_schema(), &config).unwrap();
        let b = validate_value(&otlp_schema(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn explicit_additional_properties_false_is_honoured() {
        let mut schema = otlp_schema();
        schema
            .document
            .extra
            .insert("additionalProperties".to_string(), json!(false));
        let result = validate_value(&schema, &json!({"unexpected": 1})).unwrap();
        assert!(!result.valid);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_json(br#"{"protocols": {"grpc": {}"#).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Parse {
                format: DocumentFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn yaml_normalizes_to_equivalent_json() {
        let yaml = b"protocols:\n  grpc:\n    endpoint: \"0.0.0.0:4317\"\n    max_recv_msg_size_mib: 4\n  http: {}\n";
        let bytes = yaml_to_json_bytes(yaml).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!({"protocols": {"grpc": {"endpoint": "0.0.0.0:4317", "max_recv_msg_size_mib": 4}, "http": {}}})
        );
    }

    #[test]
    fn yaml_scalar_keys_are_stringified() {
        let bytes = yaml_to_json_bytes(b"200: ok\ntrue: yes\n").unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["200"], "ok");
        assert_eq!(value["true"], "yes");
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = yaml_to_json_bytes(b"protocols:\n  grpc: [unclosed\n").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Parse {
                format: DocumentFormat::Yaml,
                ..
            }
        ));
    }

    #[test]
    fn non_finite_yaml_float_is_rejected() {
        let err = yaml_to_json_bytes(b"ratio: .inf\n").unwrap_err();
        assert!(err.to_string().contains("cannot represent float"));
    }

    #[test]
    fn result_display_lists_errors() {
        let result = ValidationResult::from_errors(vec![FieldError {
            instance_path: "/protocols/grpc/include_metadata".to_string(),
            schema_path: "/properties/protocols/properties/grpc/properties/include_metadata/type"
                .to_string(),
            message: "\"yes\" is not of type \"boolean\"".to_string(),
        }]);
        let display = result.to_string();
        assert!(display.starts_with("invalid (1 error(s))"));
        assert!(display.contains("/protocols/grpc/include_metadata"));
        assert_eq!(ValidationResult::from_errors(Vec::new()).to_string(), "valid");
    }

    #[test]
    fn date_time_format_is_checked() {
        let schema = ComponentSchema::new(
            ComponentIdentity::parse("receiver", "filelog", "0.138.0").unwrap(),
            SchemaNode::new(NodeKind::Object).with_property("start_at", {
                let mut node = SchemaNode::new(NodeKind::String);
                node.format = Some("date-time".to_string());
                node
            }),
        );
        assert!(validate_value(&schema, &json!({"start_at": "2024-01-02T03:04:05Z"})).unwrap().valid);
        assert!(!validate_value(&schema, &json!({"start_at": "yesterday"})).unwrap().valid);
    }

    #[test]
    fn validation_uses_the_stored_document() {
        let schema = ComponentSchema::decode(
            ComponentIdentity::parse("processor", "transform", "0.138.0").unwrap(),
            br#"{"properties":{"any":{"description":"x"},"maybe":{"type":["string","null"]}}}"#,
            DocumentFormat::Json,
        )
        .unwrap();

        let result = validate_value(&schema, &json!({"any": 5, "maybe": null})).unwrap();
        assert!(result.valid, "{result}");

        let result = validate_value(&schema, &json!({"maybe": 3})).unwrap();
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.errors[0].instance_path, "/maybe");
    }

    #[test]
    fn validator_is_compiled_once_per_schema() {
        let schema = otlp_schema();
        assert!(schema.validator.get().is_none());

        validate_value(&schema, &json!({})).unwrap();
        let first = Arc::clone(schema.validator.get().unwrap());
        let config = json!({"protocols": {"grpc": {"include_metadata": "yes"}}});
        let result = validate_value(&schema, &config).unwrap();
        assert!(!result.valid);
        assert!(Arc::ptr_eq(&first, schema.validator.get().unwrap()));
    }
}
