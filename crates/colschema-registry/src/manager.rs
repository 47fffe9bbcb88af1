//! # Schema Manager
//!
//! The registry's public operation surface. A manager owns a
//! [`SchemaStore`], a single-flight [`SchemaCache`] of decoded schemas and
//! a lazily built documentation index. Every operation runs synchronously
//! on the caller's thread and is safe to call concurrently through a
//! shared reference.
//!
//! ```ignore
//! let manager = SchemaManager::from_config(&RegistryConfig::from_env()?);
//! let id = manager.resolve_identity("receiver", "otlp", None)?;
//! let result = manager.validate_yaml(&id, b"protocols:\n  grpc: {}\n")?;
//! assert!(result.valid);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use colschema_core::{CollectorVersion, ComponentCategory, ComponentIdentity, ComponentName};
use parking_lot::Mutex;
use serde_json::Value;

use crate::cache::SchemaCache;
use crate::config::{DocumentFormat, RegistryConfig};
use crate::deprecation::{self, DeprecatedField};
use crate::docs::{DocQuery, DocumentIndex, DocumentMatch};
use crate::document::ComponentSchema;
use crate::error::RegistryError;
use crate::store::{DirectoryStore, SchemaStore};
use crate::validate::{self, ValidationResult};
use crate::versions;

/// Lookup, validation and documentation operations over one asset tree.
#[derive(Debug)]
pub struct SchemaManager {
    store: Arc<dyn SchemaStore>,
    cache: SchemaCache,
    docs: Mutex<Option<Arc<DocumentIndex>>>,
}

impl SchemaManager {
    /// A manager reading from `store`.
    pub fn new(store: Arc<dyn SchemaStore>) -> Self {
        Self {
            store,
            cache: SchemaCache::new(),
            docs: Mutex::new(None),
        }
    }

    /// A manager over the directory tree described by `config`.
    pub fn from_config(config: &RegistryConfig) -> Self {
        tracing::info!(
            root = %config.schema_root.display(),
            format = %config.schema_format,
            "opening schema directory"
        );
        Self::new(Arc::new(DirectoryStore::new(
            config.schema_root.clone(),
            config.schema_format,
        )))
    }

    /// The backing store.
    pub fn store(&self) -> &dyn SchemaStore {
        self.store.as_ref()
    }

    /// Build an identity from raw strings, defaulting the version to the
    /// latest one present.
    ///
    /// The category and name are checked before the store is touched.
    pub fn resolve_identity(
        &self,
        category: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<ComponentIdentity, RegistryError> {
        let category: ComponentCategory = category.parse()?;
        let name = ComponentName::new(name)?;
        let version = self.resolve_version(version)?;
        Ok(ComponentIdentity::new(category, name, version))
    }

    /// Parse `version`, or fall back to the latest version present.
    pub fn resolve_version(&self, version: Option<&str>) -> Result<CollectorVersion, RegistryError> {
        match version {
            Some(raw) => Ok(CollectorVersion::parse(raw)?),
            None => self.latest_version(),
        }
    }

    /// The decoded schema for `identity`; cached after the first success.
    pub fn schema(&self, identity: &ComponentIdentity) -> Result<Arc<ComponentSchema>, RegistryError> {
        self.cache.get_or_load(identity, || {
            let bytes = self.store.read_schema_bytes(identity)?;
            ComponentSchema::decode(identity.clone(), &bytes, self.store.schema_format())
        })
    }

    /// The schema document as pretty-printed JSON.
    pub fn schema_json(&self, identity: &ComponentIdentity) -> Result<Vec<u8>, RegistryError> {
        Ok(self.schema(identity)?.to_json_pretty())
    }

    /// Every component in `version`, grouped by category. Names are sorted
    /// and categories with no components are omitted.
    pub fn list_components(
        &self,
        version: &CollectorVersion,
    ) -> Result<BTreeMap<ComponentCategory, Vec<String>>, RegistryError> {
        let mut grouped: BTreeMap<ComponentCategory, Vec<String>> = BTreeMap::new();
        for (category, name) in self.store.list_entries(version)? {
            grouped.entry(category).or_default().push(name.to_string());
        }
        Ok(grouped)
    }

    /// Sorted names of every `category` component in `version`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NoComponents`] if there are none.
    pub fn component_names(
        &self,
        category: ComponentCategory,
        version: &CollectorVersion,
    ) -> Result<Vec<String>, RegistryError> {
        let names: Vec<String> = self
            .store
            .list_entries(version)?
            .into_iter()
            .filter(|(c, _)| *c == category)
            .map(|(_, name)| name.to_string())
            .collect();

        if names.is_empty() {
            return Err(RegistryError::NoComponents {
                category,
                version: *version,
            });
        }
        Ok(names)
    }

    /// Validate a JSON configuration.
    pub fn validate_json(
        &self,
        identity: &ComponentIdentity,
        json: &[u8],
    ) -> Result<ValidationResult, RegistryError> {
        let schema = self.schema(identity)?;
        let instance = validate::parse_json(json)?;
        validate::validate_value(&schema, &instance)
    }

    /// Validate a YAML configuration by normalizing it to JSON first.
    pub fn validate_yaml(
        &self,
        identity: &ComponentIdentity,
        yaml: &[u8],
    ) -> Result<ValidationResult, RegistryError> {
        let json = validate::yaml_to_json_bytes(yaml)?;
        self.validate_json(identity, &json)
    }

    /// Validate a configuration in the given format.
    pub fn validate(
        &self,
        identity: &ComponentIdentity,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<ValidationResult, RegistryError> {
        match format {
            DocumentFormat::Json => self.validate_json(identity, bytes),
            DocumentFormat::Yaml => self.validate_yaml(identity, bytes),
        }
    }

    /// Validate an already-parsed configuration.
    pub fn validate_value(
        &self,
        identity: &ComponentIdentity,
        instance: &Value,
    ) -> Result<ValidationResult, RegistryError> {
        let schema = self.schema(identity)?;
        validate::validate_value(&schema, instance)
    }

    /// Every deprecated field in the component's schema.
    pub fn deprecated_fields(
        &self,
        identity: &ComponentIdentity,
    ) -> Result<Vec<DeprecatedField>, RegistryError> {
        let schema = self.schema(identity)?;
        Ok(deprecation::scan(&schema.document))
    }

    /// The component's readme.
    pub fn readme(&self, identity: &ComponentIdentity) -> Result<String, RegistryError> {
        self.store.read_readme(identity)
    }

    /// Release notes for `version`.
    pub fn changelog(&self, version: &CollectorVersion) -> Result<String, RegistryError> {
        self.store.read_changelog(version)
    }

    /// The numerically highest version present.
    pub fn latest_version(&self) -> Result<CollectorVersion, RegistryError> {
        versions::latest_version(self.store.as_ref())
    }

    /// Every version present, ascending.
    pub fn all_versions(&self) -> Result<Vec<CollectorVersion>, RegistryError> {
        versions::all_versions(self.store.as_ref())
    }

    /// Search readmes and changelogs across all versions.
    ///
    /// The index is built on the first call. An empty query is rejected
    /// before the index is touched.
    pub fn search_documentation(&self, query: &DocQuery) -> Result<Vec<DocumentMatch>, RegistryError> {
        if query.text.chars().all(|c| !c.is_alphanumeric()) {
            return Err(RegistryError::EmptyQuery);
        }
        self.document_index()?.search(query)
    }

    /// Number of schemas currently cached.
    pub fn cached_schema_count(&self) -> usize {
        self.cache.len()
    }

    fn document_index(&self) -> Result<Arc<DocumentIndex>, RegistryError> {
        let mut slot = self.docs.lock();
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(DocumentIndex::build(self.store.as_ref())?);
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const OTLP_SCHEMA: &str = r#"{
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "protocols": {
                "type": "object",
                "properties": {
                    "grpc": {"type": "object"},
                    "http": {"type": "object"}
                }
            }
        }
    }"#;

    const KAFKA_SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "brokers": {"type": "array", "items": {"type": "string"}, "deprecated": true,
                        "description": "Use client.brokers instead."},
            "client": {"type": "object", "properties": {"brokers": {"type": "array"}}}
        }
    }"#;

    fn manager() -> SchemaManager {
        let store = MemoryStore::new(DocumentFormat::Json);
        let otlp = ComponentIdentity::parse("receiver", "otlp", "0.138.0").unwrap();
        let kafka = ComponentIdentity::parse("exporter", "kafka", "0.138.0").unwrap();
        store.insert_schema(&otlp, OTLP_SCHEMA);
        store.insert_schema(&kafka, KAFKA_SCHEMA);
        store.insert_readme(&otlp, "# OTLP Receiver\nReceives data via gRPC or HTTP.");
        store.insert_changelog(&otlp.version, "## v0.138.0\n- kafka exporter deprecates brokers");
        store.insert_file("0.9.0", "changelog.md", "## v0.9.0");
        SchemaManager::new(Arc::new(store))
    }

    #[test]
    fn schema_lookup_is_cached() {
        let m = manager();
        let id = m.resolve_identity("receiver", "otlp", Some("0.138.0")).unwrap();
        let a = m.schema(&id).unwrap();
        let b = m.schema(&id).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(m.cached_schema_count(), 1);
        assert_eq!(a.document.properties["protocols"].properties.len(), 2);
    }

    #[test]
    fn missing_schema_names_component() {
        let m = manager();
        let id = m.resolve_identity("receiver", "nonexistent", Some("0.138.0")).unwrap();
        let err = m.schema(&id).unwrap_err();
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("receiver") && msg.contains("nonexistent"), "{msg}");
        assert_eq!(m.cached_schema_count(), 0);
    }

    #[test]
    fn invalid_category_is_rejected_before_lookup() {
        let m = SchemaManager::new(Arc::new(MemoryStore::new(DocumentFormat::Json)));
        // Empty store: a version lookup would fail with NoVersions.
        let err = m.resolve_identity("pipeline", "otlp", None).unwrap_err();
        assert!(matches!(err, RegistryError::Identity(_)));
    }

    #[test]
    fn version_defaults_to_latest() {
        let m = manager();
        let id = m.resolve_identity("receiver", "otlp", None).unwrap();
        assert_eq!(id.version, CollectorVersion::new(0, 138, 0));
        assert_eq!(m.all_versions().unwrap().len(), 2);
    }

    #[test]
    fn validates_json_and_yaml() {
        let m = manager();
        let id = m.resolve_identity("receiver", "otlp", Some("0.138.0")).unwrap();
        assert!(m.validate_json(&id, br#"{"protocols":{"grpc":{}}}"#).unwrap().valid);
        assert!(m.validate_json(&id, b"{}").unwrap().valid);
        assert!(m.validate_yaml(&id, b"protocols:\n  grpc: {}\n").unwrap().valid);

        let bad = m.validate(&id, b"protocols:\n  grpc: 5\n", DocumentFormat::Yaml).unwrap();
        assert!(!bad.valid);
        assert_eq!(bad.errors[0].instance_path, "/protocols/grpc");

        assert!(matches!(
            m.validate_json(&id, b"{oops"),
            Err(RegistryError::Parse { .. })
        ));
    }

    #[test]
    fn validation_of_unknown_component_is_not_found() {
        let m = manager();
        let id = m.resolve_identity("processor", "batch", Some("0.138.0")).unwrap();
        assert!(m.validate_json(&id, b"{}").unwrap_err().is_not_found());
    }

    #[test]
    fn lists_components_by_category() {
        let m = manager();
        let v = CollectorVersion::new(0, 138, 0);
        let listing = m.list_components(&v).unwrap();
        assert_eq!(listing[&ComponentCategory::Receiver], vec!["otlp"]);
        assert_eq!(listing[&ComponentCategory::Exporter], vec!["kafka"]);
        assert!(!listing.contains_key(&ComponentCategory::Processor));

        assert_eq!(m.component_names(ComponentCategory::Exporter, &v).unwrap(), vec!["kafka"]);
        assert!(matches!(
            m.component_names(ComponentCategory::Connector, &v),
            Err(RegistryError::NoComponents { .. })
        ));
    }

    #[test]
    fn reports_deprecated_fields() {
        let m = manager();
        let id = m.resolve_identity("exporter", "kafka", Some("0.138.0")).unwrap();
        let fields = m.deprecated_fields(&id).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].path, "brokers");
        assert_eq!(fields[0].declared_type, "array");
        assert_eq!(fields[0].description, "Use client.brokers instead.");
    }

    #[test]
    fn readme_and_changelog() {
        let m = manager();
        let otlp = m.resolve_identity("receiver", "otlp", Some("0.138.0")).unwrap();
        assert!(m.readme(&otlp).unwrap().starts_with("# OTLP Receiver"));

        let kafka = m.resolve_identity("exporter", "kafka", Some("0.138.0")).unwrap();
        assert!(matches!(m.readme(&kafka), Err(RegistryError::ReadmeNotFound { .. })));

        assert!(m.changelog(&CollectorVersion::new(0, 138, 0)).unwrap().contains("v0.138.0"));
        let err = m.changelog(&CollectorVersion::new(999, 999, 999)).unwrap_err();
        assert!(err.to_string().contains("changelog not found for version 999.999.999"));
    }

    #[test]
    fn schema_json_is_pretty() {
        let m = manager();
        let id = m.resolve_identity("receiver", "otlp", Some("0.138.0")).unwrap();
        let text = String::from_utf8(m.schema_json(&id).unwrap()).unwrap();
        assert!(text.contains('\n'));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["properties"]["protocols"]["type"], "object");
    }

    #[test]
    fn searches_documentation() {
        let m = manager();
        let hits = m.search_documentation(&DocQuery::new("gRPC receiver")).unwrap();
        assert_eq!(hits[0].id, "0.138.0/receiver_otlp");

        let filtered = m
            .search_documentation(
                &DocQuery::new("brokers").with_version(CollectorVersion::new(0, 138, 0)),
            )
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "0.138.0/changelog");

        assert!(matches!(
            m.search_documentation(&DocQuery::new("  ")),
            Err(RegistryError::EmptyQuery)
        ));
    }
}
