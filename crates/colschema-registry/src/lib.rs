//! # colschema-registry — Collector Component Schema Registry
//!
//! Looks up, validates against and documents the configuration schemas of
//! collector components (receivers, processors, exporters, extensions and
//! connectors) across collector releases.
//!
//! ## Asset tree (`store`)
//!
//! Schemas are produced offline and shipped as a static tree:
//! `<root>/<version>/<category>_<name>.<ext>`, an optional
//! `<category>_<name>.md` readme, and one `changelog.md` per version.
//! [`DirectoryStore`] serves it from disk and [`MemoryStore`] from memory.
//!
//! ## Operations (`manager`)
//!
//! [`SchemaManager`] is the entry point:
//!
//! - [`SchemaManager::schema`]: decoded schema, cached for the process
//!   lifetime with single-flight loading per identity.
//! - [`SchemaManager::validate_json`] / [`SchemaManager::validate_yaml`]:
//!   exhaustive Draft 2020-12 validation; YAML is normalized to JSON so
//!   both encodings share one code path.
//! - [`SchemaManager::deprecated_fields`]: dotted paths of every field
//!   marked deprecated.
//! - [`SchemaManager::latest_version`]: numeric, not lexicographic.
//! - [`SchemaManager::search_documentation`]: lexical search over
//!   readmes and changelogs.
//!
//! ## Crate Policy
//!
//! - Depends only on `colschema-core` internally.
//! - The asset tree is read-only; nothing here writes to it.
//! - Every failure is a [`RegistryError`] value. A failed lookup never
//!   leaves state behind in the cache.

pub mod cache;
pub mod config;
pub mod deprecation;
pub mod docs;
pub mod document;
pub mod error;
pub mod manager;
pub mod store;
pub mod validate;
pub mod versions;

pub use cache::SchemaCache;
pub use config::{ConfigError, DocumentFormat, RegistryConfig};
pub use deprecation::DeprecatedField;
pub use docs::{DocQuery, DocumentEntry, DocumentIndex, DocumentMatch};
pub use document::{ComponentSchema, NodeKind, SchemaNode};
pub use error::RegistryError;
pub use manager::SchemaManager;
pub use store::{DirectoryStore, MemoryStore, SchemaStore};
pub use validate::{FieldError, ValidationResult};
