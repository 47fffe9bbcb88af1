//! # Schema Store
//!
//! Read-only access to the versioned asset tree:
//!
//! ```text
//! <root>/<version>/<category>_<name>.<ext>   schema document
//! <root>/<version>/<category>_<name>.md      component readme (optional)
//! <root>/<version>/changelog.md              release notes
//! ```
//!
//! Backends implement a handful of primitives; the listing rules
//! ([`SchemaStore::list_versions`], [`SchemaStore::list_entries`]) are
//! provided methods so every backend applies them identically.
//!
//! ## Listing policy
//!
//! Listing is best-effort. Directory names that are not versions, and
//! filenames that do not split into a known category and a name on the
//! first `_`, are skipped without error.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use colschema_core::{CollectorVersion, ComponentCategory, ComponentIdentity, ComponentName};
use parking_lot::RwLock;

use crate::config::DocumentFormat;
use crate::error::RegistryError;

/// Filename of the per-version release notes.
pub const CHANGELOG_FILE: &str = "changelog.md";

const MARKDOWN_EXT: &str = "md";

/// A markdown document found in a version directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownFile {
    /// Filename without the `.md` extension.
    pub stem: String,
    /// Location reported to callers, relative to the asset root.
    pub path: String,
    /// Document text.
    pub content: String,
}

/// Read-only access to the schema asset tree.
pub trait SchemaStore: Send + Sync + fmt::Debug {
    /// The format every schema document in this store is written in.
    fn schema_format(&self) -> DocumentFormat;

    /// Raw bytes of the schema document for `identity`.
    fn read_schema_bytes(&self, identity: &ComponentIdentity) -> Result<Vec<u8>, RegistryError>;

    /// Readme text for `identity`.
    fn read_readme(&self, identity: &ComponentIdentity) -> Result<String, RegistryError>;

    /// Changelog text for `version`.
    fn read_changelog(&self, version: &CollectorVersion) -> Result<String, RegistryError>;

    /// Names of every top-level directory, version-shaped or not.
    fn version_dir_names(&self) -> Result<Vec<String>, RegistryError>;

    /// Names of every file inside a version directory.
    fn file_names(&self, version: &CollectorVersion) -> Result<Vec<String>, RegistryError>;

    /// Every markdown document inside a version directory.
    fn markdown_files(&self, version: &CollectorVersion) -> Result<Vec<MarkdownFile>, RegistryError>;

    /// All versions present, ascending.
    fn list_versions(&self) -> Result<Vec<CollectorVersion>, RegistryError> {
        let mut versions: Vec<CollectorVersion> = self
            .version_dir_names()?
            .iter()
            .filter_map(|name| match CollectorVersion::parse(name) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::debug!(dir = %name, "skipping non-version directory");
                    None
                }
            })
            .collect();
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    /// Every (category, name) with a schema document in `version`, sorted.
    fn list_entries(
        &self,
        version: &CollectorVersion,
    ) -> Result<Vec<(ComponentCategory, ComponentName)>, RegistryError> {
        let ext = self.schema_format().extension();
        let mut entries: Vec<(ComponentCategory, ComponentName)> = self
            .file_names(version)?
            .iter()
            .filter_map(|file| parse_schema_filename(file, ext))
            .collect();
        entries.sort();
        entries.dedup();
        Ok(entries)
    }
}

/// Split `<category>_<name>.<ext>` into its parts.
///
/// Returns `None` for other extensions, stems without `_`, unknown
/// categories, and names that fail validation.
pub fn parse_schema_filename(file: &str, ext: &str) -> Option<(ComponentCategory, ComponentName)> {
    let stem = file.strip_suffix(ext)?.strip_suffix('.')?;
    parse_component_stem(stem)
}

/// Split a `<category>_<name>` stem on its first `_`.
pub fn parse_component_stem(stem: &str) -> Option<(ComponentCategory, ComponentName)> {
    let (category, name) = stem.split_once('_')?;
    let category = category.parse().ok()?;
    let name = ComponentName::new(name).ok()?;
    Some((category, name))
}

// ---------------------------------------------------------------------------
// Filesystem backend
// ---------------------------------------------------------------------------

/// A schema store backed by a directory tree on disk.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    format: DocumentFormat,
}

impl DirectoryStore {
    /// Serve the tree rooted at `root`, whose schema files are in `format`.
    ///
    /// The root is not touched until the first read.
    pub fn new(root: impl Into<PathBuf>, format: DocumentFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    /// The asset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn version_dir(&self, version: &CollectorVersion) -> PathBuf {
        self.root.join(version.to_string())
    }

    fn root_error(&self, e: std::io::Error) -> RegistryError {
        RegistryError::DirectoryRead {
            path: self.root.display().to_string(),
            reason: e.to_string(),
        }
    }

    /// Classify a failed asset read.
    ///
    /// A missing file under an existing root is the asset's own not-found
    /// error. A missing root, or any other I/O failure, is a
    /// [`RegistryError::DirectoryRead`].
    fn asset_error(
        &self,
        path: &Path,
        e: std::io::Error,
        not_found: impl FnOnce() -> RegistryError,
    ) -> RegistryError {
        if e.kind() != std::io::ErrorKind::NotFound {
            return RegistryError::DirectoryRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            };
        }
        if self.root.is_dir() {
            not_found()
        } else {
            self.root_error(e)
        }
    }

    /// Read a directory, distinguishing a missing version directory from a
    /// missing or unreadable asset root.
    fn read_version_dir(&self, version: &CollectorVersion) -> Result<std::fs::ReadDir, RegistryError> {
        let dir = self.version_dir(version);
        match std::fs::read_dir(&dir) {
            Ok(entries) => Ok(entries),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && self.root.is_dir() => {
                Err(RegistryError::VersionNotFound { version: *version })
            }
            Err(e) => Err(RegistryError::DirectoryRead {
                path: dir.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl SchemaStore for DirectoryStore {
    fn schema_format(&self) -> DocumentFormat {
        self.format
    }

    fn read_schema_bytes(&self, identity: &ComponentIdentity) -> Result<Vec<u8>, RegistryError> {
        let path = self.version_dir(&identity.version).join(format!(
            "{}.{}",
            identity.schema_stem(),
            self.format.extension()
        ));
        tracing::debug!(path = %path.display(), "reading schema document");
        std::fs::read(&path)
            .map_err(|e| self.asset_error(&path, e, || RegistryError::schema_not_found(identity)))
    }

    fn read_readme(&self, identity: &ComponentIdentity) -> Result<String, RegistryError> {
        let path = self
            .version_dir(&identity.version)
            .join(format!("{}.{MARKDOWN_EXT}", identity.schema_stem()));
        std::fs::read_to_string(&path)
            .map_err(|e| self.asset_error(&path, e, || RegistryError::readme_not_found(identity)))
    }

    fn read_changelog(&self, version: &CollectorVersion) -> Result<String, RegistryError> {
        let path = self.version_dir(version).join(CHANGELOG_FILE);
        std::fs::read_to_string(&path).map_err(|e| {
            self.asset_error(&path, e, || RegistryError::ChangelogNotFound { version: *version })
        })
    }

    fn version_dir_names(&self) -> Result<Vec<String>, RegistryError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| self.root_error(e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.root_error(e))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn file_names(&self, version: &CollectorVersion) -> Result<Vec<String>, RegistryError> {
        let mut names = Vec::new();
        for entry in self.read_version_dir(version)? {
            let entry = entry.map_err(|e| RegistryError::DirectoryRead {
                path: self.version_dir(version).display().to_string(),
                reason: e.to_string(),
            })?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn markdown_files(&self, version: &CollectorVersion) -> Result<Vec<MarkdownFile>, RegistryError> {
        let mut files = Vec::new();
        for name in self.file_names(version)? {
            let Some(stem) = name.strip_suffix(".md") else {
                continue;
            };
            let path = self.version_dir(version).join(&name);
            match std::fs::read_to_string(&path) {
                Ok(content) => files.push(MarkdownFile {
                    stem: stem.to_string(),
                    path: format!("{version}/{name}"),
                    content,
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read markdown file");
                }
            }
        }
        files.sort_by(|a, b| a.stem.cmp(&b.stem));
        Ok(files)
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct VersionDir {
    files: BTreeMap<String, Vec<u8>>,
}

/// A schema store held entirely in memory.
///
/// Useful for assets compiled into a binary and for tests. Populate it
/// before handing it to a manager; the manager only reads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    format: DocumentFormat,
    versions: RwLock<BTreeMap<String, VersionDir>>,
}

impl MemoryStore {
    /// An empty store whose schema files use `format`.
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            versions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store raw bytes under `<version>/<file>`, creating the directory as needed.
    pub fn insert_file(&self, version: &str, file: &str, bytes: impl Into<Vec<u8>>) {
        self.versions
            .write()
            .entry(version.to_string())
            .or_default()
            .files
            .insert(file.to_string(), bytes.into());
    }

    /// Store a schema document for `identity`.
    pub fn insert_schema(&self, identity: &ComponentIdentity, bytes: impl Into<Vec<u8>>) {
        let file = format!("{}.{}", identity.schema_stem(), self.format.extension());
        self.insert_file(&identity.version.to_string(), &file, bytes);
    }

    /// Store a readme for `identity`.
    pub fn insert_readme(&self, identity: &ComponentIdentity, text: &str) {
        let file = format!("{}.{MARKDOWN_EXT}", identity.schema_stem());
        self.insert_file(&identity.version.to_string(), &file, text);
    }

    /// Store the changelog for `version`.
    pub fn insert_changelog(&self, version: &CollectorVersion, text: &str) {
        self.insert_file(&version.to_string(), CHANGELOG_FILE, text);
    }

    fn read_file(&self, version: &CollectorVersion, file: &str) -> Option<Vec<u8>> {
        self.versions
            .read()
            .get(&version.to_string())
            .and_then(|dir| dir.files.get(file).cloned())
    }
}

impl SchemaStore for MemoryStore {
    fn schema_format(&self) -> DocumentFormat {
        self.format
    }

    fn read_schema_bytes(&self, identity: &ComponentIdentity) -> Result<Vec<u8>, RegistryError> {
        let file = format!("{}.{}", identity.schema_stem(), self.format.extension());
        self.read_file(&identity.version, &file)
            .ok_or_else(|| RegistryError::schema_not_found(identity))
    }

    fn read_readme(&self, identity: &ComponentIdentity) -> Result<String, RegistryError> {
        let file = format!("{}.{MARKDOWN_EXT}", identity.schema_stem());
        self.read_file(&identity.version, &file)
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| RegistryError::readme_not_found(identity))
    }

    fn read_changelog(&self, version: &CollectorVersion) -> Result<String, RegistryError> {
        self.read_file(version, CHANGELOG_FILE)
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(RegistryError::ChangelogNotFound { version: *version })
    }

    fn version_dir_names(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self.versions.read().keys().cloned().collect())
    }

    fn file_names(&self, version: &CollectorVersion) -> Result<Vec<String>, RegistryError> {
        self.versions
            .read()
            .get(&version.to_string())
            .map(|dir| dir.files.keys().cloned().collect())
            .ok_or(RegistryError::VersionNotFound { version: *version })
    }

    fn markdown_files(&self, version: &CollectorVersion) -> Result<Vec<MarkdownFile>, RegistryError> {
        let versions = self.versions.read();
        let dir = versions
            .get(&version.to_string())
            .ok_or(RegistryError::VersionNotFound { version: *version })?;
        let mut files = Vec::new();
        for (name, bytes) in &dir.files {
            let Some(stem) = name.strip_suffix(".md") else {
                continue;
            };
            match std::str::from_utf8(bytes) {
                Ok(content) => files.push(MarkdownFile {
                    stem: stem.to_string(),
                    path: format!("{version}/{name}"),
                    content: content.to_string(),
                }),
                Err(e) => tracing::warn!(file = %name, error = %e, "markdown file is not UTF-8"),
            }
        }
        Ok(files)
    }
}
