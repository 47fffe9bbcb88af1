//! # Identity Newtypes
//!
//! Domain-primitive newtypes that together address exactly one schema
//! document: a [`ComponentCategory`], a [`ComponentName`] and a
//! [`CollectorVersion`], bundled as a [`ComponentIdentity`].
//!
//! ## Validation
//!
//! - Names must be non-empty and may not contain `/`, `\` or `..`, since
//!   they become part of an asset path.
//! - Versions are `MAJOR.MINOR.PATCH` with decimal fields and no leading
//!   zeros, so [`Display`](std::fmt::Display) reproduces the input exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::category::ComponentCategory;
use crate::error::IdentityError;

// ---------------------------------------------------------------------------
// Component name
// ---------------------------------------------------------------------------

/// The name of a collector component within its category (e.g. `otlp`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentName(String);

impl ComponentName {
    /// Create a component name, validating that it is usable as a path segment.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidComponentName`] if the name is empty
    /// or contains a path separator or `..`.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let s = value.into();
        if s.is_empty() || s.contains('/') || s.contains('\\') || s.contains("..") {
            return Err(IdentityError::InvalidComponentName(s));
        }
        Ok(Self(s))
    }

    /// Access the name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ComponentName {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ComponentName> for String {
    fn from(name: ComponentName) -> Self {
        name.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Collector version
// ---------------------------------------------------------------------------

/// A collector release version, `MAJOR.MINOR.PATCH`.
///
/// Ordering is numeric per field, so `0.10.0 > 0.9.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectorVersion {
    major: u64,
    minor: u64,
    patch: u64,
}

impl CollectorVersion {
    /// Build a version from its numeric parts.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a `MAJOR.MINOR.PATCH` string.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidVersion`] if the string does not have
    /// exactly three dot-separated decimal fields, or a field has a leading zero.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        let invalid = |reason: String| IdentityError::InvalidVersion {
            value: s.to_string(),
            reason,
        };

        let fields: Vec<&str> = s.split('.').collect();
        if fields.len() != 3 {
            return Err(invalid(format!(
                "expected 3 components, found {}",
                fields.len()
            )));
        }

        let mut parts = [0u64; 3];
        for (slot, field) in parts.iter_mut().zip(&fields) {
            if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid(format!("\"{field}\" is not a decimal number")));
            }
            if field.len() > 1 && field.starts_with('0') {
                return Err(invalid(format!("\"{field}\" has a leading zero")));
            }
            *slot = field
                .parse()
                .map_err(|e| invalid(format!("\"{field}\": {e}")))?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    /// Major version number.
    pub fn major(&self) -> u64 {
        self.major
    }

    /// Minor version number.
    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Patch version number.
    pub fn patch(&self) -> u64 {
        self.patch
    }
}

impl FromStr for CollectorVersion {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CollectorVersion {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CollectorVersion> for String {
    fn from(version: CollectorVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for CollectorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// ---------------------------------------------------------------------------
// Component identity
// ---------------------------------------------------------------------------

/// The (category, name, version) triple that addresses one schema document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentIdentity {
    /// Component category.
    pub category: ComponentCategory,
    /// Component name within the category.
    pub name: ComponentName,
    /// Collector release the schema belongs to.
    pub version: CollectorVersion,
}

impl ComponentIdentity {
    /// Assemble an identity from already-validated parts.
    pub fn new(category: ComponentCategory, name: ComponentName, version: CollectorVersion) -> Self {
        Self {
            category,
            name,
            version,
        }
    }

    /// Parse and validate an identity from raw strings.
    ///
    /// The category is checked first, so an unknown category is always
    /// reported as [`IdentityError::InvalidCategory`] regardless of the
    /// other two inputs.
    pub fn parse(category: &str, name: &str, version: &str) -> Result<Self, IdentityError> {
        let category = category.parse()?;
        let name = ComponentName::new(name)?;
        let version = CollectorVersion::parse(version)?;
        Ok(Self::new(category, name, version))
    }

    /// `<category>_<name>`, the stem shared by the schema and readme files.
    pub fn schema_stem(&self) -> String {
        format!("{}_{}", self.category, self.name)
    }

    /// `<category>_<name>_<version>`, the key the schema cache is indexed by.
    pub fn cache_key(&self) -> String {
        format!("{}_{}_{}", self.category, self.name, self.version)
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.category, self.name, self.version)
    }
}
