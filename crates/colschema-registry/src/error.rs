//! # Registry Errors
//!
//! Every manager operation returns one of these as an explicit value.
//! Nothing here is fatal to the process, and a failed lookup never leaves
//! state behind in the schema cache.

use colschema_core::{CollectorVersion, ComponentCategory, ComponentIdentity, IdentityError};
use thiserror::Error;

use crate::config::DocumentFormat;

/// Error returned by registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A category, name or version string failed validation.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// No schema document exists for the identity.
    #[error("schema not found for component {category} {name} (version {version})")]
    SchemaNotFound {
        /// Requested category.
        category: ComponentCategory,
        /// Requested component name.
        name: String,
        /// Requested collector version.
        version: CollectorVersion,
    },

    /// No readme exists for the identity.
    #[error("README not found for component {category} {name} v{version}")]
    ReadmeNotFound {
        /// Requested category.
        category: ComponentCategory,
        /// Requested component name.
        name: String,
        /// Requested collector version.
        version: CollectorVersion,
    },

    /// The version directory has no changelog.
    #[error("changelog not found for version {version}")]
    ChangelogNotFound {
        /// Requested collector version.
        version: CollectorVersion,
    },

    /// The asset tree has no directory for this version.
    #[error("failed to read schema directory for version {version}: version not found")]
    VersionNotFound {
        /// Requested collector version.
        version: CollectorVersion,
    },

    /// The version exists but holds no components of this category.
    #[error("no {category} components found for version {version}")]
    NoComponents {
        /// Requested category.
        category: ComponentCategory,
        /// Requested collector version.
        version: CollectorVersion,
    },

    /// The asset root contains no version directories.
    #[error("no versions found in schemas directory")]
    NoVersions,

    /// The asset root is missing, or an asset under it could not be read.
    #[error("failed to read schema directory '{path}': {reason}")]
    DirectoryRead {
        /// Path that could not be read.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// A stored schema document could not be decoded.
    #[error("failed to decode schema for {identity}: {reason}")]
    SchemaDecode {
        /// The component whose schema is corrupt.
        identity: ComponentIdentity,
        /// Decoder message.
        reason: String,
    },

    /// The candidate configuration is not well-formed in its claimed format.
    #[error("failed to parse {format} data: {reason}")]
    Parse {
        /// The claimed format of the candidate bytes.
        format: DocumentFormat,
        /// Parser message.
        reason: String,
    },

    /// A stored schema could not be compiled into a validator.
    #[error("validator build error for {identity}: {reason}")]
    ValidatorBuild {
        /// The component whose schema failed to compile.
        identity: ComponentIdentity,
        /// Compiler message.
        reason: String,
    },

    /// A documentation search was issued without any search terms.
    #[error("documentation query must contain at least one search term")]
    EmptyQuery,
}

impl RegistryError {
    /// Whether this error means the requested asset does not exist.
    ///
    /// These are never worth retrying: the asset tree is static for the
    /// life of the process.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound { .. }
                | Self::ReadmeNotFound { .. }
                | Self::ChangelogNotFound { .. }
                | Self::VersionNotFound { .. }
                | Self::NoComponents { .. }
                | Self::NoVersions
        )
    }

    pub(crate) fn schema_not_found(identity: &ComponentIdentity) -> Self {
        Self::SchemaNotFound {
            category: identity.category,
            name: identity.name.to_string(),
            version: identity.version,
        }
    }

    pub(crate) fn readme_not_found(identity: &ComponentIdentity) -> Self {
        Self::ReadmeNotFound {
            category: identity.category,
            name: identity.name.to_string(),
            version: identity.version,
        }
    }
}
