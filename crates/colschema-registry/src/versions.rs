//! Collector version resolution over the asset tree.
//!
//! "Latest" is the numeric maximum of the version-shaped directory names,
//! so `0.10.0` outranks `0.9.0`.

use colschema_core::CollectorVersion;

use crate::error::RegistryError;
use crate::store::SchemaStore;

/// Every version present in the store, ascending.
pub fn all_versions(store: &dyn SchemaStore) -> Result<Vec<CollectorVersion>, RegistryError> {
    store.list_versions()
}

/// The highest version present in the store.
///
/// # Errors
///
/// [`RegistryError::NoVersions`] if the asset root holds no version
/// directories.
pub fn latest_version(store: &dyn SchemaStore) -> Result<CollectorVersion, RegistryError> {
    store
        .list_versions()?
        .into_iter()
        .max()
        .ok_or(RegistryError::NoVersions)
}
