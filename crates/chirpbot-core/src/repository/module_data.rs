//! Module-private data store trait.
//!
//! Defines the interface for module-scoped key-value storage.
//! Implementations live in chirpbot-infra.

use chirpbot_types::error::RepositoryError;

/// Trait for module-scoped key-value persistent storage.
///
/// Stores arbitrary JSON values keyed by module name and string key. The
/// router never reads these rows; they exist so modules can keep state
/// without touching the store directly.
pub trait ModuleDataRepository: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get_module_data(
        &self,
        module: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, RepositoryError>> + Send;

    /// Set a value for a key (upsert).
    fn set_module_data(
        &self,
        module: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete_module_data(
        &self,
        module: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List all keys for a module.
    fn list_module_keys(
        &self,
        module: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;
}
