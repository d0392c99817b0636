//! Service trait for entity storage

use crate::core::Entity;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Service trait for managing entities
///
/// Implementations provide CRUD operations for a specific entity type.
/// Business rules live above this trait; implementations only enforce
/// storage-level constraints such as unique indexes.
#[async_trait]
pub trait DataService<T: Entity>: Send + Sync {
    /// Create a new entity
    async fn create(&self, entity: T) -> Result<T>;

    /// Get an entity by ID
    async fn get(&self, id: &Uuid) -> Result<Option<T>>;

    /// List all entities
    async fn list(&self) -> Result<Vec<T>>;

    /// Replace an existing entity
    async fn update(&self, id: &Uuid, entity: T) -> Result<T>;

    /// Delete an entity
    async fn delete(&self, id: &Uuid) -> Result<()>;
}
