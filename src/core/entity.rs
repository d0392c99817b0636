//! Entity trait defining the tracked-record abstraction

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all records managed by the admin backend.
///
/// Every list carries the same tracking fields next to its own data:
/// - id: Unique identifier
/// - created_at / updated_at: Timestamps
/// - created_by / updated_by: Author of the first and the latest write
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "orders")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "order")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// User who created the record, if known
    fn created_by(&self) -> Option<Uuid>;

    /// User who last wrote the record, if known
    fn updated_by(&self) -> Option<Uuid>;
}
