//! Registry of the lists served by the admin backend

use axum::Router;
use std::collections::BTreeMap;

/// Describes how one list contributes its routes
pub trait EntityDescriptor: Send + Sync {
    /// Singular list key (e.g. "order")
    fn entity_type(&self) -> &str;

    /// Plural path segment (e.g. "orders")
    fn plural(&self) -> &str;

    /// Routes of the list, with their state already attached
    fn build_routes(&self) -> Router;
}

/// Collects list descriptors, keyed by entity type
///
/// Registering the same entity type twice replaces the earlier descriptor.
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        if self.descriptors.contains_key(&entity_type) {
            tracing::warn!(%entity_type, "replacing registered list");
        }
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Merge the routes of every registered list
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                tracing::debug!(list = descriptor.plural(), "mounting list routes");
                router.merge(descriptor.build_routes())
            })
    }

    /// Registered entity types, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
