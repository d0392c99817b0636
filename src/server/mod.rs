//! HTTP server assembly
//!
//! Lists register an [`EntityDescriptor`]; the [`ServerBuilder`] merges their
//! routes with the health checks and installs the auth provider.

pub mod builder;
pub mod entity_registry;
pub mod exposure;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
