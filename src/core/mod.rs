//! Core module containing the traits and types shared by every list

pub mod auth;
pub mod entity;
pub mod error;
pub mod relation;
pub mod service;
pub mod store;
pub mod validation;

pub use auth::{
    AuthContext, AuthPolicy, AuthProvider, CurrentUser, HeaderAuthProvider, ListAccess, Operation,
    Role,
};
pub use entity::Entity;
pub use error::{AdminError, ConfigError, EntityError, RequestError, StorageError, ValidationError};
pub use relation::{ManyRelationInput, ManyRelationWrite, RelationInput, RelationWrite};
pub use service::DataService;
pub use store::QueryableStore;
pub use validation::ValidationReport;
