//! # Advertise Admin
//!
//! Admin backend for advertisement orders.
//!
//! An order records what a member bought (the ad name, copy, image material,
//! screenshots and broadcast schedule) and where it is in the production
//! workflow. An order can be handed over to another order through
//! `relatedOrder`; the lifecycle hooks in [`entities::order::hooks`] keep those
//! transfers one-to-one, acyclic and write-once.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use advertise::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryOrderStore::new());
//! let orders = OrderDescriptor::new(OrderService::with_default_access(store));
//!
//! ServerBuilder::new()
//!     .register_entity(orders)
//!     .serve("127.0.0.1:3000".parse()?)
//!     .await?;
//! ```
//!
//! Callers identify themselves with the `x-user-id` and `x-user-roles`
//! headers; see [`core::auth::HeaderAuthProvider`].

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{
            AuthContext, AuthPolicy, AuthProvider, CurrentUser, HeaderAuthProvider, ListAccess,
            Operation, Role,
        },
        entity::Entity,
        error::{AdminError, ConfigError, EntityError, RequestError, StorageError, ValidationError},
        relation::{ManyRelationWrite, RelationInput, RelationWrite},
        service::DataService,
        store::QueryableStore,
        validation::ValidationReport,
    };

    // === Orders ===
    pub use crate::entities::order::{
        Order, OrderDescriptor, OrderInput, OrderListQuery, OrderMutation, OrderPayload, OrderQuery,
        OrderService, OrderState, OrderStore, TransferRejection, TransferView, default_access,
        resolve_input, validate_input,
    };

    // === Storage ===
    pub use crate::storage::InMemoryOrderStore;

    // === Config ===
    pub use crate::config::{AccessConfig, AdminConfig, ListAccessConfig, init_tracing};

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}
