//! Entity descriptor for Order

use super::handlers::{
    OrderAppState, create_order, delete_order, get_order, list_order_states, list_orders,
    update_order,
};
use super::service::{OrderService, default_access};
use super::store::OrderStore;
use crate::config::AccessConfig;
use crate::core::error::ConfigError;
use crate::server::EntityDescriptor;
use axum::{Router, routing::get};
use std::sync::Arc;

/// Descriptor for the Order entity
pub struct OrderDescriptor {
    pub service: OrderService,
}

impl OrderDescriptor {
    pub fn new(service: OrderService) -> Self {
        Self { service }
    }

    /// Order list over `store` with the access overrides of `access`
    pub fn from_config(
        access: &AccessConfig,
        store: Arc<dyn OrderStore>,
    ) -> Result<Self, ConfigError> {
        let access = access.order.apply(default_access())?;
        Ok(Self::new(OrderService::new(store, access)))
    }
}

impl EntityDescriptor for OrderDescriptor {
    fn entity_type(&self) -> &str {
        "order"
    }

    fn plural(&self) -> &str {
        "orders"
    }

    fn build_routes(&self) -> Router {
        let state = OrderAppState {
            service: self.service.clone(),
        };

        Router::new()
            .route("/orders", get(list_orders).post(create_order))
            .route("/orders/states", get(list_order_states))
            .route(
                "/orders/{id}",
                get(get_order)
                    .patch(update_order)
                    .put(update_order)
                    .delete(delete_order),
            )
            .with_state(state)
    }
}
