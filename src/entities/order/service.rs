//! Order mutation pipeline
//!
//! Every request passes, in order: the list access check, payload field
//! rules and relation normalization, [`resolve_input`], [`validate_input`],
//! and only then the tracking fields and the store write. Updates go through
//! [`OrderStore::update_with`], which edits the row as it is at commit time.

use super::hooks::{resolve_input, validate_input};
use super::input::OrderPayload;
use super::model::{Order, OrderState};
use super::store::{OrderListQuery, OrderMutation, OrderStore};
use crate::core::auth::{AuthContext, AuthPolicy, ListAccess, Operation, Role};
use crate::core::error::{AdminError, EntityError};
use crate::core::validation::ValidationReport;
use crate::core::{DataService, Entity};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Built-in access map of the order list
///
/// Editors may browse, moderators may also write, only admins delete.
pub fn default_access() -> ListAccess {
    ListAccess::new(Order::resource_name())
        .allow(
            Operation::Query,
            AuthPolicy::allow_roles(&[Role::Admin, Role::Moderator, Role::Editor]),
        )
        .allow(
            Operation::Create,
            AuthPolicy::allow_roles(&[Role::Admin, Role::Moderator]),
        )
        .allow(
            Operation::Update,
            AuthPolicy::allow_roles(&[Role::Admin, Role::Moderator]),
        )
        .allow(Operation::Delete, AuthPolicy::allow_roles(&[Role::Admin]))
}

/// One page of `GET /orders`
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// Matches before `limit`/`offset`
    pub count: usize,
}

/// Select option for the state field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateOption {
    pub value: OrderState,
    pub label: &'static str,
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    access: ListAccess,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, access: ListAccess) -> Self {
        Self { store, access }
    }

    /// Service using [`default_access`]
    pub fn with_default_access(store: Arc<dyn OrderStore>) -> Self {
        Self::new(store, default_access())
    }

    pub fn access(&self) -> &ListAccess {
        &self.access
    }

    pub async fn create(
        &self,
        ctx: &AuthContext,
        payload: OrderPayload,
    ) -> Result<Order, AdminError> {
        self.access.check(Operation::Create, ctx)?;
        let input = payload.into_create_input()?;

        let now = Utc::now();
        let input = resolve_input(input, Operation::Create, None, now);

        let mut report = ValidationReport::new();
        validate_input(&input, None, self.store.as_ref(), &mut report).await?;
        report.into_result()?;

        let order = input.into_new_order(now, ctx.user_id())?;
        let order = self.store.create(order).await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            state = %order.state,
            related_order = ?order.related_order,
            "order created"
        );
        Ok(order)
    }

    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        payload: OrderPayload,
    ) -> Result<Order, AdminError> {
        self.access.check(Operation::Update, ctx)?;
        let input = payload.into_update_input()?;

        let item = self.find(&id).await?;
        let now = Utc::now();
        let input = resolve_input(input, Operation::Update, Some(&item), now);

        let mut report = ValidationReport::new();
        validate_input(&input, Some(&item), self.store.as_ref(), &mut report).await?;
        report.into_result()?;

        // only the written fields land, on the row as it is at commit time
        let stamped = input.updated_at.is_some();
        let author = ctx.user_id();
        let mutation: OrderMutation = Box::new(move |order: &mut Order| {
            input.apply_to(order);
            if !stamped {
                order.updated_at = now;
            }
            order.updated_by = author;
        });
        let order = self.store.update_with(&id, mutation).await?;

        tracing::info!(
            order_id = %order.id,
            state = %order.state,
            related_order = ?order.related_order,
            "order updated"
        );
        Ok(order)
    }

    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<Order, AdminError> {
        self.access.check(Operation::Query, ctx)?;
        self.find(&id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        query: &OrderListQuery,
    ) -> Result<OrderPage, AdminError> {
        self.access.check(Operation::Query, ctx)?;
        let (orders, count) = self.store.list_matching(query).await?;
        tracing::debug!(returned = orders.len(), count, "orders listed");
        Ok(OrderPage { orders, count })
    }

    /// Delete an order; fails with a conflict while another order was
    /// transferred to it
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<(), AdminError> {
        self.access.check(Operation::Delete, ctx)?;
        self.store.delete(&id).await?;
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    /// The state select options, in display order
    pub fn states(&self, ctx: &AuthContext) -> Result<Vec<StateOption>, AdminError> {
        self.access.check(Operation::Query, ctx)?;
        Ok(OrderState::ALL
            .into_iter()
            .map(|value| StateOption {
                value,
                label: value.label(),
            })
            .collect())
    }

    async fn find(&self, id: &Uuid) -> Result<Order, AdminError> {
        self.store.get(id).await?.ok_or_else(|| {
            EntityError::NotFound {
                entity_type: Order::resource_name_singular().to_string(),
                id: *id,
            }
            .into()
        })
    }
}
