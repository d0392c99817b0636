//! Storage contract of the order list

use super::model::{Order, OrderState};
use crate::core::DataService;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Projection of an order used by the transfer rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferView {
    pub id: Uuid,
    pub state: OrderState,
    pub related_order: Option<Uuid>,
}

impl From<&Order> for TransferView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            state: order.state,
            related_order: order.related_order,
        }
    }
}

/// Lookups the `validate_input` hook performs while checking a transfer
///
/// Errors are unexpected lookup failures; they propagate and fail the request.
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Fetch the transfer projection of one order
    async fn find_one(&self, id: &Uuid) -> Result<Option<TransferView>>;

    /// Ids of every order whose `related_order` is `target`
    async fn find_many_pointing_to(&self, target: &Uuid) -> Result<Vec<Uuid>>;
}

/// Query parameters of `GET /orders`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderListQuery {
    pub state: Option<OrderState>,
    pub member: Option<Uuid>,
    pub related_order: Option<Uuid>,

    /// `field`, `field:asc` or `field:desc`
    pub sort: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Edit applied to the current row inside [`OrderStore::update_with`]
pub type OrderMutation = Box<dyn FnOnce(&mut Order) + Send>;

/// Everything the order service needs from a backend
#[async_trait]
pub trait OrderStore: DataService<Order> + OrderQuery {
    /// Filtered, sorted page of orders plus the total match count before paging
    async fn list_matching(&self, query: &OrderListQuery) -> Result<(Vec<Order>, usize)>;

    /// Apply `mutation` to the stored row and commit it atomically
    ///
    /// The edit sees the row as it is at commit time, not as the caller last
    /// read it. Backends re-check the transfer link under the same lock: a set
    /// link never changes, and a newly set target must exist without a link
    /// of its own. Those failures come back as
    /// [`ValidationError::Rejected`](crate::core::error::ValidationError).
    async fn update_with(&self, id: &Uuid, mutation: OrderMutation) -> Result<Order>;
}
