//! In-memory order store for testing and development

use crate::core::error::{EntityError, StorageError, ValidationError};
use crate::core::store::{QueryableStore, parse_sort};
use crate::core::{DataService, Entity};
use crate::entities::order::{
    Order, OrderListQuery, OrderMutation, OrderQuery, OrderStore, TransferRejection, TransferView,
};
use anyhow::Result;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

#[derive(Debug, Default)]
struct OrderTable {
    rows: HashMap<Uuid, Order>,
    /// order_number -> id
    by_number: HashMap<String, Uuid>,
    /// related_order target -> id of the order pointing at it
    by_related: HashMap<Uuid, Uuid>,
}

impl OrderTable {
    /// Fail if `order` would collide with a row other than itself
    fn check_unique(&self, order: &Order) -> Result<(), StorageError> {
        if let Some(owner) = self.by_number.get(&order.order_number) {
            if *owner != order.id {
                return Err(StorageError::UniqueViolation {
                    field: "orderNumber".to_string(),
                    value: order.order_number.clone(),
                });
            }
        }
        if let Some(target) = order.related_order {
            if let Some(owner) = self.by_related.get(&target) {
                if *owner != order.id {
                    return Err(StorageError::UniqueViolation {
                        field: "relatedOrder".to_string(),
                        value: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Re-check the transfer link of `order` against the committed rows
    ///
    /// `previous` is the row being replaced, `None` on create.
    fn check_transfer(
        &self,
        previous: Option<&Order>,
        order: &Order,
    ) -> Result<(), TransferRejection> {
        if let Some(prior) = previous.and_then(|row| row.related_order) {
            return if order.related_order == Some(prior) {
                Ok(())
            } else {
                Err(TransferRejection::AlreadyTransferred)
            };
        }

        let Some(target) = order.related_order else {
            return Ok(());
        };
        if target == order.id {
            return Err(TransferRejection::SelfReference);
        }
        match self.rows.get(&target) {
            None => Err(TransferRejection::TargetNotFound),
            Some(row) if row.related_order.is_some() => {
                Err(TransferRejection::TargetAlreadyTransferred)
            }
            Some(_) => Ok(()),
        }
    }

    /// Validate `order` against the indexes and swap it in for `previous`
    fn commit(&mut self, previous: Option<Order>, order: Order) -> Result<Order> {
        self.check_unique(&order)?;
        self.check_transfer(previous.as_ref(), &order)
            .map_err(|rejection| {
                tracing::warn!(
                    order_id = %order.id,
                    reason = rejection.code(),
                    "transfer rejected at commit"
                );
                ValidationError::Rejected {
                    messages: vec![rejection.to_string()],
                }
            })?;

        if let Some(previous) = &previous {
            self.unindex(previous);
        }
        self.insert(order.clone());
        Ok(order)
    }

    fn unindex(&mut self, order: &Order) {
        self.by_number.remove(&order.order_number);
        if let Some(target) = order.related_order {
            self.by_related.remove(&target);
        }
    }

    fn insert(&mut self, order: Order) {
        self.by_number.insert(order.order_number.clone(), order.id);
        if let Some(target) = order.related_order {
            self.by_related.insert(target, order.id);
        }
        self.rows.insert(order.id, order);
    }
}

fn poisoned<T>(err: PoisonError<T>) -> StorageError {
    StorageError::LockPoisoned {
        message: err.to_string(),
    }
}

fn not_found(id: &Uuid) -> EntityError {
    EntityError::NotFound {
        entity_type: Order::resource_name_singular().to_string(),
        id: *id,
    }
}

/// Order store backed by a `HashMap`
///
/// `order_number` and `related_order` are unique. Both indexes are checked
/// and written under the same write lock as the row itself, so two
/// concurrent transfers to one target cannot both commit. The same lock
/// guards the transfer link: it is write-once, and a new target must exist
/// and carry no link of its own.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    table: Arc<RwLock<OrderTable>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataService<Order> for InMemoryOrderStore {
    async fn create(&self, order: Order) -> Result<Order> {
        let mut table = self.table.write().map_err(poisoned)?;

        if table.rows.contains_key(&order.id) {
            return Err(EntityError::Conflict {
                entity_type: Order::resource_name_singular().to_string(),
                id: order.id,
                message: "id already in use".to_string(),
            }
            .into());
        }
        table.commit(None, order)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Order>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.rows.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn update(&self, id: &Uuid, mut order: Order) -> Result<Order> {
        let mut table = self.table.write().map_err(poisoned)?;

        let previous = table.rows.get(id).cloned().ok_or_else(|| not_found(id))?;
        order.id = *id;
        table.commit(Some(previous), order)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut table = self.table.write().map_err(poisoned)?;

        if let Some(source) = table.by_related.get(id) {
            return Err(EntityError::Conflict {
                entity_type: Order::resource_name_singular().to_string(),
                id: *id,
                message: format!("order {} was transferred to it", source),
            }
            .into());
        }
        let removed = table.rows.remove(id).ok_or_else(|| not_found(id))?;
        table.unindex(&removed);

        Ok(())
    }
}

#[async_trait]
impl OrderQuery for InMemoryOrderStore {
    async fn find_one(&self, id: &Uuid) -> Result<Option<TransferView>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.rows.get(id).map(TransferView::from))
    }

    async fn find_many_pointing_to(&self, target: &Uuid) -> Result<Vec<Uuid>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.by_related.get(target).copied().into_iter().collect())
    }
}

impl QueryableStore<Order> for InMemoryOrderStore {
    type Filter = OrderListQuery;

    fn apply_filters(&self, data: Vec<Order>, filter: &OrderListQuery) -> Vec<Order> {
        data.into_iter()
            .filter(|order| filter.state.is_none_or(|state| order.state == state))
            .filter(|order| filter.member.is_none_or(|member| order.member == Some(member)))
            .filter(|order| {
                filter
                    .related_order
                    .is_none_or(|target| order.related_order == Some(target))
            })
            .collect()
    }

    fn apply_sort(&self, mut data: Vec<Order>, sort: &str) -> Vec<Order> {
        let (field, descending) = parse_sort(sort);
        let compare: fn(&Order, &Order) -> Ordering = match field {
            "created_at" | "createdAt" => |a: &Order, b: &Order| a.created_at.cmp(&b.created_at),
            "updated_at" | "updatedAt" => |a: &Order, b: &Order| a.updated_at.cmp(&b.updated_at),
            "order_number" | "orderNumber" => {
                |a: &Order, b: &Order| a.order_number.cmp(&b.order_number)
            }
            "schedule_start_date" | "scheduleStartDate" => {
                |a: &Order, b: &Order| a.schedule_start_date.cmp(&b.schedule_start_date)
            }
            _ => return data,
        };

        data.sort_by(|a, b| {
            let ordering = compare(a, b);
            if descending { ordering.reverse() } else { ordering }
        });
        data
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn list_matching(&self, query: &OrderListQuery) -> Result<(Vec<Order>, usize)> {
        let mut orders = self.list().await?;
        // stable base order so pagination is deterministic
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut orders = self.apply_filters(orders, query);
        if let Some(sort) = &query.sort {
            orders = self.apply_sort(orders, sort);
        }

        let total = orders.len();
        let page = orders
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok((page, total))
    }

    async fn update_with(&self, id: &Uuid, mutation: OrderMutation) -> Result<Order> {
        let mut table = self.table.write().map_err(poisoned)?;

        let previous = table.rows.get(id).cloned().ok_or_else(|| not_found(id))?;
        let mut order = previous.clone();
        mutation(&mut order);
        order.id = *id;
        table.commit(Some(previous), order)
    }
}
