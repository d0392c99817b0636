//! Lifecycle hooks of the order list
//!
//! Every create and update runs through [`resolve_input`] and then
//! [`validate_input`] before anything is written.
//!
//! The transfer rules: an order may point at one other order through
//! `related_order`. The link is write-once, the target must exist and must not
//! itself be transferred, and a target accepts at most one inbound transfer.
//! Connecting a target moves the order to [`OrderState::Transferred`], and an
//! order in that state must carry a link.

use super::input::OrderInput;
use super::model::{Order, OrderState};
use super::store::OrderQuery;
use crate::core::auth::Operation;
use crate::core::relation::RelationWrite;
use crate::core::validation::ValidationReport;
use anyhow::Result;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Reasons a write is rejected by the transfer rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransferRejection {
    #[error("不能選擇自己作為訂單更動的目標")]
    SelfReference,

    #[error("此訂單已經轉移過，不能再次修改轉移目標")]
    AlreadyTransferred,

    #[error("目標訂單不存在")]
    TargetNotFound,

    #[error("不能選擇已經轉移出去的訂單作為訂單更動的目標")]
    TargetAlreadyTransferred,

    #[error("此訂單已經被其他訂單轉移過來，不能再次被選為目標")]
    TargetAlreadyClaimed,

    #[error("狀態為「已轉交」時，必須設定訂單更動")]
    MissingRelatedOrder,
}

impl TransferRejection {
    /// Stable identifier used in logs
    pub fn code(&self) -> &'static str {
        match self {
            TransferRejection::SelfReference => "self_reference",
            TransferRejection::AlreadyTransferred => "already_transferred",
            TransferRejection::TargetNotFound => "target_not_found",
            TransferRejection::TargetAlreadyTransferred => "target_already_transferred",
            TransferRejection::TargetAlreadyClaimed => "target_already_claimed",
            TransferRejection::MissingRelatedOrder => "missing_related_order",
        }
    }
}

/// Adjust the incoming write before validation
///
/// Stamps `updated_at` on create when the caller did not supply one, and
/// forces the state to `transferred` when the write connects a related order.
/// Never rejects.
pub fn resolve_input(
    mut input: OrderInput,
    operation: Operation,
    item: Option<&Order>,
    now: DateTime<Utc>,
) -> OrderInput {
    if operation == Operation::Create && input.updated_at.is_none() {
        input.updated_at = Some(now);
    }

    if let Some(target) = input.related_order_target() {
        let state = input.effective_state(item);
        if state != OrderState::Transferred {
            tracing::debug!(
                %target,
                from = %state,
                "related order connected, forcing transferred state"
            );
            input.state = Some(OrderState::Transferred);
        }
    }

    input
}

/// Check the transfer rules against the resolved write
///
/// Failures are reported to `report`; the first failing link check ends the
/// hook. `Err` means a lookup itself failed.
pub async fn validate_input<Q>(
    input: &OrderInput,
    item: Option<&Order>,
    query: &Q,
    report: &mut ValidationReport,
) -> Result<()>
where
    Q: OrderQuery + ?Sized,
{
    let prior_link = item.and_then(|order| order.related_order);

    match input.related_order {
        Some(RelationWrite::Connect(target)) => {
            if let Some(rejection) = check_transfer(target, item, query).await? {
                reject(report, rejection);
                return Ok(());
            }
        }
        Some(RelationWrite::Disconnect) if prior_link.is_some() => {
            reject(report, TransferRejection::AlreadyTransferred);
            return Ok(());
        }
        _ => {}
    }

    let state = input.effective_state(item);
    if state == OrderState::Transferred
        && input.related_order_target().is_none()
        && prior_link.is_none()
    {
        reject(report, TransferRejection::MissingRelatedOrder);
    }

    Ok(())
}

async fn check_transfer<Q>(
    target: Uuid,
    item: Option<&Order>,
    query: &Q,
) -> Result<Option<TransferRejection>>
where
    Q: OrderQuery + ?Sized,
{
    if let Some(order) = item {
        if order.id == target {
            return Ok(Some(TransferRejection::SelfReference));
        }
        if order.related_order.is_some() {
            return Ok(Some(TransferRejection::AlreadyTransferred));
        }
    }

    let Some(view) = query.find_one(&target).await? else {
        return Ok(Some(TransferRejection::TargetNotFound));
    };
    if view.related_order.is_some() {
        return Ok(Some(TransferRejection::TargetAlreadyTransferred));
    }

    let inbound = query.find_many_pointing_to(&target).await?;
    if !inbound.is_empty() {
        tracing::debug!(%target, inbound = inbound.len(), "target already claimed");
        return Ok(Some(TransferRejection::TargetAlreadyClaimed));
    }

    Ok(None)
}

fn reject(report: &mut ValidationReport, rejection: TransferRejection) {
    tracing::warn!(reason = rejection.code(), "order transfer rejected");
    report.add_validation_error(rejection.to_string());
}
