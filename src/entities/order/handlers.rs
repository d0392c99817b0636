//! Order HTTP handlers

use super::input::OrderPayload;
use super::model::Order;
use super::service::{OrderPage, OrderService, StateOption};
use super::store::OrderListQuery;
use crate::core::auth::CurrentUser;
use crate::core::error::{AdminError, RequestError};
use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

/// Order-specific AppState
#[derive(Clone)]
pub struct OrderAppState {
    pub service: OrderService,
}

fn bad_request(message: impl Into<String>) -> AdminError {
    RequestError::BadRequest {
        message: message.into(),
    }
    .into()
}

fn parse_id(id: &str) -> Result<Uuid, AdminError> {
    Uuid::parse_str(id).map_err(|_| bad_request(format!("invalid order id '{}'", id)))
}

fn body(payload: Result<Json<OrderPayload>, JsonRejection>) -> Result<OrderPayload, AdminError> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

pub async fn list_orders(
    State(state): State<OrderAppState>,
    CurrentUser(ctx): CurrentUser,
    query: Result<Query<OrderListQuery>, QueryRejection>,
) -> Result<Json<OrderPage>, AdminError> {
    let Query(query) = query.map_err(|rejection| bad_request(rejection.body_text()))?;
    state.service.list(&ctx, &query).await.map(Json)
}

pub async fn list_order_states(
    State(state): State<OrderAppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Vec<StateOption>>, AdminError> {
    state.service.states(&ctx).map(Json)
}

pub async fn get_order(
    State(state): State<OrderAppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, AdminError> {
    let id = parse_id(&id)?;
    state.service.get(&ctx, id).await.map(Json)
}

pub async fn create_order(
    State(state): State<OrderAppState>,
    CurrentUser(ctx): CurrentUser,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), AdminError> {
    let payload = body(payload)?;
    let order = state.service.create(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_order(
    State(state): State<OrderAppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Result<Json<Order>, AdminError> {
    let id = parse_id(&id)?;
    let payload = body(payload)?;
    state.service.update(&ctx, id, payload).await.map(Json)
}

pub async fn delete_order(
    State(state): State<OrderAppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AdminError> {
    let id = parse_id(&id)?;
    state.service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
