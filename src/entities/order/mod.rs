//! Order entity module

pub mod descriptor;
pub mod handlers;
pub mod hooks;
pub mod input;
pub mod model;
pub mod service;
pub mod store;

pub use descriptor::OrderDescriptor;
pub use hooks::{TransferRejection, resolve_input, validate_input};
pub use input::{OrderInput, OrderPayload};
pub use model::{Order, OrderState};
pub use service::{OrderPage, OrderService, StateOption, default_access};
pub use store::{OrderListQuery, OrderMutation, OrderQuery, OrderStore, TransferView};
