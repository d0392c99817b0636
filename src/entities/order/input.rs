//! Order write payloads
//!
//! [`OrderPayload`] is the JSON body of a create or update request.
//! [`OrderInput`] is the same write after field rules ran and every relation
//! was normalized; it is the field set the lifecycle hooks work on.

use super::model::{NAME_MAX_LENGTH, Order, OrderState};
use crate::core::error::{FieldErrorDetail, ValidationError};
use crate::core::relation::{ManyRelationInput, ManyRelationWrite, RelationInput, RelationWrite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// Distinguishes an absent field from an explicit `null`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// JSON body of `POST /orders` and `PATCH /orders/{id}`
///
/// Every field is optional on the wire; create requires `orderNumber` and
/// `name`. Relations are kept raw until [`OrderPayload::into_create_input`]
/// or [`OrderPayload::into_update_input`] normalizes them.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub member: Option<Value>,

    #[validate(length(min = 1, message = "orderNumber must not be empty"))]
    pub order_number: Option<String>,

    #[validate(length(min = 1, max = NAME_MAX_LENGTH, message = "name must be 1 to 10 characters"))]
    pub name: Option<String>,
    pub name_editable: Option<bool>,

    pub state: Option<OrderState>,
    pub related_order: Option<Value>,

    pub paragraph_one: Option<String>,
    pub paragraph_one_editable: Option<bool>,
    pub paragraph_two: Option<String>,
    pub paragraph_two_editable: Option<bool>,

    pub image: Option<Value>,
    pub image_editable: Option<bool>,
    pub demo_image: Option<ManyRelationInput>,
    pub attachment: Option<Value>,

    #[serde(default, deserialize_with = "nullable")]
    pub schedule_start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub schedule_end_date: Option<Option<DateTime<Utc>>>,
    pub schedule_editable: Option<bool>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderPayload {
    /// Validate and normalize a create payload
    pub fn into_create_input(self) -> Result<OrderInput, ValidationError> {
        let mut missing = Vec::new();
        if self.order_number.is_none() {
            missing.push(FieldErrorDetail {
                field: "orderNumber".to_string(),
                message: "orderNumber is required".to_string(),
            });
        }
        if self.name.is_none() {
            missing.push(FieldErrorDetail {
                field: "name".to_string(),
                message: "name is required".to_string(),
            });
        }
        if !missing.is_empty() {
            return Err(ValidationError::FieldErrors(missing));
        }
        self.into_update_input()
    }

    /// Validate and normalize an update payload
    pub fn into_update_input(self) -> Result<OrderInput, ValidationError> {
        self.validate().map_err(wire_field_names)?;

        Ok(OrderInput {
            member: relation("member", self.member)?,
            order_number: self.order_number,
            name: self.name,
            name_editable: self.name_editable,
            state: self.state,
            related_order: relation("relatedOrder", self.related_order)?,
            paragraph_one: self.paragraph_one,
            paragraph_one_editable: self.paragraph_one_editable,
            paragraph_two: self.paragraph_two,
            paragraph_two_editable: self.paragraph_two_editable,
            image: relation("image", self.image)?,
            image_editable: self.image_editable,
            demo_image: self.demo_image.map(ManyRelationWrite::from),
            attachment: relation("attachment", self.attachment)?,
            schedule_start_date: self.schedule_start_date,
            schedule_end_date: self.schedule_end_date,
            schedule_editable: self.schedule_editable,
            updated_at: self.updated_at,
        })
    }
}

/// Report field rule failures under their camelCase wire names
fn wire_field_names(errors: validator::ValidationErrors) -> ValidationError {
    match ValidationError::from(errors) {
        ValidationError::FieldErrors(details) => ValidationError::FieldErrors(
            details
                .into_iter()
                .map(|detail| FieldErrorDetail {
                    field: camel_case(&detail.field),
                    message: detail.message,
                })
                .collect(),
        ),
        other => other,
    }
}

fn camel_case(field: &str) -> String {
    let mut parts = field.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn relation(field: &str, value: Option<Value>) -> Result<Option<RelationWrite>, ValidationError> {
    match value {
        Some(value) => RelationInput::from_value(field, value),
        None => Ok(None),
    }
}

/// Normalized field set of one write
///
/// `None` means "not written". The hooks may adjust `state` and `updated_at`
/// before the input is applied to a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderInput {
    pub member: Option<RelationWrite>,
    pub order_number: Option<String>,
    pub name: Option<String>,
    pub name_editable: Option<bool>,
    pub state: Option<OrderState>,
    pub related_order: Option<RelationWrite>,
    pub paragraph_one: Option<String>,
    pub paragraph_one_editable: Option<bool>,
    pub paragraph_two: Option<String>,
    pub paragraph_two_editable: Option<bool>,
    pub image: Option<RelationWrite>,
    pub image_editable: Option<bool>,
    pub demo_image: Option<ManyRelationWrite>,
    pub attachment: Option<RelationWrite>,
    pub schedule_start_date: Option<Option<DateTime<Utc>>>,
    pub schedule_end_date: Option<Option<DateTime<Utc>>>,
    pub schedule_editable: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderInput {
    /// Target id when this write connects `related_order`
    pub fn related_order_target(&self) -> Option<Uuid> {
        self.related_order.and_then(|write| write.connect_target())
    }

    /// State that will hold after this write: the incoming value, else the
    /// stored one, else the list default
    pub fn effective_state(&self, item: Option<&Order>) -> OrderState {
        self.state
            .or(item.map(|order| order.state))
            .unwrap_or_default()
    }

    /// Build a new record; `order_number` and `name` must be present
    pub fn into_new_order(
        self,
        now: DateTime<Utc>,
        author: Option<Uuid>,
    ) -> Result<Order, ValidationError> {
        let order_number = self.order_number.clone().ok_or_else(|| ValidationError::FieldError {
            field: "orderNumber".to_string(),
            message: "orderNumber is required".to_string(),
        })?;
        let name = self.name.clone().ok_or_else(|| ValidationError::FieldError {
            field: "name".to_string(),
            message: "name is required".to_string(),
        })?;

        let mut order = Order::new(order_number, name, now);
        order.created_by = author;
        order.updated_by = author;
        self.apply_to(&mut order);
        Ok(order)
    }

    /// Copy every written field onto `order`
    pub fn apply_to(self, order: &mut Order) {
        if let Some(write) = self.member {
            write.apply(&mut order.member);
        }
        if let Some(order_number) = self.order_number {
            order.order_number = order_number;
        }
        if let Some(name) = self.name {
            order.name = name;
        }
        if let Some(flag) = self.name_editable {
            order.name_editable = flag;
        }
        if let Some(state) = self.state {
            order.state = state;
        }
        if let Some(write) = self.related_order {
            write.apply(&mut order.related_order);
        }
        if let Some(text) = self.paragraph_one {
            order.paragraph_one = text;
        }
        if let Some(flag) = self.paragraph_one_editable {
            order.paragraph_one_editable = flag;
        }
        if let Some(text) = self.paragraph_two {
            order.paragraph_two = text;
        }
        if let Some(flag) = self.paragraph_two_editable {
            order.paragraph_two_editable = flag;
        }
        if let Some(write) = self.image {
            write.apply(&mut order.image);
        }
        if let Some(flag) = self.image_editable {
            order.image_editable = flag;
        }
        if let Some(write) = self.demo_image {
            write.apply(&mut order.demo_image);
        }
        if let Some(write) = self.attachment {
            write.apply(&mut order.attachment);
        }
        if let Some(date) = self.schedule_start_date {
            order.schedule_start_date = date;
        }
        if let Some(date) = self.schedule_end_date {
            order.schedule_end_date = date;
        }
        if let Some(flag) = self.schedule_editable {
            order.schedule_editable = flag;
        }
        if let Some(updated_at) = self.updated_at {
            order.updated_at = updated_at;
        }
    }
}
