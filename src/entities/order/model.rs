//! Order entity model

use crate::core::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum length of the advertisement name, in characters
pub const NAME_MAX_LENGTH: u64 = 10;

/// Workflow state of an order
///
/// A flat enumeration: the only coupling enforced by the hooks is between
/// `Transferred` and `related_order`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    #[default]
    Paid,
    FileUploaded,
    MaterialConfirmed,
    MaterialUpdated,
    Produced,
    VideoConfirmed,
    Scheduled,
    Broadcasted,
    ModificationRequest,
    PendingQuoteConfirmation,
    Transferred,
    PendingBroadcastDate,
    Cancelled,
}

impl OrderState {
    /// Every state, in the order the admin UI lists them
    pub const ALL: [OrderState; 13] = [
        OrderState::Paid,
        OrderState::FileUploaded,
        OrderState::MaterialConfirmed,
        OrderState::MaterialUpdated,
        OrderState::Produced,
        OrderState::VideoConfirmed,
        OrderState::Scheduled,
        OrderState::Broadcasted,
        OrderState::ModificationRequest,
        OrderState::PendingQuoteConfirmation,
        OrderState::Transferred,
        OrderState::PendingBroadcastDate,
        OrderState::Cancelled,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Paid => "paid",
            OrderState::FileUploaded => "file_uploaded",
            OrderState::MaterialConfirmed => "material_confirmed",
            OrderState::MaterialUpdated => "material_updated",
            OrderState::Produced => "produced",
            OrderState::VideoConfirmed => "video_confirmed",
            OrderState::Scheduled => "scheduled",
            OrderState::Broadcasted => "broadcasted",
            OrderState::ModificationRequest => "modification_request",
            OrderState::PendingQuoteConfirmation => "pending_quote_confirmation",
            OrderState::Transferred => "transferred",
            OrderState::PendingBroadcastDate => "pending_broadcast_date",
            OrderState::Cancelled => "cancelled",
        }
    }

    /// Display label shown to admins
    pub fn label(&self) -> &'static str {
        match self {
            OrderState::Paid => "待上傳素材",
            OrderState::FileUploaded => "已上傳檔案",
            OrderState::MaterialConfirmed => "已確認素材",
            OrderState::MaterialUpdated => "素材更新",
            OrderState::Produced => "已製作",
            OrderState::VideoConfirmed => "影片確認",
            OrderState::Scheduled => "排播",
            OrderState::Broadcasted => "已播出",
            OrderState::ModificationRequest => "提出修改要求",
            OrderState::PendingQuoteConfirmation => "待確認修改報價",
            OrderState::Transferred => "已轉交",
            OrderState::PendingBroadcastDate => "待排播",
            OrderState::Cancelled => "已取消",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("unknown order state '{}'", s))
    }
}

/// An advertisement order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,

    /// Member who placed the order
    pub member: Option<Uuid>,

    /// Unique business identifier
    pub order_number: String,

    /// Advertisement name
    pub name: String,
    pub name_editable: bool,

    pub state: OrderState,

    /// Order this one was transferred to; write-once
    pub related_order: Option<Uuid>,

    pub paragraph_one: String,
    pub paragraph_one_editable: bool,
    pub paragraph_two: String,
    pub paragraph_two_editable: bool,

    /// Image material (photo id)
    pub image: Option<Uuid>,
    pub image_editable: bool,

    /// Video screenshots (photo ids)
    pub demo_image: Vec<Uuid>,

    /// Related document (pdf id)
    pub attachment: Option<Uuid>,

    pub schedule_start_date: Option<DateTime<Utc>>,
    pub schedule_end_date: Option<DateTime<Utc>>,
    pub schedule_editable: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

impl Order {
    /// A fresh order with every optional field at its default
    pub fn new(
        order_number: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            member: None,
            order_number: order_number.into(),
            name: name.into(),
            name_editable: false,
            state: OrderState::default(),
            related_order: None,
            paragraph_one: String::new(),
            paragraph_one_editable: false,
            paragraph_two: String::new(),
            paragraph_two_editable: false,
            image: None,
            image_editable: false,
            demo_image: Vec::new(),
            attachment: None,
            schedule_start_date: None,
            schedule_end_date: None,
            schedule_editable: false,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        }
    }

    pub fn is_transferred(&self) -> bool {
        self.related_order.is_some()
    }
}

impl Entity for Order {
    fn resource_name() -> &'static str {
        "orders"
    }

    fn resource_name_singular() -> &'static str {
        "order"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn created_by(&self) -> Option<Uuid> {
        self.created_by
    }

    fn updated_by(&self) -> Option<Uuid> {
        self.updated_by
    }
}
