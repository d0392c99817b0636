//! Relation payloads and their normalized form
//!
//! Clients write single relations either as a nested connect object or as a
//! bare id:
//!
//! ```json
//! { "relatedOrder": { "connect": { "id": "…" } } }
//! { "relatedOrder": { "connect": "…" } }
//! { "relatedOrder": "…" }
//! { "relatedOrder": { "disconnect": true } }
//! ```
//!
//! The boundary turns every shape into a [`RelationWrite`] so business rules
//! only ever see one explicit optional foreign key.

use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Target of a `connect`: `{ "id": X }` or a bare `X`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectTarget {
    Where { id: Uuid },
    Id(Uuid),
}

impl ConnectTarget {
    pub fn id(&self) -> Uuid {
        match self {
            ConnectTarget::Where { id } | ConnectTarget::Id(id) => *id,
        }
    }
}

/// Wire form of a single-relation write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationInput {
    Connect { connect: ConnectTarget },
    Disconnect { disconnect: bool },
    Id(Uuid),
}

/// Normalized single-relation write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationWrite {
    Connect(Uuid),
    Disconnect,
}

impl RelationWrite {
    /// The foreign key this write connects, if any
    pub fn connect_target(&self) -> Option<Uuid> {
        match self {
            RelationWrite::Connect(id) => Some(*id),
            RelationWrite::Disconnect => None,
        }
    }

    /// Apply to the stored foreign key
    pub fn apply(&self, current: &mut Option<Uuid>) {
        *current = self.connect_target();
    }
}

impl RelationInput {
    /// Normalize into a [`RelationWrite`]; `{ "disconnect": false }` is no write
    pub fn normalize(self) -> Option<RelationWrite> {
        match self {
            RelationInput::Connect { connect } => Some(RelationWrite::Connect(connect.id())),
            RelationInput::Id(id) => Some(RelationWrite::Connect(id)),
            RelationInput::Disconnect { disconnect: true } => Some(RelationWrite::Disconnect),
            RelationInput::Disconnect { disconnect: false } => None,
        }
    }

    /// Parse a raw JSON relation value, naming `field` in the error
    ///
    /// `null` means the field was not written.
    pub fn from_value(
        field: &str,
        value: serde_json::Value,
    ) -> Result<Option<RelationWrite>, ValidationError> {
        if value.is_null() {
            return Ok(None);
        }
        let input: RelationInput =
            serde_json::from_value(value).map_err(|_| ValidationError::InvalidRelation {
                field: field.to_string(),
                message: "expected an id, {\"connect\": {\"id\": ...}} or {\"disconnect\": true}"
                    .to_string(),
            })?;
        Ok(input.normalize())
    }
}

/// Wire form of a many-relation write
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManyRelationInput {
    /// Replace the whole set before applying connect/disconnect
    #[serde(default)]
    pub set: Option<Vec<ConnectTarget>>,

    #[serde(default)]
    pub connect: Vec<ConnectTarget>,

    #[serde(default)]
    pub disconnect: Vec<ConnectTarget>,
}

/// Normalized many-relation write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManyRelationWrite {
    pub set: Option<Vec<Uuid>>,
    pub connect: Vec<Uuid>,
    pub disconnect: Vec<Uuid>,
}

impl From<ManyRelationInput> for ManyRelationWrite {
    fn from(input: ManyRelationInput) -> Self {
        let ids = |targets: Vec<ConnectTarget>| -> Vec<Uuid> {
            targets.iter().map(ConnectTarget::id).collect()
        };
        Self {
            set: input.set.map(ids),
            connect: ids(input.connect),
            disconnect: ids(input.disconnect),
        }
    }
}

impl ManyRelationWrite {
    /// Apply to a stored id list, keeping insertion order and no duplicates
    pub fn apply(&self, current: &mut Vec<Uuid>) {
        if let Some(set) = &self.set {
            current.clear();
            for id in set {
                if !current.contains(id) {
                    current.push(*id);
                }
            }
        }
        for id in &self.connect {
            if !current.contains(id) {
                current.push(*id);
            }
        }
        current.retain(|id| !self.disconnect.contains(id));
    }
}
