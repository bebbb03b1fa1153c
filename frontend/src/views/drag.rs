//! Drag payload carried from a top-level user block to a group block.

use serde::{Deserialize, Serialize};

use crate::constants::DRAG_KIND_USER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl DragPayload {
    pub fn user(user_id: &str) -> Self {
        Self {
            kind: DRAG_KIND_USER.to_string(),
            id: user_id.to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The dragged user's id, or `None` when `raw` is not a user payload.
pub fn parse_user_drag(raw: &str) -> Option<String> {
    let payload: DragPayload = serde_json::from_str(raw).ok()?;
    (payload.kind == DRAG_KIND_USER && !payload.id.is_empty()).then_some(payload.id)
}
