//! Activity ledger and document models
//! Append-only rows; never updated or deleted

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of ledger action tags. Status changes always carry `Status`;
/// generic field edits carry `Update`, `Software` or `Inspection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Create,
    Update,
    Status,
    Software,
    Inspection,
    Repair,
    Recover,
    Archive,
    UploadDocument,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::Status => "status",
            ActivityAction::Software => "software",
            ActivityAction::Inspection => "inspection",
            ActivityAction::Repair => "repair",
            ActivityAction::Recover => "recover",
            ActivityAction::Archive => "archive",
            ActivityAction::UploadDocument => "upload_document",
        }
    }

    pub fn parse(value: &str) -> Option<ActivityAction> {
        match value {
            "create" => Some(ActivityAction::Create),
            "update" => Some(ActivityAction::Update),
            "status" => Some(ActivityAction::Status),
            "software" => Some(ActivityAction::Software),
            "inspection" => Some(ActivityAction::Inspection),
            "repair" => Some(ActivityAction::Repair),
            "recover" => Some(ActivityAction::Recover),
            "archive" => Some(ActivityAction::Archive),
            "upload_document" => Some(ActivityAction::UploadDocument),
            _ => None,
        }
    }
}

/// Fields whose changes constitute asset movement; the movement report is
/// restricted to this set.
pub const MOVEMENT_FIELDS: [&str; 4] = ["province", "district", "assigned_to", "status"];

/// One immutable row per field-level change on an asset.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssetActivity {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// A pending ledger row, produced by the lifecycle engine before it is
/// written inside the mutation's transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub action: ActivityAction,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

impl ActivityDraft {
    pub fn new(
        action: ActivityAction,
        field: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        ActivityDraft {
            action,
            field: field.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }
}

/// Evidence document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    LossEvidence,
    Specification,
    Inspection,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::LossEvidence => "loss_evidence",
            DocumentType::Specification => "specification",
            DocumentType::Inspection => "inspection",
        }
    }
}

/// One row per uploaded evidence file.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssetDocument {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub uploaded_at: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub doc_type: String,
    pub original_filename: String,
    pub stored_filename: String,
}

/// Inline document payload carried on create/update requests.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUpload {
    pub file_name: String,
    /// Base64-encoded file content
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_action_round_trip() {
        for action in [
            ActivityAction::Create,
            ActivityAction::Update,
            ActivityAction::Status,
            ActivityAction::Software,
            ActivityAction::Inspection,
            ActivityAction::Repair,
            ActivityAction::Recover,
            ActivityAction::Archive,
            ActivityAction::UploadDocument,
        ] {
            assert_eq!(ActivityAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(ActivityAction::parse("delete"), None);
    }

    #[test]
    fn test_movement_fields_are_the_closed_set() {
        assert_eq!(MOVEMENT_FIELDS, ["province", "district", "assigned_to", "status"]);
    }
}
