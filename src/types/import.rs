//! Bulk client import types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Problem found in a single spreadsheet row.
///
/// `row` is 1-based as a human sees it in the sheet: the header is row 1,
/// so the first data row reports as row 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row: i32,
    pub message: String,
}

impl RowError {
    pub fn new(row: i32, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

/// Identity stamped onto every imported client, on both create and update.
///
/// Last uploader wins ownership: the update path overwrites these columns
/// unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportActor {
    /// User who performed the upload (owner of the records).
    pub user_id: Uuid,
    /// Employee the imported leads are assigned to.
    pub assigned_employee_id: Uuid,
}

/// Request to bulk-import clients from a spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportClientsRequest {
    /// Base64-encoded xlsx/xls file content. Only the first sheet is read.
    pub file_base64: String,
    /// Uploading user.
    pub actor_id: Uuid,
    /// Role of the uploader ("ADMIN" or "EMPLOYEE"); informational only,
    /// authorization happens at the gateway.
    pub actor_role: String,
    /// Employee to assign the imported leads to. Admins pass the target
    /// employee here; when absent the leads are assigned to the uploader.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
}

/// Response for a bulk client import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportClientsResponse {
    pub message: String,
    pub processed_count: u32,
    pub created_count: u32,
    pub updated_count: u32,
    pub errors: Vec<RowError>,
}
