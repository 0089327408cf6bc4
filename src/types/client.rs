//! Client (lead) types

use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Lead status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "lead_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeadStatus {
    Hot,
    Prospect,
    Followup,
    Cold,
    Success,
}

impl LeadStatus {
    /// Parse an already-normalized token (upper-cased, whitespace and
    /// hyphens stripped), as it appears in a STATUS spreadsheet column.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HOT" => Some(LeadStatus::Hot),
            "PROSPECT" => Some(LeadStatus::Prospect),
            "FOLLOWUP" => Some(LeadStatus::Followup),
            "COLD" => Some(LeadStatus::Cold),
            "SUCCESS" => Some(LeadStatus::Success),
            _ => None,
        }
    }
}

/// Call response enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "call_response", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CallResponse {
    Hangup,
    Notinterested,
    Wrong,
    Notresponded,
    Notreached,
    Ongoing,
    Completed,
}

/// One cleaned, validated spreadsheet row, ready for upsert.
///
/// `phone` is the upsert key and is always non-empty here — rows without a
/// usable phone never make it past validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedClient {
    /// 1-based sheet row (header row counts as row 1), used in error reports.
    pub row: i32,
    pub name: Option<String>,
    pub phone: String,
    pub status: Option<LeadStatus>,
    pub call_response: Option<CallResponse>,
    pub notes: Option<String>,
    pub course: Option<String>,
    pub hostel_fee: Option<f64>,
    pub course_fee: Option<f64>,
    pub total_fee: Option<f64>,
    pub course_fee_paid: Option<f64>,
    pub hostel_fee_paid: Option<f64>,
    pub total_fee_paid: Option<f64>,
}

impl CleanedClient {
    pub fn new(row: i32, phone: String) -> Self {
        Self {
            row,
            name: None,
            phone,
            status: None,
            call_response: None,
            notes: None,
            course: None,
            hostel_fee: None,
            course_fee: None,
            total_fee: None,
            course_fee_paid: None,
            hostel_fee_paid: None,
            total_fee_paid: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_status_from_token() {
        assert_eq!(LeadStatus::from_token("HOT"), Some(LeadStatus::Hot));
        assert_eq!(LeadStatus::from_token("FOLLOWUP"), Some(LeadStatus::Followup));
        assert_eq!(LeadStatus::from_token("hot"), None); // caller normalizes case
        assert_eq!(LeadStatus::from_token("UNKNOWN"), None);
    }

    #[test]
    fn test_lead_status_serializes_uppercase() {
        let json = serde_json::to_string(&LeadStatus::Followup).unwrap();
        assert_eq!(json, "\"FOLLOWUP\"");
    }

    #[test]
    fn test_call_response_serializes_uppercase() {
        let json = serde_json::to_string(&CallResponse::Notinterested).unwrap();
        assert_eq!(json, "\"NOTINTERESTED\"");
    }
}
