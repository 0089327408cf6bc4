//! Per-row field cleaning and validation.
//!
//! Takes the loosely-typed rows produced by the sheet reader and turns each
//! one into a typed `CleanedClient`, or a `RowError` when the row is
//! unusable. Phone is the only hard requirement; every other problem is a
//! soft error that nulls the offending field and lets the row through.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::import::columns::{normalize_header, CanonicalField};
use crate::import::sheet_reader::RawRow;
use crate::types::{CallResponse, CleanedClient, LeadStatus, RowError};

/// What to do with a PROSPECT status before persistence.
///
/// The business has flip-flopped on this: one upload path stored resolved
/// PROSPECT as NULL, the other treated PROSPECT as the default for rows
/// with no status at all. Both behaviors are kept selectable; the NULL
/// variant is the current rule and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProspectPolicy {
    /// A resolved status of PROSPECT is stored as NULL.
    #[default]
    NullOnProspect,
    /// Rows with no resolvable status default to PROSPECT; explicit
    /// PROSPECT is kept.
    DefaultToProspect,
}

impl ProspectPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "null-on-prospect" | "null_on_prospect" => Some(ProspectPolicy::NullOnProspect),
            "default-to-prospect" | "default_to_prospect" => Some(ProspectPolicy::DefaultToProspect),
            _ => None,
        }
    }

    fn apply(self, status: Option<LeadStatus>) -> Option<LeadStatus> {
        match self {
            ProspectPolicy::NullOnProspect => {
                if status == Some(LeadStatus::Prospect) {
                    None
                } else {
                    status
                }
            }
            ProspectPolicy::DefaultToProspect => status.or(Some(LeadStatus::Prospect)),
        }
    }
}

/// Boolean-flag status columns, checked in this order; the first column
/// whose cell reads "yes" wins and the STATUS column is not consulted.
const STATUS_FLAG_COLUMNS: &[(&str, LeadStatus)] = &[
    ("HOT", LeadStatus::Hot),
    ("PROSPECT", LeadStatus::Prospect),
    ("FOLLOW-UP", LeadStatus::Followup),
    ("COLD", LeadStatus::Cold),
    ("SUCCESS", LeadStatus::Success),
];

/// Human phrasings of call outcomes seen in real sheets, including the
/// "cilent" misspelling that shipped in production data.
static CALL_RESPONSE_SYNONYMS: Lazy<HashMap<&'static str, CallResponse>> = Lazy::new(|| {
    use CallResponse::*;
    HashMap::from([
        ("hang up", Hangup),
        ("hung up", Hangup),
        ("hanged up", Hangup),
        ("hangup", Hangup),
        ("hang call", Hangup),
        ("hang call by client", Hangup),
        ("hang call by cilent", Hangup),
        ("not interested", Notinterested),
        ("wrong", Wrong),
        ("wrong number", Wrong),
        ("not responded", Notresponded),
        ("no response", Notresponded),
        ("no answer", Notresponded),
        ("not reached", Notreached),
        ("ongoing", Ongoing),
        ("completed", Completed),
    ])
});

/// Result of cleaning one batch of raw rows.
///
/// `cleaned` and `errors` partition the input: a row either yields a
/// `CleanedClient`, or a "Missing phone" error. Soft problems contribute an
/// error entry *and* a cleaned row with the field nulled.
#[derive(Debug, Default)]
pub struct CleanedBatch {
    pub cleaned: Vec<CleanedClient>,
    pub errors: Vec<RowError>,
}

/// Row cleaner parameterized by the prospect-status policy.
pub struct RowCleaner {
    policy: ProspectPolicy,
}

impl RowCleaner {
    pub fn new(policy: ProspectPolicy) -> Self {
        Self { policy }
    }

    pub fn clean_rows(&self, rows: &[RawRow]) -> CleanedBatch {
        let mut batch = CleanedBatch::default();
        for row in rows {
            self.clean_row(row, &mut batch);
        }
        batch
    }

    fn clean_row(&self, row: &RawRow, batch: &mut CleanedBatch) {
        // Header row is sheet row 1, so data row 0 reports as row 2.
        let row_number = row.index as i32 + 2;

        let mut name = None;
        let mut phone = None;
        let mut notes = None;
        let mut course = None;
        let mut hostel_fee = None;
        let mut course_fee = None;
        let mut total_fee = None;
        let mut course_fee_paid = None;
        let mut hostel_fee_paid = None;
        let mut total_fee_paid = None;
        let mut raw_call_response: Option<&str> = None;

        for (header, value) in &row.cells {
            let Some(field) = normalize_header(header) else {
                continue;
            };
            match field {
                CanonicalField::Name => name = non_empty(value),
                CanonicalField::Phone => phone = clean_phone(value),
                CanonicalField::Notes => notes = non_empty(value),
                CanonicalField::Course => course = non_empty(value),
                CanonicalField::HostelFee => hostel_fee = clean_fee(value),
                CanonicalField::CourseFee => course_fee = clean_fee(value),
                CanonicalField::TotalFee => total_fee = clean_fee(value),
                CanonicalField::CourseFeePaid => course_fee_paid = clean_fee(value),
                CanonicalField::HostelFeePaid => hostel_fee_paid = clean_fee(value),
                CanonicalField::TotalFeePaid => total_fee_paid = clean_fee(value),
                CanonicalField::CallResponse => {
                    raw_call_response = match value.trim() {
                        "" => None,
                        v => Some(v),
                    }
                }
            }
        }

        let status = self.policy.apply(infer_status(row));

        let call_response = match raw_call_response {
            Some(raw) => match CALL_RESPONSE_SYNONYMS.get(raw.to_lowercase().as_str()) {
                Some(mapped) => Some(*mapped),
                None => {
                    batch.errors.push(RowError::new(
                        row_number,
                        format!("Invalid call response: \"{}\", defaulted to null.", raw),
                    ));
                    None
                }
            },
            None => None,
        };

        let Some(phone) = phone else {
            batch.errors.push(RowError::new(row_number, "Missing phone"));
            return;
        };

        batch.cleaned.push(CleanedClient {
            row: row_number,
            name,
            phone,
            status,
            call_response,
            notes,
            course,
            hostel_fee,
            course_fee,
            total_fee,
            course_fee_paid,
            hostel_fee_paid,
            total_fee_paid,
        });
    }
}

/// Resolve a row's status from its flag columns, falling back to a STATUS
/// column only when no flag matched.
fn infer_status(row: &RawRow) -> Option<LeadStatus> {
    let upper: HashMap<String, &str> = row
        .cells
        .iter()
        .map(|(k, v)| (k.trim().to_uppercase(), v.as_str()))
        .collect();

    for (column, status) in STATUS_FLAG_COLUMNS {
        if let Some(value) = upper.get(*column) {
            if value.trim().eq_ignore_ascii_case("yes") {
                return Some(*status);
            }
        }
    }

    if let Some(value) = upper.get("STATUS") {
        let token: String = value
            .trim()
            .to_uppercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        return LeadStatus::from_token(&token);
    }

    None
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Keep digits and at most one leading `+`; everything else is formatting.
fn clean_phone(raw: &str) -> Option<String> {
    let mut out = String::new();
    for c in raw.trim().chars() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if c == '+' && out.is_empty() {
            out.push(c);
        }
    }
    if out.is_empty() || out == "+" {
        None
    } else {
        Some(out)
    }
}

/// Best-effort currency parse: empty, unparsable or negative values become
/// `None` without raising a row error.
fn clean_fee(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => None,
    }
}
