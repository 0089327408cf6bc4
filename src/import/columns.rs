//! Column header normalization.
//!
//! Spreadsheets arrive from many hands: "Phone Number", "phone number" and
//! "PHONENUMBER" all mean the same column. Headers are trimmed, lower-cased
//! and looked up in a static synonym table; anything unmapped is dropped
//! without complaint — human-authored sheets carry plenty of columns we do
//! not care about.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical client fields a spreadsheet column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    Phone,
    Notes,
    Course,
    HostelFee,
    CourseFee,
    TotalFee,
    CourseFeePaid,
    HostelFeePaid,
    TotalFeePaid,
    CallResponse,
}

static COLUMN_SYNONYMS: Lazy<HashMap<&'static str, CanonicalField>> = Lazy::new(|| {
    use CanonicalField::*;
    HashMap::from([
        ("name", Name),
        ("full name", Name),
        ("fullname", Name),
        ("phone", Phone),
        ("phone number", Phone),
        ("phonenumber", Phone),
        ("contact number", Phone),
        ("number", Phone),
        ("notes", Notes),
        ("remark", Notes),
        ("comment", Notes),
        ("course", Course),
        ("hostel fee", HostelFee),
        ("course fee", CourseFee),
        ("total fee", TotalFee),
        ("course fee paid", CourseFeePaid),
        ("hostel fee paid", HostelFeePaid),
        ("total fee paid", TotalFeePaid),
        ("call response", CallResponse),
        ("callstatus", CallResponse),
    ])
});

/// Map a raw header onto its canonical field, or `None` for unknown columns.
pub fn normalize_header(raw: &str) -> Option<CanonicalField> {
    COLUMN_SYNONYMS
        .get(raw.trim().to_lowercase().as_str())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_map_to_same_field() {
        for header in ["Full Name", "full name", "FULL NAME", "  fullname  ", "Name"] {
            assert_eq!(
                normalize_header(header),
                Some(CanonicalField::Name),
                "header {:?} should map to Name",
                header
            );
        }
    }

    #[test]
    fn test_phone_synonyms() {
        for header in ["Phone", "Phone Number", "PHONENUMBER", "Contact Number", "number"] {
            assert_eq!(normalize_header(header), Some(CanonicalField::Phone));
        }
    }

    #[test]
    fn test_fee_synonyms() {
        assert_eq!(normalize_header("Course Fee Paid"), Some(CanonicalField::CourseFeePaid));
        assert_eq!(normalize_header("hostel fee"), Some(CanonicalField::HostelFee));
        assert_eq!(normalize_header("Total Fee"), Some(CanonicalField::TotalFee));
    }

    #[test]
    fn test_call_response_synonyms() {
        assert_eq!(normalize_header("Call Response"), Some(CanonicalField::CallResponse));
        assert_eq!(normalize_header("CallStatus"), Some(CanonicalField::CallResponse));
    }

    #[test]
    fn test_unknown_headers_dropped() {
        assert_eq!(normalize_header("Address"), None);
        assert_eq!(normalize_header(""), None);
        // Status flag columns are handled by the cleaner, not the column map
        assert_eq!(normalize_header("STATUS"), None);
        assert_eq!(normalize_header("HOT"), None);
    }
}
