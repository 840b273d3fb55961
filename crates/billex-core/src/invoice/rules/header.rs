//! Header field extraction (bill number, bill date, patient name).

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Header fields a bill may print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    BillNo,
    BillDate,
    PatientName,
}

/// One pattern per field, tried case-insensitively. The first capture group
/// is the value.
pub const HEADER_FIELDS: &[(HeaderField, &str)] = &[
    (HeaderField::BillNo, r"Bill\s*No\.?\s*[:\-]\s*([A-Za-z0-9/\\\-]+)"),
    (
        HeaderField::BillDate,
        r"Bill\s*Date\s*[:\-]\s*([0-9]{1,2}[-/][A-Za-z]{3}[-/][0-9]{2,4}|[0-9]{2}[-/][0-9]{2}[-/][0-9]{4})",
    ),
    (HeaderField::PatientName, r"Name\s*of\s*Patient\s*[:\-]\s*(.+)"),
];

lazy_static! {
    static ref HEADER_PATTERNS: Vec<(HeaderField, Regex)> = HEADER_FIELDS
        .iter()
        .map(|(field, pattern)| (*field, Regex::new(&format!("(?i){pattern}")).unwrap()))
        .collect();
}

/// Extracted header values. Fields that were not found stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFields {
    pub bill_no: Option<String>,
    pub bill_date: Option<String>,
    pub patient_name: Option<String>,
}

impl HeaderFields {
    fn set(&mut self, field: HeaderField, value: String) {
        let slot = match field {
            HeaderField::BillNo => &mut self.bill_no,
            HeaderField::BillDate => &mut self.bill_date,
            HeaderField::PatientName => &mut self.patient_name,
        };
        *slot = Some(value);
    }
}

/// Extract header fields; the first match of each pattern wins.
pub fn extract_header_fields(text: &str) -> HeaderFields {
    let mut fields = HeaderFields::default();

    for (field, pattern) in HEADER_PATTERNS.iter() {
        if let Some(value) = pattern.captures(text).and_then(|c| c.get(1)) {
            let value = value.as_str().trim();
            if !value.is_empty() {
                fields.set(*field, value.to_string());
            }
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bill_no_and_date() {
        let text = "CITY HOSPITAL\nBill No: 12345\nBill Date: 12-Jan-24\n";
        let fields = extract_header_fields(text);

        assert_eq!(
            fields,
            HeaderFields {
                bill_no: Some("12345".to_string()),
                bill_date: Some("12-Jan-24".to_string()),
                patient_name: None,
            }
        );
    }

    #[test]
    fn test_numeric_date_and_patient() {
        let text = "bill no. - IP/2024/778\nBILL DATE : 03/02/2024\nName of Patient: Asha Rao  \nAge: 41";
        let fields = extract_header_fields(text);

        assert_eq!(fields.bill_no.as_deref(), Some("IP/2024/778"));
        assert_eq!(fields.bill_date.as_deref(), Some("03/02/2024"));
        assert_eq!(fields.patient_name.as_deref(), Some("Asha Rao"));
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Bill No: A1\nBill No: B2";
        assert_eq!(extract_header_fields(text).bill_no.as_deref(), Some("A1"));
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let fields = extract_header_fields("Discharge summary\nBill Date: tomorrow");
        assert_eq!(fields, HeaderFields::default());
    }

    #[test]
    fn test_table_is_ordered_and_complete() {
        let fields: Vec<HeaderField> = HEADER_FIELDS.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            vec![HeaderField::BillNo, HeaderField::BillDate, HeaderField::PatientName]
        );
    }
}
