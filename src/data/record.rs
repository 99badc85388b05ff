//! Case Record Module
//! Normalized line-list rows and the coercion warnings collected while building them.

use chrono::NaiveDate;
use std::fmt;

/// Placeholder substituted for any missing text value.
pub const NA: &str = "NA";
/// Placeholder substituted for a missing or non-numeric age.
pub const AGE_SENTINEL: f64 = -1.0;

/// One normalized case entry. Text fields never hold an empty value.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    pub patient_id: String,
    /// Position used on the case-emergence chart.
    pub ordinal: u64,
    /// `None` only when the date policy tolerates unparseable dates.
    pub date_announced: Option<NaiveDate>,
    pub detected_state: String,
    pub age: f64,
    pub gender: String,
    pub transmission: String,
    pub current_status: String,
}

impl CaseRecord {
    /// A record with every optional field set to its sentinel.
    pub fn new(patient_id: impl Into<String>, ordinal: u64) -> Self {
        Self {
            patient_id: patient_id.into(),
            ordinal,
            date_announced: None,
            detected_state: NA.to_string(),
            age: AGE_SENTINEL,
            gender: NA.to_string(),
            transmission: NA.to_string(),
            current_status: NA.to_string(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date_announced = Some(date);
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.detected_state = state.to_string();
        self
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = age;
        self
    }

    pub fn with_gender(mut self, gender: &str) -> Self {
        self.gender = gender.to_string();
        self
    }

    pub fn with_transmission(mut self, transmission: &str) -> Self {
        self.transmission = transmission.to_string();
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.current_status = status.to_string();
        self
    }
}

/// Field whose raw value failed coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningField {
    DateAnnounced,
    AgeBracket,
    Gender,
    Transmission,
}

impl fmt::Display for WarningField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WarningField::DateAnnounced => "date announced",
            WarningField::AgeBracket => "age bracket",
            WarningField::Gender => "gender",
            WarningField::Transmission => "type of transmission",
        };
        f.write_str(name)
    }
}

/// Non-fatal coercion failure, absorbed by sentinel substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWarning {
    /// Zero-based data row (header excluded).
    pub row: usize,
    pub field: WarningField,
    pub raw_value: String,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: {} value {:?} replaced by sentinel",
            self.row, self.field, self.raw_value
        )
    }
}

/// The immutable, normalized input of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseTable {
    records: Vec<CaseRecord>,
    warnings: Vec<FieldWarning>,
}

impl CaseTable {
    pub fn new(records: Vec<CaseRecord>, warnings: Vec<FieldWarning>) -> Self {
        Self { records, warnings }
    }

    pub fn from_records(records: Vec<CaseRecord>) -> Self {
        Self::new(records, Vec::new())
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn warnings(&self) -> &[FieldWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
