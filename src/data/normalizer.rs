//! Record Normalizer Module
//! Turns the raw text table into typed case records: sentinel substitution,
//! date parsing and category canonicalisation.

use crate::config::{ColumnSchema, DatePolicy, DEFAULT_DATE_FORMAT};
use crate::data::loader::LoadError;
use crate::data::record::{CaseRecord, CaseTable, FieldWarning, WarningField, AGE_SENTINEL, NA};
use chrono::NaiveDate;
use polars::prelude::*;

pub const IMPORTED: &str = "Imported";
pub const LOCAL: &str = "Local";
pub const TO_BE_DETERMINED: &str = "ToBeDetermined";
pub const FEMALE: &str = "F";
pub const MALE: &str = "M";

/// Raw text of one row, as read from the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawRow<'a> {
    pub patient_id: Option<&'a str>,
    pub date_announced: Option<&'a str>,
    pub detected_state: Option<&'a str>,
    pub age_bracket: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub transmission: Option<&'a str>,
    pub current_status: Option<&'a str>,
}

/// Applies the load-time normalization rules.
#[derive(Debug, Clone)]
pub struct Normalizer {
    date_format: String,
    date_policy: DatePolicy,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT, DatePolicy::Strict)
    }
}

impl Normalizer {
    pub fn new(date_format: &str, date_policy: DatePolicy) -> Self {
        Self {
            date_format: date_format.to_string(),
            date_policy,
        }
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Normalize every row of a text frame into a [`CaseTable`].
    ///
    /// Missing cells are filled with the `NA` sentinel before any row is read.
    pub fn normalize_frame(
        &self,
        df: &DataFrame,
        schema: &ColumnSchema,
    ) -> Result<CaseTable, LoadError> {
        let names = schema.names();
        let filled = df
            .clone()
            .lazy()
            .select(
                names
                    .iter()
                    .map(|name| col(*name).cast(DataType::String).fill_null(lit(NA)))
                    .collect::<Vec<_>>(),
            )
            .collect()?;

        let text = |name: &str| -> Result<StringChunked, LoadError> {
            Ok(filled.column(name)?.str()?.clone())
        };
        let patient_id = text(&schema.patient_id)?;
        let date_announced = text(&schema.date_announced)?;
        let detected_state = text(&schema.detected_state)?;
        let age_bracket = text(&schema.age_bracket)?;
        let gender = text(&schema.gender)?;
        let transmission = text(&schema.transmission)?;
        let current_status = text(&schema.current_status)?;

        let mut records = Vec::with_capacity(filled.height());
        let mut warnings = Vec::new();

        for i in 0..filled.height() {
            let raw = RawRow {
                patient_id: patient_id.get(i),
                date_announced: date_announced.get(i),
                detected_state: detected_state.get(i),
                age_bracket: age_bracket.get(i),
                gender: gender.get(i),
                transmission: transmission.get(i),
                current_status: current_status.get(i),
            };
            records.push(self.normalize_row(i, raw, &mut warnings)?);
        }

        if !warnings.is_empty() {
            tracing::warn!(
                "{} field value(s) failed coercion and were replaced by sentinels",
                warnings.len()
            );
            for w in &warnings {
                tracing::debug!("{}", w);
            }
        }

        Ok(CaseTable::new(records, warnings))
    }

    /// Normalize one row. Coercion failures are pushed onto `warnings`.
    pub fn normalize_row(
        &self,
        row: usize,
        raw: RawRow<'_>,
        warnings: &mut Vec<FieldWarning>,
    ) -> Result<CaseRecord, LoadError> {
        let patient_id = present(raw.patient_id).ok_or(LoadError::MissingPatientId { row })?;
        let ordinal = patient_ordinal(patient_id).unwrap_or(row as u64 + 1);

        let date_announced = match self.parse_date(raw.date_announced) {
            Some(date) => Some(date),
            None => {
                let value = raw.date_announced.unwrap_or(NA).trim().to_string();
                match self.date_policy {
                    DatePolicy::Strict => return Err(LoadError::InvalidDate { row, value }),
                    DatePolicy::Skip => {
                        warnings.push(FieldWarning {
                            row,
                            field: WarningField::DateAnnounced,
                            raw_value: value,
                        });
                        None
                    }
                }
            }
        };

        let age = match present(raw.age_bracket) {
            None => AGE_SENTINEL,
            Some(value) => coerce_age(value).unwrap_or_else(|| {
                warnings.push(FieldWarning {
                    row,
                    field: WarningField::AgeBracket,
                    raw_value: value.to_string(),
                });
                AGE_SENTINEL
            }),
        };

        let gender = canonical_or_warn(
            raw.gender,
            canonical_gender,
            row,
            WarningField::Gender,
            warnings,
        );
        let transmission = canonical_or_warn(
            raw.transmission,
            canonical_transmission,
            row,
            WarningField::Transmission,
            warnings,
        );

        Ok(CaseRecord {
            patient_id: patient_id.to_string(),
            ordinal,
            date_announced,
            detected_state: text_or_na(raw.detected_state),
            age,
            gender,
            transmission,
            current_status: text_or_na(raw.current_status),
        })
    }

    fn parse_date(&self, raw: Option<&str>) -> Option<NaiveDate> {
        let value = present(raw)?;
        NaiveDate::parse_from_str(value, &self.date_format).ok()
    }
}

/// Trimmed value, or `None` when missing, blank or already the sentinel.
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty() && *v != NA)
}

fn text_or_na(raw: Option<&str>) -> String {
    present(raw).unwrap_or(NA).to_string()
}

/// Numeric patient id, tolerating float-formatted integers such as `12.0`.
fn patient_ordinal(patient_id: &str) -> Option<u64> {
    patient_id.parse::<u64>().ok().or_else(|| {
        patient_id
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
            .map(|v| v as u64)
    })
}

/// Finite numeric age, or `None` when the value does not coerce.
pub fn coerce_age(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn canonical_gender(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().as_str() {
        "f" | "female" => Some(FEMALE),
        "m" | "male" => Some(MALE),
        _ => None,
    }
}

pub fn canonical_transmission(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().as_str() {
        "imported" => Some(IMPORTED),
        "local" => Some(LOCAL),
        "tbd" | "tobedetermined" | "to be determined" => Some(TO_BE_DETERMINED),
        "unknown" => Some(NA),
        _ => None,
    }
}

fn canonical_or_warn(
    raw: Option<&str>,
    canonical: fn(&str) -> Option<&'static str>,
    row: usize,
    field: WarningField,
    warnings: &mut Vec<FieldWarning>,
) -> String {
    let Some(value) = present(raw) else {
        return NA.to_string();
    };
    match canonical(value) {
        Some(c) => c.to_string(),
        None => {
            warnings.push(FieldWarning {
                row,
                field,
                raw_value: value.to_string(),
            });
            NA.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row<'a>(id: &'a str, date: &'a str) -> RawRow<'a> {
        RawRow {
            patient_id: Some(id),
            date_announced: Some(date),
            ..RawRow::default()
        }
    }

    #[test]
    fn missing_fields_become_sentinels() {
        let mut warnings = Vec::new();
        let rec = Normalizer::default()
            .normalize_row(0, row("1", "30/01/2020"), &mut warnings)
            .unwrap();

        assert_eq!(rec.detected_state, NA);
        assert_eq!(rec.gender, NA);
        assert_eq!(rec.transmission, NA);
        assert_eq!(rec.current_status, NA);
        assert_eq!(rec.age, AGE_SENTINEL);
        assert_eq!(rec.date_announced, NaiveDate::from_ymd_opt(2020, 1, 30));
        assert!(warnings.is_empty());
    }

    #[test]
    fn blank_text_counts_as_missing() {
        let mut warnings = Vec::new();
        let raw = RawRow {
            detected_state: Some("   "),
            current_status: Some(" Recovered "),
            ..row("7", "02/03/2020")
        };
        let rec = Normalizer::default()
            .normalize_row(0, raw, &mut warnings)
            .unwrap();
        assert_eq!(rec.detected_state, NA);
        assert_eq!(rec.current_status, "Recovered");
    }

    #[test]
    fn non_numeric_age_is_sentinel_with_warning() {
        let mut warnings = Vec::new();
        let raw = RawRow {
            age_bracket: Some("28-35"),
            ..row("3", "01/02/2020")
        };
        let rec = Normalizer::default()
            .normalize_row(4, raw, &mut warnings)
            .unwrap();
        assert_eq!(rec.age, AGE_SENTINEL);
        assert_eq!(
            warnings,
            vec![FieldWarning {
                row: 4,
                field: WarningField::AgeBracket,
                raw_value: "28-35".to_string(),
            }]
        );
    }

    #[test]
    fn fractional_age_is_kept() {
        let mut warnings = Vec::new();
        let raw = RawRow {
            age_bracket: Some("0.5"),
            ..row("3", "01/02/2020")
        };
        let rec = Normalizer::default()
            .normalize_row(0, raw, &mut warnings)
            .unwrap();
        assert_eq!(rec.age, 0.5);
    }

    #[test]
    fn strict_policy_rejects_bad_date() {
        let mut warnings = Vec::new();
        let err = Normalizer::default()
            .normalize_row(2, row("1", "2020-01-30"), &mut warnings)
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidDate { row: 2, .. }));
    }

    #[test]
    fn skip_policy_keeps_record_without_date() {
        let mut warnings = Vec::new();
        let rec = Normalizer::new(DEFAULT_DATE_FORMAT, DatePolicy::Skip)
            .normalize_row(2, row("1", "soon"), &mut warnings)
            .unwrap();
        assert_eq!(rec.date_announced, None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, WarningField::DateAnnounced);
    }

    #[test]
    fn missing_patient_id_is_fatal() {
        let mut warnings = Vec::new();
        let raw = RawRow {
            patient_id: Some(" "),
            ..row("", "30/01/2020")
        };
        let err = Normalizer::default()
            .normalize_row(9, raw, &mut warnings)
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingPatientId { row: 9 }));
    }

    #[test]
    fn ordinal_falls_back_to_row_position() {
        let mut warnings = Vec::new();
        let n = Normalizer::default();
        let numeric = n.normalize_row(0, row("42", "30/01/2020"), &mut warnings).unwrap();
        let float = n.normalize_row(1, row("43.0", "30/01/2020"), &mut warnings).unwrap();
        let named = n.normalize_row(5, row("P-9", "30/01/2020"), &mut warnings).unwrap();
        assert_eq!(numeric.ordinal, 42);
        assert_eq!(float.ordinal, 43);
        assert_eq!(named.ordinal, 6);
    }

    #[test]
    fn categories_are_canonicalised() {
        assert_eq!(canonical_transmission("imported"), Some(IMPORTED));
        assert_eq!(canonical_transmission("TBD"), Some(TO_BE_DETERMINED));
        assert_eq!(canonical_transmission("Unknown"), Some(NA));
        assert_eq!(canonical_transmission("airborne"), None);
        assert_eq!(canonical_gender("Female"), Some(FEMALE));
        assert_eq!(canonical_gender("m"), Some(MALE));
        assert_eq!(canonical_gender("x"), None);
    }

    #[test]
    fn unrecognised_category_maps_to_na_with_warning() {
        let mut warnings = Vec::new();
        let raw = RawRow {
            transmission: Some("airborne"),
            gender: Some("F"),
            ..row("1", "30/01/2020")
        };
        let rec = Normalizer::default()
            .normalize_row(0, raw, &mut warnings)
            .unwrap();
        assert_eq!(rec.transmission, NA);
        assert_eq!(rec.gender, FEMALE);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, WarningField::Transmission);
    }

    #[test]
    fn frame_nulls_are_filled_before_reading() {
        let schema = ColumnSchema::default();
        let df = DataFrame::new(vec![
            Column::new(schema.patient_id.as_str().into(), ["1", "2"]),
            Column::new(schema.date_announced.as_str().into(), ["30/01/2020", "02/02/2020"]),
            Column::new(schema.detected_state.as_str().into(), [Some("Kerala"), None]),
            Column::new(schema.age_bracket.as_str().into(), [Some("20"), None]),
            Column::new(schema.gender.as_str().into(), [None, Some("M")]),
            Column::new(schema.transmission.as_str().into(), [Some("Imported"), None]),
            Column::new(schema.current_status.as_str().into(), ["Recovered", "Hospitalized"]),
        ])
        .unwrap();

        let table = Normalizer::default().normalize_frame(&df, &schema).unwrap();
        let recs = table.records();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].detected_state, "Kerala");
        assert_eq!(recs[1].detected_state, NA);
        assert_eq!(recs[0].gender, NA);
        assert_eq!(recs[1].transmission, NA);
        assert_eq!(recs[0].age, 20.0);
        assert_eq!(recs[1].age, AGE_SENTINEL);
        assert!(table.warnings().is_empty());
    }
}
