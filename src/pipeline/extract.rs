//! Field extraction from raw disclosure rows.
//!
//! DOL has renamed columns across filing years, so every logical field is
//! looked up through an ordered list of known column names; the first one
//! present with a non-empty value wins. Missing optional fields simply stay
//! empty and disqualify the row later, during annualization.

use crate::domain::ExtractedRecord;
use crate::pipeline::county::normalize_county;
use std::collections::HashMap;

const STATE_COLUMNS: &[&str] = &["WORKSITE_STATE", "STATE"];
const COUNTY_COLUMNS: &[&str] = &["WORKSITE_COUNTY", "COUNTY"];
const FIPS_COLUMNS: &[&str] = &["WORKSITE_COUNTY_FIPS", "COUNTY_FIPS"];
const JOB_TITLE_COLUMNS: &[&str] = &["JOB_TITLE", "SOC_TITLE", "OCCUPATION_TITLE"];
const PAY_UNIT_COLUMNS: &[&str] = &["PW_UNIT_OF_PAY", "WAGE_UNIT_OF_PAY"];
const WAGE_LEVEL_COLUMNS: [[&str; 2]; 4] = [
    ["PW_WAGE_LEVEL_1", "PW_LEVEL_1"],
    ["PW_WAGE_LEVEL_2", "PW_LEVEL_2"],
    ["PW_WAGE_LEVEL_3", "PW_LEVEL_3"],
    ["PW_WAGE_LEVEL_4", "PW_LEVEL_4"],
];

/// Resolves logical fields against one input vintage's header row.
pub struct RecordExtractor {
    columns: HashMap<String, usize>,
}

impl RecordExtractor {
    pub fn new(headers: &csv::StringRecord) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_string(), idx))
            .collect();
        Self { columns }
    }

    /// First candidate column present in the header with a non-empty value.
    fn field<'r>(&self, row: &'r csv::StringRecord, candidates: &[&str]) -> &'r str {
        for name in candidates {
            if let Some(&idx) = self.columns.get(*name) {
                if let Some(value) = row.get(idx) {
                    if !value.is_empty() {
                        return value;
                    }
                }
            }
        }
        ""
    }

    /// Pulls the needed fields out of a raw row. Returns `None` when the row
    /// is unusable: state, county, or job title missing, or a county name
    /// that normalizes to nothing.
    pub fn extract(&self, row: &csv::StringRecord) -> Option<ExtractedRecord> {
        let state = self.field(row, STATE_COLUMNS).trim().to_uppercase();
        let county_raw = self.field(row, COUNTY_COLUMNS).to_string();
        let job_title = self.field(row, JOB_TITLE_COLUMNS).trim().to_string();

        if state.is_empty() || job_title.is_empty() || normalize_county(&county_raw).is_empty() {
            return None;
        }

        let fips_raw = self.field(row, FIPS_COLUMNS).trim().to_string();
        let pay_unit = self.field(row, PAY_UNIT_COLUMNS).to_string();
        let wage_raw =
            WAGE_LEVEL_COLUMNS.map(|candidates| self.field(row, &candidates).to_string());

        Some(ExtractedRecord {
            state,
            county_raw,
            fips_raw,
            job_title,
            pay_unit,
            wage_raw,
        })
    }
}
