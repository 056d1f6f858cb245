use serde::{Deserialize, Serialize};

/// One filing pulled out of a raw disclosure row. Wage figures stay raw
/// strings here; annualization happens later so absence is still visible.
#[derive(Debug, Clone)]
pub struct ExtractedRecord {
    pub state: String,
    pub county_raw: String,
    /// County FIPS as given by the row, empty when the column is absent.
    pub fips_raw: String,
    pub job_title: String,
    pub pay_unit: String,
    /// Raw prevailing wage figures for levels 1 through 4, empty when absent.
    pub wage_raw: [String; 4],
}

/// Canonical county identity. `fips` is the identity; `display_name` is
/// cosmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCounty {
    pub fips: String,
    pub display_name: String,
}

/// Final per-(county, job title) output record. Wage levels are rounded
/// annual medians across all contributing filings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub county_fips: String,
    pub county_name: String,
    pub state: String,
    pub job_title: String,
    pub level_1: i64,
    pub level_2: i64,
    pub level_3: i64,
    pub level_4: i64,
    pub source_count: usize,
}

/// Audit entry for a filing whose worksite county could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedEntry {
    pub state: String,
    pub county: String,
    pub job_title: String,
}

/// Result of a complete processing run
#[derive(Debug, Serialize)]
pub struct ProcessResult {
    pub total_rows: usize,
    pub aggregated_rows: usize,
    pub skipped_rows: usize,
    pub summary_records: usize,
    pub unmatched_entries: usize,
    pub output_file: String,
}
