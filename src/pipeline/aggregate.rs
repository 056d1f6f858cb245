//! Grouping and median aggregation.
//!
//! Filings are grouped by `(county FIPS, job title)` with exact string
//! equality on the title. Each group keeps four append-only wage sequences,
//! one per prevailing wage level; levels are never mixed. Medians are taken
//! over each sequence at finalization, which runs exactly once per run.
//! Median over mean, to resist skew from a handful of anomalous filings.

use crate::domain::{ResolvedCounty, SummaryRecord};
use indexmap::IndexMap;

struct WageGroup {
    county_fips: String,
    county_name: String,
    state: String,
    job_title: String,
    levels: [Vec<f64>; 4],
}

impl WageGroup {
    fn new(county: &ResolvedCounty, state: &str, job_title: &str) -> Self {
        Self {
            county_fips: county.fips.clone(),
            county_name: county.display_name.clone(),
            state: state.to_string(),
            job_title: job_title.to_string(),
            levels: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
        }
    }

    fn push(&mut self, wages: [f64; 4]) {
        for (seq, wage) in self.levels.iter_mut().zip(wages) {
            seq.push(wage);
        }
    }

    fn finalize(self) -> SummaryRecord {
        let source_count = self.levels[0].len();
        let [l1, l2, l3, l4] = self.levels;
        SummaryRecord {
            county_fips: self.county_fips,
            county_name: self.county_name,
            state: self.state,
            job_title: self.job_title,
            level_1: median(&l1).round() as i64,
            level_2: median(&l2).round() as i64,
            level_3: median(&l3).round() as i64,
            level_4: median(&l4).round() as i64,
            source_count,
        }
    }
}

/// Standard statistical median: the middle value for odd-sized input, the
/// mean of the two middle values for even-sized input. Callers guarantee a
/// non-empty slice; groups always hold at least one filing per level.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Accumulates resolved filings into `(county FIPS, job title)` groups.
/// Single-writer and append-only; groups are emitted in creation order.
pub struct WageAggregator {
    groups: IndexMap<(String, String), WageGroup>,
}

impl WageAggregator {
    pub fn new() -> Self {
        Self {
            groups: IndexMap::new(),
        }
    }

    /// Appends one filing's four annualized wages to its group, creating the
    /// group on first sight. State and display name are denormalized from
    /// the first member; all members of a group share the same FIPS.
    pub fn add(&mut self, county: &ResolvedCounty, state: &str, job_title: &str, wages: [f64; 4]) {
        let key = (county.fips.clone(), job_title.to_string());
        self.groups
            .entry(key)
            .or_insert_with(|| WageGroup::new(county, state, job_title))
            .push(wages);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Collapses every group into its summary record, keyed by
    /// `"{county_fips}_{job_title}"`. Key order is group creation order.
    /// The key is best-effort: a title containing the delimiter could
    /// collide with another group, and the later group would win.
    pub fn finalize(self) -> IndexMap<String, SummaryRecord> {
        let mut summaries = IndexMap::with_capacity(self.groups.len());
        for (_, group) in self.groups {
            let record = group.finalize();
            let key = format!("{}_{}", record.county_fips, record.job_title);
            summaries.insert(key, record);
        }
        summaries
    }
}

impl Default for WageAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn county(fips: &str, name: &str) -> ResolvedCounty {
        ResolvedCounty {
            fips: fips.to_string(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn test_median_odd_length() {
        assert_eq!(median(&[80000.0, 90000.0, 100000.0]), 90000.0);
        assert_eq!(median(&[90000.0]), 90000.0);
        // Order of arrival does not matter.
        assert_eq!(median(&[100000.0, 80000.0, 90000.0]), 90000.0);
    }

    #[test]
    fn test_median_even_length() {
        assert_eq!(median(&[80000.0, 90000.0]), 85000.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_groups_key_on_fips_and_title() {
        let mut agg = WageAggregator::new();
        // Same resolved FIPS through differing county spellings: one group.
        agg.add(
            &county("06085", "Santa Clara"),
            "CA",
            "Software Engineer",
            [100000.0, 110000.0, 120000.0, 130000.0],
        );
        agg.add(
            &county("06085", "Santa Clara Cnty"),
            "CA",
            "Software Engineer",
            [120000.0, 130000.0, 140000.0, 150000.0],
        );
        // Different title: separate group.
        agg.add(
            &county("06085", "Santa Clara"),
            "CA",
            "Data Engineer",
            [90000.0, 95000.0, 100000.0, 105000.0],
        );
        assert_eq!(agg.len(), 2);

        let summaries = agg.finalize();
        let rec = &summaries["06085_Software Engineer"];
        assert_eq!(rec.source_count, 2);
        assert_eq!(rec.level_1, 110000);
        assert_eq!(rec.level_2, 120000);
        assert_eq!(rec.level_3, 130000);
        assert_eq!(rec.level_4, 140000);
    }

    #[test]
    fn test_levels_are_never_mixed() {
        let mut agg = WageAggregator::new();
        agg.add(
            &county("53033", "King"),
            "WA",
            "Analyst",
            [10.0, 100.0, 1000.0, 10000.0],
        );
        agg.add(
            &county("53033", "King"),
            "WA",
            "Analyst",
            [20.0, 200.0, 2000.0, 20000.0],
        );
        agg.add(
            &county("53033", "King"),
            "WA",
            "Analyst",
            [30.0, 300.0, 3000.0, 30000.0],
        );

        let summaries = agg.finalize();
        let rec = &summaries["53033_Analyst"];
        assert_eq!(rec.level_1, 20);
        assert_eq!(rec.level_2, 200);
        assert_eq!(rec.level_3, 2000);
        assert_eq!(rec.level_4, 20000);
        assert_eq!(rec.source_count, 3);
    }

    #[test]
    fn test_denormalized_fields_come_from_first_member() {
        let mut agg = WageAggregator::new();
        agg.add(
            &county("06085", "Santa Clara"),
            "CA",
            "Engineer",
            [1.0, 2.0, 3.0, 4.0],
        );
        agg.add(
            &county("06085", "SANTA CLARA"),
            "CA",
            "Engineer",
            [1.0, 2.0, 3.0, 4.0],
        );

        let summaries = agg.finalize();
        assert_eq!(summaries["06085_Engineer"].county_name, "Santa Clara");
        assert_eq!(summaries["06085_Engineer"].state, "CA");
    }

    #[test]
    fn test_finalize_preserves_creation_order() {
        let mut agg = WageAggregator::new();
        agg.add(&county("53033", "King"), "WA", "B", [1.0, 1.0, 1.0, 1.0]);
        agg.add(&county("06085", "Santa Clara"), "CA", "A", [1.0, 1.0, 1.0, 1.0]);
        agg.add(&county("53033", "King"), "WA", "B", [2.0, 2.0, 2.0, 2.0]);

        let finalized = agg.finalize();
        let keys: Vec<&String> = finalized.keys().collect();
        assert_eq!(keys, ["53033_B", "06085_A"]);
    }

    #[test]
    fn test_medians_round_to_nearest_integer() {
        let mut agg = WageAggregator::new();
        // Hourly-style fractions that land between integers once averaged.
        agg.add(&county("53033", "King"), "WA", "Tech", [100000.0, 1.0, 1.0, 1.0]);
        agg.add(&county("53033", "King"), "WA", "Tech", [100001.0, 2.0, 2.0, 2.0]);

        let summaries = agg.finalize();
        // (100000 + 100001) / 2 = 100000.5 rounds up.
        assert_eq!(summaries["53033_Tech"].level_1, 100001);
    }
}
