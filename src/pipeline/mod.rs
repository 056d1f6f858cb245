//! Single-pass processing pipeline: extract fields from each disclosure row,
//! resolve the worksite county, annualize the four wage levels, and either
//! feed the aggregator or the unmatched log. One ordered stream in, one
//! summary map out; there is no partial output and no retry.

pub mod aggregate;
pub mod county;
pub mod extract;
pub mod units;
pub mod unmatched;

use crate::domain::{ExtractedRecord, ProcessResult, SummaryRecord, UnmatchedEntry};
use crate::error::{Result, WageError};
use crate::output;
use self::aggregate::WageAggregator;
use self::county::CountyTable;
use self::extract::RecordExtractor;
use self::unmatched::UnmatchedTracker;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Everything a processing run needs to know: where the snapshot and the
/// county reference table live, and where the outputs go.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub input: PathBuf,
    pub county_map: PathBuf,
    pub output: PathBuf,
    pub sample_output: Option<PathBuf>,
    pub sample_size: usize,
    pub unmatched_log: PathBuf,
}

/// Why a row did not reach the aggregator. Only `CountyUnresolved` leaves an
/// audit record; the other reasons drop silently.
enum RowOutcome {
    Aggregated,
    NotUsable,
    CountyUnresolved,
    WageUnconvertible,
}

/// Accumulates one run's worth of state: the immutable county table, the
/// growing aggregation groups, and the unmatched log.
pub struct Processor {
    table: CountyTable,
    aggregator: WageAggregator,
    unmatched: UnmatchedTracker,
    rows_seen: usize,
    rows_aggregated: usize,
}

/// Outcome of consuming the full input stream, before serialization.
pub struct RunOutcome {
    pub summaries: IndexMap<String, SummaryRecord>,
    pub unmatched: Vec<UnmatchedEntry>,
    pub rows_seen: usize,
    pub rows_aggregated: usize,
}

impl Processor {
    pub fn new(table: CountyTable) -> Self {
        Self {
            table,
            aggregator: WageAggregator::new(),
            unmatched: UnmatchedTracker::new(),
            rows_seen: 0,
            rows_aggregated: 0,
        }
    }

    /// Feeds one extracted record through resolution and annualization.
    fn consume(&mut self, record: &ExtractedRecord) -> RowOutcome {
        let Some(resolved) = county::resolve(
            &self.table,
            &record.state,
            &record.county_raw,
            &record.fips_raw,
        ) else {
            self.unmatched
                .record(&record.state, &record.county_raw, &record.job_title);
            return RowOutcome::CountyUnresolved;
        };

        let mut wages = [0.0_f64; 4];
        for (slot, raw) in wages.iter_mut().zip(&record.wage_raw) {
            match units::annualize(units::parse_wage(raw), &record.pay_unit) {
                Some(annual) => *slot = annual,
                // Any level failing disqualifies the whole filing.
                None => return RowOutcome::WageUnconvertible,
            }
        }

        self.aggregator
            .add(&resolved, &record.state, &record.job_title, wages);
        RowOutcome::Aggregated
    }

    /// Consumes every row of a disclosure snapshot in order.
    pub fn consume_reader<R: std::io::Read>(&mut self, reader: &mut csv::Reader<R>) -> Result<()> {
        let headers = reader.headers()?.clone();
        let extractor = RecordExtractor::new(&headers);

        for row in reader.records() {
            let row = row?;
            self.rows_seen += 1;

            let outcome = match extractor.extract(&row) {
                Some(record) => self.consume(&record),
                None => RowOutcome::NotUsable,
            };
            match outcome {
                RowOutcome::Aggregated => self.rows_aggregated += 1,
                RowOutcome::NotUsable => debug!("Row {} unusable, skipped", self.rows_seen),
                RowOutcome::CountyUnresolved => {
                    debug!("Row {} county unresolved, logged", self.rows_seen)
                }
                RowOutcome::WageUnconvertible => {
                    debug!("Row {} wage unconvertible, skipped", self.rows_seen)
                }
            }
        }
        Ok(())
    }

    /// Ends the run: collapses every group into its summary record.
    pub fn finalize(self) -> RunOutcome {
        RunOutcome {
            summaries: self.aggregator.finalize(),
            unmatched: self.unmatched.entries().to_vec(),
            rows_seen: self.rows_seen,
            rows_aggregated: self.rows_aggregated,
        }
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Runs the complete batch: load reference table, stream the snapshot,
    /// aggregate, and write all outputs. Fails fast, before any output is
    /// written, when an input cannot be opened.
    #[instrument(skip(options), fields(input = %options.input.display()))]
    pub fn run(options: &ProcessOptions) -> Result<ProcessResult> {
        info!("🚀 Starting wage aggregation run");
        println!("🚀 Processing {}", options.input.display());

        let table = CountyTable::load(&options.county_map)?;
        let mut reader = open_input(&options.input)?;

        let mut processor = Processor::new(table);
        processor.consume_reader(&mut reader)?;
        let outcome = processor.finalize();

        info!(
            "✅ Aggregated {} of {} rows into {} groups ({} unmatched)",
            outcome.rows_aggregated,
            outcome.rows_seen,
            outcome.summaries.len(),
            outcome.unmatched.len()
        );

        output::write_summaries(&options.output, &outcome.summaries)?;
        if let Some(sample_path) = &options.sample_output {
            output::write_sample(sample_path, &outcome.summaries, options.sample_size)?;
        }
        output::write_unmatched(&options.unmatched_log, &outcome.unmatched)?;

        println!(
            "Processed {} county+job records; unmatched counties: {}",
            outcome.summaries.len(),
            outcome.unmatched.len()
        );

        Ok(ProcessResult {
            total_rows: outcome.rows_seen,
            aggregated_rows: outcome.rows_aggregated,
            skipped_rows: outcome.rows_seen - outcome.rows_aggregated,
            summary_records: outcome.summaries.len(),
            unmatched_entries: outcome.unmatched.len(),
            output_file: options.output.to_string_lossy().to_string(),
        })
    }
}

fn open_input(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path).map_err(|e| {
        WageError::Input(format!(
            "Failed to open input snapshot '{}': {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_table() -> CountyTable {
        CountyTable::from_entries(vec![
            ("CA", "santa clara", "06085", "Santa Clara"),
            ("WA", "king", "53033", "King"),
        ])
    }

    fn csv_reader(body: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(body.as_bytes())
    }

    const HEADER: &str = "WORKSITE_STATE,WORKSITE_COUNTY,WORKSITE_COUNTY_FIPS,JOB_TITLE,PW_UNIT_OF_PAY,PW_WAGE_LEVEL_1,PW_WAGE_LEVEL_2,PW_WAGE_LEVEL_3,PW_WAGE_LEVEL_4";

    #[test]
    fn test_missing_wage_level_drops_row_silently() {
        let body = format!(
            "{HEADER}\nCA,Santa Clara County,,Engineer,Year,100000,110000,,130000\n"
        );
        let mut processor = Processor::new(test_table());
        processor.consume_reader(&mut csv_reader(&body)).unwrap();
        let outcome = processor.finalize();

        assert!(outcome.summaries.is_empty());
        assert!(outcome.unmatched.is_empty());
        assert_eq!(outcome.rows_seen, 1);
        assert_eq!(outcome.rows_aggregated, 0);
    }

    #[test]
    fn test_unknown_unit_drops_row_silently() {
        let body = format!(
            "{HEADER}\nCA,Santa Clara County,,Engineer,Fortnight,100000,110000,120000,130000\n"
        );
        let mut processor = Processor::new(test_table());
        processor.consume_reader(&mut csv_reader(&body)).unwrap();
        let outcome = processor.finalize();

        assert!(outcome.summaries.is_empty());
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_unresolved_county_logs_exactly_one_entry() {
        let body = format!(
            "{HEADER}\nOR,Multnomah County,,Engineer,Year,100000,110000,120000,130000\n"
        );
        let mut processor = Processor::new(test_table());
        processor.consume_reader(&mut csv_reader(&body)).unwrap();
        let outcome = processor.finalize();

        assert!(outcome.summaries.is_empty());
        assert_eq!(outcome.unmatched.len(), 1);
        assert_eq!(outcome.unmatched[0].state, "OR");
        assert_eq!(outcome.unmatched[0].county, "Multnomah County");
        assert_eq!(outcome.unmatched[0].job_title, "Engineer");
    }

    #[test]
    fn test_unresolved_county_with_bad_wages_still_logs() {
        // County resolution runs before annualization, so the audit entry
        // is written even though the wages would also have disqualified it.
        let body = format!("{HEADER}\nOR,Multnomah County,,Engineer,Year,,,,\n");
        let mut processor = Processor::new(test_table());
        processor.consume_reader(&mut csv_reader(&body)).unwrap();
        let outcome = processor.finalize();

        assert_eq!(outcome.unmatched.len(), 1);
    }

    #[test]
    fn test_two_filings_one_group() {
        let body = format!(
            "{HEADER}\n\
             CA,Santa Clara County,,Software Engineer,Year,100000,110000,120000,130000\n\
             CA,santa clara,,Software Engineer,Year,120000,130000,140000,150000\n"
        );
        let mut processor = Processor::new(test_table());
        processor.consume_reader(&mut csv_reader(&body)).unwrap();
        let outcome = processor.finalize();

        assert_eq!(outcome.summaries.len(), 1);
        let rec = &outcome.summaries["06085_Software Engineer"];
        assert_eq!(rec.county_fips, "06085");
        assert_eq!(rec.county_name, "Santa Clara");
        assert_eq!(rec.state, "CA");
        assert_eq!(rec.level_1, 110000);
        assert_eq!(rec.level_2, 120000);
        assert_eq!(rec.level_3, 130000);
        assert_eq!(rec.level_4, 140000);
        assert_eq!(rec.source_count, 2);
    }

    #[test]
    fn test_hourly_rows_annualize_before_grouping() {
        let body = format!(
            "{HEADER}\n\
             WA,King County,,Analyst,Hour,50,55,60,65\n\
             WA,King County,,Analyst,Year,104000,114400,124800,135200\n"
        );
        let mut processor = Processor::new(test_table());
        processor.consume_reader(&mut csv_reader(&body)).unwrap();
        let outcome = processor.finalize();

        let rec = &outcome.summaries["53033_Analyst"];
        assert_eq!(rec.source_count, 2);
        // 50/hr == 104000/yr, so both levels agree after annualization.
        assert_eq!(rec.level_1, 104000);
        assert_eq!(rec.level_4, 135200);
    }
}
