/// Default locations and fetch settings, overridable via config.toml and CLI flags.

// DOL listing page that links the quarterly disclosure files
pub const PERFORMANCE_URL: &str = "https://www.dol.gov/agencies/eta/foreign-labor/performance";

// How many of the most recent disclosure files to consolidate
pub const DEFAULT_FILE_LIMIT: usize = 4;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

// Default on-disk layout
pub const DEFAULT_RAW_OUTPUT: &str = "data/raw/oflc_lca_latest.csv";
pub const DEFAULT_COUNTY_MAP: &str = "data/reference/county_fips.csv";
pub const DEFAULT_SUMMARY_OUTPUT: &str = "data/out/county_wages.json";
pub const DEFAULT_SAMPLE_OUTPUT: &str = "data/out/county_wages_sample.json";
pub const DEFAULT_UNMATCHED_LOG: &str = "data/out/unmatched_counties.csv";

// Entries included in the truncated sample output
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;
