//! Discovery and download of OFLC disclosure files.
//!
//! The DOL performance page links each quarter's H-1B disclosure file. The
//! newest few are downloaded and consolidated into a single CSV snapshot
//! with a `_source_url` provenance column, which is what the processing
//! pipeline consumes. This layer owns all network concerns; the core never
//! fetches anything.

use crate::error::{Result, WageError};
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const DISCLOSURE_PATTERN: &str =
    r#"(?i)https://www\.dol\.gov[^"']*H-1B[^"']*Disclosure[^"']*\.(?:xlsx|csv)"#;
const RELATIVE_HREF_PATTERN: &str = r"(?i)^[^\s]*H-1B[^\s]*Disclosure[^\s]*\.(?:xlsx|csv)$";

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub performance_url: String,
    pub file_limit: usize,
    pub timeout_seconds: u64,
    pub output: PathBuf,
}

/// Result of a complete fetch run
#[derive(Debug, Serialize)]
pub struct FetchResult {
    pub files_consolidated: usize,
    pub files_skipped: usize,
    pub total_rows: usize,
    pub output_file: String,
}

/// Provenance sidecar written next to the consolidated snapshot: which
/// files went in, their checksums, and when they were fetched.
#[derive(Debug, Serialize)]
pub struct FetchManifest {
    pub fetched_at: DateTime<Utc>,
    pub files: Vec<FetchedFile>,
}

#[derive(Debug, Serialize)]
pub struct FetchedFile {
    pub url: String,
    pub sha256: String,
    pub bytes: usize,
    pub rows: usize,
}

/// Finds disclosure file URLs in the listing page. Absolute links are
/// matched directly; when the page format changes to relative links, every
/// anchor href is tested and joined against the listing URL. Returns the
/// newest `limit` URLs; disclosure file names sort by fiscal year and
/// quarter, so lexicographic descending order is newest first.
pub fn discover_urls(html: &str, base_url: &str, limit: usize) -> Vec<String> {
    let absolute = Regex::new(DISCLOSURE_PATTERN).unwrap();
    let mut urls: BTreeSet<String> = absolute
        .find_iter(html)
        .map(|m| m.as_str().to_string())
        .collect();

    if urls.is_empty() {
        debug!("No absolute disclosure links found, scanning anchor hrefs");
        let relative = Regex::new(RELATIVE_HREF_PATTERN).unwrap();
        let anchor = Selector::parse("a[href]").unwrap();
        let document = Html::parse_document(html);
        let base = reqwest::Url::parse(base_url).ok();
        for element in document.select(&anchor) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !relative.is_match(href) {
                continue;
            }
            if let Some(joined) = base.as_ref().and_then(|b| b.join(href).ok()) {
                urls.insert(joined.to_string());
            }
        }
    }

    let mut sorted: Vec<String> = urls.into_iter().collect();
    sorted.reverse();
    sorted.truncate(limit);
    sorted
}

/// One downloaded disclosure file, parsed but not yet merged.
struct SourceTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    source_url: String,
}

fn parse_csv(bytes: &[u8], source_url: &str) -> Result<SourceTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(SourceTable {
        headers,
        rows,
        source_url: source_url.to_string(),
    })
}

/// Merges the downloaded files into one CSV. Column sets differ across
/// vintages, so the output header is the union of all input headers in
/// first-seen order, plus a trailing `_source_url` column; cells a file
/// does not have stay empty.
fn write_consolidated(path: &Path, tables: &[SourceTable]) -> Result<usize> {
    let mut combined: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for table in tables {
        for header in &table.headers {
            if seen.insert(header.as_str()) {
                combined.push(header.clone());
            }
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;

    let mut full_header = combined.clone();
    full_header.push("_source_url".to_string());
    writer.write_record(&full_header)?;

    let mut total = 0usize;
    for table in tables {
        let positions: HashMap<&str, usize> = table
            .headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();
        for row in &table.rows {
            let mut out: Vec<&str> = combined
                .iter()
                .map(|col| {
                    positions
                        .get(col.as_str())
                        .and_then(|&idx| row.get(idx))
                        .map(String::as_str)
                        .unwrap_or("")
                })
                .collect();
            out.push(&table.source_url);
            writer.write_record(&out)?;
            total += 1;
        }
    }
    writer.flush()?;
    Ok(total)
}

/// Discovers, downloads, and consolidates the newest disclosure files.
/// Aborts before writing anything when discovery comes up empty.
pub async fn run(options: &FetchOptions) -> Result<FetchResult> {
    info!("📡 Discovering disclosure files from {}", options.performance_url);
    println!("📡 Discovering disclosure files...");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(options.timeout_seconds))
        .build()?;

    let html = client
        .get(&options.performance_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let urls = discover_urls(&html, &options.performance_url, options.file_limit);
    if urls.is_empty() {
        return Err(WageError::Discovery(
            "Could not discover disclosure URLs from performance page".to_string(),
        ));
    }
    info!("Found {} candidate disclosure files", urls.len());

    let mut tables = Vec::new();
    let mut manifest_files = Vec::new();
    let mut skipped = 0usize;
    for url in &urls {
        // Spreadsheet vintages need a format decoder this tool does not
        // carry; the same data is published as CSV.
        if !url.to_lowercase().ends_with(".csv") {
            warn!("Skipping non-CSV disclosure file: {}", url);
            println!("⚠️  Skipping non-CSV file: {url}");
            skipped += 1;
            continue;
        }

        println!("Loading: {url}");
        let t0 = Instant::now();
        let payload = client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let sha_hex = {
            let mut hasher = Sha256::new();
            hasher.update(&payload);
            hex::encode(hasher.finalize())
        };
        info!(
            url = %url,
            bytes = payload.len(),
            sha256 = %sha_hex,
            secs = t0.elapsed().as_secs_f64(),
            "Downloaded disclosure file"
        );

        let table = parse_csv(&payload, url)?;
        manifest_files.push(FetchedFile {
            url: url.clone(),
            sha256: sha_hex,
            bytes: payload.len(),
            rows: table.rows.len(),
        });
        tables.push(table);
    }

    if tables.is_empty() {
        return Err(WageError::Discovery(
            "All discovered disclosure files were skipped; nothing to consolidate".to_string(),
        ));
    }

    let total_rows = write_consolidated(&options.output, &tables)?;

    let manifest = FetchManifest {
        fetched_at: Utc::now(),
        files: manifest_files,
    };
    let manifest_path = options.output.with_extension("manifest.json");
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    debug!("Wrote fetch manifest to {}", manifest_path.display());

    println!(
        "Wrote {} rows from {} files to {}",
        total_rows,
        tables.len(),
        options.output.display()
    );

    Ok(FetchResult {
        files_consolidated: tables.len(),
        files_skipped: skipped,
        total_rows,
        output_file: options.output.to_string_lossy().to_string(),
    })
}
