//! Worksite county resolution.
//!
//! Disclosure rows carry a free-text county name, sometimes a FIPS code, and
//! a state. Identity downstream is the 5-digit county FIPS. A plausible
//! per-row FIPS wins over the name lookup, since the same county name shows
//! up in many states and in several punctuation variants; rows without one
//! fall back to the reference table keyed by `(state, normalized name)`.

use crate::domain::ResolvedCounty;
use crate::error::{Result, WageError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Sentinel FIPS that some vintages emit instead of leaving the column blank.
const FIPS_PLACEHOLDER: &str = "00000";

/// Normalizes a free-text county name for table lookup: trim, lowercase,
/// drop a trailing " county", fold "saint "/"st. " to "st ", collapse runs
/// of whitespace. Normalizing an already-normalized name is a no-op.
pub fn normalize_county(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut cleaned = lowered.as_str();
    while let Some(stripped) = cleaned.strip_suffix(" county") {
        cleaned = stripped;
    }
    let cleaned = cleaned.replace("saint ", "st ").replace("st. ", "st ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Left-pads a FIPS fragment with zeros to five characters.
pub fn pad_fips(fips: &str) -> String {
    format!("{:0>5}", fips.trim())
}

fn is_authoritative_fips(fips: &str) -> bool {
    fips.len() == 5
        && fips.bytes().all(|b| b.is_ascii_digit())
        && fips != FIPS_PLACEHOLDER
}

#[derive(Debug, Deserialize)]
struct CountyRow {
    state: String,
    county_normalized: String,
    county_fips: String,
    county_name: String,
}

/// Immutable reference table mapping `(state, normalized county name)` to a
/// canonical FIPS and display name. Loaded once per run, read-only after.
pub struct CountyTable {
    entries: HashMap<(String, String), ResolvedCounty>,
}

impl CountyTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            WageError::Input(format!(
                "Failed to open county reference table '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut entries = HashMap::new();
        for row in reader.deserialize::<CountyRow>() {
            let row = row?;
            entries.insert(
                (
                    row.state.trim().to_uppercase(),
                    row.county_normalized.trim().to_lowercase(),
                ),
                ResolvedCounty {
                    fips: pad_fips(&row.county_fips),
                    display_name: row.county_name,
                },
            );
        }

        if entries.is_empty() {
            return Err(WageError::Input(format!(
                "County reference table '{}' contains no rows",
                path.display()
            )));
        }

        info!("Loaded {} county reference entries", entries.len());
        Ok(Self { entries })
    }

    #[cfg(test)]
    pub fn from_entries(rows: Vec<(&str, &str, &str, &str)>) -> Self {
        let entries = rows
            .into_iter()
            .map(|(state, normalized, fips, name)| {
                (
                    (state.to_uppercase(), normalized.to_lowercase()),
                    ResolvedCounty {
                        fips: pad_fips(fips),
                        display_name: name.to_string(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, state: &str, normalized_county: &str) -> Option<&ResolvedCounty> {
        self.entries
            .get(&(state.to_string(), normalized_county.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves a row's worksite to a canonical county, or `None` when neither
/// the row's own FIPS nor the reference table can place it.
pub fn resolve(
    table: &CountyTable,
    state: &str,
    county_raw: &str,
    fips_raw: &str,
) -> Option<ResolvedCounty> {
    let normalized = normalize_county(county_raw);
    let mapped = table.lookup(state, &normalized);

    let padded = if fips_raw.trim().is_empty() {
        String::new()
    } else {
        pad_fips(fips_raw)
    };

    if is_authoritative_fips(&padded) {
        // The row's own code wins; the table still supplies the nicer
        // display name when it has one.
        let display_name = match mapped {
            Some(entry) => entry.display_name.clone(),
            None => county_raw
                .strip_suffix(" County")
                .unwrap_or(county_raw)
                .to_string(),
        };
        return Some(ResolvedCounty {
            fips: padded,
            display_name,
        });
    }

    mapped.cloned()
}
