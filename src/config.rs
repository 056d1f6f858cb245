use crate::constants;
use crate::error::{Result, WageError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub process: ProcessConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub performance_url: String,
    pub file_limit: usize,
    pub timeout_seconds: u64,
    pub output: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    pub input: String,
    pub county_map: String,
    pub output: String,
    pub sample_output: Option<String>,
    pub sample_size: usize,
    pub unmatched_log: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            performance_url: constants::PERFORMANCE_URL.to_string(),
            file_limit: constants::DEFAULT_FILE_LIMIT,
            timeout_seconds: constants::DEFAULT_TIMEOUT_SECONDS,
            output: constants::DEFAULT_RAW_OUTPUT.to_string(),
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            input: constants::DEFAULT_RAW_OUTPUT.to_string(),
            county_map: constants::DEFAULT_COUNTY_MAP.to_string(),
            output: constants::DEFAULT_SUMMARY_OUTPUT.to_string(),
            sample_output: Some(constants::DEFAULT_SAMPLE_OUTPUT.to_string()),
            sample_size: constants::DEFAULT_SAMPLE_SIZE,
            unmatched_log: constants::DEFAULT_UNMATCHED_LOG.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            process: ProcessConfig::default(),
        }
    }
}

impl Config {
    /// Loads config.toml from the working directory, falling back to built-in
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(path).map_err(|e| {
            WageError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
