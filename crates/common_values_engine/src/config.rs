//! Configuration file loading.
//!
//! The file is TOML with four sections: `[service]` for the statistics
//! endpoint, `[selection]` for the global exclusions and value-shape rule,
//! `[database]` for the output table and `[[keys]]` for the keys to analyse.
//! Keys are processed in the order they appear in the file.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common_values_core::{KeySpec, ValueShape};
use reqwest::Url;
use serde::Deserialize;

use crate::fetch::{FetchSettings, DEFAULT_USER_AGENT};
use crate::harvest::{HarvestSettings, DEFAULT_PAGE_SIZE};

pub const DEFAULT_CONFIG_FILE: &str = "common-values.toml";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_TABLE: &str = "common_values";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no keys specified in configuration file")]
    NoKeys,
    #[error("key entry #{index} has an empty name")]
    EmptyKeyName { index: usize },
    #[error("key {key} is listed more than once")]
    DuplicateKey { key: String },
    #[error("key {key} has no min_count")]
    MissingThreshold { key: String },
    #[error("invalid service base_url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },
}

/// A validated configuration, ready to drive a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceSettings,
    pub global_exclusions: BTreeSet<String>,
    pub value_shape: ValueShape,
    pub database: DatabaseSettings,
    pub keys: Vec<KeySpec>,
}

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: Url,
    pub harvest: HarvestSettings,
    pub fetch: FetchSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSettings {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub render_user: Option<String>,
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            name: None,
            host: None,
            port: None,
            username: None,
            password: None,
            render_user: None,
            schema: default_schema(),
            table: default_table(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseOverrides {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub render_user: Option<String>,
}

impl DatabaseSettings {
    pub fn apply(&mut self, overrides: DatabaseOverrides) {
        fn replace<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        replace(&mut self.name, overrides.name);
        replace(&mut self.host, overrides.host);
        replace(&mut self.port, overrides.port);
        replace(&mut self.username, overrides.username);
        replace(&mut self.password, overrides.password);
        replace(&mut self.render_user, overrides.render_user);
    }
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    service: RawService,
    #[serde(default)]
    selection: RawSelection,
    #[serde(default)]
    database: DatabaseSettings,
    #[serde(default)]
    keys: Vec<RawKey>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawService {
    base_url: String,
    page_size: Option<u32>,
    max_pages: Option<u32>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSelection {
    #[serde(default)]
    common_exclusions: BTreeSet<String>,
    #[serde(default)]
    value_shape: ValueShape,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKey {
    name: String,
    min_count: Option<u64>,
    #[serde(default)]
    exclusions: BTreeSet<String>,
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(text)?;
    let service = validate_service(raw.service)?;
    let keys = validate_keys(raw.keys)?;
    Ok(Config {
        service,
        global_exclusions: raw.selection.common_exclusions,
        value_shape: raw.selection.value_shape,
        database: raw.database,
        keys,
    })
}

fn validate_service(raw: RawService) -> Result<ServiceSettings, ConfigError> {
    let base_url = Url::parse(&raw.base_url).map_err(|err| ConfigError::InvalidBaseUrl {
        url: raw.base_url.clone(),
        reason: err.to_string(),
    })?;
    if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.base_url,
            reason: "expected an http(s) URL".to_string(),
        });
    }

    let page_size = raw.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(ConfigError::ZeroValue { field: "page_size" });
    }
    if raw.max_pages == Some(0) {
        return Err(ConfigError::ZeroValue { field: "max_pages" });
    }

    let mut fetch = FetchSettings::default();
    if let Some(secs) = raw.connect_timeout_secs {
        if secs == 0 {
            return Err(ConfigError::ZeroValue {
                field: "connect_timeout_secs",
            });
        }
        fetch.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = raw.request_timeout_secs {
        if secs == 0 {
            return Err(ConfigError::ZeroValue {
                field: "request_timeout_secs",
            });
        }
        fetch.request_timeout = Duration::from_secs(secs);
    }
    fetch.user_agent = raw
        .user_agent
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Ok(ServiceSettings {
        base_url,
        harvest: HarvestSettings {
            page_size,
            max_pages: raw.max_pages,
        },
        fetch,
    })
}

fn validate_keys(raw: Vec<RawKey>) -> Result<Vec<KeySpec>, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::NoKeys);
    }
    let mut seen = BTreeSet::new();
    let mut keys = Vec::with_capacity(raw.len());
    for (index, entry) in raw.into_iter().enumerate() {
        let name = entry.name.trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::EmptyKeyName { index: index + 1 });
        }
        if !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicateKey { key: name });
        }
        let Some(min_count) = entry.min_count else {
            return Err(ConfigError::MissingThreshold { key: name });
        };
        keys.push(KeySpec {
            key: name,
            min_count,
            exclusions: entry.exclusions,
        });
    }
    Ok(keys)
}
