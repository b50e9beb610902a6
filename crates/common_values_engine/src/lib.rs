//! Common values engine: statistics client, harvesting, configuration and persistence.
mod config;
mod decode;
mod fetch;
mod harvest;
mod pages;
mod persist;
mod runner;
mod types;

pub use config::{
    load_config, parse_config, Config, ConfigError, DatabaseOverrides, DatabaseSettings,
    ServiceSettings, DEFAULT_CONFIG_FILE, DEFAULT_SCHEMA, DEFAULT_TABLE,
};
pub use decode::decode_values_page;
pub use fetch::{values_url, FetchSettings, ReqwestStatsSource, StatsSource, DEFAULT_USER_AGENT};
pub use harvest::{harvest_key, HarvestError, HarvestSettings, KeyHarvest, DEFAULT_PAGE_SIZE};
pub use pages::PageFetcher;
pub use persist::{
    create_table_sql, drop_table_sql, grant_sql, insert_sql, quote_ident, PersistError,
    PostgresStore, ReplaceRequest, TableName, ValueRow, ValueStore,
};
pub use runner::{run, run_with_predicate, KeyReport, RunError, RunOptions, RunReport};
pub use types::{FailureKind, FetchError};
