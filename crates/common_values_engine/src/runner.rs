use std::collections::BTreeSet;

use common_values_core::{EmptyCandidateList, StopReason, ValuePredicate};
use engine_logging::{engine_error, engine_info};

use crate::config::Config;
use crate::harvest::{harvest_key, HarvestError};
use crate::persist::{PersistError, ReplaceRequest, TableName, ValueRow, ValueStore};
use crate::StatsSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Harvest and report, but leave the database alone.
    pub no_update: bool,
    /// Persist even when some keys produced no candidates.
    pub allow_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReport {
    pub key: String,
    pub candidates: Vec<String>,
    pub found_exclusions: BTreeSet<String>,
    pub not_found: BTreeSet<String>,
    pub stop_reason: StopReason,
    pub pages_fetched: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub keys: Vec<KeyReport>,
    /// `None` when nothing was written.
    pub rows_written: Option<u64>,
}

impl RunReport {
    pub fn empty_keys(&self) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|report| report.candidates.is_empty())
            .map(|report| report.key.as_str())
            .collect()
    }

    /// `(key, value)` rows in key order, then candidate order.
    pub fn rows(&self) -> Vec<ValueRow> {
        self.keys
            .iter()
            .flat_map(|report| {
                report.candidates.iter().map(|value| ValueRow {
                    key: report.key.clone(),
                    value: value.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Harvest(#[from] HarvestError),
    #[error("no valid values for keys: {}", .keys.join(", "))]
    EmptyCandidates { keys: Vec<String> },
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Harvest every configured key in order, then write the result in one go.
///
/// A service failure on any key aborts the run before storage is touched.
pub async fn run(
    config: &Config,
    source: &dyn StatsSource,
    store: &dyn ValueStore,
    options: RunOptions,
) -> Result<RunReport, RunError> {
    run_with_predicate(config, source, store, &config.value_shape, options).await
}

/// Like [`run`], with a caller-supplied value-shape predicate.
pub async fn run_with_predicate(
    config: &Config,
    source: &dyn StatsSource,
    store: &dyn ValueStore,
    predicate: &dyn ValuePredicate,
    options: RunOptions,
) -> Result<RunReport, RunError> {
    let mut keys = Vec::with_capacity(config.keys.len());
    for spec in &config.keys {
        engine_info!("  Obtaining frequency information for key {}", spec.key);
        let harvest = harvest_key(
            source,
            spec,
            &config.global_exclusions,
            &config.service.harvest,
            predicate,
        )
        .await?;
        let selection = harvest.selection;

        if !selection.not_found.is_empty() {
            let missing: Vec<&str> = selection.not_found.iter().map(String::as_str).collect();
            engine_info!(
                "  Did not find these excluded values above threshold for {}: {}",
                spec.key,
                missing.join(",")
            );
        }
        if let Err(EmptyCandidateList { key }) = selection.require_candidates() {
            engine_error!("  No valid values for key {}", key);
        }
        engine_info!(
            "  Found {} matches for key {}",
            selection.candidates.len(),
            spec.key
        );

        keys.push(KeyReport {
            key: selection.key,
            candidates: selection.candidates,
            found_exclusions: selection.found_exclusions,
            not_found: selection.not_found,
            stop_reason: harvest.stop_reason,
            pages_fetched: harvest.pages_fetched,
        });
    }

    let mut report = RunReport {
        keys,
        rows_written: None,
    };
    if options.no_update {
        return Ok(report);
    }

    let empty = report.empty_keys();
    if !empty.is_empty() && !options.allow_empty {
        return Err(RunError::EmptyCandidates {
            keys: empty.into_iter().map(str::to_string).collect(),
        });
    }

    let table = TableName::from_settings(&config.database)?;
    let rows = report.rows();
    let written = store
        .replace_values(ReplaceRequest {
            table: &table,
            rows: &rows,
            grant_to: config.database.render_user.as_deref(),
            allow_empty: options.allow_empty,
        })
        .await?;
    engine_info!("Wrote {} rows to {}", written, table.qualified());
    report.rows_written = Some(written);
    Ok(report)
}
