pub mod provider;

pub use provider::{CountryDirectory, RestCountriesProvider};

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::database_ops::store::{Datastore, NewCountry};
use crate::normalization::country::to_new_country;

#[derive(Debug, Clone, Serialize)]
pub struct CountryRefreshSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub fetched: usize,
    pub transformed: usize,
    /// Records that could not be mapped onto a country row.
    pub malformed: usize,
    /// Repeated common names; only the first record is kept.
    pub duplicates: Vec<String>,
    pub written: usize,
    pub removed: u64,
    pub failed: Vec<String>,
}

/// Replaces the `countries` table with the upstream directory.
pub struct CountryImporter {
    store: Arc<dyn Datastore>,
    directory: Arc<dyn CountryDirectory>,
}

impl CountryImporter {
    pub fn new(store: Arc<dyn Datastore>, directory: Arc<dyn CountryDirectory>) -> Self {
        Self { store, directory }
    }

    /// Fetch, transform and swap in the full directory.
    ///
    /// A failed fetch, or a directory with no usable record, leaves the table
    /// untouched. Per-record mapping failures and per-row write failures are
    /// logged and counted; only a failure of the surrounding transaction
    /// aborts the run.
    #[instrument(skip(self))]
    pub async fn refresh_countries(&self) -> Result<CountryRefreshSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let records = self
            .directory
            .fetch_all()
            .await
            .context("failed to fetch country directory")?;
        info!(%run_id, fetched = records.len(), "fetched country directory");

        let (rows, malformed, duplicates) = transform_records(&records);
        for name in &duplicates {
            warn!(%run_id, country = %name, "duplicate country name in directory; keeping first");
        }
        if rows.is_empty() {
            bail!(
                "country directory yielded no usable records ({} fetched, {malformed} malformed); table left as is",
                records.len()
            );
        }

        let report = self
            .store
            .replace_countries(&rows)
            .await
            .context("failed to replace countries")?;

        let summary = CountryRefreshSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            fetched: records.len(),
            transformed: rows.len(),
            malformed,
            duplicates,
            written: report.written,
            removed: report.removed,
            failed: report.failed,
        };
        info!(
            %run_id,
            written = summary.written,
            removed = summary.removed,
            failed = summary.failed.len(),
            malformed = summary.malformed,
            "country refresh complete"
        );
        Ok(summary)
    }
}

/// Map every record, dropping malformed ones and repeated names.
fn transform_records(records: &[serde_json::Value]) -> (Vec<NewCountry>, usize, Vec<String>) {
    let mut rows = Vec::with_capacity(records.len());
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut malformed = 0usize;
    let mut duplicates = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        match to_new_country(record) {
            Ok(row) => {
                if seen.insert(row.name.clone()) {
                    rows.push(row);
                } else {
                    duplicates.push(row.name);
                }
            }
            Err(e) => {
                malformed += 1;
                warn!(index = idx, error = %format!("{e:#}"), "skipping country record");
            }
        }
    }

    (rows, malformed, duplicates)
}
