//! One invocation of the tool: make sure the catalog exists, then search and
//! dispatch every configured keyword.

use std::io;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{CatalogError, InsertReport, SqliteCatalog, TorrentCatalog};
use crate::config::{CatalogConfig, Config};
use crate::dispatch::{DispatchError, DispatchReport, Dispatcher};
use crate::fetcher::{FetchError, SourceFetcher};
use crate::search::{SearchEngine, SearchResult};

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

fn io_error(path: &Path, e: io::Error) -> RunnerError {
    RunnerError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// An opened catalog, plus the load report when it was (re)built.
pub struct PreparedCatalog {
    pub catalog: SqliteCatalog,
    pub rebuilt: Option<InsertReport>,
}

/// Open the catalog, building it from the source snapshot first when the
/// database does not exist yet or `force_update` is set.
pub async fn prepare_catalog(
    config: &CatalogConfig,
    fetcher: &dyn SourceFetcher,
    force_update: bool,
) -> Result<PreparedCatalog, RunnerError> {
    let exists = config.db_path.exists();
    if exists && !force_update {
        info!(
            db = %config.db_path.display(),
            "Catalog exists, skipping download (use --force-update to rebuild)"
        );
        return Ok(PreparedCatalog {
            catalog: SqliteCatalog::open(&config.db_path)?,
            rebuilt: None,
        });
    }

    if exists {
        info!("Force update requested, rebuilding catalog");
    } else {
        info!(db = %config.db_path.display(), "Catalog does not exist, building it");
    }

    let url = config
        .source_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            RunnerError::Config("catalog.source_url is required to build the catalog".to_string())
        })?;

    for path in [&config.csv_path, &config.db_path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
    }

    remove_if_exists(&config.csv_path).await?;
    let bytes = fetcher.fetch(url, &config.csv_path).await?;
    info!(bytes, csv = %config.csv_path.display(), "Snapshot fetched");

    // Only drop the old catalog once a fresh snapshot is on disk.
    remove_if_exists(&config.db_path).await?;
    let catalog = SqliteCatalog::open(&config.db_path)?;

    match catalog.bulk_insert(&config.csv_path) {
        Ok(report) => Ok(PreparedCatalog {
            catalog,
            rebuilt: Some(report),
        }),
        Err(e) => {
            // An empty database would be taken for a built catalog next run.
            catalog.close();
            if let Err(remove_err) = remove_if_exists(&config.db_path).await {
                warn!(error = %remove_err, "Could not remove incomplete catalog");
            }
            Err(e.into())
        }
    }
}

async fn remove_if_exists(path: &Path) -> Result<(), RunnerError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!(path = %path.display(), "Deleted existing file");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path, e)),
    }
}

/// Per-run search and dispatch settings, independent of where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOptions {
    pub case_sensitive: bool,
    pub start: usize,
    pub end: usize,
    pub submit: bool,
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            case_sensitive: config.search.case_sensitive,
            start: config.dispatch.start,
            end: config.dispatch.end,
            submit: config.dispatch.submit,
        }
    }
}

/// Search result and dispatch report for one keyword.
#[derive(Debug, Clone)]
pub struct KeywordOutcome {
    pub keyword: String,
    pub result: SearchResult,
    pub dispatch: DispatchReport,
}

/// Search each keyword, hand the result to `on_results`, then dispatch the
/// configured range of it.
///
/// The range is clamped per keyword; one keyword's result size never
/// narrows the range used for the next.
pub async fn process_keywords<F>(
    engine: &SearchEngine,
    dispatcher: &Dispatcher,
    keywords: &[String],
    options: &RunOptions,
    mut on_results: F,
) -> Result<Vec<KeywordOutcome>, RunnerError>
where
    F: FnMut(&str, &SearchResult),
{
    if keywords.is_empty() {
        return Err(RunnerError::Config("no keywords configured".to_string()));
    }

    let mut outcomes = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        info!(keyword = %keyword, "Processing keyword");
        let result = engine.search_title(keyword, options.case_sensitive);
        on_results(keyword, &result);

        let dispatch = dispatcher
            .dispatch(result.as_slice(), options.start, options.end, options.submit)
            .await?;
        if dispatch.nothing_to_dispatch() {
            info!(
                keyword = %keyword,
                start = options.start,
                found = result.len(),
                "No results available to dispatch for keyword"
            );
        }

        outcomes.push(KeywordOutcome {
            keyword: keyword.clone(),
            result,
            dispatch,
        });
    }
    Ok(outcomes)
}
