//! The single `debrify` run: configuration, catalog, search, dispatch.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use debrify_core::{
    clamp_range, load_config, load_config_from_env, prepare_catalog, process_keywords,
    validate_config, Config, DispatchItem, DispatchProgressCallback, Dispatcher, HttpFetcher,
    KeywordOutcome, RealDebridClient, RunOptions, SanitizedConfig, SearchEngine, SourceFetcher,
    TermMatch, TorrentCatalog,
};

use crate::parser::Cli;
use crate::presentation;

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Connect timeout for the snapshot download.
const FETCH_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Copy every flag that was given over the matching configuration value.
pub fn apply_overrides(config: &mut Config, cli: &Cli) {
    if !cli.keywords.is_empty() {
        config.search.keywords = cli.keywords.clone();
    }
    if let Some(token) = &cli.real_debrid_api_key {
        config.debrid.api_token = token.clone();
    }
    if let Some(start) = cli.download_start_from {
        config.dispatch.start = start;
    }
    if let Some(end) = cli.download_end_at {
        config.dispatch.end = end;
    }
    if cli.download_to_debrid {
        config.dispatch.submit = true;
    }
    if let Some(print_results) = cli.print_results {
        config.dispatch.print_results = print_results;
    }
    if cli.all_terms {
        config.search.term_match = TermMatch::AllTermsMatch;
    }
    if cli.case_sensitive {
        config.search.case_sensitive = true;
    }
}

/// Load the configuration file (or defaults plus environment when no file
/// is used), apply command-line overrides and validate the result.
pub fn load(cli: &Cli) -> Result<Config> {
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    let config_path = match &cli.config {
        Some(path) => Some(path.as_path()),
        None if default_path.exists() => Some(default_path),
        None => None,
    };

    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => {
            info!("No configuration file, using defaults and environment");
            load_config_from_env().context("Failed to load config from environment")?
        }
    };

    apply_overrides(&mut config, cli);
    validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Run against the real network services.
pub async fn run(cli: &Cli) -> Result<Vec<KeywordOutcome>> {
    let config = load(cli)?;
    let fetcher =
        HttpFetcher::new(FETCH_CONNECT_TIMEOUT).context("Failed to create HTTP client")?;
    run_with(&config, cli.force_update, &fetcher).await
}

/// Run with an explicit configuration and snapshot source.
pub async fn run_with(
    config: &Config,
    force_update: bool,
    fetcher: &dyn SourceFetcher,
) -> Result<Vec<KeywordOutcome>> {
    if let Ok(sanitized) = toml_summary(config) {
        debug!(config = %sanitized, "Effective configuration");
    }

    if config.search.keywords.is_empty() && !force_update {
        bail!("No keywords configured; pass --keywords or set search.keywords");
    }

    let spinner = presentation::spinner("Preparing catalog...");
    let prepared = prepare_catalog(&config.catalog, fetcher, force_update).await;
    spinner.finish_and_clear();
    let prepared = prepared.context("Failed to prepare catalog")?;

    if let Some(report) = &prepared.rebuilt {
        println!(
            "Catalog built: {} rows read, {} inserted, {} duplicates, {} rejected",
            report.attempted, report.inserted, report.ignored, report.rejected
        );
    }

    let catalog: Arc<dyn TorrentCatalog> = Arc::new(prepared.catalog);
    if config.search.keywords.is_empty() {
        info!("Catalog updated, no keywords to search");
        catalog.close();
        return Ok(Vec::new());
    }

    let engine = SearchEngine::new(Arc::clone(&catalog)).with_policy(config.search.term_match);

    let bar = presentation::dispatch_bar();
    let progress_bar = bar.clone();
    let on_item: DispatchProgressCallback = Arc::new(move |item: &DispatchItem| {
        progress_bar.set_message(item.infohash.clone());
        progress_bar.inc(1);
    });

    let dispatcher = if config.dispatch.submit {
        let client = RealDebridClient::new(config.debrid.clone())
            .context("Failed to create Real-Debrid client")?;
        info!("Submitting magnets to Real-Debrid");
        Dispatcher::new(Arc::new(client))
    } else {
        Dispatcher::preview_only()
    };
    let dispatcher = dispatcher.with_progress(on_item);

    let options = RunOptions::from(config);
    let print_results = config.dispatch.print_results;
    let outcomes = process_keywords(
        &engine,
        &dispatcher,
        &config.search.keywords,
        &options,
        |keyword, result| {
            if print_results {
                bar.suspend(|| print!("{}", presentation::format_results_table(keyword, result)));
            }
            let selected = clamp_range(result.len(), options.start, options.end).len();
            bar.reset();
            bar.set_length(selected as u64);
            bar.set_message(keyword.to_string());
        },
    )
    .await;
    bar.finish_and_clear();
    engine.close();
    let outcomes = outcomes.context("Keyword processing failed")?;

    for outcome in &outcomes {
        println!("{}", presentation::format_dispatch_summary(outcome));
        for line in presentation::format_failures(outcome) {
            println!("{}", line);
        }
    }
    Ok(outcomes)
}

fn toml_summary(config: &Config) -> Result<String> {
    Ok(toml::to_string(&SanitizedConfig::from(config))?)
}
