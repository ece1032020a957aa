pub mod catalog;
pub mod config;
pub mod debrid;
pub mod dispatch;
pub mod fetcher;
pub mod runner;
pub mod search;
pub mod testing;

pub use catalog::{
    magnet_uri, CatalogError, InsertReport, MemoryCatalog, NameFilter, RowError, RowRejection,
    SqliteCatalog, TorrentCatalog, TorrentRecord,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, CatalogConfig,
    Config, ConfigError, DebridConfig, DispatchConfig, SanitizedConfig, SearchConfig,
};
pub use debrid::{AddMagnetResult, DebridClient, DebridError, RealDebridClient};
pub use dispatch::{
    clamp_range, DispatchError, DispatchItem, DispatchOutcome, DispatchProgressCallback,
    DispatchReport, Dispatcher,
};
pub use fetcher::{FetchError, HttpFetcher, SourceFetcher};
pub use runner::{
    prepare_catalog, process_keywords, KeywordOutcome, PreparedCatalog, RunOptions, RunnerError,
};
pub use search::{split_terms, SearchEngine, SearchError, SearchResult, TermMatch};
