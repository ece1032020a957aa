use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::search::TermMatch;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub debrid: DebridConfig,
}

/// Catalog source and storage locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Remote CSV snapshot to fetch when (re)building the catalog.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Where the downloaded CSV is written.
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    /// SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            csv_path: default_csv_path(),
            db_path: default_db_path(),
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("data/torrents.csv")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/torrents.db")
}

/// Keyword search settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Each keyword is searched on its own; a keyword may hold several terms.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub term_match: TermMatch,
}

/// Dispatch range and switches
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// First result index to dispatch (inclusive).
    #[serde(default)]
    pub start: usize,
    /// Last result index (exclusive), clamped to the result count.
    #[serde(default = "default_dispatch_end")]
    pub end: usize,
    /// Send magnets to the debrid service instead of only previewing them.
    #[serde(default)]
    pub submit: bool,
    /// Print a results table for every keyword.
    #[serde(default)]
    pub print_results: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: default_dispatch_end(),
            submit: false,
            print_results: false,
        }
    }
}

fn default_dispatch_end() -> usize {
    1_000_000
}

/// Real-Debrid API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebridConfig {
    /// Real-Debrid API token
    #[serde(default)]
    pub api_token: String,
    /// REST base URL (e.g., "https://api.real-debrid.com/rest/1.0")
    #[serde(default = "default_debrid_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for DebridConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: default_debrid_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_debrid_url() -> String {
    "https://api.real-debrid.com/rest/1.0".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub dispatch: DispatchConfig,
    pub debrid: SanitizedDebridConfig,
}

/// Sanitized debrid config (API token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDebridConfig {
    pub base_url: String,
    pub api_token_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog: config.catalog.clone(),
            search: config.search.clone(),
            dispatch: config.dispatch.clone(),
            debrid: SanitizedDebridConfig {
                base_url: config.debrid.base_url.clone(),
                api_token_configured: !config.debrid.api_token.is_empty(),
                timeout_secs: config.debrid.timeout_secs,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.catalog.source_url.is_none());
        assert_eq!(config.catalog.db_path.to_str().unwrap(), "data/torrents.db");
        assert_eq!(config.catalog.csv_path.to_str().unwrap(), "data/torrents.csv");
        assert!(config.search.keywords.is_empty());
        assert!(!config.search.case_sensitive);
        assert_eq!(config.search.term_match, TermMatch::AnyTermMatches);
        assert_eq!(config.dispatch.start, 0);
        assert_eq!(config.dispatch.end, 1_000_000);
        assert!(!config.dispatch.submit);
        assert_eq!(config.debrid.timeout_secs, 30);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[catalog]
source_url = "https://example.org/torrents.csv"
db_path = "/data/catalog.db"

[search]
keywords = ["ubuntu", "debian live"]
case_sensitive = true
term_match = "all_terms_match"

[dispatch]
start = 2
end = 10
submit = true
print_results = true

[debrid]
api_token = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.catalog.source_url.as_deref(),
            Some("https://example.org/torrents.csv")
        );
        assert_eq!(config.catalog.db_path.to_str().unwrap(), "/data/catalog.db");
        assert_eq!(config.search.keywords, vec!["ubuntu", "debian live"]);
        assert!(config.search.case_sensitive);
        assert_eq!(config.search.term_match, TermMatch::AllTermsMatch);
        assert_eq!(config.dispatch.start, 2);
        assert_eq!(config.dispatch.end, 10);
        assert!(config.dispatch.submit);
        assert!(config.dispatch.print_results);
        assert_eq!(config.debrid.api_token, "secret");
        assert_eq!(config.debrid.base_url, "https://api.real-debrid.com/rest/1.0");
    }

    #[test]
    fn test_unknown_term_match_fails() {
        let toml = r#"
[search]
term_match = "some_terms"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_token() {
        let mut config = Config::default();
        config.debrid.api_token = "super-secret".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.debrid.api_token_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret"));
    }

    #[test]
    fn test_sanitized_config_without_token() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert!(!sanitized.debrid.api_token_configured);
    }
}
