use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Legacy variable some Real-Debrid tooling reads the token from.
const LEGACY_TOKEN_VAR: &str = "RD_APITOKEN";

/// Load configuration from file with environment variable overrides.
///
/// `DEBRIFY_`-prefixed variables use `__` between sections, e.g.
/// `DEBRIFY_DEBRID__API_TOKEN` or `DEBRIFY_DISPATCH__END`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    with_env(Figment::new().merge(Toml::file(path)))
}

/// Load configuration from defaults and environment variables only.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    with_env(Figment::new())
}

fn with_env(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(
            Env::raw()
                .only(&[LEGACY_TOKEN_VAR])
                .map(|_| "debrid.api_token".into()),
        )
        .merge(Env::prefixed("DEBRIFY_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[search]
keywords = ["ubuntu"]

[dispatch]
end = 5
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.search.keywords, vec!["ubuntu"]);
        assert_eq!(config.dispatch.end, 5);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[dispatch]
end = "lots"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[catalog]
source_url = "https://example.org/torrents.csv"
db_path = "/tmp/catalog.db"

[search]
keywords = ["debian", "arch linux"]
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.catalog.db_path.to_str().unwrap(), "/tmp/catalog.db");
        assert_eq!(config.search.keywords.len(), 2);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[debrid]
base_url = "http://from-file"
"#
        )
        .unwrap();

        std::env::set_var("DEBRIFY_DEBRID__BASE_URL", "http://from-env");
        let config = load_config(temp_file.path());
        std::env::remove_var("DEBRIFY_DEBRID__BASE_URL");

        assert_eq!(config.unwrap().debrid.base_url, "http://from-env");
    }

    #[test]
    fn test_load_config_from_env_uses_defaults() {
        std::env::set_var("DEBRIFY_CATALOG__CSV_PATH", "/tmp/from-env.csv");
        let config = load_config_from_env();
        std::env::remove_var("DEBRIFY_CATALOG__CSV_PATH");

        let config = config.unwrap();
        assert_eq!(config.catalog.csv_path.to_str().unwrap(), "/tmp/from-env.csv");
        assert_eq!(config.dispatch.end, 1_000_000);
    }
}
