//! Command-line arguments.
//!
//! Every flag is optional; a flag that is given overrides the matching
//! configuration value.

use std::path::PathBuf;

use clap::Parser;

/// Search a torrent catalog snapshot and send matches to Real-Debrid.
#[derive(Parser, Debug)]
#[command(name = "debrify")]
#[command(about = "Search a torrent catalog snapshot and send matches to Real-Debrid")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, env = "DEBRIFY_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Delete and rebuild the catalog from the latest snapshot
    #[arg(long = "force-update")]
    pub force_update: bool,

    /// Keywords to search for; quote a keyword to pass several terms
    #[arg(long, num_args = 1.., value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Real-Debrid API token
    #[arg(long = "real-debrid-api-key", value_name = "TOKEN")]
    pub real_debrid_api_key: Option<String>,

    /// First result index to dispatch (0-based)
    #[arg(long = "download-start-from", value_name = "N")]
    pub download_start_from: Option<usize>,

    /// Result index to stop before
    #[arg(long = "download-end-at", value_name = "N")]
    pub download_end_at: Option<usize>,

    /// Submit the selected magnets to Real-Debrid instead of only listing them
    #[arg(long = "download-to-debrid")]
    pub download_to_debrid: bool,

    /// Print the results table for every keyword (yes/no, true/false, 1/0)
    #[arg(
        long = "print-results",
        value_name = "BOOL",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub print_results: Option<bool>,

    /// Require every term of a keyword to appear in the name
    #[arg(long = "all-terms")]
    pub all_terms: bool,

    /// Match names case-sensitively
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["debrify"]);
        assert!(cli.keywords.is_empty());
        assert!(!cli.force_update);
        assert!(!cli.download_to_debrid);
        assert_eq!(cli.print_results, None);
        assert_eq!(cli.download_start_from, None);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from([
            "debrify",
            "--config",
            "/tmp/debrify.toml",
            "--force-update",
            "--keywords",
            "debian",
            "arch linux",
            "--real-debrid-api-key",
            "secret",
            "--download-start-from",
            "2",
            "--download-end-at",
            "7",
            "--download-to-debrid",
            "--print-results",
            "false",
            "--all-terms",
            "--case-sensitive",
            "-v",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/debrify.toml")));
        assert!(cli.force_update);
        assert_eq!(cli.keywords, vec!["debian", "arch linux"]);
        assert_eq!(cli.real_debrid_api_key.as_deref(), Some("secret"));
        assert_eq!(cli.download_start_from, Some(2));
        assert_eq!(cli.download_end_at, Some(7));
        assert!(cli.download_to_debrid);
        assert_eq!(cli.print_results, Some(false));
        assert!(cli.all_terms);
        assert!(cli.case_sensitive);
        assert!(cli.verbose);
    }

    #[test]
    fn test_negative_index_rejected() {
        let result = Cli::try_parse_from(["debrify", "--download-start-from", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_print_results_accepts_boolish_values() {
        for (raw, expected) in [
            ("yes", true),
            ("y", true),
            ("t", true),
            ("1", true),
            ("no", false),
            ("n", false),
            ("f", false),
            ("0", false),
        ] {
            let cli = Cli::parse_from(["debrify", "--print-results", raw]);
            assert_eq!(cli.print_results, Some(expected), "value {}", raw);
        }
        assert!(Cli::try_parse_from(["debrify", "--print-results", "maybe"]).is_err());
    }
}
