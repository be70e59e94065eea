use clap::Parser;
use std::path::PathBuf;

use crate::models::IncompletePolicy;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Merge daily contribution counts and calendar levels into CSV and range reports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "contrib-ledger",
    about = "Merge daily contribution counts and calendar levels into CSV and range reports",
    version
)]
pub struct Settings {
    /// Directory holding the contributions_*.yml count files
    #[arg(long, env = "LEDGER_CONTRIBUTIONS_DIR", default_value = "./contributions")]
    pub contributions_dir: PathBuf,

    /// Directory holding the contributions_*.html calendar tables
    #[arg(long, env = "LEDGER_LEVELS_DIR", default_value = "./table")]
    pub levels_dir: PathBuf,

    /// File name prefix shared by both sources
    #[arg(long, env = "LEDGER_FILE_PREFIX", default_value = "contributions_")]
    pub file_prefix: String,

    /// Path of the combined CSV export
    #[arg(long, env = "LEDGER_CSV_OUTPUT", default_value = "csv/contributions.csv")]
    pub csv_output: PathBuf,

    /// Path of the range report (printed to stdout when omitted)
    #[arg(long, env = "LEDGER_RANGES_OUTPUT")]
    pub ranges_output: Option<PathBuf>,

    /// Range report format
    #[arg(long, env = "LEDGER_RANGES_FORMAT", default_value = "text", value_parser = ["text", "json"])]
    pub ranges_format: String,

    /// Handling of dates missing a count or level in the CSV export
    #[arg(long, env = "LEDGER_CSV_INCOMPLETE", value_enum, default_value_t = IncompletePolicy::DefaultZero)]
    pub csv_incomplete: IncompletePolicy,

    /// Handling of dates missing a count or level in the range report
    #[arg(long, env = "LEDGER_RANGES_INCOMPLETE", value_enum, default_value_t = IncompletePolicy::Abort)]
    pub ranges_incomplete: IncompletePolicy,

    /// Reject date keys that are not real YYYY-MM-DD calendar dates
    #[arg(long, env = "LEDGER_STRICT_DATES")]
    pub strict_dates: bool,

    /// Fail instead of skipping markup files that cannot be parsed
    #[arg(long, env = "LEDGER_STRICT_MARKUP")]
    pub strict_markup: bool,

    /// Logging level
    #[arg(long, env = "LEDGER_LOG_LEVEL", default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply derived overrides.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Settings::parse_from(args))
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// `true` when the range report should be serialized as JSON.
    pub fn ranges_as_json(&self) -> bool {
        self.ranges_format == "json"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
