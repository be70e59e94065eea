//! End-to-end pipeline: load both sources, merge them, write both reports.

use std::io::Write;
use std::path::PathBuf;

use ledger_core::error::Result;
use ledger_core::models::{CombinedRecords, IncompletePolicy};
use ledger_core::settings::Settings;
use serde::Serialize;
use tracing::info;

use crate::contributions::load_contributions;
use crate::csv_report::write_csv;
use crate::levels::load_levels;
use crate::merger::merge;
use crate::output::write_output;
use crate::ranges::{compute_ranges, render_ranges_json, render_ranges_text};
use crate::source::{LoadOptions, SourceStore};

// ── Options ───────────────────────────────────────────────────────────────────

/// Where the inputs live and how strictly to load them.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub contributions_dir: PathBuf,
    pub levels_dir: PathBuf,
    pub load: LoadOptions,
}

/// Where the reports go and how they treat incomplete records.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub csv_output: PathBuf,
    pub csv_policy: IncompletePolicy,
    /// `None` prints the range report to the console writer.
    pub ranges_output: Option<PathBuf>,
    pub ranges_policy: IncompletePolicy,
    pub ranges_json: bool,
}

impl From<&Settings> for PipelineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            contributions_dir: settings.contributions_dir.clone(),
            levels_dir: settings.levels_dir.clone(),
            load: LoadOptions {
                file_prefix: settings.file_prefix.clone(),
                strict_dates: settings.strict_dates,
                strict_markup: settings.strict_markup,
            },
        }
    }
}

impl From<&Settings> for ReportOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            csv_output: settings.csv_output.clone(),
            csv_policy: settings.csv_incomplete,
            ranges_output: settings.ranges_output.clone(),
            ranges_policy: settings.ranges_incomplete,
            ranges_json: settings.ranges_as_json(),
        }
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Counters describing one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineMetadata {
    pub contribution_files: usize,
    pub level_files: usize,
    pub skipped_level_files: Vec<PathBuf>,
    pub contribution_dates: usize,
    pub level_dates: usize,
    pub combined_dates: usize,
    /// Wall-clock seconds spent loading both sources.
    pub load_time_seconds: f64,
}

/// Output of [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub records: CombinedRecords,
    pub metadata: PipelineMetadata,
}

/// Output of [`generate_reports`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub csv_rows: usize,
    pub range_years: usize,
}

// ── Stages ────────────────────────────────────────────────────────────────────

/// Load both sources and merge them.
///
/// Both loaders run to completion before the merge; any fatal loader error
/// aborts the run.
pub fn run_pipeline(store: &impl SourceStore, options: &PipelineOptions) -> Result<PipelineResult> {
    let load_start = std::time::Instant::now();
    let contributions = load_contributions(store, &options.contributions_dir, &options.load)?;
    let levels = load_levels(store, &options.levels_dir, &options.load)?;
    let load_time_seconds = load_start.elapsed().as_secs_f64();

    let contribution_dates = contributions.records.len();
    let level_dates = levels.records.len();
    let records = merge(contributions.records, levels.records);

    let metadata = PipelineMetadata {
        contribution_files: contributions.files_read,
        level_files: levels.files_read,
        skipped_level_files: levels.files_skipped,
        contribution_dates,
        level_dates,
        combined_dates: records.len(),
        load_time_seconds,
    };

    info!(
        "Merged {} contribution dates and {} level dates into {} records",
        metadata.contribution_dates, metadata.level_dates, metadata.combined_dates
    );

    Ok(PipelineResult { records, metadata })
}

/// Write the CSV export, then the range report.
///
/// The range report goes to `options.ranges_output` when set, otherwise to
/// `console`. A range failure happens after the CSV export is written and
/// produces no range output at all.
pub fn generate_reports(
    records: &CombinedRecords,
    options: &ReportOptions,
    console: &mut impl Write,
) -> Result<ReportSummary> {
    let csv_rows = write_csv(records, &options.csv_output, options.csv_policy)?;

    let summary = compute_ranges(records, options.ranges_policy)?;
    let rendered = if options.ranges_json {
        render_ranges_json(&summary)?
    } else {
        render_ranges_text(&summary)
    };

    match &options.ranges_output {
        Some(path) => {
            write_output(path, &rendered)?;
            info!("Wrote ranges for {} years to {}", summary.len(), path.display());
        }
        None => {
            console.write_all(rendered.as_bytes())?;
            console.flush()?;
        }
    }

    Ok(ReportSummary {
        csv_rows,
        range_years: summary.len(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
