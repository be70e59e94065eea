mod bootstrap;

use std::process::ExitCode;

use anyhow::{Context, Result};
use ledger_core::settings::Settings;
use ledger_data::pipeline::{generate_reports, run_pipeline, PipelineOptions, ReportOptions};
use ledger_data::source::FsStore;

fn main() -> ExitCode {
    let settings = Settings::load();

    if let Err(err) = bootstrap::setup_logging(&settings.log_level) {
        eprintln!("Failed to initialise logging: {err:#}");
        return ExitCode::FAILURE;
    }

    tracing::info!("contrib-ledger v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Sources: {} + {}, CSV policy: {}, ranges policy: {}",
        settings.contributions_dir.display(),
        settings.levels_dir.display(),
        settings.csv_incomplete,
        settings.ranges_incomplete
    );

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<()> {
    let result = run_pipeline(&FsStore, &PipelineOptions::from(settings))
        .context("Failed to load contribution data")?;

    let meta = &result.metadata;
    tracing::info!(
        "Loaded {} + {} files ({} skipped) in {:.3}s",
        meta.contribution_files,
        meta.level_files,
        meta.skipped_level_files.len(),
        meta.load_time_seconds
    );

    let stdout = std::io::stdout();
    let summary = generate_reports(
        &result.records,
        &ReportOptions::from(settings),
        &mut stdout.lock(),
    )
    .context("Failed to write reports")?;

    tracing::info!(
        "Done: {} CSV rows, ranges for {} years",
        summary.csv_rows,
        summary.range_years
    );

    Ok(())
}
