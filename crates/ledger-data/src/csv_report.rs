//! Combined CSV export: one `date,year,month,contributions,level` row per date.

use std::path::Path;

use ledger_core::calendar::{month_name, year_of};
use ledger_core::error::{LedgerError, Result};
use ledger_core::models::{CombinedRecords, IncompletePolicy};
use serde::Serialize;
use tracing::info;

use crate::merger::resolve_record;
use crate::output::write_output;

/// Header row of the export.
pub const CSV_HEADER: [&str; 5] = ["date", "year", "month", "contributions", "level"];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: &'a str,
    year: &'a str,
    month: &'static str,
    contributions: u64,
    level: u32,
}

/// Render the export as text.
///
/// Every month lookup happens before any output is produced, so an
/// [`LedgerError::InvalidMonth`] leaves nothing half-written.
pub fn render_csv(records: &CombinedRecords, policy: IncompletePolicy) -> Result<String> {
    let rows = build_rows(records, policy)?;
    encode(&rows)
}

/// Render the export and overwrite `path` with it, creating parent
/// directories as needed. Returns the number of data rows written.
pub fn write_csv(
    records: &CombinedRecords,
    path: &Path,
    policy: IncompletePolicy,
) -> Result<usize> {
    let rows = build_rows(records, policy)?;
    let text = encode(&rows)?;
    write_output(path, &text)?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(rows.len())
}

fn build_rows(records: &CombinedRecords, policy: IncompletePolicy) -> Result<Vec<CsvRow<'_>>> {
    let mut rows = Vec::with_capacity(records.len());
    for (date, record) in records.iter() {
        let Some((contributions, level)) = resolve_record(date, record, policy)? else {
            continue;
        };
        rows.push(CsvRow {
            date,
            year: year_of(date),
            month: month_name(date)?,
            contributions,
            level,
        });
    }
    Ok(rows)
}

fn encode(rows: &[CsvRow<'_>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LedgerError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| LedgerError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::merge;
    use ledger_core::models::{CombinedRecord, ContributionMap, LevelMap};
    use tempfile::TempDir;

    fn combined(contributions: &[(&str, u64)], levels: &[(&str, u32)]) -> CombinedRecords {
        let contributions: ContributionMap = contributions.iter().copied().collect();
        let levels: LevelMap = levels.iter().copied().collect();
        merge(contributions, levels)
    }

    fn data_lines(text: &str) -> Vec<&str> {
        text.lines().skip(1).collect()
    }

    // ── render_csv ────────────────────────────────────────────────────────────

    #[test]
    fn test_render_header_only_when_empty() {
        let text = render_csv(&CombinedRecords::new(), IncompletePolicy::DefaultZero).unwrap();
        assert_eq!(text, "date,year,month,contributions,level\n");
    }

    #[test]
    fn test_render_complete_record() {
        let records = combined(&[("2024-01-01", 5)], &[("2024-01-01", 2)]);
        let text = render_csv(&records, IncompletePolicy::DefaultZero).unwrap();
        assert_eq!(data_lines(&text), vec!["2024-01-01,2024,January,5,2"]);
    }

    #[test]
    fn test_render_missing_level_defaults_to_zero() {
        let records = combined(&[("2024-03-10", 7)], &[]);
        let text = render_csv(&records, IncompletePolicy::DefaultZero).unwrap();
        assert_eq!(data_lines(&text), vec!["2024-03-10,2024,March,7,0"]);
    }

    #[test]
    fn test_render_missing_contributions_defaults_to_zero() {
        let records = combined(&[], &[("2023-12-25", 3)]);
        let text = render_csv(&records, IncompletePolicy::DefaultZero).unwrap();
        assert_eq!(data_lines(&text), vec!["2023-12-25,2023,December,0,3"]);
    }

    #[test]
    fn test_render_follows_union_order() {
        let records = combined(
            &[("2024-02-02", 1), ("2024-02-01", 2)],
            &[("2024-02-03", 1), ("2024-02-02", 4)],
        );
        let text = render_csv(&records, IncompletePolicy::DefaultZero).unwrap();
        assert_eq!(
            data_lines(&text),
            vec![
                "2024-02-02,2024,February,1,4",
                "2024-02-01,2024,February,2,0",
                "2024-02-03,2024,February,0,1",
            ]
        );
    }

    #[test]
    fn test_render_skip_record_policy() {
        let records = combined(&[("2024-01-01", 5), ("2024-01-02", 6)], &[("2024-01-01", 2)]);
        let text = render_csv(&records, IncompletePolicy::SkipRecord).unwrap();
        assert_eq!(data_lines(&text), vec!["2024-01-01,2024,January,5,2"]);
    }

    #[test]
    fn test_render_abort_policy() {
        let records = combined(&[("2024-01-01", 5)], &[]);
        let result = render_csv(&records, IncompletePolicy::Abort);
        assert!(matches!(result, Err(LedgerError::IncompleteRecord { .. })));
    }

    #[test]
    fn test_render_invalid_month_is_fatal() {
        let mut records = CombinedRecords::new();
        records.insert(
            "2024-01-01",
            CombinedRecord {
                contributions: Some(1),
                level: Some(1),
            },
        );
        records.insert(
            "2024-13-01",
            CombinedRecord {
                contributions: Some(1),
                level: Some(1),
            },
        );

        let result = render_csv(&records, IncompletePolicy::DefaultZero);
        assert!(matches!(result, Err(LedgerError::InvalidMonth { .. })));
    }

    // ── write_csv ─────────────────────────────────────────────────────────────

    #[test]
    fn test_write_creates_parent_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("csv").join("contributions.csv");

        let first = combined(&[("2024-01-01", 5), ("2024-01-02", 1)], &[]);
        assert_eq!(write_csv(&first, &path, IncompletePolicy::DefaultZero).unwrap(), 2);

        let second = combined(&[("2024-05-05", 9)], &[("2024-05-05", 4)]);
        assert_eq!(write_csv(&second, &path, IncompletePolicy::DefaultZero).unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "date,year,month,contributions,level\n2024-05-05,2024,May,9,4\n"
        );
    }

    #[test]
    fn test_write_invalid_month_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contributions.csv");
        std::fs::write(&path, "previous").unwrap();

        let records = combined(&[("2024-00-10", 1)], &[("2024-00-10", 1)]);
        assert!(write_csv(&records, &path, IncompletePolicy::DefaultZero).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
    }
}
