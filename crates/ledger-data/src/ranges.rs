//! Per-year, per-level min/max contribution ranges.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use ledger_core::calendar::year_of;
use ledger_core::error::Result;
use ledger_core::models::{CombinedRecords, IncompletePolicy, LevelRange, RangeSummary};

use crate::merger::resolve_record;

/// Group records by year and level and compute the contribution range of
/// every group.
///
/// Under [`IncompletePolicy::Abort`] the first incomplete record fails the
/// whole computation and no summary is produced.
pub fn compute_ranges(records: &CombinedRecords, policy: IncompletePolicy) -> Result<RangeSummary> {
    let mut years: BTreeMap<String, BTreeMap<u32, (u64, u64)>> = BTreeMap::new();

    for (date, record) in records.iter() {
        let Some((count, level)) = resolve_record(date, record, policy)? else {
            continue;
        };
        let (min, max) = years
            .entry(year_of(date).to_string())
            .or_default()
            .entry(level)
            .or_insert((count, count));
        *min = (*min).min(count);
        *max = (*max).max(count);
    }

    let years = years
        .into_iter()
        .map(|(year, levels)| {
            let ranges = levels
                .into_iter()
                .map(|(level, (min, max))| LevelRange { level, min, max })
                .collect();
            (year, ranges)
        })
        .collect();

    Ok(RangeSummary::new(years))
}

/// Text report: per year a blank line, `YEAR {year}`, then one
/// `Level {level}: Min = {min}, Max = {max}` line per level.
pub fn render_ranges_text(summary: &RangeSummary) -> String {
    let mut out = String::new();
    for (year, ranges) in summary.iter() {
        out.push('\n');
        let _ = writeln!(out, "YEAR {year}");
        for range in ranges {
            let _ = writeln!(
                out,
                "Level {}: Min = {}, Max = {}",
                range.level, range.min, range.max
            );
        }
    }
    out
}

/// JSON report: `{ "<year>": [{ "level", "min", "max" }, ...] }`.
pub fn render_ranges_json(summary: &RangeSummary) -> Result<String> {
    let mut json = serde_json::to_string_pretty(summary)?;
    json.push('\n');
    Ok(json)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
