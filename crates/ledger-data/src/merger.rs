//! Date join of the two sources and the incomplete-record policy shared by
//! both reporters.

use ledger_core::error::{LedgerError, Result};
use ledger_core::models::{
    CombinedRecord, CombinedRecords, ContributionMap, IncompletePolicy, LevelMap,
};

/// Join both maps on date.
///
/// The result holds every contribution date in its original order followed by
/// the level-only dates in theirs. A field is `Some` exactly when its source
/// has the date.
pub fn merge(contributions: ContributionMap, levels: LevelMap) -> CombinedRecords {
    let mut combined = CombinedRecords::new();

    for (date, count) in contributions {
        combined.insert(
            date,
            CombinedRecord {
                contributions: Some(count),
                level: None,
            },
        );
    }

    for (date, level) in levels {
        let mut record = combined.get(&date).copied().unwrap_or_default();
        record.level = Some(level);
        combined.insert(date, record);
    }

    combined
}

/// Apply `policy` to one record, returning the `(contributions, level)` pair a
/// report should use, or `None` when the record is to be left out.
pub fn resolve_record(
    date: &str,
    record: &CombinedRecord,
    policy: IncompletePolicy,
) -> Result<Option<(u64, u32)>> {
    if let (Some(count), Some(level)) = (record.contributions, record.level) {
        return Ok(Some((count, level)));
    }

    match policy {
        IncompletePolicy::SkipRecord => Ok(None),
        IncompletePolicy::DefaultZero => Ok(Some((
            record.contributions.unwrap_or(0),
            record.level.unwrap_or(0),
        ))),
        IncompletePolicy::Abort => Err(LedgerError::IncompleteRecord {
            date: date.to_string(),
            missing: record.missing_field().unwrap_or("contributions"),
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
