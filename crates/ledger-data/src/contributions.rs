//! Contribution loader: `contributions_*.yml` files holding `date: count` pairs.

use std::path::Path;

use ledger_core::error::{LedgerError, Result};
use ledger_core::models::ContributionMap;
use serde_yaml::Value;
use tracing::{debug, info};

use crate::source::{
    ensure_calendar_dates, select_files, FileSelector, LoadOptions, LoadOutcome, SourceStore,
};

/// Load and merge every structured contribution file in `dir`.
///
/// Files are processed in path order and merged with overwrite semantics, so
/// for a date present in several files the last file wins. Any read or parse
/// failure aborts the whole load.
pub fn load_contributions(
    store: &impl SourceStore,
    dir: &Path,
    options: &LoadOptions,
) -> Result<LoadOutcome<u64>> {
    let files = select_files(store, dir, &FileSelector::structured(&options.file_prefix))?;

    let mut records = ContributionMap::new();
    for path in &files {
        let bytes = store.read(path)?;
        let text = String::from_utf8(bytes).map_err(|e| structured_error(path, e))?;
        let parsed = parse_contributions(&text, path)?;

        if options.strict_dates {
            ensure_calendar_dates(&parsed, path)?;
        }

        debug!("{}: {} dates", path.display(), parsed.len());
        records.absorb(parsed);
    }

    info!(
        "Loaded {} contribution dates from {} files in {}",
        records.len(),
        files.len(),
        dir.display()
    );

    Ok(LoadOutcome {
        records,
        files_read: files.len(),
        files_skipped: Vec::new(),
    })
}

/// Parse one structured document into a date → count map.
///
/// The document must be a flat mapping whose keys are date strings and whose
/// values are non-negative integers. An empty document yields an empty map.
pub fn parse_contributions(text: &str, path: &Path) -> Result<ContributionMap> {
    if text.trim().is_empty() {
        return Ok(ContributionMap::new());
    }

    let document: Value = serde_yaml::from_str(text).map_err(|e| structured_error(path, e))?;
    let mapping = match document {
        Value::Null => return Ok(ContributionMap::new()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(structured_error(
                path,
                format!("expected a mapping of dates to counts, found {}", kind(&other)),
            ))
        }
    };

    let mut records = ContributionMap::new();
    for (key, value) in mapping {
        let date = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                return Err(structured_error(
                    path,
                    format!("date keys must be strings, found {}", kind(&other)),
                ))
            }
        };
        let count = value.as_u64().ok_or_else(|| {
            structured_error(
                path,
                format!("count for {date} must be a non-negative integer, found {}", kind(&value)),
            )
        })?;
        records.insert(date, count);
    }

    Ok(records)
}

fn structured_error(path: &Path, message: impl ToString) -> LedgerError {
    LedgerError::StructuredParse {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FsStore, MemoryStore, UnreadableStore};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<ContributionMap> {
        parse_contributions(text, Path::new("contributions/contributions_test.yml"))
    }

    // ── parse_contributions ───────────────────────────────────────────────────

    #[test]
    fn test_parse_flat_mapping_keeps_order() {
        let map = parse("2024-01-02: 3\n2024-01-01: 5\n'2024-01-03': 0\n").unwrap();
        let pairs: Vec<(&str, u64)> = map.iter().map(|(k, v)| (k, *v)).collect();
        assert_eq!(
            pairs,
            vec![("2024-01-02", 3), ("2024-01-01", 5), ("2024-01-03", 0)]
        );
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   \n").unwrap().is_empty());
        assert!(parse("~\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_sequence() {
        let err = parse("- 2024-01-01\n- 2024-01-02\n").unwrap_err();
        assert!(matches!(err, LedgerError::StructuredParse { .. }));
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_parse_rejects_negative_count() {
        let err = parse("2024-01-01: -4\n").unwrap_err();
        assert!(err.to_string().contains("non-negative integer"));
    }

    #[test]
    fn test_parse_rejects_nested_value() {
        assert!(parse("2024-01-01:\n  count: 4\n").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_yaml() {
        assert!(matches!(
            parse("2024-01-01: [1, 2\n"),
            Err(LedgerError::StructuredParse { .. })
        ));
    }

    // ── load_contributions ────────────────────────────────────────────────────

    #[test]
    fn test_load_later_file_wins() {
        let store = MemoryStore::new()
            .with_file("c/contributions_2024a.yml", "2024-01-01: 5\n2024-01-02: 6\n")
            .with_file("c/contributions_2024b.yml", "2024-01-02: 60\n2024-01-03: 7\n");

        let outcome = load_contributions(&store, Path::new("c"), &LoadOptions::default()).unwrap();

        assert_eq!(outcome.files_read, 2);
        assert_eq!(outcome.records.get("2024-01-01"), Some(&5));
        assert_eq!(outcome.records.get("2024-01-02"), Some(&60));
        assert_eq!(outcome.records.get("2024-01-03"), Some(&7));
    }

    #[test]
    fn test_load_same_content_twice_is_idempotent() {
        let content = "2024-02-01: 2\n2024-02-02: 4\n";
        let once = MemoryStore::new().with_file("c/contributions_a.yml", content);
        let twice = MemoryStore::new()
            .with_file("c/contributions_a.yml", content)
            .with_file("c/contributions_b.yml", content);

        let a = load_contributions(&once, Path::new("c"), &LoadOptions::default()).unwrap();
        let b = load_contributions(&twice, Path::new("c"), &LoadOptions::default()).unwrap();

        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_load_ignores_unmatched_names() {
        let store = MemoryStore::new()
            .with_file("c/contributions_2024.yml", "2024-01-01: 1\n")
            .with_file("c/notes.yml", "2024-01-02: 2\n")
            .with_file("c/contributions_2024.json", "{}");

        let outcome = load_contributions(&store, Path::new("c"), &LoadOptions::default()).unwrap();
        assert_eq!(outcome.files_read, 1);
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_load_aborts_on_bad_file() {
        let store = MemoryStore::new()
            .with_file("c/contributions_1.yml", "2024-01-01: 1\n")
            .with_file("c/contributions_2.yml", "2024-01-02: many\n");

        let result = load_contributions(&store, Path::new("c"), &LoadOptions::default());
        assert!(matches!(result, Err(LedgerError::StructuredParse { .. })));
    }

    #[test]
    fn test_load_aborts_on_unreadable_file() {
        let store = UnreadableStore {
            dir: PathBuf::from("c"),
            file: PathBuf::from("c/contributions_1.yml"),
        };

        let result = load_contributions(&store, Path::new("c"), &LoadOptions::default());
        assert!(matches!(result, Err(LedgerError::FileRead { .. })));
    }

    #[test]
    fn test_load_rejects_non_utf8() {
        let store = MemoryStore::new().with_file("c/contributions_1.yml", vec![0xff, 0xfe, 0x00]);
        let result = load_contributions(&store, Path::new("c"), &LoadOptions::default());
        assert!(matches!(result, Err(LedgerError::StructuredParse { .. })));
    }

    #[test]
    fn test_load_strict_dates() {
        let store = MemoryStore::new().with_file("c/contributions_1.yml", "2024-02-30: 1\n");
        let lenient = load_contributions(&store, Path::new("c"), &LoadOptions::default());
        assert!(lenient.is_ok());

        let strict = LoadOptions {
            strict_dates: true,
            ..LoadOptions::default()
        };
        let result = load_contributions(&store, Path::new("c"), &strict);
        assert!(matches!(result, Err(LedgerError::InvalidDateKey { .. })));
    }

    #[test]
    fn test_load_missing_directory() {
        let result = load_contributions(
            &FsStore,
            Path::new("/tmp/does-not-exist-ledger-contributions"),
            &LoadOptions::default(),
        );
        assert!(matches!(result, Err(LedgerError::DataPathNotFound(_))));
    }

    #[test]
    fn test_load_from_filesystem() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("contributions_2023.yml"), "2023-12-31: 9\n").unwrap();
        std::fs::write(dir.path().join("contributions_2024.yml"), "2024-01-01: 1\n").unwrap();

        let outcome = load_contributions(&FsStore, dir.path(), &LoadOptions::default()).unwrap();
        let keys: Vec<&str> = outcome.records.keys().collect();
        assert_eq!(keys, vec!["2023-12-31", "2024-01-01"]);
    }
}
