//! Level loader: `contributions_*.html` calendar tables whose `td` cells carry
//! `data-date` and `data-level` attributes.

use std::path::{Path, PathBuf};

use ledger_core::error::{LedgerError, Result};
use ledger_core::models::LevelMap;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info, warn};

use crate::source::{
    ensure_calendar_dates, select_files, FileSelector, LoadOptions, LoadOutcome, SourceStore,
};

const CELL_TAG: &[u8] = b"td";
const DATE_ATTR: &[u8] = b"data-date";
const LEVEL_ATTR: &[u8] = b"data-level";

/// Load and merge every markup level file in `dir`.
///
/// A file whose markup cannot be parsed is logged and skipped unless
/// `options.strict_markup` is set. Directory and read failures always abort.
pub fn load_levels(
    store: &impl SourceStore,
    dir: &Path,
    options: &LoadOptions,
) -> Result<LoadOutcome<u32>> {
    let files = select_files(store, dir, &FileSelector::markup(&options.file_prefix))?;

    let mut records = LevelMap::new();
    let mut files_read = 0usize;
    let mut files_skipped: Vec<PathBuf> = Vec::new();

    for path in &files {
        let bytes = store.read(path)?;
        let parsed = match decode(bytes, path).and_then(|text| parse_levels(&text, path)) {
            Ok(parsed) => parsed,
            Err(err) if err.is_recoverable() && !options.strict_markup => {
                warn!("Skipping {}: {}", path.display(), err);
                files_skipped.push(path.clone());
                continue;
            }
            Err(err) => return Err(err),
        };

        if options.strict_dates {
            ensure_calendar_dates(&parsed, path)?;
        }

        debug!("{}: {} dated cells", path.display(), parsed.len());
        records.absorb(parsed);
        files_read += 1;
    }

    info!(
        "Loaded {} level dates from {} files in {} ({} skipped)",
        records.len(),
        files_read,
        dir.display(),
        files_skipped.len()
    );

    Ok(LoadOutcome {
        records,
        files_read,
        files_skipped,
    })
}

/// Extract `(data-date, data-level)` pairs from every `td` element of a
/// markup document.
///
/// Cells missing either attribute, with an empty one, or with a value that
/// cannot be decoded are ignored. A level that is not a base-10 integer is
/// ignored as well. When tokenizing fails partway, the cells read before the
/// failure are kept; [`LedgerError::MarkupParse`] is returned only when the
/// document yields no cells at all.
pub fn parse_levels(text: &str, path: &Path) -> Result<LevelMap> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut levels = LevelMap::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) | Ok(Event::Empty(tag)) => {
                if !tag.name().as_ref().eq_ignore_ascii_case(CELL_TAG) {
                    continue;
                }
                let Some((date, raw_level)) = cell_attributes(&tag) else {
                    continue;
                };
                match raw_level.trim().parse::<u32>() {
                    Ok(level) => {
                        levels.insert(date, level);
                    }
                    Err(_) => debug!(
                        "{}: ignoring non-numeric level {:?} for {}",
                        path.display(),
                        raw_level,
                        date
                    ),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                let message = format!("at byte {}: {}", reader.buffer_position(), e);
                if levels.is_empty() {
                    return Err(markup_error(path, message));
                }
                warn!(
                    "{}: keeping {} cells read before markup error {}",
                    path.display(),
                    levels.len(),
                    message
                );
                break;
            }
        }
    }

    Ok(levels)
}

/// Date and level attribute values of a cell, when both are present,
/// decodable and non-empty.
fn cell_attributes(tag: &BytesStart<'_>) -> Option<(String, String)> {
    let mut date: Option<String> = None;
    let mut level: Option<String> = None;

    let mut attributes = tag.html_attributes();
    attributes.with_checks(false);
    for attribute in attributes {
        let attribute = attribute.ok()?;
        let key = attribute.key.as_ref();
        let slot = if key.eq_ignore_ascii_case(DATE_ATTR) {
            &mut date
        } else if key.eq_ignore_ascii_case(LEVEL_ATTR) {
            &mut level
        } else {
            continue;
        };
        *slot = attribute
            .unescape_value_with(resolve_html5_entity)
            .ok()
            .map(|value| value.into_owned());
    }

    match (date, level) {
        (Some(date), Some(level)) if !date.is_empty() && !level.is_empty() => Some((date, level)),
        _ => None,
    }
}

fn decode(bytes: Vec<u8>, path: &Path) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| markup_error(path, e))
}

fn markup_error(path: &Path, message: impl ToString) -> LedgerError {
    LedgerError::MarkupParse {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
