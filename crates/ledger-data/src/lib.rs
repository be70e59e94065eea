//! Data layer for the contribution ledger.
//!
//! Discovers and loads the YAML contribution files and HTML level tables,
//! joins them by date and produces the CSV export and the range report.

pub mod contributions;
pub mod csv_report;
pub mod levels;
pub mod merger;
pub mod output;
pub mod pipeline;
pub mod ranges;
pub mod source;

pub use ledger_core as core;
