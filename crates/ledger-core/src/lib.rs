//! Shared types for the contribution ledger: the error type, the date-keyed
//! data model, calendar helpers and CLI settings.

pub mod calendar;
pub mod error;
pub mod models;
pub mod settings;
