#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! One-time CSV dataset loading for the Fix-It map.
//!
//! [`DataStore::load`] reads every configured category export into memory
//! exactly once, up front. The store is read-only for the rest of the
//! process lifetime, so aggregation requests can share it freely without
//! coordination.
//!
//! Malformed rows are rejected here, at load time, so the aggregation
//! core can assume clean input.

pub mod parse;
pub mod registry;
pub mod store;

pub use registry::all_categories;
pub use store::DataStore;

/// Errors that can occur while loading report datasets.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// File open or read error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV structure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column header is missing from a dataset.
    #[error("{file}: missing required column \"{column}\"")]
    MissingColumn {
        /// The missing header name.
        column: String,
        /// The dataset file the header was expected in.
        file: String,
    },

    /// A `Created Date` value could not be parsed.
    #[error("unparseable created date: {value:?}")]
    InvalidDate {
        /// The offending field text.
        value: String,
    },

    /// A non-empty coordinate field was not numeric.
    #[error("non-numeric coordinate: {value:?}")]
    InvalidCoordinate {
        /// The offending field text.
        value: String,
    },
}
