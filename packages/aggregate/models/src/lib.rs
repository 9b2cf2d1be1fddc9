#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Query parameter and result row types for report aggregation.
//!
//! These are per-request values: a [`QueryParams`] is built from the
//! caller's filter selections, handed to the aggregation core, and
//! discarded along with its [`AggregateRow`]s once rendered.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// An inclusive calendar date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day of the window.
    pub start: NaiveDate,
    /// Last day of the window.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates an inclusive `[start, end]` window.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// The date-range presets offered by the dashboard's segmented control.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DatePreset {
    /// Everything since the start of data collection.
    AllDates,
    /// Calendar year 2024 onwards.
    Cy2024Plus,
    /// The 90 days ending on the last date in the data.
    Last90Days,
    /// The 30 days ending on the last date in the data.
    Last30Days,
}

/// Floor date for the all-dates preset; no export predates it.
const ALL_DATES_START: (i32, u32, u32) = (2020, 1, 1);
/// Floor date for the CY2024+ preset.
const CY2024_START: (i32, u32, u32) = (2024, 1, 1);

impl DatePreset {
    /// Resolves the preset against the last date present in the data.
    ///
    /// # Panics
    ///
    /// Panics if a preset floor constant is not a valid calendar date,
    /// which cannot happen for the values above.
    #[must_use]
    pub fn resolve(self, last_date: NaiveDate) -> DateRange {
        let ymd = |(y, m, d): (i32, u32, u32)| {
            NaiveDate::from_ymd_opt(y, m, d).expect("preset floor is a valid date")
        };

        let start = match self {
            Self::AllDates => ymd(ALL_DATES_START),
            Self::Cy2024Plus => ymd(CY2024_START),
            Self::Last90Days => last_date - Duration::days(90),
            Self::Last30Days => last_date - Duration::days(30),
        };

        DateRange::new(start, last_date)
    }
}

/// One aggregation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// Inclusive date window.
    pub date_range: DateRange,
    /// Optional exact-match neighborhood filter. Comparison ignores ASCII
    /// case, so `"South Lake Union"` matches records stored as
    /// `"SOUTH LAKE UNION"`.
    pub neighborhood: Option<String>,
    /// Number of decimal digits to round coordinates to before grouping.
    /// `None` groups on exact coordinates.
    pub smoothing_precision: Option<u32>,
    /// Cap on returned rows, applied after sorting. `None` is unlimited.
    pub limit: Option<usize>,
}

impl QueryParams {
    /// Creates params for `date_range` with no neighborhood filter, no
    /// smoothing, and no limit.
    #[must_use]
    pub const fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            neighborhood: None,
            smoothing_precision: None,
            limit: None,
        }
    }

    /// Sets the neighborhood filter.
    #[must_use]
    pub fn with_neighborhood(mut self, neighborhood: &str) -> Self {
        self.neighborhood = Some(neighborhood.to_owned());
        self
    }

    /// Sets the smoothing precision (decimal digits).
    #[must_use]
    pub const fn with_smoothing(mut self, precision: u32) -> Self {
        self.smoothing_precision = Some(precision);
        self
    }

    /// Sets the result limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One output cluster: a location, coordinates, and a report count.
///
/// Rows are ordered by `report_count` descending; ties keep the order in
/// which the groups were first encountered in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    /// A location label for the cluster. When smoothing merges several
    /// raw locations this is the first-encountered constituent label.
    pub location: String,
    /// Exact latitude when unsmoothed; arithmetic mean of constituent
    /// points when smoothed.
    pub latitude: f64,
    /// Exact longitude when unsmoothed; mean of constituents when
    /// smoothed.
    pub longitude: f64,
    /// Number of constituent reports, always at least 1.
    pub report_count: u64,
}
