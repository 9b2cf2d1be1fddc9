#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Report category taxonomy and raw record types for the Fix-It map.
//!
//! This crate defines the canonical set of Seattle "Find It, Fix It"
//! service-request categories and the shape of a single raw report row.
//! Every dashboard view works against these shared types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The supported service-request categories.
///
/// Declaration order is significant: it is the iteration order of
/// [`ReportCategory::all()`] and therefore the tie-break order when a
/// free-text request type matches more than one category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportCategory {
    /// Unauthorized encampment reports
    Encampment,
    /// Illegal dumping reports
    Dumping,
    /// Graffiti reports
    Graffiti,
    /// Abandoned vehicle reports
    AbandonedVehicle,
    /// Overflowing or littered public receptacles
    PublicLitter,
    /// 911 priority 1 and 2 calls
    Priority911,
}

impl ReportCategory {
    /// Returns all variants in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Encampment,
            Self::Dumping,
            Self::Graffiti,
            Self::AbandonedVehicle,
            Self::PublicLitter,
            Self::Priority911,
        ]
    }
}

/// Static configuration for one report category.
///
/// One spec exists per [`ReportCategory`], loaded from an embedded TOML
/// registry at process start and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    /// The category this spec configures.
    pub category: ReportCategory,
    /// Human-readable display name (e.g. `"Abandoned Vehicle"`). Also the
    /// needle for cross-category request-type matching.
    pub name: String,
    /// Source CSV filename relative to the data directory.
    pub csv_file: String,
    /// Marker color for the map rendering layer.
    pub color: String,
    /// Whether the source dataset carries a `Neighborhood` column. The 911
    /// call feed does not.
    pub has_neighborhood: bool,
}

/// One raw report row, as loaded from a category's CSV export.
///
/// Sourced externally and never mutated by the aggregation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    /// Calendar date the report was created.
    pub created_date: NaiveDate,
    /// Latitude, if the record was geocoded.
    pub latitude: Option<f64>,
    /// Longitude, if the record was geocoded.
    pub longitude: Option<f64>,
    /// Free-text location label.
    pub location: String,
    /// Neighborhood label, absent for datasets without the column.
    pub neighborhood: Option<String>,
    /// Free-text service request type. Only present in datasets that feed
    /// the combined all-categories view.
    pub service_request_type: Option<String>,
}

/// Re-derives the category for a free-text `Service Request Type` label.
///
/// Each spec's display name is matched case-insensitively as a substring
/// of the label; the first match in `specs` order wins. Returns `None`
/// when no spec matches, in which case the record is dropped from the
/// combined view.
#[must_use]
pub fn match_request_type(specs: &[CategorySpec], request_type: &str) -> Option<ReportCategory> {
    let haystack = request_type.to_lowercase();
    specs
        .iter()
        .find(|spec| haystack.contains(&spec.name.to_lowercase()))
        .map(|spec| spec.category)
}
