#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the Fix-It map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the core aggregation types to allow independent evolution of the
//! API contract.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use fixit_map_aggregate_models::{AggregateRow, DatePreset};
use fixit_map_report_models::{CategorySpec, ReportCategory};
use serde::{Deserialize, Serialize, Serializer};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// One configured report category as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    /// Category identifier.
    pub category: ReportCategory,
    /// Human-readable display name.
    pub name: String,
    /// Marker color for the rendering layer.
    pub color: String,
    /// Whether the category supports neighborhood filtering.
    pub has_neighborhood: bool,
}

impl From<&CategorySpec> for ApiCategory {
    fn from(spec: &CategorySpec) -> Self {
        Self {
            category: spec.category,
            name: spec.name.clone(),
            color: spec.color.clone(),
            has_neighborhood: spec.has_neighborhood,
        }
    }
}

/// The dataset a single-view aggregate query runs against: one concrete
/// category, or `ALL` for the union of every service-request export
/// aggregated flat, with no category dimension (the dashboard's
/// "All Fix-It Data" table choice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSelector {
    /// The flat union of the service-request datasets.
    All,
    /// A single category's dataset.
    Category(ReportCategory),
}

impl FromStr for DatasetSelector {
    type Err = strum::ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("ALL") {
            return Ok(Self::All);
        }
        value.parse::<ReportCategory>().map(Self::Category)
    }
}

impl fmt::Display for DatasetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Category(category) => write!(f, "{category}"),
        }
    }
}

impl Serialize for DatasetSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The location-smoothing levels offered by the dashboard's segmented
/// control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Smoothing {
    /// Group on exact coordinates.
    None,
    /// Round coordinates to 3 decimal digits (roughly a city block).
    ALittle,
    /// Round coordinates to 2 decimal digits.
    More,
}

impl Smoothing {
    /// The coordinate rounding precision for this level, or `None` for
    /// exact-coordinate grouping.
    #[must_use]
    pub const fn precision(self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::ALittle => Some(3),
            Self::More => Some(2),
        }
    }
}

/// Query parameters for the neighborhoods endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodsQueryParams {
    /// Category identifier (e.g. `"ENCAMPMENT"`), or `"ALL"` for the
    /// union dataset.
    pub category: String,
}

/// Query parameters for the single-category aggregate endpoint.
///
/// The date window comes from `preset` when present, otherwise from the
/// explicit `from`/`to` bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateQueryParams {
    /// Category identifier (e.g. `"ENCAMPMENT"`), or `"ALL"` for the
    /// union dataset.
    pub category: String,
    /// Date-range preset, resolved against the last date in the data.
    pub preset: Option<DatePreset>,
    /// Explicit window start (ignored when `preset` is set).
    pub from: Option<NaiveDate>,
    /// Explicit window end (ignored when `preset` is set).
    pub to: Option<NaiveDate>,
    /// Exact-match neighborhood filter (case-insensitive).
    pub neighborhood: Option<String>,
    /// Location smoothing level.
    pub smoothing: Option<Smoothing>,
    /// Cap on returned rows; omit for everything.
    pub limit: Option<usize>,
}

/// Query parameters for the combined all-categories endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedQueryParams {
    /// Date-range preset, resolved against the last date in the data.
    pub preset: Option<DatePreset>,
    /// Explicit window start (ignored when `preset` is set).
    pub from: Option<NaiveDate>,
    /// Explicit window end (ignored when `preset` is set).
    pub to: Option<NaiveDate>,
    /// Exact-match neighborhood filter (case-insensitive).
    pub neighborhood: Option<String>,
    /// Location smoothing level.
    pub smoothing: Option<Smoothing>,
    /// Cap on returned rows per category; omit for everything.
    pub limit: Option<usize>,
}

/// Response from the single-category aggregate endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResponse {
    /// The queried dataset.
    pub category: DatasetSelector,
    /// Total records matching the date/neighborhood filter, before any
    /// limit or coordinate-validity filtering. Display-only.
    pub total_reports: u64,
    /// Largest `reportCount` across `rows`, at least 1. The marker-sizing
    /// divisor.
    pub max_report_count: u64,
    /// Ranked clusters.
    pub rows: Vec<AggregateRow>,
}

/// One category's clusters within the combined view response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedCategoryRows {
    /// Category identifier.
    pub category: ReportCategory,
    /// Marker color for this category's clusters.
    pub color: String,
    /// Ranked clusters for this category.
    pub rows: Vec<AggregateRow>,
}

/// Response from the combined all-categories endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedAggregateResponse {
    /// Largest `reportCount` across every category's rows, at least 1.
    pub max_report_count: u64,
    /// Per-category clusters, in category declaration order.
    pub categories: Vec<CombinedCategoryRows>,
}
