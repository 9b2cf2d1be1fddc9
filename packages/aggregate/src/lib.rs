#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! The report aggregation query engine.
//!
//! Given a slice of raw report records and a [`QueryParams`], produces
//! ranked (location, report-count) clusters for the map rendering layer.
//! Stateless and synchronous: every call reads the immutable datasets and
//! allocates its own output, so concurrent requests need no coordination.
//!
//! Grouping semantics:
//!
//! - Without smoothing, records group on their exact
//!   `(location, latitude, longitude)` triple.
//! - With smoothing, records group on coordinates rounded to the requested
//!   number of decimal digits; the location label is *not* part of the key,
//!   so nearby reports with different labels merge into one cluster. Output
//!   coordinates are the arithmetic mean of the constituent raw points, not
//!   the rounded cell key.
//!
//! Rows sort by report count descending. The sort is stable over
//! first-encountered group order, and the representative label of a
//! smoothed cluster is its first-encountered constituent label, so results
//! are reproducible for a given input ordering.

use std::collections::{BTreeMap, HashMap};

use fixit_map_aggregate_models::{AggregateRow, DateRange, QueryParams};
use fixit_map_report_models::{CategorySpec, ReportCategory, ReportRecord, match_request_type};

/// Counts records matching the date window and optional neighborhood
/// filter. Used for the "N reports in timeframe" display, independent of
/// any result limit or coordinate validity.
#[must_use]
pub fn count_matching(
    records: &[ReportRecord],
    date_range: &DateRange,
    neighborhood: Option<&str>,
) -> usize {
    records
        .iter()
        .filter(|record| matches_filters(record, date_range, neighborhood))
        .count()
}

/// Aggregates records into ranked clusters per [`QueryParams`].
///
/// Records without a renderable point (missing coordinates, or one of the
/// `(0, 0)` / `(-1, -1)` missing-geocode sentinels) are discarded before
/// grouping. An empty result is a normal outcome, not an error.
#[must_use]
pub fn aggregate(records: &[ReportRecord], params: &QueryParams) -> Vec<AggregateRow> {
    let mut groups = Grouping::new(params.smoothing_precision);

    for record in records {
        if !matches_filters(record, &params.date_range, params.neighborhood.as_deref()) {
            continue;
        }
        let Some((latitude, longitude)) = renderable_point(record) else {
            continue;
        };
        groups.add(record, latitude, longitude);
    }

    groups.into_rows(params.limit)
}

/// Aggregates a combined multi-category dataset, re-deriving each record's
/// category from its `Service Request Type` label.
///
/// The first spec (in `specs` order) whose name is a case-insensitive
/// substring of the label wins; records matching no spec are dropped
/// silently. Category is folded into the grouping key, and sorting and the
/// result limit apply within each category.
#[must_use]
pub fn aggregate_by_category(
    records: &[ReportRecord],
    specs: &[CategorySpec],
    params: &QueryParams,
) -> BTreeMap<ReportCategory, Vec<AggregateRow>> {
    let mut per_category: BTreeMap<ReportCategory, Grouping> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        if !matches_filters(record, &params.date_range, params.neighborhood.as_deref()) {
            continue;
        }
        let Some((latitude, longitude)) = renderable_point(record) else {
            continue;
        };
        let category = record
            .service_request_type
            .as_deref()
            .and_then(|label| match_request_type(specs, label));
        let Some(category) = category else {
            dropped += 1;
            continue;
        };

        per_category
            .entry(category)
            .or_insert_with(|| Grouping::new(params.smoothing_precision))
            .add(record, latitude, longitude);
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} records with unrecognized request types");
    }

    per_category
        .into_iter()
        .map(|(category, groups)| (category, groups.into_rows(params.limit)))
        .collect()
}

/// The largest report count across `rows`, defaulting to 1 when `rows` is
/// empty so marker-sizing divisions never hit zero.
#[must_use]
pub fn max_report_count(rows: &[AggregateRow]) -> u64 {
    rows.iter().map(|row| row.report_count).max().unwrap_or(1)
}

fn matches_filters(
    record: &ReportRecord,
    date_range: &DateRange,
    neighborhood: Option<&str>,
) -> bool {
    if !date_range.contains(record.created_date) {
        return false;
    }

    neighborhood.is_none_or(|filter| {
        record
            .neighborhood
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case(filter))
    })
}

/// Returns the record's coordinates if they are renderable. `(0, 0)` and
/// `(-1, -1)` are missing-geocode placeholders in the source exports and
/// must never appear on the map, directly or via averaging.
#[allow(clippy::float_cmp)]
fn renderable_point(record: &ReportRecord) -> Option<(f64, f64)> {
    let (latitude, longitude) = (record.latitude?, record.longitude?);

    let sentinel = (latitude == 0.0 && longitude == 0.0)
        || (latitude == -1.0 && longitude == -1.0);

    (!sentinel).then_some((latitude, longitude))
}

/// Grouping key for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    /// Exact `(location, latitude-bits, longitude-bits)` triple.
    Exact(String, u64, u64),
    /// Rounded coordinate cell at the requested precision.
    Cell(i64, i64),
}

/// Accumulated state for one cluster.
struct Group {
    /// First-encountered constituent label.
    location: String,
    /// Exact coordinates of the first constituent (unsmoothed output).
    first_point: (f64, f64),
    /// Coordinate sums for the smoothed mean.
    latitude_sum: f64,
    longitude_sum: f64,
    count: u64,
}

/// Insertion-ordered cluster accumulation.
///
/// Groups keep first-encountered order in `groups`; `index` maps each key
/// to its slot. The stable descending sort in [`Grouping::into_rows`]
/// therefore breaks count ties by first-encountered order.
struct Grouping {
    smoothing_precision: Option<u32>,
    index: HashMap<GroupKey, usize>,
    groups: Vec<Group>,
}

impl Grouping {
    fn new(smoothing_precision: Option<u32>) -> Self {
        Self {
            smoothing_precision,
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn add(&mut self, record: &ReportRecord, latitude: f64, longitude: f64) {
        let key = self.smoothing_precision.map_or_else(
            || {
                GroupKey::Exact(
                    record.location.clone(),
                    latitude.to_bits(),
                    longitude.to_bits(),
                )
            },
            |precision| {
                GroupKey::Cell(
                    scale_coordinate(latitude, precision),
                    scale_coordinate(longitude, precision),
                )
            },
        );

        let slot = *self.index.entry(key).or_insert_with(|| {
            self.groups.push(Group {
                location: record.location.clone(),
                first_point: (latitude, longitude),
                latitude_sum: 0.0,
                longitude_sum: 0.0,
                count: 0,
            });
            self.groups.len() - 1
        });

        let group = &mut self.groups[slot];
        group.latitude_sum += latitude;
        group.longitude_sum += longitude;
        group.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn into_rows(self, limit: Option<usize>) -> Vec<AggregateRow> {
        let smoothed = self.smoothing_precision.is_some();

        let mut rows: Vec<AggregateRow> = self
            .groups
            .into_iter()
            .map(|group| {
                let (latitude, longitude) = if smoothed {
                    let divisor = group.count as f64;
                    (group.latitude_sum / divisor, group.longitude_sum / divisor)
                } else {
                    group.first_point
                };

                AggregateRow {
                    location: group.location,
                    latitude,
                    longitude,
                    report_count: group.count,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.report_count.cmp(&a.report_count));

        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        rows
    }
}

/// Scales a coordinate to an integer cell index at `precision` decimal
/// digits. Integer keys keep rounded cells exactly comparable, which raw
/// `f64` keys would not be.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn scale_coordinate(value: f64, precision: u32) -> i64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() as i64
}
