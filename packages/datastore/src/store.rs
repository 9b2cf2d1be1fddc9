//! The in-memory report data store.
//!
//! Loaded once at startup from the per-category CSV exports and read-only
//! afterwards. The combined all-categories dataset is materialized at load
//! time so the request path never re-unions the sources.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use fixit_map_report_models::{CategorySpec, ReportCategory, ReportRecord};

use crate::DataError;
use crate::parse::{parse_coordinate, parse_created_date, title_case};

/// `Created Date` column header.
const COL_CREATED_DATE: &str = "Created Date";
/// `Latitude` column header.
const COL_LATITUDE: &str = "Latitude";
/// `Longitude` column header.
const COL_LONGITUDE: &str = "Longitude";
/// `Location` column header.
const COL_LOCATION: &str = "Location";
/// `Neighborhood` column header (absent in the 911 feed).
const COL_NEIGHBORHOOD: &str = "Neighborhood";
/// `Service Request Type` column header (absent in the 911 feed).
const COL_SERVICE_REQUEST_TYPE: &str = "Service Request Type";

/// Immutable, process-wide report datasets.
pub struct DataStore {
    specs: Vec<CategorySpec>,
    datasets: BTreeMap<ReportCategory, Vec<ReportRecord>>,
    combined: Vec<ReportRecord>,
}

impl DataStore {
    /// Loads every configured category export from `data_dir`.
    ///
    /// This is the only I/O the system performs; everything downstream
    /// reads the returned store by shared reference.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if a file cannot be read, a required column
    /// is missing, or any row carries an unparseable date or coordinate.
    pub fn load(data_dir: &Path, specs: &[CategorySpec]) -> Result<Self, DataError> {
        let mut datasets = BTreeMap::new();

        for spec in specs {
            let path = data_dir.join(&spec.csv_file);
            let file = File::open(&path)?;
            let records = read_records(file, &spec.csv_file)?;
            log::info!(
                "Loaded {} {} records from {}",
                records.len(),
                spec.name,
                path.display()
            );
            datasets.insert(spec.category, records);
        }

        let combined = build_combined(specs, &datasets);
        log::info!("Combined dataset holds {} records", combined.len());

        Ok(Self {
            specs: specs.to_vec(),
            datasets,
            combined,
        })
    }

    /// The category specs this store was loaded with.
    #[must_use]
    pub fn specs(&self) -> &[CategorySpec] {
        &self.specs
    }

    /// All records for one category. Empty if the category was not part of
    /// the load configuration.
    #[must_use]
    pub fn dataset(&self, category: ReportCategory) -> &[ReportRecord] {
        self.datasets.get(&category).map_or(&[], Vec::as_slice)
    }

    /// The union of every neighborhood-bearing dataset, for the combined
    /// all-categories view. The 911 feed is excluded: its records carry no
    /// `Service Request Type` to re-derive a category from.
    #[must_use]
    pub fn combined(&self) -> &[ReportRecord] {
        &self.combined
    }

    /// Distinct neighborhood labels for a category, title-cased and
    /// sorted. Empty for categories without neighborhood support.
    #[must_use]
    pub fn neighborhoods(&self, category: ReportCategory) -> Vec<String> {
        distinct_neighborhoods(self.dataset(category))
    }

    /// Distinct neighborhood labels across the combined dataset, for the
    /// union views.
    #[must_use]
    pub fn combined_neighborhoods(&self) -> Vec<String> {
        distinct_neighborhoods(&self.combined)
    }

    /// The most recent `Created Date` across all datasets, used as the
    /// anchor for relative date presets. `None` when every dataset is
    /// empty.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.datasets
            .values()
            .flatten()
            .map(|record| record.created_date)
            .max()
    }
}

fn distinct_neighborhoods(records: &[ReportRecord]) -> Vec<String> {
    let distinct: BTreeSet<String> = records
        .iter()
        .filter_map(|record| record.neighborhood.as_deref())
        .filter(|n| !n.is_empty())
        .map(title_case)
        .collect();

    distinct.into_iter().collect()
}

fn build_combined(
    specs: &[CategorySpec],
    datasets: &BTreeMap<ReportCategory, Vec<ReportRecord>>,
) -> Vec<ReportRecord> {
    specs
        .iter()
        .filter(|spec| spec.has_neighborhood)
        .filter_map(|spec| datasets.get(&spec.category))
        .flatten()
        .cloned()
        .collect()
}

/// Parses one category export into records.
///
/// `Created Date`, `Latitude`, and `Longitude` are required columns;
/// `Location`, `Neighborhood`, and `Service Request Type` are optional
/// (the 911 feed carries none of them).
///
/// # Errors
///
/// Returns [`DataError`] on malformed CSV, a missing required column, or
/// an unparseable date or coordinate field.
pub fn read_records<R: Read>(reader: R, file: &str) -> Result<Vec<ReportRecord>, DataError> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| {
        column(name).ok_or_else(|| DataError::MissingColumn {
            column: name.to_string(),
            file: file.to_string(),
        })
    };

    let created_date_idx = required(COL_CREATED_DATE)?;
    let latitude_idx = required(COL_LATITUDE)?;
    let longitude_idx = required(COL_LONGITUDE)?;
    let location_idx = column(COL_LOCATION);
    let neighborhood_idx = column(COL_NEIGHBORHOOD);
    let request_type_idx = column(COL_SERVICE_REQUEST_TYPE);

    let field = |row: &csv::StringRecord, idx: usize| row.get(idx).unwrap_or("").to_string();
    let optional_field = |row: &csv::StringRecord, idx: Option<usize>| {
        idx.map(|i| field(row, i)).filter(|v| !v.is_empty())
    };

    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;

        records.push(ReportRecord {
            created_date: parse_created_date(&field(&row, created_date_idx))?,
            latitude: parse_coordinate(&field(&row, latitude_idx))?,
            longitude: parse_coordinate(&field(&row, longitude_idx))?,
            location: optional_field(&row, location_idx).unwrap_or_default(),
            neighborhood: optional_field(&row, neighborhood_idx),
            service_request_type: optional_field(&row, request_type_idx),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSR_CSV: &str = "\
Service Request Type,Created Date,Location,Latitude,Longitude,Neighborhood
Unauthorized Encampment,2024-12-01,5th Ave & Pine St,47.6105,-122.3371,DOWNTOWN
Unauthorized Encampment,2024-12-02,Dexter Ave N,47.6242,-122.3425,SOUTH LAKE UNION
Unauthorized Encampment,2024-12-03,Dexter Ave N,47.6242,-122.3425,SOUTH LAKE UNION
";

    const CALLS_CSV: &str = "\
Created Date,Latitude,Longitude
2024-12-01,47.6097,-122.3331
2024-12-02,,
";

    #[test]
    fn reads_full_column_set() {
        let records = read_records(CSR_CSV.as_bytes(), "csr.csv").unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(
            first.created_date,
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
        assert_eq!(first.latitude, Some(47.6105));
        assert_eq!(first.longitude, Some(-122.3371));
        assert_eq!(first.location, "5th Ave & Pine St");
        assert_eq!(first.neighborhood.as_deref(), Some("DOWNTOWN"));
        assert_eq!(
            first.service_request_type.as_deref(),
            Some("Unauthorized Encampment")
        );
    }

    #[test]
    fn reads_minimal_911_column_set() {
        let records = read_records(CALLS_CSV.as_bytes(), "911.csv").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location, "");
        assert_eq!(records[0].neighborhood, None);
        assert_eq!(records[0].service_request_type, None);
        // Ungeocoded row loads with missing coordinates, not an error.
        assert_eq!(records[1].latitude, None);
        assert_eq!(records[1].longitude, None);
    }

    fn test_store() -> DataStore {
        let encampment_spec = CategorySpec {
            category: ReportCategory::Encampment,
            name: "Encampment".to_string(),
            csv_file: "csr.csv".to_string(),
            color: "blue".to_string(),
            has_neighborhood: true,
        };
        let calls_spec = CategorySpec {
            category: ReportCategory::Priority911,
            name: "911 Pri 1 & 2".to_string(),
            csv_file: "911.csv".to_string(),
            color: "yellow".to_string(),
            has_neighborhood: false,
        };

        let mut datasets = BTreeMap::new();
        datasets.insert(
            ReportCategory::Encampment,
            read_records(CSR_CSV.as_bytes(), "csr.csv").unwrap(),
        );
        datasets.insert(
            ReportCategory::Priority911,
            read_records(CALLS_CSV.as_bytes(), "911.csv").unwrap(),
        );

        let specs = vec![encampment_spec, calls_spec];
        let combined = build_combined(&specs, &datasets);

        DataStore {
            specs,
            datasets,
            combined,
        }
    }

    #[test]
    fn neighborhoods_are_distinct_title_cased_and_sorted() {
        let store = test_store();
        assert_eq!(
            store.neighborhoods(ReportCategory::Encampment),
            vec!["Downtown".to_string(), "South Lake Union".to_string()]
        );
        assert!(store.neighborhoods(ReportCategory::Priority911).is_empty());
    }

    #[test]
    fn combined_neighborhoods_span_the_union() {
        let store = test_store();
        assert_eq!(
            store.combined_neighborhoods(),
            vec!["Downtown".to_string(), "South Lake Union".to_string()]
        );
    }

    #[test]
    fn combined_excludes_the_911_feed() {
        let store = test_store();
        assert_eq!(store.combined().len(), 3);
        assert!(store
            .combined()
            .iter()
            .all(|r| r.service_request_type.is_some()));
    }

    #[test]
    fn last_date_spans_all_datasets() {
        let store = test_store();
        assert_eq!(
            store.last_date(),
            Some(NaiveDate::from_ymd_opt(2024, 12, 3).unwrap())
        );
    }

    #[test]
    fn unloaded_category_yields_empty_dataset() {
        let store = test_store();
        assert!(store.dataset(ReportCategory::Graffiti).is_empty());
    }

    #[test]
    fn missing_required_column_fails() {
        let csv = "Created Date,Latitude\n2024-12-01,47.6\n";
        let err = read_records(csv.as_bytes(), "broken.csv").unwrap_err();
        assert!(matches!(
            err,
            DataError::MissingColumn { ref column, .. } if column == "Longitude"
        ));
    }

    #[test]
    fn bad_date_fails_at_load() {
        let csv = "Created Date,Latitude,Longitude\nnot-a-date,47.6,-122.3\n";
        assert!(matches!(
            read_records(csv.as_bytes(), "bad.csv"),
            Err(DataError::InvalidDate { .. })
        ));
    }

    #[test]
    fn bad_coordinate_fails_at_load() {
        let csv = "Created Date,Latitude,Longitude\n2024-12-01,north,-122.3\n";
        assert!(matches!(
            read_records(csv.as_bytes(), "bad.csv"),
            Err(DataError::InvalidCoordinate { .. })
        ));
    }
}
