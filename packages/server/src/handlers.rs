//! HTTP handler functions for the Fix-It map API.

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use fixit_map_aggregate::{aggregate, aggregate_by_category, count_matching, max_report_count};
use fixit_map_aggregate_models::{DatePreset, DateRange, QueryParams};
use fixit_map_report_models::{CategorySpec, ReportCategory};
use fixit_map_server_models::{
    AggregateQueryParams, AggregateResponse, ApiCategory, ApiHealth, CombinedAggregateResponse,
    CombinedCategoryRows, CombinedQueryParams, DatasetSelector, NeighborhoodsQueryParams,
    Smoothing,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/categories`
///
/// Returns every configured report category with its display metadata.
pub async fn categories(state: web::Data<AppState>) -> HttpResponse {
    let categories: Vec<ApiCategory> = state.store.specs().iter().map(ApiCategory::from).collect();
    HttpResponse::Ok().json(categories)
}

/// `GET /api/neighborhoods?category=`
///
/// Returns the distinct neighborhood labels for one category (or the
/// union dataset), title-cased and sorted. Empty for categories without
/// neighborhood support.
pub async fn neighborhoods(
    state: web::Data<AppState>,
    params: web::Query<NeighborhoodsQueryParams>,
) -> HttpResponse {
    let Some(selector) = parse_selector(&params.category) else {
        return unknown_category(&params.category);
    };

    let labels = match selector {
        DatasetSelector::All => state.store.combined_neighborhoods(),
        DatasetSelector::Category(category) => state.store.neighborhoods(category),
    };

    HttpResponse::Ok().json(labels)
}

/// `GET /api/aggregate`
///
/// Single-view aggregation: ranked clusters plus the unfiltered total and
/// the marker-sizing divisor. `category=ALL` runs the same query over the
/// flat union of the service-request datasets, so same-location reports
/// from different categories land in one cluster.
pub async fn aggregate_category(
    state: web::Data<AppState>,
    params: web::Query<AggregateQueryParams>,
) -> HttpResponse {
    let Some(selector) = parse_selector(&params.category) else {
        return unknown_category(&params.category);
    };

    let query = build_query(
        state.last_date,
        params.preset,
        params.from,
        params.to,
        params.neighborhood.clone(),
        params.smoothing,
        params.limit,
    );

    let dataset = match selector {
        DatasetSelector::All => state.store.combined(),
        DatasetSelector::Category(category) => state.store.dataset(category),
    };
    let rows = aggregate(dataset, &query);
    let total = count_matching(dataset, &query.date_range, query.neighborhood.as_deref());

    HttpResponse::Ok().json(AggregateResponse {
        category: selector,
        total_reports: total as u64,
        max_report_count: max_report_count(&rows),
        rows,
    })
}

/// `GET /api/aggregate/all`
///
/// Combined view: clusters for every category re-derived from the union
/// dataset's request-type labels.
pub async fn aggregate_all(
    state: web::Data<AppState>,
    params: web::Query<CombinedQueryParams>,
) -> HttpResponse {
    let query = build_query(
        state.last_date,
        params.preset,
        params.from,
        params.to,
        params.neighborhood.clone(),
        params.smoothing,
        params.limit,
    );

    let specs = state.store.specs();
    let by_category = aggregate_by_category(state.store.combined(), specs, &query);

    let max = by_category
        .values()
        .flatten()
        .map(|row| row.report_count)
        .max()
        .unwrap_or(1);

    let categories: Vec<CombinedCategoryRows> = by_category
        .into_iter()
        .map(|(category, rows)| CombinedCategoryRows {
            category,
            color: color_for(specs, category),
            rows,
        })
        .collect();

    HttpResponse::Ok().json(CombinedAggregateResponse {
        max_report_count: max,
        categories,
    })
}

/// Resolves the request's date window and filters into a [`QueryParams`].
///
/// A preset wins over explicit bounds; with neither, the dashboard's
/// default window (most recent 30 days) applies. A lone `from` runs to
/// the end of the data; a lone `to` starts at the all-dates floor.
fn build_query(
    last_date: NaiveDate,
    preset: Option<DatePreset>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    neighborhood: Option<String>,
    smoothing: Option<Smoothing>,
    limit: Option<usize>,
) -> QueryParams {
    let date_range = resolve_date_range(last_date, preset, from, to);

    QueryParams {
        date_range,
        neighborhood,
        smoothing_precision: smoothing.and_then(Smoothing::precision),
        limit,
    }
}

fn resolve_date_range(
    last_date: NaiveDate,
    preset: Option<DatePreset>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> DateRange {
    if let Some(preset) = preset {
        return preset.resolve(last_date);
    }

    match (from, to) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        (Some(start), None) => DateRange::new(start, last_date),
        (None, Some(end)) => DateRange::new(DatePreset::AllDates.resolve(last_date).start, end),
        (None, None) => DatePreset::Last30Days.resolve(last_date),
    }
}

fn parse_selector(value: &str) -> Option<DatasetSelector> {
    value.parse::<DatasetSelector>().ok()
}

fn color_for(specs: &[CategorySpec], category: ReportCategory) -> String {
    specs
        .iter()
        .find(|spec| spec.category == category)
        .map_or_else(String::new, |spec| spec.color.clone())
}

fn unknown_category(value: &str) -> HttpResponse {
    log::warn!("Rejected request for unknown category {value:?}");
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": format!("Unknown category: {value}")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn preset_wins_over_explicit_bounds() {
        let last = date(2025, 1, 3);
        let range = resolve_date_range(
            last,
            Some(DatePreset::Cy2024Plus),
            Some(date(2022, 1, 1)),
            Some(date(2022, 12, 31)),
        );
        assert_eq!(range, DateRange::new(date(2024, 1, 1), last));
    }

    #[test]
    fn explicit_bounds_are_used_verbatim() {
        let range = resolve_date_range(
            date(2025, 1, 3),
            None,
            Some(date(2024, 6, 1)),
            Some(date(2024, 6, 30)),
        );
        assert_eq!(range, DateRange::new(date(2024, 6, 1), date(2024, 6, 30)));
    }

    #[test]
    fn lone_from_runs_to_end_of_data() {
        let last = date(2025, 1, 3);
        let range = resolve_date_range(last, None, Some(date(2024, 6, 1)), None);
        assert_eq!(range, DateRange::new(date(2024, 6, 1), last));
    }

    #[test]
    fn no_bounds_defaults_to_last_30_days() {
        let last = date(2025, 1, 3);
        let range = resolve_date_range(last, None, None, None);
        assert_eq!(range, DatePreset::Last30Days.resolve(last));
    }

    #[test]
    fn selector_parses_screaming_snake_and_all() {
        assert_eq!(
            parse_selector("ABANDONED_VEHICLE"),
            Some(DatasetSelector::Category(ReportCategory::AbandonedVehicle))
        );
        assert_eq!(parse_selector("ALL"), Some(DatasetSelector::All));
        assert_eq!(parse_selector("POTHOLE"), None);
    }
}
