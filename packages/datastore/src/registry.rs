//! Category registry — loads all category specs from embedded TOML configs.
//!
//! Each `.toml` file in `packages/datastore/categories/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a new category is as
//! simple as creating a new TOML file, adding it to the list below, and
//! extending the `ReportCategory` enum.

use fixit_map_report_models::CategorySpec;

/// TOML configs embedded at compile time, in display order.
const CATEGORY_TOMLS: &[(&str, &str)] = &[
    ("encampment", include_str!("../categories/encampment.toml")),
    ("dumping", include_str!("../categories/dumping.toml")),
    ("graffiti", include_str!("../categories/graffiti.toml")),
    (
        "abandoned_vehicle",
        include_str!("../categories/abandoned_vehicle.toml"),
    ),
    (
        "public_litter",
        include_str!("../categories/public_litter.toml"),
    ),
    (
        "priority_911",
        include_str!("../categories/priority_911.toml"),
    ),
];

/// Total number of configured categories (used in tests).
#[cfg(test)]
const EXPECTED_CATEGORY_COUNT: usize = 6;

/// Returns all configured category specs, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_categories() -> Vec<CategorySpec> {
    CATEGORY_TOMLS
        .iter()
        .map(|(name, toml)| {
            toml::from_str(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use fixit_map_report_models::ReportCategory;

    use super::*;

    #[test]
    fn loads_all_categories() {
        let specs = all_categories();
        assert_eq!(specs.len(), EXPECTED_CATEGORY_COUNT);
    }

    #[test]
    fn categories_are_unique_and_in_declaration_order() {
        let specs = all_categories();
        let categories: Vec<ReportCategory> = specs.iter().map(|s| s.category).collect();
        assert_eq!(categories, ReportCategory::all());
    }

    #[test]
    fn all_specs_have_required_fields() {
        for spec in &all_categories() {
            assert!(!spec.name.is_empty(), "{:?}: name is empty", spec.category);
            assert!(
                !spec.csv_file.is_empty(),
                "{:?}: csv_file is empty",
                spec.category
            );
            assert!(!spec.color.is_empty(), "{:?}: color is empty", spec.category);
        }
    }

    #[test]
    fn only_the_911_feed_lacks_neighborhoods() {
        for spec in &all_categories() {
            assert_eq!(
                spec.has_neighborhood,
                spec.category != ReportCategory::Priority911,
                "{:?}: unexpected neighborhood support",
                spec.category
            );
        }
    }
}
