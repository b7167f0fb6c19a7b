//! Filtering, sorting, and derived views.
//!
//! Everything here is pure and synchronous: functions over a slice of
//! drinks plus a predicate/sort configuration, safe to call repeatedly
//! from the state container.

use std::collections::{BTreeMap, BTreeSet};

use common::{AvailabilityStatus, Drink, SortOrder};

/// The active predicate set.
///
/// Predicates are independent; an empty/unset predicate passes
/// everything. Category counts are always computed over the unfiltered
/// set, and style options over the category-filtered set only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub category: Option<String>,
    /// OR semantics: a drink passes if its style is any member.
    pub styles: BTreeSet<String>,
    pub search: String,
    pub favorites_only: bool,
    pub hide_unavailable: bool,
}

impl FilterState {
    pub fn matches(&self, drink: &Drink) -> bool {
        // 1. Category: exact match.
        if let Some(category) = &self.category {
            if drink.product.category != *category {
                return false;
            }
        }

        // 2. Styles: OR over the selected set.
        if !self.styles.is_empty() {
            match &drink.product.style {
                Some(style) if self.styles.contains(style) => {}
                _ => return false,
            }
        }

        // 3. Favorites only.
        if self.favorites_only && !drink.is_favorite {
            return false;
        }

        // 4. Hide unavailable: sold-out and not-yet-available drop out;
        //    low, plenty, and no-status pass.
        if self.hide_unavailable
            && matches!(
                drink.availability(),
                Some(AvailabilityStatus::Out | AvailabilityStatus::NotYetAvailable)
            )
        {
            return false;
        }

        // 5. Search: case-insensitive substring over name, brewery,
        //    style, and notes.
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            let haystack = format!(
                "{} {} {} {}",
                drink.product.name,
                drink.producer_name,
                drink.product.style.as_deref().unwrap_or(""),
                drink.product.notes.as_deref().unwrap_or(""),
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }

        true
    }
}

fn sort_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Sort in place. All sorts are stable: equal keys keep input order.
pub fn sort_drinks(drinks: &mut [Drink], sort: SortOrder) {
    match sort {
        SortOrder::NameAsc => {
            drinks.sort_by(|a, b| sort_key(a.name()).cmp(&sort_key(b.name())));
        }
        SortOrder::NameDesc => {
            drinks.sort_by(|a, b| sort_key(b.name()).cmp(&sort_key(a.name())));
        }
        SortOrder::AbvHigh => {
            drinks.sort_by(|a, b| b.product.abv.total_cmp(&a.product.abv));
        }
        SortOrder::AbvLow => {
            drinks.sort_by(|a, b| a.product.abv.total_cmp(&b.product.abv));
        }
        SortOrder::Brewery => {
            drinks.sort_by(|a, b| sort_key(&a.producer_name).cmp(&sort_key(&b.producer_name)));
        }
        SortOrder::Style => {
            // Absent style sorts before every named style.
            drinks.sort_by(|a, b| {
                let ka = sort_key(a.product.style.as_deref().unwrap_or(""));
                let kb = sort_key(b.product.style.as_deref().unwrap_or(""));
                ka.cmp(&kb)
            });
        }
    }
}

/// The ordered visible subset for a filter/sort configuration.
pub fn visible(drinks: &[Drink], filter: &FilterState, sort: SortOrder) -> Vec<Drink> {
    let mut out: Vec<Drink> = drinks.iter().filter(|d| filter.matches(d)).cloned().collect();
    sort_drinks(&mut out, sort);
    out
}

/// Distinct categories across the unfiltered set.
pub fn available_categories(drinks: &[Drink]) -> Vec<String> {
    let set: BTreeSet<&str> = drinks.iter().map(|d| d.product.category.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Per-category counts over the unfiltered set.
pub fn category_counts(drinks: &[Drink]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for drink in drinks {
        *counts.entry(drink.product.category.clone()).or_insert(0) += 1;
    }
    counts
}

/// Distinct styles among drinks matching the category filter only, so a
/// style picker reflects what is reachable after narrowing by category.
pub fn available_styles(drinks: &[Drink], category: Option<&str>) -> Vec<String> {
    let mut set = BTreeSet::new();
    for drink in drinks {
        if let Some(category) = category {
            if drink.product.category != category {
                continue;
            }
        }
        if let Some(style) = &drink.product.style {
            if !style.trim().is_empty() {
                set.insert(style.clone());
            }
        }
    }
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Product;

    fn make_drink(id: &str, name: &str, producer: &str, category: &str) -> Drink {
        Drink {
            festival_id: "fest".into(),
            producer_id: format!("b-{producer}"),
            producer_name: producer.into(),
            producer_location: String::new(),
            producer_year_founded: None,
            product: Product {
                id: id.into(),
                name: name.into(),
                category: category.into(),
                style: None,
                dispense: "cask".into(),
                abv: 4.0,
                notes: None,
                status_text: None,
                bar: None,
                allergens: Default::default(),
            },
            is_favorite: false,
            rating: None,
        }
    }

    fn with_style(mut drink: Drink, style: &str) -> Drink {
        drink.product.style = Some(style.into());
        drink
    }

    fn with_abv(mut drink: Drink, abv: f64) -> Drink {
        drink.product.abv = abv;
        drink
    }

    fn with_status(mut drink: Drink, status: &str) -> Drink {
        drink.product.status_text = Some(status.into());
        drink
    }

    fn sample_set() -> Vec<Drink> {
        vec![
            with_style(make_drink("p1", "Citra", "Oakham", "beer"), "Pale Ale"),
            with_style(make_drink("p2", "Old Peculier", "Theakston", "beer"), "Old Ale"),
            with_status(
                with_style(make_drink("p3", "Dry Cider", "Westons", "cider"), "Dry"),
                "Sold out",
            ),
            make_drink("p4", "Mystery Cask", "Oakham", "beer"),
            with_style(make_drink("p5", "Bramling X", "Theakston", "beer"), "Pale Ale"),
        ]
    }

    fn ids(drinks: &[Drink]) -> Vec<&str> {
        drinks.iter().map(|d| d.product.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_passes_everything() {
        let drinks = sample_set();
        let result = visible(&drinks, &FilterState::default(), SortOrder::NameAsc);
        assert_eq!(result.len(), drinks.len());
    }

    #[test]
    fn category_filter_is_exact() {
        let drinks = sample_set();
        let filter = FilterState {
            category: Some("cider".into()),
            ..Default::default()
        };
        assert_eq!(ids(&visible(&drinks, &filter, SortOrder::NameAsc)), ["p3"]);
    }

    #[test]
    fn style_filter_is_or_over_the_set() {
        let drinks = sample_set();
        let mut filter = FilterState::default();
        filter.styles.insert("Pale Ale".into());
        filter.styles.insert("Old Ale".into());

        let result = visible(&drinks, &filter, SortOrder::NameAsc);
        // p4 has no style and cannot match a non-empty style set.
        assert_eq!(ids(&result), ["p5", "p1", "p2"]);
    }

    #[test]
    fn favorites_filter() {
        let mut drinks = sample_set();
        drinks[1].is_favorite = true;
        let filter = FilterState {
            favorites_only: true,
            ..Default::default()
        };
        assert_eq!(ids(&visible(&drinks, &filter, SortOrder::NameAsc)), ["p2"]);
    }

    #[test]
    fn hide_unavailable_drops_out_and_not_yet() {
        let mut drinks = sample_set();
        drinks[0].product.status_text = Some("Not yet available".into());
        drinks[1].product.status_text = Some("Running low".into());
        drinks[3].product.status_text = Some("Plenty".into());

        let filter = FilterState {
            hide_unavailable: true,
            ..Default::default()
        };
        // p1 (not yet) and p3 (sold out) drop; low/plenty/no-status stay.
        assert_eq!(ids(&visible(&drinks, &filter, SortOrder::NameAsc)), ["p5", "p4", "p2"]);
    }

    #[test]
    fn search_spans_name_brewery_style_and_notes() {
        let mut drinks = sample_set();
        drinks[3].product.notes = Some("Brewed with Citra hops".into());

        let search = |text: &str| FilterState {
            search: text.into(),
            ..Default::default()
        };

        assert_eq!(ids(&visible(&drinks, &search("citra"), SortOrder::NameAsc)), ["p1", "p4"]);
        assert_eq!(
            ids(&visible(&drinks, &search("THEAKSTON"), SortOrder::NameAsc)),
            ["p5", "p2"]
        );
        assert_eq!(ids(&visible(&drinks, &search("old ale"), SortOrder::NameAsc)), ["p2"]);
        assert!(visible(&drinks, &search("no such thing"), SortOrder::NameAsc).is_empty());
    }

    #[test]
    fn adding_a_predicate_never_grows_the_result() {
        let mut drinks = sample_set();
        drinks[0].is_favorite = true;
        drinks[2].is_favorite = true;

        let base = FilterState::default();
        let narrowings: Vec<FilterState> = vec![
            FilterState {
                category: Some("beer".into()),
                ..base.clone()
            },
            FilterState {
                styles: ["Pale Ale".to_string()].into_iter().collect(),
                ..base.clone()
            },
            FilterState {
                favorites_only: true,
                ..base.clone()
            },
            FilterState {
                hide_unavailable: true,
                ..base.clone()
            },
            FilterState {
                search: "cask".into(),
                ..base.clone()
            },
        ];

        let full = visible(&drinks, &base, SortOrder::NameAsc).len();
        for narrowed in narrowings {
            assert!(visible(&drinks, &narrowed, SortOrder::NameAsc).len() <= full);
        }
    }

    #[test]
    fn every_sort_is_a_permutation() {
        let drinks = sample_set();
        let mut expected: Vec<&str> = drinks.iter().map(|d| d.product.id.as_str()).collect();
        expected.sort();

        for sort in [
            SortOrder::NameAsc,
            SortOrder::NameDesc,
            SortOrder::AbvHigh,
            SortOrder::AbvLow,
            SortOrder::Brewery,
            SortOrder::Style,
        ] {
            let sorted = visible(&drinks, &FilterState::default(), sort);
            let mut got = ids(&sorted);
            got.sort();
            assert_eq!(got, expected, "{:?} must permute, not drop", sort);
        }
    }

    #[test]
    fn name_sort_orders_both_ways() {
        let drinks = sample_set();
        let asc = visible(&drinks, &FilterState::default(), SortOrder::NameAsc);
        assert_eq!(ids(&asc), ["p5", "p1", "p3", "p4", "p2"]);

        let desc = visible(&drinks, &FilterState::default(), SortOrder::NameDesc);
        assert_eq!(ids(&desc), ["p2", "p4", "p3", "p1", "p5"]);
    }

    #[test]
    fn abv_sort_orders_numerically() {
        let drinks = vec![
            with_abv(make_drink("p1", "A", "X", "beer"), 4.1),
            with_abv(make_drink("p2", "B", "X", "beer"), 7.2),
            with_abv(make_drink("p3", "C", "X", "beer"), 0.5),
        ];
        assert_eq!(
            ids(&visible(&drinks, &FilterState::default(), SortOrder::AbvHigh)),
            ["p2", "p1", "p3"]
        );
        assert_eq!(
            ids(&visible(&drinks, &FilterState::default(), SortOrder::AbvLow)),
            ["p3", "p1", "p2"]
        );
    }

    #[test]
    fn equal_keys_preserve_input_order() {
        let drinks = vec![
            with_abv(make_drink("p1", "Same", "X", "beer"), 4.0),
            with_abv(make_drink("p2", "Same", "X", "beer"), 4.0),
            with_abv(make_drink("p3", "Same", "X", "beer"), 4.0),
        ];
        for sort in [
            SortOrder::NameAsc,
            SortOrder::NameDesc,
            SortOrder::AbvHigh,
            SortOrder::AbvLow,
            SortOrder::Brewery,
            SortOrder::Style,
        ] {
            assert_eq!(
                ids(&visible(&drinks, &FilterState::default(), sort)),
                ["p1", "p2", "p3"],
                "{:?} must be stable",
                sort
            );
        }
    }

    #[test]
    fn style_sort_puts_absent_style_first() {
        let drinks = vec![
            with_style(make_drink("p1", "A", "X", "beer"), "Stout"),
            make_drink("p2", "B", "X", "beer"),
            with_style(make_drink("p3", "C", "X", "beer"), "Bitter"),
        ];
        assert_eq!(
            ids(&visible(&drinks, &FilterState::default(), SortOrder::Style)),
            ["p2", "p3", "p1"]
        );
    }

    #[test]
    fn derived_views_reflect_the_right_subsets() {
        let drinks = sample_set();

        assert_eq!(available_categories(&drinks), ["beer", "cider"]);

        let counts = category_counts(&drinks);
        assert_eq!(counts["beer"], 4);
        assert_eq!(counts["cider"], 1);

        // Styles are scoped by category only, regardless of other filters.
        assert_eq!(
            available_styles(&drinks, Some("beer")),
            ["Old Ale", "Pale Ale"]
        );
        assert_eq!(available_styles(&drinks, Some("cider")), ["Dry"]);
        assert_eq!(
            available_styles(&drinks, None),
            ["Dry", "Old Ale", "Pale Ale"]
        );
    }
}
