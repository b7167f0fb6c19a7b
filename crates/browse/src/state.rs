//! Browse session state.
//!
//! The single mutable aggregate behind the UI: current festival, the
//! fetched drink list, active filters, and load/error flags. All
//! mutation goes through methods that bump a version counter so
//! observers can cheaply detect change. Fetch failures are stored as
//! fixed user-facing strings; raw error types and status codes stay
//! inside the library.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use common::{Drink, Error, FavoriteEntry, Festival, SortOrder};
use tracing::debug;

use crate::engine::{self, FilterState};
use crate::similar::{similar_drinks, SimilarDrink};

/// Classify an error into the message shown to the user.
pub fn user_message(err: &Error) -> &'static str {
    match err {
        Error::Api { status: 404, .. } => "Festival data not found.",
        Error::Api { status, .. } if *status >= 500 => "Server error. Please try again later.",
        Error::Api { .. } => "Could not load drinks. Please try again.",
        Error::Timeout(_) => "Request timed out. Check your connection.",
        Error::Connection(_) => "No internet connection. Check your network.",
        _ => "Something went wrong. Please try again.",
    }
}

#[derive(Debug)]
pub struct BrowseState {
    festival: Option<Festival>,
    drinks: Vec<Drink>,
    filter: FilterState,
    sort: SortOrder,
    loading: bool,
    error: Option<String>,
    fetched_at: Option<Instant>,
    refresh_in_flight: bool,
    version: u64,
}

impl BrowseState {
    pub fn new() -> Self {
        Self {
            festival: None,
            drinks: Vec::new(),
            filter: FilterState::default(),
            sort: SortOrder::default(),
            loading: false,
            error: None,
            fetched_at: None,
            refresh_in_flight: false,
            version: 0,
        }
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Monotonic change counter for observers.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn festival(&self) -> Option<&Festival> {
        self.festival.as_ref()
    }

    pub fn drinks(&self) -> &[Drink] {
        &self.drinks
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ── Festival / fetch lifecycle ────────────────────────────────────

    /// Switch festival. Discards the record set; favorite/rating state
    /// lives in the preference store and is reattached on the next fetch.
    pub fn set_festival(&mut self, festival: Festival) {
        debug!("Switching festival to {}", festival.id);
        self.festival = Some(festival);
        self.drinks.clear();
        self.error = None;
        self.fetched_at = None;
        self.bump();
    }

    /// Mark a refresh as started. Returns false when one is already in
    /// flight so callers can suppress the duplicate.
    pub fn begin_refresh(&mut self) -> bool {
        if self.refresh_in_flight {
            debug!("Refresh already in flight; suppressing duplicate");
            return false;
        }
        self.refresh_in_flight = true;
        self.loading = true;
        self.bump();
        true
    }

    /// Apply a completed fetch. On success the record set is replaced
    /// wholesale and persisted favorite/rating state is projected onto
    /// it by product id; on failure prior data is kept and the error is
    /// stored as a user-facing message. Last completion wins.
    pub fn apply_fetch(
        &mut self,
        result: Result<Vec<Drink>, Error>,
        favorites: &BTreeMap<String, FavoriteEntry>,
        ratings: &BTreeMap<String, u8>,
    ) {
        self.refresh_in_flight = false;
        self.loading = false;
        match result {
            Ok(mut drinks) => {
                attach_preferences(&mut drinks, favorites, ratings);
                debug!("Catalog loaded: {} drinks", drinks.len());
                self.drinks = drinks;
                self.error = None;
                self.fetched_at = Some(Instant::now());
            }
            Err(e) => {
                debug!("Catalog load failed: {}", e);
                self.error = Some(user_message(&e).to_string());
            }
        }
        self.bump();
    }

    /// Whether the loaded catalog is older than `max_age` (or was never
    /// loaded at all).
    pub fn is_stale(&self, max_age: Duration) -> bool {
        match self.fetched_at {
            Some(at) => at.elapsed() > max_age,
            None => true,
        }
    }

    // ── Predicate and sort mutators ───────────────────────────────────

    /// Set or clear the category filter. Style options depend on the
    /// category, so any active style selection is cleared.
    pub fn set_category(&mut self, category: Option<String>) {
        self.filter.category = category;
        self.filter.styles.clear();
        self.bump();
    }

    /// Toggle one style in the selected set, returning whether it is now
    /// selected.
    pub fn toggle_style(&mut self, style: &str) -> bool {
        let selected = if self.filter.styles.remove(style) {
            false
        } else {
            self.filter.styles.insert(style.to_string());
            true
        };
        self.bump();
        selected
    }

    pub fn set_search(&mut self, search: String) {
        self.filter.search = search;
        self.bump();
    }

    pub fn set_favorites_only(&mut self, on: bool) {
        self.filter.favorites_only = on;
        self.bump();
    }

    pub fn set_hide_unavailable(&mut self, on: bool) {
        self.filter.hide_unavailable = on;
        self.bump();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.bump();
    }

    // ── Session-local favorite/rating mirrors ─────────────────────────

    /// Mirror a favorite change onto the in-memory record set after the
    /// store write succeeded.
    pub fn set_favorite_state(&mut self, product_id: &str, is_favorite: bool) {
        for drink in &mut self.drinks {
            if drink.product.id == product_id {
                drink.is_favorite = is_favorite;
            }
        }
        self.bump();
    }

    /// Mirror a rating change onto the in-memory record set.
    pub fn set_rating_state(&mut self, product_id: &str, rating: Option<u8>) {
        for drink in &mut self.drinks {
            if drink.product.id == product_id {
                drink.rating = rating;
            }
        }
        self.bump();
    }

    // ── Views ─────────────────────────────────────────────────────────

    /// The ordered visible subset under the active filter and sort.
    pub fn visible(&self) -> Vec<Drink> {
        engine::visible(&self.drinks, &self.filter, self.sort)
    }

    pub fn available_categories(&self) -> Vec<String> {
        engine::available_categories(&self.drinks)
    }

    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        engine::category_counts(&self.drinks)
    }

    /// Styles reachable under the current category filter.
    pub fn available_styles(&self) -> Vec<String> {
        engine::available_styles(&self.drinks, self.filter.category.as_deref())
    }

    pub fn find(&self, product_id: &str) -> Option<&Drink> {
        self.drinks.iter().find(|d| d.product.id == product_id)
    }

    /// Drinks similar to the given product, over the full set.
    pub fn similar(&self, product_id: &str) -> Option<Vec<SimilarDrink>> {
        let reference = self.find(product_id)?;
        Some(similar_drinks(&self.drinks, reference))
    }
}

impl Default for BrowseState {
    fn default() -> Self {
        Self::new()
    }
}

fn attach_preferences(
    drinks: &mut [Drink],
    favorites: &BTreeMap<String, FavoriteEntry>,
    ratings: &BTreeMap<String, u8>,
) {
    for drink in drinks {
        drink.is_favorite = favorites.contains_key(&drink.product.id);
        drink.rating = ratings.get(&drink.product.id).copied();
    }
}
