//! Domain types shared across the taplist workspace.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ── Catalog types ─────────────────────────────────────────────────────

/// A brewery, cidery, or other producer as listed in a festival feed.
///
/// Created once per catalog fetch and never mutated for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub year_founded: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Products in feed order.
    #[serde(default)]
    pub products: Vec<Product>,
}

/// A single drink as listed under a producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Top-level beverage type (beer, cider, mead, wine, ...).
    pub category: String,
    #[serde(default)]
    pub style: Option<String>,
    /// Dispense method (cask, keg, bottle, ...).
    pub dispense: String,
    /// Always a non-negative finite number; unparsable input coerces to 0.0.
    pub abv: f64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Raw availability text from the feed, if any.
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub bar: Option<String>,
    /// Only truthy allergen flags are kept.
    #[serde(default)]
    pub allergens: BTreeMap<String, bool>,
}

impl Product {
    /// Availability derived from the raw status text.
    pub fn availability(&self) -> Option<AvailabilityStatus> {
        self.status_text
            .as_deref()
            .and_then(AvailabilityStatus::classify)
    }
}

/// One product bound to its owning producer and a festival.
///
/// The only mutable entity in the model: `is_favorite` and `rating` are
/// session-local and are reattached from the preference store after each
/// fetch, keyed by `(festival_id, product.id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drink {
    pub festival_id: String,
    pub producer_id: String,
    pub producer_name: String,
    #[serde(default)]
    pub producer_location: String,
    #[serde(default)]
    pub producer_year_founded: Option<i32>,
    pub product: Product,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Drink {
    /// Compose a drink from a parsed producer and one of its products.
    pub fn compose(producer: &Producer, product: Product, festival_id: &str) -> Self {
        Self {
            festival_id: festival_id.to_string(),
            producer_id: producer.id.clone(),
            producer_name: producer.name.clone(),
            producer_location: producer.location.clone(),
            producer_year_founded: producer.year_founded,
            product,
            is_favorite: false,
            rating: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.product.name
    }

    pub fn availability(&self) -> Option<AvailabilityStatus> {
        self.product.availability()
    }
}

// ── Availability ──────────────────────────────────────────────────────

/// Availability bucket derived from a feed's free-text status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Plenty,
    Low,
    Out,
    NotYetAvailable,
}

impl AvailabilityStatus {
    /// Classify raw status text by keyword, case-insensitively.
    ///
    /// Blank text means the feed carries no status at all.
    pub fn classify(status_text: &str) -> Option<Self> {
        let lowered = status_text.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        if lowered.contains("sold out") {
            return Some(Self::Out);
        }
        if lowered.contains("not yet") || lowered.contains("coming soon") {
            return Some(Self::NotYetAvailable);
        }
        if lowered.contains("little") || lowered.contains("nearly") || lowered.contains("low") {
            return Some(Self::Low);
        }
        Some(Self::Plenty)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Plenty => "plenty",
            Self::Low => "low",
            Self::Out => "sold out",
            Self::NotYetAvailable => "not yet available",
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Sorting ───────────────────────────────────────────────────────────

/// Sort orders supported by the browse engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    NameAsc,
    NameDesc,
    AbvHigh,
    AbvLow,
    Brewery,
    Style,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::NameAsc
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().replace('_', "-").as_str() {
            "name" | "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            "abv-high" => Ok(Self::AbvHigh),
            "abv-low" => Ok(Self::AbvLow),
            "brewery" => Ok(Self::Brewery),
            "style" => Ok(Self::Style),
            other => Err(Error::Config(format!("unknown sort order: {other}"))),
        }
    }
}

// ── Festivals ─────────────────────────────────────────────────────────

/// A festival whose catalog can be browsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Festival {
    pub id: String,
    pub name: String,
    /// Base URL for per-category feeds: `{data_base_url}/{category}.json`.
    pub data_base_url: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
}

fn default_true() -> bool {
    true
}

/// The remote festival registry feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FestivalRegistry {
    #[serde(default)]
    pub festivals: Vec<Festival>,
    #[serde(default)]
    pub default_festival_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl FestivalRegistry {
    /// The festival the registry nominates as default, if present.
    pub fn default_festival(&self) -> Option<&Festival> {
        let id = self.default_festival_id.as_deref()?;
        self.festivals.iter().find(|f| f.id == id)
    }
}

// ── Favorites ─────────────────────────────────────────────────────────

/// Lifecycle of a favorited drink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteStatus {
    WantToTry,
    Tasted,
}

/// Persisted per-drink favorite state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub status: FavoriteStatus,
    /// One timestamp per recorded tasting.
    #[serde(default)]
    pub tries: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl FavoriteEntry {
    pub fn want_to_try() -> Self {
        Self {
            status: FavoriteStatus::WantToTry,
            tries: Vec::new(),
            notes: None,
        }
    }
}

// ── UI settings ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Light,
    Dark,
    System,
}

impl Default for ThemeMode {
    fn default() -> Self {
        Self::System
    }
}
