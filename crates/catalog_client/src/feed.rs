//! Catalog feed parsing.
//!
//! Festival feeds are hand-maintained JSON and drift in shape: `abv`
//! arrives as string, int, or float; `bar` as string, int, or bool;
//! allergen flags as bool, 0/1, or 1.0. Every field goes through a total
//! coercion function with a documented fallback instead of failing the
//! whole document.

use std::collections::BTreeMap;

use common::{Drink, Error, Producer, Product};
use serde::Deserialize;
use serde_json::Value;

/// Top-level shape of a per-category feed document.
///
/// `producers` may be missing or explicitly null; both mean "no producers".
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub producers: Option<Vec<RawProducer>>,
}

/// A producer as it appears on the wire, before coercion.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProducer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub year_founded: Value,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

/// A product as it appears on the wire, before coercion.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub dispense: Option<String>,
    #[serde(default)]
    pub abv: Value,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub bar: Value,
    #[serde(default)]
    pub allergens: Option<BTreeMap<String, Value>>,
}

// ── Field coercion ────────────────────────────────────────────────────

/// ABV accepted as string, int, or float. Unparsable, negative, or
/// non-finite input coerces to 0.0, never null/NaN.
pub fn coerce_abv(raw: &Value) -> f64 {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Bar label accepted as string or int; bool and anything else is
/// treated as absent.
pub fn coerce_bar(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Allergen flags accepted as bool, int, or float; non-coercible values
/// are dropped silently and only truthy entries are kept.
pub fn coerce_allergens(raw: Option<&BTreeMap<String, Value>>) -> BTreeMap<String, bool> {
    let mut flags = BTreeMap::new();
    let Some(map) = raw else {
        return flags;
    };
    for (key, value) in map {
        let truthy = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|v| v != 0.0),
            _ => None,
        };
        if truthy == Some(true) {
            flags.insert(key.clone(), true);
        }
    }
    flags
}

/// Founding year accepted as int or numeric string.
pub fn coerce_year(raw: &Value) -> Option<i32> {
    match raw {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

// ── Conversion ────────────────────────────────────────────────────────

impl RawProduct {
    fn into_product(self) -> Product {
        let abv = coerce_abv(&self.abv);
        let bar = coerce_bar(&self.bar);
        let allergens = coerce_allergens(self.allergens.as_ref());
        Product {
            id: self.id,
            name: self.name,
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "beer".to_string()),
            style: self.style.filter(|s| !s.trim().is_empty()),
            dispense: self
                .dispense
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "cask".to_string()),
            abv,
            notes: self.notes,
            status_text: self.status_text,
            bar,
            allergens,
        }
    }
}

impl RawProducer {
    fn into_producer(self) -> Producer {
        let year_founded = coerce_year(&self.year_founded);
        Producer {
            id: self.id,
            name: self.name,
            location: self.location,
            year_founded,
            notes: self.notes,
            products: self
                .products
                .into_iter()
                .map(RawProduct::into_product)
                .collect(),
        }
    }
}

/// Parse a raw feed document into drinks tagged with the festival id.
///
/// The body is decoded as UTF-8 regardless of what charset the response
/// headers claimed; static hosting regularly mislabels these files and
/// accented producer names must survive.
pub fn parse_catalog(bytes: &[u8], festival_id: &str) -> Result<Vec<Drink>, Error> {
    let feed: CatalogResponse = serde_json::from_slice(bytes)?;

    let mut drinks = Vec::new();
    for raw in feed.producers.unwrap_or_default() {
        let producer = raw.into_producer();
        for product in &producer.products {
            drinks.push(Drink::compose(&producer, product.clone(), festival_id));
        }
    }
    Ok(drinks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn abv_accepts_string_int_float() {
        assert_eq!(coerce_abv(&json!("4.5")), 4.5);
        assert_eq!(coerce_abv(&json!(5)), 5.0);
        assert_eq!(coerce_abv(&json!(6.2)), 6.2);
    }

    #[test]
    fn abv_falls_back_to_zero() {
        assert_eq!(coerce_abv(&json!("not-a-number")), 0.0);
        assert_eq!(coerce_abv(&json!(null)), 0.0);
        assert_eq!(coerce_abv(&json!(-3.0)), 0.0);
        assert_eq!(coerce_abv(&json!([1, 2])), 0.0);
    }

    #[test]
    fn bar_accepts_string_and_int_only() {
        assert_eq!(coerce_bar(&json!("Main Bar")), Some("Main Bar".into()));
        assert_eq!(coerce_bar(&json!(3)), Some("3".into()));
        assert_eq!(coerce_bar(&json!(true)), None);
        assert_eq!(coerce_bar(&json!(null)), None);
        assert_eq!(coerce_bar(&json!("  ")), None);
    }

    #[test]
    fn allergens_keep_only_coercible_truthy_flags() {
        let raw: BTreeMap<String, Value> = serde_json::from_value(json!({
            "gluten": true,
            "sulphites": 1,
            "egg": 1.0,
            "nuts": 0,
            "milk": false,
            "soy": "yes"
        }))
        .unwrap();

        let flags = coerce_allergens(Some(&raw));
        assert_eq!(flags.len(), 3);
        assert!(flags["gluten"]);
        assert!(flags["sulphites"]);
        assert!(flags["egg"]);
        assert!(!flags.contains_key("nuts"));
        assert!(!flags.contains_key("soy"));
    }

    #[test]
    fn parse_fills_defaults_and_tags_festival() {
        let body = json!({
            "producers": [{
                "id": "brew-1",
                "name": "Oakham Ales",
                "location": "Peterborough",
                "year_founded": "1993",
                "products": [
                    {"id": "p1", "name": "Citra", "style": "Pale Ale", "abv": "4.2"},
                    {"id": "p2", "name": "Mystery", "abv": null}
                ]
            }]
        });
        let drinks = parse_catalog(body.to_string().as_bytes(), "gbf-2026").unwrap();

        assert_eq!(drinks.len(), 2);
        assert_eq!(drinks[0].festival_id, "gbf-2026");
        assert_eq!(drinks[0].producer_name, "Oakham Ales");
        assert_eq!(drinks[0].producer_year_founded, Some(1993));
        assert_eq!(drinks[0].product.abv, 4.2);
        // Defaults applied when the feed omits the fields.
        assert_eq!(drinks[1].product.category, "beer");
        assert_eq!(drinks[1].product.dispense, "cask");
        assert_eq!(drinks[1].product.abv, 0.0);
    }

    #[test]
    fn parse_missing_or_null_producers_is_empty() {
        assert!(parse_catalog(b"{}", "f").unwrap().is_empty());
        assert!(parse_catalog(br#"{"producers": null}"#, "f").unwrap().is_empty());
        assert!(parse_catalog(br#"{"producers": []}"#, "f").unwrap().is_empty());
    }

    #[test]
    fn parse_decodes_utf8_bytes() {
        // "Rosé" as raw UTF-8 bytes; must not turn into mojibake.
        let body = "{\"producers\": [{\"id\": \"w1\", \"name\": \"Ch\u{00e2}teau P\u{00e9}tillant\", \"products\": [{\"id\": \"r1\", \"name\": \"Ros\u{00e9}\", \"category\": \"wine\", \"abv\": 11}]}]}";
        let drinks = parse_catalog(body.as_bytes(), "f").unwrap();
        assert_eq!(drinks[0].product.name, "Rosé");
        assert_eq!(drinks[0].producer_name, "Château Pétillant");
    }
}
