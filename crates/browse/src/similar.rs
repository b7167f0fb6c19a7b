//! "More like this" candidate selection.
//!
//! A candidate qualifies against a reference drink when it shares the
//! exact style at similar strength, or comes from the same producer.
//! Qualifying drinks are ordered by ABV proximity to the reference so a
//! capped display shows the closest matches first.

use common::Drink;

/// Max ABV difference (percentage points) for a style match to count as
/// "similar strength".
pub const ABV_PROXIMITY_WINDOW: f64 = 0.5;

/// Why a candidate was picked. A drink satisfying both conditions is
/// listed once, with the style match taking precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarReason {
    SameStyleSimilarStrength,
    SameBrewery,
}

impl SimilarReason {
    pub fn label(self) -> &'static str {
        match self {
            Self::SameStyleSimilarStrength => "Same style, similar strength",
            Self::SameBrewery => "Same brewery",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimilarDrink {
    pub drink: Drink,
    pub reason: SimilarReason,
}

/// Select drinks similar to `reference` from the full set, excluding the
/// reference itself.
pub fn similar_drinks(drinks: &[Drink], reference: &Drink) -> Vec<SimilarDrink> {
    let mut matches = Vec::new();

    for candidate in drinks {
        if candidate.festival_id == reference.festival_id
            && candidate.product.id == reference.product.id
        {
            continue;
        }

        let same_style = match (&candidate.product.style, &reference.product.style) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        let similar_strength =
            (candidate.product.abv - reference.product.abv).abs() <= ABV_PROXIMITY_WINDOW;

        let reason = if same_style && similar_strength {
            Some(SimilarReason::SameStyleSimilarStrength)
        } else if candidate.producer_id == reference.producer_id {
            Some(SimilarReason::SameBrewery)
        } else {
            None
        };

        if let Some(reason) = reason {
            matches.push(SimilarDrink {
                drink: candidate.clone(),
                reason,
            });
        }
    }

    // Closest strength first; stable, so equal distances keep catalog order.
    matches.sort_by(|a, b| {
        let da = (a.drink.product.abv - reference.product.abv).abs();
        let db = (b.drink.product.abv - reference.product.abv).abs();
        da.total_cmp(&db)
    });

    matches
}
