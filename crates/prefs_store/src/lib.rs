//! Local preference store.
//!
//! Favorites, ratings, the selected festival, and UI settings persist as
//! small JSON documents under a data directory, one favorites/ratings
//! document per festival. Documents are rewritten whole on every change;
//! they hold at most a few hundred entries.
//!
//! A corrupt document is never an error for the caller: it degrades to
//! the empty value with a warning, and the next write replaces it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use common::{Error, FavoriteEntry, FavoriteStatus, ThemeMode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Global settings document, independent of per-festival data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub selected_festival: Option<String>,
    #[serde(default)]
    pub hide_unavailable: bool,
    #[serde(default)]
    pub theme: ThemeMode,
}

/// File-backed preference store.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    dir: PathBuf,
}

impl PrefsStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn favorites_path(&self, festival_id: &str) -> PathBuf {
        self.dir.join(format!("favorites-{festival_id}.json"))
    }

    fn ratings_path(&self, festival_id: &str) -> PathBuf {
        self.dir.join(format!("ratings-{festival_id}.json"))
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join("settings.json")
    }

    fn read_doc<T: DeserializeOwned + Default>(&self, path: &Path) -> T {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return T::default();
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Discarding corrupt document {}: {}", path.display(), e);
                T::default()
            }
        }
    }

    fn write_doc<T: Serialize>(&self, path: &Path, doc: &T) -> Result<(), Error> {
        let raw = serde_json::to_vec_pretty(doc)?;
        fs::write(path, raw)?;
        Ok(())
    }

    // ── Favorites ─────────────────────────────────────────────────────

    /// All favorite entries for a festival, keyed by product id.
    pub fn favorites(&self, festival_id: &str) -> BTreeMap<String, FavoriteEntry> {
        self.read_doc(&self.favorites_path(festival_id))
    }

    pub fn is_favorite(&self, festival_id: &str, product_id: &str) -> bool {
        self.favorites(festival_id).contains_key(product_id)
    }

    pub fn add_favorite(&self, festival_id: &str, product_id: &str) -> Result<(), Error> {
        let mut favorites = self.favorites(festival_id);
        favorites
            .entry(product_id.to_string())
            .or_insert_with(FavoriteEntry::want_to_try);
        self.write_doc(&self.favorites_path(festival_id), &favorites)
    }

    pub fn remove_favorite(&self, festival_id: &str, product_id: &str) -> Result<(), Error> {
        let mut favorites = self.favorites(festival_id);
        if favorites.remove(product_id).is_some() {
            self.write_doc(&self.favorites_path(festival_id), &favorites)?;
        }
        Ok(())
    }

    /// Toggle favorite state, returning the new state.
    pub fn toggle_favorite(&self, festival_id: &str, product_id: &str) -> Result<bool, Error> {
        let mut favorites = self.favorites(festival_id);
        let now_favorite = if favorites.remove(product_id).is_some() {
            false
        } else {
            favorites.insert(product_id.to_string(), FavoriteEntry::want_to_try());
            true
        };
        self.write_doc(&self.favorites_path(festival_id), &favorites)?;
        Ok(now_favorite)
    }

    /// Record a tasting at `at`. Creates the entry directly in `Tasted`
    /// state when the drink was never favorited.
    pub fn mark_as_tasted(
        &self,
        festival_id: &str,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut favorites = self.favorites(festival_id);
        let entry = favorites
            .entry(product_id.to_string())
            .or_insert_with(FavoriteEntry::want_to_try);
        entry.status = FavoriteStatus::Tasted;
        entry.tries.push(at);
        self.write_doc(&self.favorites_path(festival_id), &favorites)
    }

    /// Remove one recorded tasting. Removing the last one reverts the
    /// entry to `WantToTry`.
    pub fn delete_try(
        &self,
        festival_id: &str,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut favorites = self.favorites(festival_id);
        let Some(entry) = favorites.get_mut(product_id) else {
            return Ok(());
        };
        if let Some(pos) = entry.tries.iter().position(|t| *t == at) {
            entry.tries.remove(pos);
            if entry.tries.is_empty() {
                entry.status = FavoriteStatus::WantToTry;
            }
            self.write_doc(&self.favorites_path(festival_id), &favorites)?;
        }
        Ok(())
    }

    /// Set or clear tasting notes, creating the entry if needed.
    pub fn update_notes(
        &self,
        festival_id: &str,
        product_id: &str,
        notes: Option<String>,
    ) -> Result<(), Error> {
        let mut favorites = self.favorites(festival_id);
        let entry = favorites
            .entry(product_id.to_string())
            .or_insert_with(FavoriteEntry::want_to_try);
        entry.notes = notes.filter(|n| !n.trim().is_empty());
        self.write_doc(&self.favorites_path(festival_id), &favorites)
    }

    // ── Ratings ───────────────────────────────────────────────────────

    /// All ratings for a festival, keyed by product id.
    pub fn ratings(&self, festival_id: &str) -> BTreeMap<String, u8> {
        self.read_doc(&self.ratings_path(festival_id))
    }

    pub fn rating(&self, festival_id: &str, product_id: &str) -> Option<u8> {
        self.ratings(festival_id).get(product_id).copied()
    }

    /// Store a rating. Values outside 1..=5 are rejected and prior state
    /// is left untouched.
    pub fn set_rating(&self, festival_id: &str, product_id: &str, rating: u8) -> Result<(), Error> {
        if !(1..=5).contains(&rating) {
            return Err(Error::RatingOutOfRange(rating));
        }
        let mut ratings = self.ratings(festival_id);
        ratings.insert(product_id.to_string(), rating);
        self.write_doc(&self.ratings_path(festival_id), &ratings)
    }

    pub fn remove_rating(&self, festival_id: &str, product_id: &str) -> Result<(), Error> {
        let mut ratings = self.ratings(festival_id);
        if ratings.remove(product_id).is_some() {
            self.write_doc(&self.ratings_path(festival_id), &ratings)?;
        }
        Ok(())
    }

    // ── Settings ──────────────────────────────────────────────────────

    pub fn settings(&self) -> Settings {
        self.read_doc(&self.settings_path())
    }

    pub fn selected_festival(&self) -> Option<String> {
        self.settings().selected_festival
    }

    pub fn set_selected_festival(&self, festival_id: &str) -> Result<(), Error> {
        let mut settings = self.settings();
        settings.selected_festival = Some(festival_id.to_string());
        self.write_doc(&self.settings_path(), &settings)
    }

    pub fn clear_selected_festival(&self) -> Result<(), Error> {
        let mut settings = self.settings();
        settings.selected_festival = None;
        self.write_doc(&self.settings_path(), &settings)
    }

    pub fn hide_unavailable(&self) -> bool {
        self.settings().hide_unavailable
    }

    pub fn set_hide_unavailable(&self, hide: bool) -> Result<(), Error> {
        let mut settings = self.settings();
        settings.hide_unavailable = hide;
        self.write_doc(&self.settings_path(), &settings)
    }

    pub fn theme(&self) -> ThemeMode {
        self.settings().theme
    }

    pub fn set_theme(&self, theme: ThemeMode) -> Result<(), Error> {
        let mut settings = self.settings();
        settings.theme = theme;
        self.write_doc(&self.settings_path(), &settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> (tempfile::TempDir, PrefsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::open(dir.path().join("prefs")).unwrap();
        (dir, store)
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn toggle_twice_returns_to_original_state() {
        let (_dir, store) = store();

        assert!(!store.is_favorite("fest", "p1"));
        assert!(store.toggle_favorite("fest", "p1").unwrap());
        assert!(store.is_favorite("fest", "p1"));
        assert!(!store.toggle_favorite("fest", "p1").unwrap());
        assert!(!store.is_favorite("fest", "p1"));
        assert!(store.favorites("fest").is_empty());
    }

    #[test]
    fn rating_round_trip_for_all_valid_values() {
        let (_dir, store) = store();

        for r in 1..=5u8 {
            store.set_rating("fest", "p1", r).unwrap();
            assert_eq!(store.rating("fest", "p1"), Some(r));
        }
    }

    #[test]
    fn out_of_range_rating_fails_and_preserves_state() {
        let (_dir, store) = store();

        store.set_rating("fest", "p1", 4).unwrap();
        for bad in [0u8, 6, 200] {
            match store.set_rating("fest", "p1", bad) {
                Err(Error::RatingOutOfRange(r)) => assert_eq!(r, bad),
                other => panic!("expected range error, got {:?}", other),
            }
        }
        assert_eq!(store.rating("fest", "p1"), Some(4));
    }

    #[test]
    fn remove_rating_clears_only_that_product() {
        let (_dir, store) = store();

        store.set_rating("fest", "p1", 3).unwrap();
        store.set_rating("fest", "p2", 5).unwrap();
        store.remove_rating("fest", "p1").unwrap();
        assert_eq!(store.rating("fest", "p1"), None);
        assert_eq!(store.rating("fest", "p2"), Some(5));
    }

    #[test]
    fn mark_as_tasted_creates_entry_in_tasted_state() {
        let (_dir, store) = store();

        store.mark_as_tasted("fest", "p1", ts(100)).unwrap();
        let favorites = store.favorites("fest");
        let entry = &favorites["p1"];
        assert_eq!(entry.status, FavoriteStatus::Tasted);
        assert_eq!(entry.tries, vec![ts(100)]);
    }

    #[test]
    fn deleting_last_try_reverts_to_want_to_try() {
        let (_dir, store) = store();

        store.add_favorite("fest", "p1").unwrap();
        store.mark_as_tasted("fest", "p1", ts(100)).unwrap();
        store.mark_as_tasted("fest", "p1", ts(200)).unwrap();

        store.delete_try("fest", "p1", ts(100)).unwrap();
        assert_eq!(store.favorites("fest")["p1"].status, FavoriteStatus::Tasted);

        store.delete_try("fest", "p1", ts(200)).unwrap();
        let entry = &store.favorites("fest")["p1"];
        assert_eq!(entry.status, FavoriteStatus::WantToTry);
        assert!(entry.tries.is_empty());
    }

    #[test]
    fn notes_update_and_clear() {
        let (_dir, store) = store();

        store
            .update_notes("fest", "p1", Some("lovely hop aroma".into()))
            .unwrap();
        assert_eq!(
            store.favorites("fest")["p1"].notes.as_deref(),
            Some("lovely hop aroma")
        );

        store.update_notes("fest", "p1", None).unwrap();
        assert_eq!(store.favorites("fest")["p1"].notes, None);
    }

    #[test]
    fn festivals_are_isolated() {
        let (_dir, store) = store();

        store.add_favorite("summer", "p1").unwrap();
        store.set_rating("summer", "p1", 5).unwrap();

        assert!(store.favorites("winter").is_empty());
        assert_eq!(store.rating("winter", "p1"), None);
    }

    #[test]
    fn corrupt_documents_degrade_to_empty() {
        let (_dir, store) = store();

        store.add_favorite("fest", "p1").unwrap();
        fs::write(store.favorites_path("fest"), b"{not json!").unwrap();
        assert!(store.favorites("fest").is_empty());

        fs::write(store.ratings_path("fest"), b"[1,2,3]").unwrap();
        assert!(store.ratings("fest").is_empty());

        // The store stays usable after corruption.
        store.add_favorite("fest", "p2").unwrap();
        assert!(store.is_favorite("fest", "p2"));
    }

    #[test]
    fn selected_festival_round_trip() {
        let (_dir, store) = store();

        assert_eq!(store.selected_festival(), None);
        store.set_selected_festival("gbf-2026").unwrap();
        assert_eq!(store.selected_festival().as_deref(), Some("gbf-2026"));
        store.clear_selected_festival().unwrap();
        assert_eq!(store.selected_festival(), None);
    }

    #[test]
    fn ui_settings_round_trip() {
        let (_dir, store) = store();

        assert!(!store.hide_unavailable());
        store.set_hide_unavailable(true).unwrap();
        assert!(store.hide_unavailable());

        assert_eq!(store.theme(), ThemeMode::System);
        store.set_theme(ThemeMode::Dark).unwrap();
        assert_eq!(store.theme(), ThemeMode::Dark);

        // Settings fields persist independently.
        assert!(store.hide_unavailable());
    }
}
