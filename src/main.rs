//! taplist: festival drinks catalog companion.
//!
//! Fetches a festival's per-category drink feeds, runs them through the
//! browse engine, and manages local favorites, tastings, and ratings
//! from the command line.

mod config;

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use browse::{BrowseState, SimilarDrink};
use catalog_client::CatalogClient;
use common::{AppConfig, Drink, Error, Festival, SortOrder, ThemeMode};
use prefs_store::PrefsStore;

/// Festival drinks catalog companion.
#[derive(Parser)]
#[command(name = "taplist", about = "Festival drinks catalog companion")]
struct Cli {
    /// Festival id to use, overriding the stored selection.
    #[arg(long, global = true)]
    festival: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List drinks with filters applied.
    List {
        /// Only this category (beer, cider, ...).
        #[arg(long)]
        category: Option<String>,
        /// Only these styles (repeatable; OR semantics).
        #[arg(long = "style")]
        styles: Vec<String>,
        /// Case-insensitive text search over name, brewery, style, notes.
        #[arg(long)]
        search: Option<String>,
        /// Only favorited drinks.
        #[arg(long)]
        favorites: bool,
        /// Skip sold-out and not-yet-available drinks.
        #[arg(long)]
        hide_unavailable: bool,
        /// Sort order: name-asc, name-desc, abv-high, abv-low, brewery, style.
        #[arg(long, default_value = "name-asc")]
        sort: String,
    },
    /// Show the categories present in the catalog, with counts.
    Categories,
    /// Show the styles available, optionally within one category.
    Styles {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show drinks similar to the given product.
    Similar { product_id: String },
    /// Toggle a drink as favorite.
    Fav { product_id: String },
    /// Record a tasting of a drink (now).
    Tried { product_id: String },
    /// Remove one recorded tasting (RFC 3339 timestamp as shown by `status`).
    Untry {
        product_id: String,
        timestamp: String,
    },
    /// Set (or clear, when no text is given) tasting notes.
    Notes {
        product_id: String,
        text: Option<String>,
    },
    /// Rate a drink 1-5.
    Rate { product_id: String, rating: u8 },
    /// Remove a rating.
    Unrate { product_id: String },
    /// List the festivals that can be browsed.
    Festivals,
    /// Select the festival used by later commands.
    Use { festival_id: String },
    /// Show favorites, tastings, and ratings for the selected festival.
    Status,
    /// Show or change persistent preferences.
    Prefs {
        /// Persistently hide sold-out and not-yet-available drinks.
        #[arg(long)]
        hide_unavailable: Option<bool>,
        /// Theme mode: light, dark, system.
        #[arg(long)]
        theme: Option<String>,
    },
}

fn data_dir(config: &AppConfig) -> PathBuf {
    match &config.data_dir {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(".taplist"),
    }
}

/// Festivals come from the registry when one is configured and
/// reachable; the built-in set is the fallback.
async fn resolve_festivals(
    client: &CatalogClient,
    config: &AppConfig,
) -> (Vec<Festival>, Option<String>) {
    if let Some(url) = &config.registry_url {
        match client.fetch_registry(url).await {
            Ok(registry) if !registry.festivals.is_empty() => {
                return (registry.festivals, registry.default_festival_id);
            }
            Ok(_) => warn!("Festival registry is empty; using built-in festivals"),
            Err(e) => warn!(
                "Festival registry unavailable ({}); using built-in festivals",
                e
            ),
        }
    }
    (config.festivals.clone(), None)
}

fn pick_festival(
    festivals: &[Festival],
    requested: Option<&str>,
    stored: Option<&str>,
    registry_default: Option<&str>,
) -> Result<Festival, Error> {
    let find = |id: &str| festivals.iter().find(|f| f.id == id).cloned();

    if let Some(id) = requested {
        return find(id).ok_or_else(|| Error::UnknownFestival(id.to_string()));
    }
    if let Some(id) = stored {
        if let Some(festival) = find(id) {
            return Ok(festival);
        }
        warn!("Stored festival {} is no longer listed; falling back", id);
    }
    if let Some(id) = registry_default {
        if let Some(festival) = find(id) {
            return Ok(festival);
        }
    }
    festivals
        .iter()
        .find(|f| f.is_active)
        .or_else(|| festivals.first())
        .cloned()
        .ok_or_else(|| Error::Config("no festivals available".into()))
}

/// Fetch the whole catalog for a festival and project persisted
/// favorite/rating state onto it.
async fn load_catalog(
    client: &CatalogClient,
    festival: &Festival,
    categories: &[String],
    store: &PrefsStore,
) -> BrowseState {
    let mut state = BrowseState::new();
    state.set_festival(festival.clone());
    state.begin_refresh();

    let result = client.fetch_all(festival, categories).await;
    let favorites = store.favorites(&festival.id);
    let ratings = store.ratings(&festival.id);
    state.apply_fetch(result, &favorites, &ratings);
    state
}

fn require_loaded(state: &BrowseState) -> anyhow::Result<()> {
    if let Some(message) = state.error() {
        anyhow::bail!("{message}");
    }
    Ok(())
}

fn print_drink(drink: &Drink) {
    let style = drink.product.style.as_deref().unwrap_or("-");
    let mut line = format!(
        "{:<12} {:<34} {:>4.1}%  {:<26} {}",
        drink.product.id,
        drink.product.name,
        drink.product.abv,
        drink.producer_name,
        style
    );
    if let Some(status) = drink.availability() {
        line.push_str(&format!("  [{status}]"));
    }
    if drink.is_favorite {
        line.push_str("  ♥");
    }
    if let Some(rating) = drink.rating {
        line.push_str(&format!("  {}/5", rating));
    }
    println!("{line}");
}

fn print_similar(similar: &[SimilarDrink]) {
    for entry in similar {
        println!(
            "{:<12} {:<34} {:>4.1}%  {:<26} ({})",
            entry.drink.product.id,
            entry.drink.product.name,
            entry.drink.product.abv,
            entry.drink.producer_name,
            entry.reason.label()
        );
    }
}

fn parse_theme(raw: &str) -> Result<ThemeMode, Error> {
    match raw.trim().to_lowercase().as_str() {
        "light" => Ok(ThemeMode::Light),
        "dark" => Ok(ThemeMode::Dark),
        "system" => Ok(ThemeMode::System),
        other => Err(Error::Config(format!(
            "theme must be light, dark, or system (got {other})"
        ))),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Other(format!("invalid RFC 3339 timestamp {raw}: {e}")))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taplist=info,catalog_client=info,browse=info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let store = PrefsStore::open(data_dir(&cfg))?;
    let client = CatalogClient::new(Duration::from_secs(cfg.fetch.timeout_secs));

    let (festivals, registry_default) = resolve_festivals(&client, &cfg).await;
    let stored = store.selected_festival();
    let festival = pick_festival(
        &festivals,
        cli.festival.as_deref(),
        stored.as_deref(),
        registry_default.as_deref(),
    )?;

    info!(
        "Festival: {} ({}); categories: {:?}; staleness window: {}s",
        festival.name,
        festival.id,
        cfg.categories,
        cfg.timing.catalog_stale_secs
    );

    let command = cli.command.unwrap_or(Command::List {
        category: None,
        styles: Vec::new(),
        search: None,
        favorites: false,
        hide_unavailable: false,
        sort: "name-asc".into(),
    });

    match command {
        Command::List {
            category,
            styles,
            search,
            favorites,
            hide_unavailable,
            sort,
        } => {
            let sort: SortOrder = sort.parse()?;
            let mut state = load_catalog(&client, &festival, &cfg.categories, &store).await;
            require_loaded(&state)?;

            state.set_category(category);
            for style in styles {
                state.toggle_style(&style);
            }
            if let Some(search) = search {
                state.set_search(search);
            }
            state.set_favorites_only(favorites);
            state.set_hide_unavailable(hide_unavailable || store.hide_unavailable());
            state.set_sort(sort);

            let visible = state.visible();
            for drink in &visible {
                print_drink(drink);
            }
            println!("{} of {} drinks", visible.len(), state.drinks().len());
        }
        Command::Categories => {
            let state = load_catalog(&client, &festival, &cfg.categories, &store).await;
            require_loaded(&state)?;
            for (category, count) in state.category_counts() {
                println!("{category:<12} {count}");
            }
        }
        Command::Styles { category } => {
            let mut state = load_catalog(&client, &festival, &cfg.categories, &store).await;
            require_loaded(&state)?;
            state.set_category(category);
            for style in state.available_styles() {
                println!("{style}");
            }
        }
        Command::Similar { product_id } => {
            let state = load_catalog(&client, &festival, &cfg.categories, &store).await;
            require_loaded(&state)?;
            match state.similar(&product_id) {
                Some(similar) if !similar.is_empty() => print_similar(&similar),
                Some(_) => println!("No similar drinks found."),
                None => anyhow::bail!("no drink with id {product_id}"),
            }
        }
        Command::Fav { product_id } => {
            let now_favorite = store.toggle_favorite(&festival.id, &product_id)?;
            println!(
                "{} is {}",
                product_id,
                if now_favorite {
                    "now a favorite"
                } else {
                    "no longer a favorite"
                }
            );
        }
        Command::Tried { product_id } => {
            let at = Utc::now();
            store.mark_as_tasted(&festival.id, &product_id, at)?;
            println!("Recorded a tasting of {} at {}", product_id, at.to_rfc3339());
        }
        Command::Untry {
            product_id,
            timestamp,
        } => {
            let at = parse_timestamp(&timestamp)?;
            store.delete_try(&festival.id, &product_id, at)?;
            println!("Removed tasting of {} at {}", product_id, timestamp);
        }
        Command::Notes { product_id, text } => {
            store.update_notes(&festival.id, &product_id, text)?;
            println!("Notes updated for {product_id}");
        }
        Command::Rate { product_id, rating } => {
            store.set_rating(&festival.id, &product_id, rating)?;
            println!("Rated {product_id} {rating}/5");
        }
        Command::Unrate { product_id } => {
            store.remove_rating(&festival.id, &product_id)?;
            println!("Removed rating for {product_id}");
        }
        Command::Festivals => {
            for entry in &festivals {
                let mut line = format!("{:<16} {}", entry.id, entry.name);
                if !entry.is_active {
                    line.push_str("  (inactive)");
                }
                if Some(entry.id.as_str()) == registry_default.as_deref() {
                    line.push_str("  [default]");
                }
                if Some(entry.id.as_str()) == stored.as_deref() {
                    line.push_str("  [selected]");
                }
                println!("{line}");
            }
        }
        Command::Use { festival_id } => {
            if !festivals.iter().any(|f| f.id == festival_id) {
                return Err(Error::UnknownFestival(festival_id).into());
            }
            store.set_selected_festival(&festival_id)?;
            println!("Selected festival {festival_id}");
        }
        Command::Status => {
            let favorites = store.favorites(&festival.id);
            let ratings = store.ratings(&festival.id);

            if favorites.is_empty() && ratings.is_empty() {
                println!("Nothing saved for {} yet.", festival.id);
                return Ok(());
            }
            for (product_id, entry) in &favorites {
                let status = match entry.status {
                    common::FavoriteStatus::WantToTry => "want to try",
                    common::FavoriteStatus::Tasted => "tasted",
                };
                let rating = ratings
                    .get(product_id)
                    .map(|r| format!("  {r}/5"))
                    .unwrap_or_default();
                println!("{product_id:<12} {status}{rating}");
                for t in &entry.tries {
                    println!("    tried {}", t.to_rfc3339());
                }
                if let Some(notes) = &entry.notes {
                    println!("    notes: {notes}");
                }
            }
            for (product_id, rating) in &ratings {
                if !favorites.contains_key(product_id) {
                    println!("{product_id:<12} rated  {rating}/5");
                }
            }
        }
        Command::Prefs {
            hide_unavailable,
            theme,
        } => {
            if let Some(hide) = hide_unavailable {
                store.set_hide_unavailable(hide)?;
            }
            if let Some(theme) = theme {
                store.set_theme(parse_theme(&theme)?)?;
            }
            let settings = store.settings();
            println!("hide_unavailable: {}", settings.hide_unavailable);
            println!("theme: {:?}", settings.theme);
            println!(
                "selected_festival: {}",
                settings.selected_festival.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
