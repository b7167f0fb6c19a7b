//! Configuration loader: merges defaults, config.toml, .env, and
//! environment variables.

use std::path::Path;

use common::{AppConfig, Error};

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.categories.is_empty() {
        issues.push("categories must contain at least one category".into());
    }
    if config.categories.iter().any(|c| c.trim().is_empty()) {
        issues.push("categories must not contain blank entries".into());
    }

    if config.fetch.timeout_secs == 0 {
        issues.push("fetch.timeout_secs must be > 0".into());
    }
    if config.timing.catalog_stale_secs == 0 {
        issues.push("timing.catalog_stale_secs must be > 0".into());
    }

    if config.festivals.is_empty() && config.registry_url.is_none() {
        issues.push("either festivals or registry_url must be configured".into());
    }
    for festival in &config.festivals {
        if festival.id.trim().is_empty() {
            issues.push("festivals entries must have a non-empty id".into());
        }
        if festival.data_base_url.trim().is_empty() {
            issues.push(format!("festival {} has no data_base_url", festival.id));
        }
    }
    let mut seen = std::collections::BTreeSet::new();
    for festival in &config.festivals {
        if !seen.insert(festival.id.as_str()) {
            issues.push(format!("duplicate festival id: {}", festival.id));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load configuration from defaults, optional config file, and environment.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env from the working directory or parents.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Merge config.toml if present.
    let config_path =
        std::env::var("TAPLIST_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config_path = Path::new(&config_path);
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", config_path.display(), e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", config_path.display(), e)))?;
    }

    // 4. Environment overrides (highest priority).
    if let Ok(url) = std::env::var("TAPLIST_REGISTRY_URL") {
        let trimmed = url.trim();
        config.registry_url = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }
    if let Ok(dir) = std::env::var("TAPLIST_DATA_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            config.data_dir = Some(trimmed.to_string());
        }
    }
    if let Ok(raw) = std::env::var("TAPLIST_TIMEOUT_SECS") {
        config.fetch.timeout_secs = parse_positive_u64(&raw, "TAPLIST_TIMEOUT_SECS")?;
    }
    if let Ok(raw) = std::env::var("TAPLIST_STALE_SECS") {
        config.timing.catalog_stale_secs = parse_positive_u64(&raw, "TAPLIST_STALE_SECS")?;
    }
    if let Ok(raw) = std::env::var("TAPLIST_CATEGORIES") {
        let categories: Vec<String> = raw
            .split(',')
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        if categories.is_empty() {
            return Err(Error::Config(
                "TAPLIST_CATEGORIES must list at least one category".into(),
            ));
        }
        config.categories = categories;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
