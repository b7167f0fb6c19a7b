//! Application configuration types.

use serde::{Deserialize, Serialize};

use crate::types::Festival;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Festival registry feed URL. When unset, only built-in festivals
    /// are offered.
    #[serde(default)]
    pub registry_url: Option<String>,

    /// Built-in festivals, used when no registry is configured or the
    /// registry is unreachable.
    #[serde(default = "default_festivals")]
    pub festivals: Vec<Festival>,

    /// Beverage categories to fetch per festival.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Network parameters.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Staleness parameters (seconds).
    #[serde(default)]
    pub timing: TimingConfig,

    /// Directory for the preference store. Defaults to `.taplist` in the
    /// working directory.
    #[serde(default)]
    pub data_dir: Option<String>,
}

/// HTTP fetch parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Staleness windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Max age of a loaded catalog before a refresh is triggered (seconds).
    #[serde(default = "default_catalog_stale")]
    pub catalog_stale_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_timeout() -> u64 {
    30
}

fn default_catalog_stale() -> u64 {
    900
}

fn default_categories() -> Vec<String> {
    vec![
        "beer".into(),
        "cider".into(),
        "perry".into(),
        "mead".into(),
        "wine".into(),
    ]
}

fn default_festivals() -> Vec<Festival> {
    vec![Festival {
        id: "gbf-2026".into(),
        name: "Great Beer Festival 2026".into(),
        data_base_url: "https://static.festivaltaplist.org/data/gbf-2026".into(),
        is_active: true,
        start_date: None,
        end_date: None,
        location: Some("London".into()),
        hours: None,
    }]
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            catalog_stale_secs: default_catalog_stale(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry_url: None,
            festivals: default_festivals(),
            categories: default_categories(),
            fetch: FetchConfig::default(),
            timing: TimingConfig::default(),
            data_dir: None,
        }
    }
}
