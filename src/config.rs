//! Layered configuration
//!
//! Merges built-in defaults, `<config dir>/stylesense/config.toml`, an optional
//! explicit file, and `STYLESENSE_*` environment variables (later wins).

use crate::api::GenderFilter;
use crate::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `STYLESENSE_BASE_URL`
pub const ENV_PREFIX: &str = "STYLESENSE_";

/// A predefined query offered in the example strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleQuery {
    pub text: String,
    #[serde(default)]
    pub emoji: String,
}

impl ExampleQuery {
    pub fn new(text: &str, emoji: &str) -> Self {
        Self {
            text: text.to_string(),
            emoji: emoji.to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the recommendation service
    pub base_url: String,
    /// Result-count preference on wide terminals
    pub top_k_wide: u32,
    /// Result-count preference on narrow terminals
    pub top_k_narrow: u32,
    /// Terminals narrower than this many columns use the narrow layout
    pub narrow_width: u16,
    /// Minimum card width used to derive the column count
    pub card_min_width: u16,
    /// Initial state of the re-rank toggle
    pub rerank: bool,
    /// Initial gender filter
    pub gender_filter: Option<GenderFilter>,
    /// Request timeout; unset means wait indefinitely
    pub request_timeout_secs: Option<u64>,
    /// Check image URLs in the background to show per-card image status
    pub probe_images: bool,
    /// Default tracing filter
    pub log_level: String,
    /// Query the search box starts with
    pub initial_query: String,
    /// Example queries
    pub examples: Vec<ExampleQuery>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            top_k_wide: 12,
            top_k_narrow: 6,
            narrow_width: 100,
            card_min_width: 36,
            rerank: false,
            gender_filter: None,
            request_timeout_secs: None,
            probe_images: true,
            log_level: "info".to_string(),
            initial_query: "outfit for tropical vacation".to_string(),
            examples: default_examples(),
        }
    }
}

/// The example queries the search view ships with
pub fn default_examples() -> Vec<ExampleQuery> {
    vec![
        ExampleQuery::new("men's beach shorts for vacation", "\u{1F3D6}\u{FE0F}"),
        ExampleQuery::new("women's running shoes for gym", "\u{1F45F}"),
        ExampleQuery::new("professional office outfit", "\u{1F4BC}"),
        ExampleQuery::new("winter coat for extreme cold", "\u{2744}\u{FE0F}"),
        ExampleQuery::new("wedding guest dress summer", "\u{1F470}"),
        ExampleQuery::new("comfortable walking shoes all day", "\u{1F6B6}"),
    ]
}

/// Default location of the user config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stylesense").join("config.toml"))
}

impl AppConfig {
    /// Load defaults, the user config file, an optional explicit file, then env overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::figment(default_config_path().as_deref(), explicit)
            .extract::<Self>()
            .map_err(Into::into)
            .and_then(Self::validated)
    }

    /// Build the provider stack without extracting
    pub fn figment(user_file: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = user_file {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Reject values the view cannot work with
    pub fn validated(mut self) -> Result<Self> {
        if self.base_url.trim().is_empty() {
            return Err(crate::StyleSenseError::Config("base_url is empty".into()));
        }
        if self.top_k_wide == 0 || self.top_k_narrow == 0 {
            return Err(crate::StyleSenseError::Config(
                "top_k_wide and top_k_narrow must be positive".into(),
            ));
        }
        if self.card_min_width == 0 {
            return Err(crate::StyleSenseError::Config(
                "card_min_width must be positive".into(),
            ));
        }
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_search_view() {
        let config = AppConfig::default();
        assert_eq!(config.top_k_wide, 12);
        assert_eq!(config.top_k_narrow, 6);
        assert!(!config.rerank);
        assert_eq!(config.examples.len(), 6);
        assert_eq!(config.examples[0].text, "men's beach shorts for vacation");
    }

    #[test]
    fn env_overrides_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                    base_url = "http://file:9000/"
                    top_k_wide = 20
                    rerank = true
                "#,
            )?;
            jail.set_env("STYLESENSE_TOP_K_WIDE", "24");

            let config: AppConfig = AppConfig::figment(None, Some(Path::new("custom.toml")))
                .extract()?;
            let config = config.validated().map_err(|e| e.to_string())?;

            assert_eq!(config.base_url, "http://file:9000");
            assert_eq!(config.top_k_wide, 24);
            assert!(config.rerank);
            assert_eq!(config.top_k_narrow, 6);
            Ok(())
        });
    }

    #[test]
    fn gender_filter_parses_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file("c.toml", r#"gender_filter = "women""#)?;
            let config: AppConfig =
                AppConfig::figment(None, Some(Path::new("c.toml"))).extract()?;
            assert_eq!(config.gender_filter, Some(GenderFilter::Women));
            Ok(())
        });
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let config = AppConfig {
            top_k_narrow: 0,
            ..AppConfig::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn missing_files_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        let config: AppConfig = AppConfig::figment(Some(&missing), None)
            .extract()
            .expect("defaults extract");
        assert_eq!(config.base_url, AppConfig::default().base_url);
    }
}
