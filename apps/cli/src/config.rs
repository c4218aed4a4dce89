//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     QUILL_DB=quill                                                     │
//! │     QUILL_OUTPUT_DIR=/srv/quotes                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config PATH, or                                                  │
//! │     ~/.config/quill/quill.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.quill.quill/quill.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! name = "quill"
//! data_dir = "/home/me/.local/share/quill"
//!
//! [export]
//! output_dir = "quotes"
//! terms_file = "cgv.pdf"
//! asset_dir = "."
//!
//! [render]
//! font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
//! bold_font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"
//!
//! [quotes]
//! validity_days = 30
//! default_payment_terms = "Payment within 30 days"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use quill_core::validation::validate_validity_days;
use quill_core::DEFAULT_VALIDITY_DAYS;
use quill_render::ExportOptions;

use crate::error::{AppError, AppResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "quill.toml";

// =============================================================================
// Sections
// =============================================================================

/// Where the SQLite file lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// File name without the `.db` extension.
    #[serde(default = "default_db_name")]
    pub name: String,

    /// Directory holding the database. Platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_db_name() -> String {
    "quill".to_string()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            name: default_db_name(),
            data_dir: None,
        }
    }
}

/// Export inputs and outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory exported quotes are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Terms document appended after each quote when present.
    #[serde(default = "default_terms_file")]
    pub terms_file: PathBuf,

    /// Directory searched for `logo.jpg`, `logo.jpeg` and `logo.png`.
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("quotes")
}

fn default_terms_file() -> PathBuf {
    PathBuf::from(quill_render::export::DEFAULT_TERMS_FILE)
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            output_dir: default_output_dir(),
            terms_file: default_terms_file(),
            asset_dir: default_asset_dir(),
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderSettings {
    /// TrueType font for body text. Built-in Helvetica when unset.
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// TrueType font for headings and the grand total. When only
    /// `font_path` is set, bold text is emboldened by stroking.
    #[serde(default)]
    pub bold_font_path: Option<PathBuf>,
}

/// Defaults applied to newly created quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSettings {
    #[serde(default = "default_validity_days")]
    pub validity_days: i64,

    #[serde(default)]
    pub default_payment_terms: String,
}

fn default_validity_days() -> i64 {
    DEFAULT_VALIDITY_DAYS
}

impl Default for QuoteSettings {
    fn default() -> Self {
        QuoteSettings {
            validity_days: default_validity_days(),
            default_payment_terms: String::new(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub quotes: QuoteSettings,
}

impl AppConfig {
    /// Loads configuration: defaults, then the TOML file, then `QUILL_*`
    /// environment variables. The result is validated.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| AppError::File {
                    path: path.clone(),
                    source,
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::config("No config path available"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        let name = self.database.name.trim();
        if name.is_empty() {
            return Err(AppError::config("database.name must not be empty"));
        }
        if name.contains(['/', '\\']) {
            return Err(AppError::config(format!(
                "database.name must be a plain file name, got: {}",
                name
            )));
        }

        if self.export.output_dir.as_os_str().is_empty() {
            return Err(AppError::config("export.output_dir must not be empty"));
        }

        validate_validity_days(self.quotes.validity_days)
            .map_err(|e| AppError::config(format!("quotes.validity_days: {}", e)))?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `QUILL_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("QUILL_DB") {
            debug!(name = %name, "Overriding database name from environment");
            self.database.name = name;
        }

        if let Some(dir) = lookup("QUILL_DATA_DIR") {
            debug!(dir = %dir, "Overriding data directory from environment");
            self.database.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(dir) = lookup("QUILL_OUTPUT_DIR") {
            debug!(dir = %dir, "Overriding output directory from environment");
            self.export.output_dir = PathBuf::from(dir);
        }

        if let Some(path) = lookup("QUILL_TERMS_FILE") {
            self.export.terms_file = PathBuf::from(path);
        }

        if let Some(dir) = lookup("QUILL_ASSET_DIR") {
            self.export.asset_dir = PathBuf::from(dir);
        }

        if let Some(path) = lookup("QUILL_FONT") {
            self.render.font_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("QUILL_BOLD_FONT") {
            self.render.bold_font_path = Some(PathBuf::from(path));
        }

        if let Some(days) = lookup("QUILL_VALIDITY_DAYS") {
            match days.parse::<i64>() {
                Ok(d) => self.quotes.validity_days = d,
                Err(_) => warn!(value = %days, "Ignoring non-numeric QUILL_VALIDITY_DAYS"),
            }
        }
    }

    /// `~/.config/quill/quill.toml` or the platform equivalent.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "quill", "quill")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Full path of the SQLite file.
    pub fn database_path(&self) -> PathBuf {
        let dir = self.database.data_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("com", "quill", "quill")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });
        dir.join(format!("{}.db", self.database.name.trim()))
    }

    /// Options for [`quill_render::QuoteExporter`].
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            terms_path: self.export.terms_file.clone(),
            asset_dir: self.export.asset_dir.clone(),
            font_path: self.render.font_path.clone(),
            bold_font_path: self.render.bold_font_path.clone(),
            scratch_root: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.export.output_dir
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
