use crate::error::{FertilogError, Result};
use crate::models::QuantityMode;
use dialoguer::{Confirm, Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_REGISTRY_URL: &str = "https://api.pdok.nl/rvo/gewaspercelen/ogc/v1";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub soil_map: SoilMapConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: String,
    #[serde(default)]
    pub session_cookie: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("base_url", &self.base_url)
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReferenceConfig {
    /// JSON file with usage norms, companies, parcels and products.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_registry_limit")]
    pub limit: u32,
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_registry_limit() -> u32 {
    250
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            enabled: true,
            limit: default_registry_limit(),
        }
    }
}

/// ArcGIS FeatureServer layers of the soil map. Point lookups are off
/// until `layer_url` is set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoilMapConfig {
    #[serde(default)]
    pub layer_url: Option<String>,
    /// Southern sand and loess region layer
    #[serde(default)]
    pub southern_region_url: Option<String>,
    #[serde(default)]
    pub loess_region_url: Option<String>,
    /// Attribute carrying the main soil type
    #[serde(default = "default_soil_field")]
    pub soil_field: String,
}

fn default_soil_field() -> String {
    "HOOFDGRS".to_string()
}

impl Default for SoilMapConfig {
    fn default() -> Self {
        Self {
            layer_url: None,
            southern_region_url: None,
            loess_region_url: None,
            soil_field: default_soil_field(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WizardConfig {
    #[serde(default)]
    pub default_quantity_mode: QuantityMode,
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(FertilogError::Config(format!(
                "Config file not found at {:?}. Run `fertilog init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| FertilogError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| FertilogError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Search for config.yaml in standard locations.
    /// Returns the first one found, or the XDG default path if none exists.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let default_path = Self::default_config_path()?;
        Ok(default_path)
    }

    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for new config files (~/.config/fertilog/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FertilogError::Config("Cannot determine config directory".into()))?
            .join("fertilog");
        Ok(config_dir.join("config.yaml"))
    }

    /// Reference data path: CLI override, then `FERTILOG_REFERENCE`, then the
    /// config file, then `reference.json` in the XDG data directory.
    pub fn reference_path(&self, override_path: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(p) = override_path {
            return Ok(p.clone());
        }
        if let Ok(p) = std::env::var("FERTILOG_REFERENCE") {
            return Ok(PathBuf::from(p));
        }
        if let Some(p) = &self.reference.path {
            return Ok(p.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| FertilogError::Config("Cannot determine data directory".into()))?
            .join("fertilog");
        Ok(data_dir.join("reference.json"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up fertilog!");
        println!();

        println!("Bookkeeping server");
        let base_url: String = Input::new()
            .with_prompt("  Base URL")
            .default("http://localhost:5000".into())
            .interact_text()
            .map_err(|e| FertilogError::Config(format!("Input error: {}", e)))?;

        let cookie: String = Password::new()
            .with_prompt("  Session cookie (blank for none)")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| FertilogError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Reference data");
        let reference_path: String = Input::new()
            .with_prompt("  Path to reference JSON (blank for default)")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| FertilogError::Config(format!("Input error: {}", e)))?;

        println!();

        let registry_enabled = Confirm::new()
            .with_prompt("Enable parcel registry lookups (PDOK BRP)?")
            .default(true)
            .interact()
            .map_err(|e| FertilogError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            server: ServerConfig {
                base_url,
                session_cookie: (!cookie.is_empty()).then_some(cookie),
                timeout_secs: default_timeout_secs(),
            },
            reference: ReferenceConfig {
                path: (!reference_path.is_empty()).then(|| PathBuf::from(reference_path)),
            },
            registry: RegistryConfig {
                enabled: registry_enabled,
                ..RegistryConfig::default()
            },
            soil_map: SoilMapConfig::default(),
            wizard: WizardConfig::default(),
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| FertilogError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# fertilog configuration\n# Generated by `fertilog init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return content.to_string();
        };

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://localhost:5000".into(),
                session_cookie: None,
                timeout_secs: default_timeout_secs(),
            },
            reference: ReferenceConfig::default(),
            registry: RegistryConfig::default(),
            soil_map: SoilMapConfig::default(),
            wizard: WizardConfig::default(),
        }
    }
}
