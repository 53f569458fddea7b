use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::{PlateforgeError, PlateforgeResult};

/// One entry of the configured operator chain. `params` stays an opaque JSON
/// mapping here; the named operator applies its own defaults when built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OperatorConfig {
    pub name: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl OperatorConfig {
    pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Merged run configuration. Every field carries a serde default, so a config
/// file only needs to state what it changes; precedence is
/// defaults < file < CLI overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub perturbations: Vec<OperatorConfig>,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub backgrounds: PathBuf,
    pub overlays: PathBuf,
    pub output: PathBuf,
    pub n_variants: u32,
    pub random_seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub save_metadata: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            perturbations: vec![
                OperatorConfig::new(
                    "shapes",
                    serde_json::json!({ "num_shapes": 20, "min_size": 2, "max_size": 15 }),
                ),
                OperatorConfig::new("noise", serde_json::json!({ "intensity": 25 })),
            ],
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            backgrounds: PathBuf::from("./backgrounds"),
            overlays: PathBuf::from("./overlays"),
            output: PathBuf::from("./dataset"),
            n_variants: 10,
            random_seed: Some(1337),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            save_metadata: true,
        }
    }
}

impl Config {
    /// Parse a JSON config file over the defaults.
    pub fn from_path(path: &Path) -> PlateforgeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            PlateforgeError::validation(format!("invalid config '{}': {e}", path.display()))
        })
    }

    /// Defaults, or the given file layered over them.
    pub fn load(path: Option<&Path>) -> PlateforgeResult<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }

    /// Apply CLI-level overrides on top of whatever the file said.
    pub fn apply_overrides(&mut self, n_variants: Option<u32>, seed: Option<u64>) {
        if let Some(n) = n_variants {
            self.dataset.n_variants = n;
        }
        if let Some(s) = seed {
            self.dataset.random_seed = Some(s);
        }
    }
}
