use std::path::Path;

use lineage_generate::TreeConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub tree_depth_limit: Option<u32>,
    pub sibling_partner_depth_limit: Option<u32>,
    pub partner_probability: Option<f64>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut TreeConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(ftdl) = self.tree_depth_limit {
            config.tree_depth_limit = ftdl;
        }
        if let Some(spdl) = self.sibling_partner_depth_limit {
            config.sibling_partner_depth_limit = spdl;
        }
        if let Some(pcp) = self.partner_probability {
            config.partner_probability = pcp;
        }
    }
}

pub fn parse_tree_config(content: &str) -> Result<TreeConfig, SettingsError> {
    Ok(toml::from_str(content)?)
}

/// Defaults, then the optional TOML file, then command-line overrides.
pub fn resolve_tree_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<TreeConfig, SettingsError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
                path: path.display().to_string(),
                source,
            })?;
            parse_tree_config(&content)?
        }
        None => TreeConfig::default(),
    };
    overrides.apply(&mut config);
    Ok(config)
}
