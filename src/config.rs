use std::num::NonZeroUsize;
use std::path::PathBuf;

use thiserror::Error;

use crate::map::base_layer::BaseLayerId;

pub const ASSET_DIR_VAR: &str = "JOGJAMAP_ASSET_DIR";
pub const BASE_LAYER_VAR: &str = "JOGJAMAP_BASE_LAYER";
pub const TILE_CACHE_VAR: &str = "JOGJAMAP_TILE_CACHE";
pub const USER_AGENT_VAR: &str = "JOGJAMAP_USER_AGENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    BaseLayer {
        var: &'static str,
        #[source]
        source: crate::map::base_layer::UnknownBaseLayer,
    },

    #[error("{var}: expected a positive integer, got `{value}`")]
    NotPositive { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root for the marker icon and relative popup image paths.
    pub asset_dir: PathBuf,
    pub default_layer: BaseLayerId,
    pub tile_cache_capacity: NonZeroUsize,
    /// Tile servers reject anonymous clients.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            default_layer: BaseLayerId::Street,
            tile_cache_capacity: NonZeroUsize::new(512).unwrap_or(NonZeroUsize::MIN),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Read the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenv::dotenv() {
            log::debug!("no .env loaded: {}", e);
        }
        Self::from_lookup(|var| dotenv::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = get(ASSET_DIR_VAR) {
            config.asset_dir = PathBuf::from(dir);
        }

        if let Some(layer) = get(BASE_LAYER_VAR) {
            config.default_layer = layer.parse().map_err(|source| ConfigError::BaseLayer {
                var: BASE_LAYER_VAR,
                source,
            })?;
        }

        if let Some(capacity) = get(TILE_CACHE_VAR) {
            config.tile_cache_capacity = capacity
                .parse::<NonZeroUsize>()
                .map_err(|_| ConfigError::NotPositive {
                    var: TILE_CACHE_VAR,
                    value: capacity.clone(),
                })?;
        }

        if let Some(agent) = get(USER_AGENT_VAR) {
            config.user_agent = agent;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.asset_dir, PathBuf::from("assets"));
        assert_eq!(config.default_layer, BaseLayerId::Street);
        assert_eq!(config.tile_cache_capacity.get(), 512);
        assert!(config.user_agent.starts_with("jogjamap/"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            (ASSET_DIR_VAR, "/opt/jogjamap/assets"),
            (BASE_LAYER_VAR, "Dark Matter Map"),
            (TILE_CACHE_VAR, " 64 "),
            (USER_AGENT_VAR, "kiosk-3"),
        ]))
        .unwrap();

        assert_eq!(config.asset_dir, PathBuf::from("/opt/jogjamap/assets"));
        assert_eq!(config.default_layer, BaseLayerId::DarkMatter);
        assert_eq!(config.tile_cache_capacity.get(), 64);
        assert_eq!(config.user_agent, "kiosk-3");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[(BASE_LAYER_VAR, "   ")])).unwrap();
        assert_eq!(config.default_layer, BaseLayerId::Street);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = Config::from_lookup(lookup(&[(TILE_CACHE_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { .. }));

        let err = Config::from_lookup(lookup(&[(BASE_LAYER_VAR, "satellite")])).unwrap_err();
        assert!(err.to_string().contains("satellite"));
    }
}
