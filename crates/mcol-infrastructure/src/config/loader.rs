//! Configuration loader
//!
//! Handles loading configuration from defaults, a TOML or JSON file,
//! prefixed environment variables, flat legacy environment variables and
//! finally command line overrides, in that order.

use crate::constants::ENV_NESTING_SEPARATOR;
use crate::error_ext::ErrorContext;
use crate::logging::log_config_loaded;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use mcol_domain::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// A configuration document the loader can produce
pub trait LoadableConfig: Serialize + DeserializeOwned + Default {
    /// Prefix of nested environment variables, e.g. `MCOL_AGENT__`
    const ENV_PREFIX: &'static str;

    /// Flat environment variable names and the fields they set
    const LEGACY_ENV: &'static [(&'static str, &'static str)];

    /// Reject values the component cannot run with
    fn validate(&self) -> Result<()>;
}

/// Configuration loader service
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load configuration from every source without command line overrides
    pub fn load<T: LoadableConfig>(&self) -> Result<T> {
        self.extract(self.figment::<T>())
    }

    /// Load configuration, letting `overrides` win over every other source
    ///
    /// Fields of `overrides` that serialize to nothing leave the lower layers
    /// untouched, so override structs should skip `None` values.
    pub fn load_with<T: LoadableConfig, O: Serialize>(&self, overrides: &O) -> Result<T> {
        self.extract(self.figment::<T>().merge(Serialized::defaults(overrides)))
    }

    /// Layered figment before command line overrides
    pub fn figment<T: LoadableConfig>(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(T::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = if is_json(config_path) {
                    figment.merge(Json::file(config_path))
                } else {
                    figment.merge(Toml::file(config_path))
                };
                log_config_loaded(config_path, true);
            } else {
                log_config_loaded(config_path, false);
            }
        }

        figment
            .merge(Env::prefixed(T::ENV_PREFIX).split(ENV_NESTING_SEPARATOR))
            .merge(legacy_env(T::LEGACY_ENV))
    }

    fn extract<T: LoadableConfig>(&self, figment: Figment) -> Result<T> {
        let config: T = figment
            .extract()
            .config_context("Failed to extract configuration")?;
        config.validate()?;
        Ok(config)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Unprefixed variables such as `ADDRESS` or `STORE_INTERVAL`, renamed to their fields
fn legacy_env(names: &'static [(&'static str, &'static str)]) -> Env {
    Env::raw().filter_map(move |key| {
        names
            .iter()
            .find(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
            .map(|(_, field)| (*field).into())
    })
}
