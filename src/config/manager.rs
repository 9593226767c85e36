use super::{
    initialisation::InitialisationConfig,
    mapping::MappingConfig,
    operators::{CrossoverConfig, MutationConfig},
    traits::ConfigSection,
};
use crate::error::GpError;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seed for every random stream; entropy when absent
    pub seed: Option<u64>,
    /// BNF grammar, either inline text or a path to a grammar file
    pub grammar: Option<String>,
    pub mapping: MappingConfig,
    pub initialisation: InitialisationConfig,
    pub crossover: CrossoverConfig,
    pub mutation: MutationConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), GpError> {
        self.mapping.validate()?;
        self.initialisation.validate()?;
        self.crossover.validate()?;
        self.mutation.validate()?;
        Ok(())
    }

    /// Resolve the grammar setting to BNF text
    pub fn grammar_text(&self) -> Result<Option<String>, GpError> {
        match &self.grammar {
            None => Ok(None),
            Some(text) if text.contains("::=") => Ok(Some(text.clone())),
            Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
        }
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a toml or json file, overridden by `GPCORE_<SECTION>__<FIELD>` variables
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GpError> {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| GpError::Configuration(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        info!("Loaded configuration from {}", path.as_ref().display());

        *self.write()? = config;
        Ok(())
    }

    /// Defaults overridden by environment variables only
    pub fn load_from_env(&self) -> Result<(), GpError> {
        let config: AppConfig = config::Config::builder()
            .add_source(Self::environment())
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| GpError::Configuration(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        *self.write()? = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GpError> {
        let config = self.read()?;
        let toml_str = toml::to_string_pretty(&*config)
            .map_err(|e| GpError::Toml(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig, GpError> {
        Ok(self.read()?.clone())
    }

    /// Apply `f` and keep the result only if it still validates
    pub fn update<F>(&self, f: F) -> Result<(), GpError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.write()?;
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("GPCORE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, AppConfig>, GpError> {
        self.config
            .read()
            .map_err(|_| GpError::Configuration("Config lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, AppConfig>, GpError> {
        self.config
            .write()
            .map_err(|_| GpError::Configuration("Config lock poisoned".to_string()))
    }
}
