use super::traits::ConfigSection;
use crate::error::GpError;
use crate::types::DataType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialisationMethod {
    Full,
    Grow,
    RampedHalfAndHalf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialisationConfig {
    pub method: InitialisationMethod,
    pub max_depth: usize,
    pub population_size: usize,
    /// Attempts per slot before ramped initialisation accepts a duplicate
    pub max_retries: usize,
    pub return_type: DataType,
}

impl Default for InitialisationConfig {
    fn default() -> Self {
        Self {
            method: InitialisationMethod::RampedHalfAndHalf,
            max_depth: 6,
            population_size: 100,
            max_retries: 100,
            return_type: DataType::Double,
        }
    }
}

impl ConfigSection for InitialisationConfig {
    fn section_name() -> &'static str {
        "initialisation"
    }

    fn validate(&self) -> Result<(), GpError> {
        if self.population_size == 0 {
            return Err(GpError::Configuration(
                "initialisation.population_size must be positive".to_string(),
            ));
        }
        if self.method == InitialisationMethod::RampedHalfAndHalf && self.max_depth < 2 {
            return Err(GpError::Configuration(format!(
                "initialisation.max_depth must be at least 2 for ramped half-and-half, got {}",
                self.max_depth
            )));
        }
        Ok(())
    }
}
