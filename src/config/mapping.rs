use super::traits::ConfigSection;
use crate::engines::mapping::Codon;
use crate::error::GpError;
use serde::{Deserialize, Serialize};

/// What the mapper does when it runs out of codons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Mapping fails
    Fail,
    /// Restart from the first codon, up to `max_wraps` times
    Wrap,
    /// Append codons from a generator, up to `max_chromosome_length`
    Extend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub max_depth: usize,
    pub exhaustion: ExhaustionPolicy,
    pub max_wraps: usize,
    pub max_chromosome_length: usize,
    pub remove_unused_codons: bool,
    pub max_codon_size: Codon,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            max_depth: 12,
            exhaustion: ExhaustionPolicy::Wrap,
            max_wraps: 1,
            max_chromosome_length: 1000,
            remove_unused_codons: false,
            max_codon_size: Codon::MAX,
        }
    }
}

impl ConfigSection for MappingConfig {
    fn section_name() -> &'static str {
        "mapping"
    }

    fn validate(&self) -> Result<(), GpError> {
        if self.max_depth == 0 {
            return Err(GpError::Configuration(
                "mapping.max_depth must be at least 1".to_string(),
            ));
        }
        if self.exhaustion == ExhaustionPolicy::Extend && self.max_chromosome_length == 0 {
            return Err(GpError::Configuration(
                "mapping.max_chromosome_length must be positive when extending".to_string(),
            ));
        }
        Ok(())
    }
}
