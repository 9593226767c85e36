use super::traits::{check_probability, ConfigSection};
use crate::error::GpError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverMethod {
    /// Function points with probability `p_function`, else terminal points
    Koza,
    /// Any node is equally likely
    UniformPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossoverConfig {
    pub method: CrossoverMethod,
    pub p_function: f64,
    /// Children deeper than this are reverted to their parents
    pub max_depth: Option<usize>,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            method: CrossoverMethod::Koza,
            p_function: 0.9,
            max_depth: None,
        }
    }
}

impl ConfigSection for CrossoverConfig {
    fn section_name() -> &'static str {
        "crossover"
    }

    fn validate(&self) -> Result<(), GpError> {
        check_probability(Self::section_name(), "p_function", self.p_function)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    pub p_point: f64,
    pub max_subtree_depth: usize,
    /// Per-codon mutation rate for chromosomes
    pub codon_rate: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            p_point: 0.01,
            max_subtree_depth: 4,
            codon_rate: 0.01,
        }
    }
}

impl ConfigSection for MutationConfig {
    fn section_name() -> &'static str {
        "mutation"
    }

    fn validate(&self) -> Result<(), GpError> {
        check_probability(Self::section_name(), "p_point", self.p_point)?;
        check_probability(Self::section_name(), "codon_rate", self.codon_rate)?;
        Ok(())
    }
}
