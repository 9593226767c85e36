use crate::error::GpError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), GpError>;
}

/// Shared check for probability fields
pub(crate) fn check_probability(section: &str, field: &str, value: f64) -> Result<(), GpError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GpError::Configuration(format!(
            "{}.{} must be between 0 and 1, got {}",
            section, field, value
        )));
    }
    Ok(())
}
