pub mod traits;
pub mod mapping;
pub mod initialisation;
pub mod operators;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use mapping::{ExhaustionPolicy, MappingConfig};
pub use initialisation::{InitialisationConfig, InitialisationMethod};
pub use operators::{CrossoverConfig, CrossoverMethod, MutationConfig};
pub use traits::ConfigSection;
