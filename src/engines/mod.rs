pub mod initialisation;
pub mod mapping;
pub mod operators;
