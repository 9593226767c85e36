pub mod traits;
pub mod registry;
pub mod primitives;
