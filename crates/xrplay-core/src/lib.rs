pub mod config;
pub mod error;
pub mod handle_map;

pub use config::{ReplayConfig, ReplaySettings};
pub use error::CoreError;
pub use handle_map::{HandleInfo, IdentityRegistry, RegistryHandle, ValueInfo, NO_PARENT};
