//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, DATABASE_URI override)
//!     → CLI flags (main.rs)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, finish, read_config, ConfigError};
pub use schema::{
    DiagnosticsConfig, ListenerConfig, LogFormat, ObservabilityConfig, ServiceConfig,
    StoreBackend, StoreConfig, TimeoutConfig, ViewsConfig,
};
