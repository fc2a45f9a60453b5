pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{CliConfig, Command};

pub use crate::adapters::{InMemoryStore, PgStore};
pub use crate::api::{build_router, AppState};
pub use crate::config::{toml_config::TomlConfig, Settings};
pub use crate::core::theater::TheaterService;
pub use crate::domain::ports::{Clock, FixedClock, SystemClock, TheaterStore};
pub use crate::utils::error::{Result, TheaterError};
