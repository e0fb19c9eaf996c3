//! # Finder Agent - Runtime for the Wildcats Finder client
//!
//! Binds the headless core in `finder-app` to the outside world:
//!
//! - [`http::HttpApi`]: the REST backend over `reqwest`
//! - [`storage::FileStorage`]: durable session state on disk
//! - [`config::AgentConfig`]: TOML configuration with environment overrides
//! - [`logging::init_tracing`]: subscriber setup
//! - [`builder::AgentBuilder`]: assembles a shared `AppCore`
//!
//! ```rust,ignore
//! use finder_agent::{AgentBuilder, AgentConfig};
//!
//! finder_agent::init_tracing();
//! let config = AgentConfig::load(path)?.with_env_overrides();
//! let (app_core, session) = AgentBuilder::new().with_config(config).start().await?;
//! ```

#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod http;
pub mod logging;
pub mod storage;

pub use builder::AgentBuilder;
pub use config::{default_storage_path, AgentConfig, API_URL_ENV, DEFAULT_API_BASE_URL};
pub use http::HttpApi;
pub use logging::init_tracing;
pub use storage::FileStorage;
