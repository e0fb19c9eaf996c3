//! # Core Application Module
//!
//! - [`AppCore`]: the main application entry point
//! - [`AppConfig`]: application configuration
//! - [`InFlight`]: duplicate-submission guard

mod app;
mod inflight;

pub use app::{AppConfig, AppCore, DEFAULT_TOAST_DURATION_MS};
pub use inflight::{InFlight, InFlightGuard};
