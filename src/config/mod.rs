//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (dotenvy) + optional TOML file
//!     → loader.rs (parse, apply PORT override)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc to handlers and services
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the relay runs with no config file
//! - Proxy variables are NOT part of ServerConfig: they are runtime state,
//!   owned by the environment store and re-read on every outbound call
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::ListenerConfig;
pub use schema::ServerConfig;
pub use schema::TransportConfig;
pub use schema::UpstreamConfig;
