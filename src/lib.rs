//! Realtime session relay library.

pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod session;

pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
