//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, services and handlers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (text or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every outbound call logs its transport and proxy endpoint
//! - Request ID flows through HTTP access logs
//! - Secrets (API key, proxy passwords) never reach a log field

pub mod logging;
pub mod metrics;
