//! Operational diagnostics.

pub mod probe;

pub use probe::{DiagnosticProbe, OutboundIdentity};
