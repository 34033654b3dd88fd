//! Realtime session token issuance.
//!
//! # Data Flow
//! ```text
//! GET /token
//!     → prompt.rs (instructions from disk, default on failure)
//!     → token.rs  (session request body + bearer credential)
//!     → Dispatcher (proxy-aware POST to the session endpoint)
//!     → upstream JSON returned verbatim
//! ```

pub mod prompt;
pub mod token;

pub use prompt::{PromptLoader, DEFAULT_INSTRUCTIONS};
pub use token::{SessionRequest, SessionTokenService, TokenIssuanceError, TurnDetection};
