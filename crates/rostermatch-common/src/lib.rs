//! rostermatch-common — Shared error type and the sandboxed HTTP client used by every
//! rostermatch crate.

pub mod error;
pub mod sandbox;

// Re-export commonly used types
pub use error::{Result, RosterMatchError};
pub use sandbox::SandboxClient;
