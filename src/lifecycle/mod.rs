//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Trackers → WatchService → spawn monitor → bind API
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → monitor exits at its next sleep,
//!     API drains in-flight requests
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, Running, StartupError};
