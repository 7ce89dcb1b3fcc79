//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms via `metrics`)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Structured fields (chain, address, chat_id) instead of formatted strings
//! - Metric calls are no-ops until a recorder is installed, so library code
//!   and tests can record unconditionally

pub mod logging;
pub mod metrics;
