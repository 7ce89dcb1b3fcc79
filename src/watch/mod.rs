//! Wallet tracking subsystem.
//!
//! # Data Flow
//! ```text
//! API track/untrack → registry.rs (per-chat wallets, cursor seeding)
//!
//! WalletMonitor (monitor.rs), every interval:
//!     registry snapshot
//!     → ChainTracker::transactions (uncached, page_size entries)
//!     → diff.rs (entries newer than the cursor)
//!     → registry.advance_cursor (compare-and-set)
//!     → render + NotificationSink::send
//! ```
//!
//! # Design Decisions
//! - Registry lock is never held across a chain API call
//! - Wallets are polled sequentially; the shared rate limiter paces them anyway
//! - A cursor missing from the fetched page reports the whole page

pub mod diff;
pub mod monitor;
pub mod registry;
pub mod types;

pub use diff::{diff_page, PageDiff};
pub use monitor::{TickReport, WalletMonitor};
pub use registry::WalletRegistry;
pub use types::{ChatId, Notification, TrackedWallet};
