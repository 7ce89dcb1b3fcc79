//! Multi-chain wallet watcher library.
//!
//! Tracks TON, Ethereum and BSC wallets per chat, answers interactive
//! lookups, and pushes notifications when tracked wallets see new
//! transactions.

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod service;
pub mod tracker;
pub mod watch;

pub use config::WatchConfig;
pub use lifecycle::Shutdown;
pub use service::{WalletInfo, WatchService};
