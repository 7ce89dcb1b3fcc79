//! Wallet tracking types.

use serde::{Deserialize, Serialize};

use crate::tracker::{Chain, Transaction};

/// Identifier of the chat (conversation) that receives notifications.
pub type ChatId = i64;

/// A wallet followed by one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedWallet {
    pub chat_id: ChatId,
    pub address: String,
    pub chain: Chain,
    /// Hash of the newest transaction already accounted for. `None` until
    /// the first successful fetch.
    pub last_seen_hash: Option<String>,
}

impl TrackedWallet {
    pub fn new(chat_id: ChatId, address: impl Into<String>, chain: Chain) -> Self {
        Self {
            chat_id,
            address: address.into(),
            chain,
            last_seen_hash: None,
        }
    }

    /// Whether this entry is the (chat, address, chain) triple given.
    pub fn is(&self, chat_id: ChatId, address: &str, chain: Chain) -> bool {
        self.chat_id == chat_id && self.chain == chain && self.has_address(address)
    }

    /// EVM addresses compare case-insensitively (checksum casing is
    /// cosmetic); TON user-friendly addresses are case-sensitive base64.
    pub fn has_address(&self, address: &str) -> bool {
        match self.chain {
            Chain::Ton => self.address == address,
            Chain::Eth | Chain::Bsc => self.address.eq_ignore_ascii_case(address),
        }
    }
}

/// New activity for one wallet, ready to be rendered and delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub chat_id: ChatId,
    pub wallet: TrackedWallet,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    pub explorer_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matching() {
        let wallet = TrackedWallet::new(1, "0xAbCdEf0000000000000000000000000000000001", Chain::Eth);
        assert!(wallet.is(1, "0xabcdef0000000000000000000000000000000001", Chain::Eth));
        assert!(!wallet.is(1, "0xabcdef0000000000000000000000000000000001", Chain::Bsc));
        assert!(!wallet.is(2, "0xAbCdEf0000000000000000000000000000000001", Chain::Eth));

        let ton = TrackedWallet::new(1, "EQabc", Chain::Ton);
        assert!(ton.has_address("EQabc"));
        assert!(!ton.has_address("EQABC"));
    }
}
