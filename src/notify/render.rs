//! Telegram-flavoured HTML rendering of balances, transactions and alerts.

use chrono::DateTime;

use crate::tracker::{Balance, Chain, Direction, Transaction, TxStatus};
use crate::watch::Notification;

fn chain_icon(chain: Chain) -> &'static str {
    match chain {
        Chain::Ton => "💎",
        Chain::Eth => "⟠",
        Chain::Bsc => "🟡",
    }
}

fn currency(chain: Chain) -> &'static str {
    match chain {
        Chain::Ton => "TON",
        Chain::Eth => "ETH",
        Chain::Bsc => "BNB",
    }
}

/// Escape the characters Telegram's HTML parse mode treats specially.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// `head...tail` for strings longer than `head + tail + 3` characters.
pub fn shorten(text: &str, head: usize, tail: usize) -> String {
    let count = text.chars().count();
    if count <= head + tail + 3 {
        return text.to_string();
    }
    let start: String = text.chars().take(head).collect();
    let end: String = text.chars().skip(count - tail).collect();
    format!("{start}...{end}")
}

fn format_timestamp(timestamp: i64) -> String {
    if timestamp <= 0 {
        return "unknown".to_string();
    }
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Balance line. An absent balance is "unavailable", never zero.
pub fn format_balance(balance: Option<&Balance>) -> String {
    match balance {
        Some(b) => format!("💰 Balance: {:.6} {}", b.amount, b.currency),
        None => "❌ Balance unavailable, try again later".to_string(),
    }
}

pub fn format_transaction(tx: &Transaction, chain: Chain) -> String {
    let (icon, kind, label) = match tx.direction {
        Direction::Incoming => ("📥", "Incoming", "From"),
        Direction::Outgoing => ("📤", "Outgoing", "To"),
    };
    let status = match tx.status {
        TxStatus::Success => "✅",
        TxStatus::Failed => "❌",
        TxStatus::Unknown => "⚠️",
    };

    format!(
        "{icon} {kind}: {:.6} {}\n   {label}: {}\n   Date: {}\n   Hash: {} {status}",
        tx.amount,
        currency(chain),
        escape_html(&shorten(&tx.counterparty, 6, 4)),
        format_timestamp(tx.timestamp),
        escape_html(&shorten(&tx.hash, 6, 4)),
    )
}

/// Full lookup answer: header, balance, recent transactions and explorer link.
pub fn format_wallet_info(
    address: &str,
    chain: Chain,
    balance: Option<&Balance>,
    transactions: &[Transaction],
    explorer_link: &str,
) -> String {
    let mut message = format!(
        "{} <b>{} wallet</b>\n\n📍 Address: <code>{}</code>\n\n{}\n\n",
        chain_icon(chain),
        chain,
        escape_html(&shorten(address, 8, 6)),
        format_balance(balance),
    );

    if transactions.is_empty() {
        message.push_str("📊 No transactions found\n\n");
    } else {
        message.push_str("📊 <b>Recent transactions:</b>\n\n");
        for (i, tx) in transactions.iter().enumerate() {
            message.push_str(&format!("{}. {}\n\n", i + 1, format_transaction(tx, chain)));
        }
    }

    message.push_str(&format!(
        "🔗 <a href=\"{}\">View in explorer</a>",
        escape_html(explorer_link)
    ));
    message
}

/// Alert text for new activity on a tracked wallet.
pub fn format_notification(notification: &Notification) -> String {
    let wallet = &notification.wallet;
    let mut message = format!(
        "🔔 New transactions for <b>{}</b> <code>{}</code>\n\n",
        wallet.chain,
        escape_html(&shorten(&wallet.address, 8, 6)),
    );
    for tx in &notification.transactions {
        message.push_str(&format_transaction(tx, wallet.chain));
        message.push_str("\n\n");
    }
    message.push_str(&format!(
        "<a href=\"{}\">Open in explorer</a>",
        escape_html(&notification.explorer_link)
    ));
    message
}
