//! Cursor comparison for one fetched transaction page.

use crate::tracker::Transaction;

/// Outcome of comparing a newest-first page against a wallet's cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum PageDiff {
    /// Nothing fetched (no history, or the fetch failed).
    Empty,
    /// No cursor yet: adopt this hash silently.
    Seed(String),
    /// The newest entry is the cursor.
    Unchanged,
    /// Entries newer than the cursor, newest first. Never empty.
    New(Vec<Transaction>),
}

/// Compare `page` (newest first) against `cursor`.
///
/// Everything before the first entry whose hash equals the cursor is new.
/// If the cursor is not on the page at all, the whole page counts as new:
/// activity older than the page is invisible, so a burst larger than the
/// page between two polls can re-report entries from an earlier tick.
pub fn diff_page(cursor: Option<&str>, page: &[Transaction]) -> PageDiff {
    let Some(newest) = page.first() else {
        return PageDiff::Empty;
    };
    let Some(cursor) = cursor else {
        return PageDiff::Seed(newest.hash.clone());
    };

    let fresh: Vec<Transaction> = page
        .iter()
        .take_while(|tx| tx.hash != cursor)
        .cloned()
        .collect();

    if fresh.is_empty() {
        PageDiff::Unchanged
    } else {
        PageDiff::New(fresh)
    }
}
