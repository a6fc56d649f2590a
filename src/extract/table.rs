//! Locate the share-history table in a page snapshot.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::FetchError;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").expect("static selector"));

/// First table, in document order, whose text contains `marker`.
///
/// Pages are expected to carry at most one matching table. If a page ever has two,
/// the first one wins; nothing tries to rank candidates.
pub fn locate_table<'a>(doc: &'a Html, marker: &str) -> Result<ElementRef<'a>, FetchError> {
    doc.select(&TABLE)
        .find(|table| table_text(*table).contains(marker))
        .ok_or_else(|| FetchError::TableNotFound {
            marker: marker.to_string(),
        })
}

fn table_text(table: ElementRef<'_>) -> String {
    table.text().collect()
}
