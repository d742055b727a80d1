//! Extraction of the fundamentals table from a quote page.
//!
//! Each field is looked up independently: the first text node equal to the
//! label is located, and the next `td` cell after it in document order holds
//! the value. A label that is not on the page yields [`FieldValue::Missing`].

use scraper::{ElementRef, Html, Node};
use tracing::warn;

use crate::models::{FieldValue, FundamentalsRow};

pub const MARKET_CAP_LABEL: &str = "Market Cap";
pub const FLOAT_LABEL: &str = "Shs Float";
pub const SHORT_FLOAT_LABEL: &str = "Short Float";
pub const SHARES_OUTSTANDING_LABEL: &str = "Shs Outstand";
pub const INSTITUTIONAL_OWNERSHIP_LABEL: &str = "Inst Own";
pub const INSIDER_OWNERSHIP_LABEL: &str = "Insider Own";

/// Column headers, in the order of [`FundamentalsRow::fields`]
pub const FUNDAMENTALS_COLUMNS: [&str; 6] = [
    "Market Cap",
    "Float",
    "Short Float %",
    "Shares O/S",
    "Inst Own %",
    "Insider Own",
];

/// Parse the six fundamentals fields out of a quote page
pub fn parse_fundamentals(html: &str) -> FundamentalsRow {
    let document = Html::parse_document(html);

    FundamentalsRow {
        market_cap: lookup(&document, MARKET_CAP_LABEL),
        float: lookup(&document, FLOAT_LABEL),
        short_float: lookup(&document, SHORT_FLOAT_LABEL),
        shares_outstanding: lookup(&document, SHARES_OUTSTANDING_LABEL),
        institutional_ownership: lookup(&document, INSTITUTIONAL_OWNERSHIP_LABEL),
        insider_ownership: lookup(&document, INSIDER_OWNERSHIP_LABEL),
    }
}

fn lookup(document: &Html, label: &str) -> FieldValue {
    match value_after_label(document, label) {
        Some(value) => FieldValue::Found(value),
        None => {
            warn!("Label '{}' not found on quote page", label);
            FieldValue::Missing
        }
    }
}

/// Text of the first `td` that follows the label's text node in document order
fn value_after_label(document: &Html, label: &str) -> Option<String> {
    let mut nodes = document.tree.root().descendants();

    nodes.find(|node| matches!(node.value(), Node::Text(text) if text.trim() == label))?;

    nodes
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "td")
        .map(|cell| cell.text().collect::<String>().trim().to_string())
}
