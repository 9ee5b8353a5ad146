//! View projection and display formatting.
//!
//! [`project`] picks which rows to show: the whole book when it is short
//! or the user expanded it, otherwise the first and last
//! [`PREVIEW_EDGE`] rows. The formatting helpers render every absent
//! field as [`PLACEHOLDER`].

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::book::{BookMeta, OrderBookRow, PriceValue};

/// Rows kept from each end of the book in the preview.
pub const PREVIEW_EDGE: usize = 3;

/// Books with at most this many rows are never truncated.
pub const PREVIEW_THRESHOLD: usize = 2 * PREVIEW_EDGE;

/// Rendered in place of any absent value.
pub const PLACEHOLDER: &str = "—";

/// Selects the rows to display, preserving feed order.
///
/// A 7-row book yields rows `[0, 1, 2, 4, 5, 6]` with no gap marker.
pub fn project(rows: &[OrderBookRow], expanded: bool) -> Vec<&OrderBookRow> {
    if expanded || rows.len() <= PREVIEW_THRESHOLD {
        return rows.iter().collect();
    }

    rows[..PREVIEW_EDGE]
        .iter()
        .chain(&rows[rows.len() - PREVIEW_EDGE..])
        .collect()
}

/// Returns `true` if the collapsed projection hides rows.
pub fn is_truncated(rows: &[OrderBookRow], expanded: bool) -> bool {
    !expanded && rows.len() > PREVIEW_THRESHOLD
}

/// One labelled cell of the summary grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryField {
    pub label: &'static str,
    pub value: String,
}

/// Builds the summary grid in display order.
pub fn summary(meta: Option<&BookMeta>) -> Vec<SummaryField> {
    let empty = BookMeta::default();
    let meta = meta.unwrap_or(&empty);

    let field = |label, value| SummaryField { label, value };
    vec![
        field("Subscription", format_pct(meta.subscription_pct)),
        field("Remaining Qty", format_qty(meta.remaining_qty)),
        field("Cutoff Price", format_price(meta.cutoff_price.as_ref())),
        field("Top Price", format_price(meta.top_price.as_ref())),
        field("Issue Size", format_qty(meta.issue_size)),
        field("NSE Time", format_timestamp(meta.nse_last_updated_ts)),
        field("BSE Time", format_timestamp(meta.bse_last_updated_ts)),
    ]
}

/// Display strings for one table row: price, quantity, cumulative.
pub fn format_row(row: &OrderBookRow) -> [String; 3] {
    [
        row.price.to_string(),
        group_thousands(i128::from(row.qty)),
        format_qty(row.cumulative_qty),
    ]
}

/// `87.25%`, or the placeholder.
pub fn format_pct(value: Option<Decimal>) -> String {
    match value {
        Some(pct) => format!("{:.2}%", pct.round_dp(2)),
        None => PLACEHOLDER.to_string(),
    }
}

/// Quantity with thousands separators, or the placeholder.
pub fn format_qty<N: Into<i128>>(value: Option<N>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |n| group_thousands(n.into()))
}

pub fn format_price(value: Option<&PriceValue>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), ToString::to_string)
}

/// Unix seconds as local date-time, or the placeholder when absent or
/// out of range.
pub fn format_timestamp(value: Option<Decimal>) -> String {
    value
        .and_then(|ts| ts.trunc().to_i64())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
