//! Order-book snapshot models.
//!
//! A snapshot is a complete replacement view of the book, never a diff.
//! Every field the feed may omit is an `Option` so absent values stay
//! absent instead of failing deserialization.

use std::fmt;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A price as sent by the feed: either a JSON string or a JSON number.
///
/// The two encodings are kept distinct so that a switch from `"101.5"`
/// to `101.5` counts as a change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Text(String),
    Number(Decimal),
}

impl fmt::Display for PriceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceValue::Text(text) => f.write_str(text),
            PriceValue::Number(number) => write!(f, "{number}"),
        }
    }
}

/// A single price level, in the rank order the feed sent it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBookRow {
    pub price: PriceValue,
    pub qty: u64,
    /// Running total of `qty` down the book. Absent in legacy frames.
    #[serde(default)]
    pub cumulative_qty: Option<u64>,
}

/// Summary statistics accompanying a snapshot.
///
/// A field with an unexpected type is read as absent rather than
/// rejecting the rows it arrived with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BookMeta {
    #[serde(deserialize_with = "lenient")]
    pub subscription_pct: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    pub remaining_qty: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub cutoff_price: Option<PriceValue>,
    #[serde(deserialize_with = "lenient")]
    pub top_price: Option<PriceValue>,
    #[serde(deserialize_with = "lenient")]
    pub issue_size: Option<u64>,
    /// Unix seconds; may carry a fractional part.
    #[serde(deserialize_with = "lenient")]
    pub nse_last_updated_ts: Option<Decimal>,
    /// Unix seconds; may carry a fractional part.
    #[serde(deserialize_with = "lenient")]
    pub bse_last_updated_ts: Option<Decimal>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// The unit of deduplication and storage: ordered rows plus metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ClientSnapshot {
    pub rows: Vec<OrderBookRow>,
    pub meta: BookMeta,
}

impl ClientSnapshot {
    /// Returns `true` if `cumulative_qty` never decreases down the book.
    ///
    /// Rows without a cumulative quantity are skipped.
    pub fn cumulative_is_monotonic(&self) -> bool {
        let mut previous: Option<u64> = None;
        for cumulative in self.rows.iter().filter_map(|row| row.cumulative_qty) {
            if previous.is_some_and(|p| cumulative < p) {
                return false;
            }
            previous = Some(cumulative);
        }
        true
    }

    /// Feeds a deterministic, order-preserving encoding of the snapshot
    /// into `hasher`.
    pub fn write_canonical(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(&(self.rows.len() as u64).to_le_bytes());
        for row in &self.rows {
            write_price(hasher, Some(&row.price));
            hasher.update(&row.qty.to_le_bytes());
            write_opt(hasher, row.cumulative_qty.map(|v| v.to_le_bytes()));
        }

        let meta = &self.meta;
        write_decimal(hasher, meta.subscription_pct);
        write_opt(hasher, meta.remaining_qty.map(|v| v.to_le_bytes()));
        write_price(hasher, meta.cutoff_price.as_ref());
        write_price(hasher, meta.top_price.as_ref());
        write_opt(hasher, meta.issue_size.map(|v| v.to_le_bytes()));
        write_decimal(hasher, meta.nse_last_updated_ts);
        write_decimal(hasher, meta.bse_last_updated_ts);
    }
}

fn write_opt(hasher: &mut crc32fast::Hasher, value: Option<[u8; 8]>) {
    match value {
        Some(bytes) => {
            hasher.update(&[1]);
            hasher.update(&bytes);
        }
        None => hasher.update(&[0]),
    }
}

fn write_decimal(hasher: &mut crc32fast::Hasher, value: Option<Decimal>) {
    match value {
        // Normalized so 1.50 and 1.5 hash alike, matching Decimal equality.
        Some(d) => {
            hasher.update(&[1]);
            hasher.update(&d.normalize().serialize());
        }
        None => hasher.update(&[0]),
    }
}

fn write_price(hasher: &mut crc32fast::Hasher, value: Option<&PriceValue>) {
    match value {
        Some(PriceValue::Text(text)) => {
            hasher.update(&[2]);
            hasher.update(&(text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }
        Some(PriceValue::Number(number)) => {
            hasher.update(&[3]);
            hasher.update(&number.normalize().serialize());
        }
        None => hasher.update(&[0]),
    }
}
