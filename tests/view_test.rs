//! Preview windowing tests.

use ofsbook::models::book::{OrderBookRow, PriceValue};
use ofsbook::view::{PREVIEW_THRESHOLD, is_truncated, project};

fn book(len: usize) -> Vec<OrderBookRow> {
    (0..len)
        .map(|i| OrderBookRow {
            price: PriceValue::Text(format!("{}.00", 100 + i)),
            qty: i as u64,
            cumulative_qty: None,
        })
        .collect()
}

fn quantities(rows: &[&OrderBookRow]) -> Vec<u64> {
    rows.iter().map(|r| r.qty).collect()
}

#[test]
fn test_ten_rows_preview_is_head_and_tail() {
    let rows = book(10);
    assert_eq!(quantities(&project(&rows, false)), [0, 1, 2, 7, 8, 9]);
    assert!(is_truncated(&rows, false));
}

#[test]
fn test_five_rows_are_shown_in_full() {
    let rows = book(5);
    assert_eq!(quantities(&project(&rows, false)), [0, 1, 2, 3, 4]);
    assert!(!is_truncated(&rows, false));
}

#[test]
fn test_expanded_shows_everything_in_order() {
    let rows = book(10);
    assert_eq!(
        quantities(&project(&rows, true)),
        (0..10).collect::<Vec<u64>>()
    );
    assert!(!is_truncated(&rows, true));
}

#[test]
fn test_exactly_six_rows_never_truncates() {
    let rows = book(PREVIEW_THRESHOLD);
    assert_eq!(project(&rows, false).len(), 6);
    assert!(!is_truncated(&rows, false));
}

#[test]
fn test_seven_rows_abut_without_gap() {
    let rows = book(7);
    assert_eq!(quantities(&project(&rows, false)), [0, 1, 2, 4, 5, 6]);
}

#[test]
fn test_duplicate_rows_are_not_collapsed() {
    let mut rows = book(8);
    for row in &mut rows {
        row.price = PriceValue::Text("100.00".to_string());
        row.qty = 1;
    }
    assert_eq!(project(&rows, false).len(), 6);
}

#[test]
fn test_empty_book() {
    assert!(project(&[], false).is_empty());
    assert!(project(&[], true).is_empty());
}
