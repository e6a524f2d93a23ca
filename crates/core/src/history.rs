//! Purchase history trimmed to what predates the customer's recent invoices.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::invoice::{HistoryEntry, InvoiceRecord};

/// Most recent entries kept after filtering.
pub const HISTORY_LIMIT: usize = 12;

/// Earliest invoice date, or `None` when there are no invoices.
pub fn cutoff_date(invoices: &[InvoiceRecord]) -> Option<NaiveDate> {
    invoices.iter().map(|invoice| invoice.date).min()
}

/// Entries strictly before the cutoff (all entries without one), keeping only
/// the last [`HISTORY_LIMIT`] in their original order.
pub fn filter_history(history: &[HistoryEntry], invoices: &[InvoiceRecord]) -> Vec<HistoryEntry> {
    let cutoff = cutoff_date(invoices);
    let kept: Vec<&HistoryEntry> = history
        .iter()
        .filter(|entry| cutoff.map_or(true, |cutoff| entry.date < cutoff))
        .collect();

    let skip = kept.len().saturating_sub(HISTORY_LIMIT);
    kept.into_iter().skip(skip).cloned().collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "entries", rename_all = "snake_case")]
pub enum HistoryOutcome {
    Entries(Vec<HistoryEntry>),
    /// The customer has no history at all.
    NoHistory,
    /// History exists but every entry falls on or after the cutoff.
    AllAfterCutoff,
}

impl HistoryOutcome {
    pub fn evaluate(history: &[HistoryEntry], invoices: &[InvoiceRecord]) -> Self {
        if history.is_empty() {
            return Self::NoHistory;
        }

        let filtered = filter_history(history, invoices);
        if filtered.is_empty() {
            Self::AllAfterCutoff
        } else {
            Self::Entries(filtered)
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        match self {
            Self::Entries(entries) => entries,
            Self::NoHistory | Self::AllAfterCutoff => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;

    use super::{cutoff_date, filter_history, HistoryOutcome, HISTORY_LIMIT};
    use crate::domain::invoice::{HistoryEntry, InvoiceRecord};
    use crate::domain::product::ProductId;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date") + Duration::days(offset)
    }

    fn entry(offset: i64, item: &str) -> HistoryEntry {
        HistoryEntry { date: day(offset), item: ProductId::from(item) }
    }

    fn invoice(offset: i64) -> InvoiceRecord {
        InvoiceRecord {
            invoice_id: Some(format!("INV-{offset}")),
            date: day(offset),
            items: vec![ProductId::from("Washer")],
            total: Decimal::new(49_999, 2),
        }
    }

    #[test]
    fn cutoff_is_earliest_invoice_date() {
        assert_eq!(cutoff_date(&[invoice(30), invoice(10), invoice(20)]), Some(day(10)));
        assert_eq!(cutoff_date(&[]), None);
    }

    #[test]
    fn entries_on_or_after_cutoff_are_excluded() {
        let history = vec![entry(1, "Grill"), entry(9, "Vacuum"), entry(10, "Washer"), entry(11, "Dryer")];

        let filtered = filter_history(&history, &[invoice(12), invoice(10)]);

        assert_eq!(filtered, vec![entry(1, "Grill"), entry(9, "Vacuum")]);
    }

    #[test]
    fn filtered_history_keeps_last_twelve_in_input_order() {
        let history: Vec<HistoryEntry> = (0..20).map(|i| entry(i, &format!("Item {i}"))).collect();

        let filtered = filter_history(&history, &[invoice(18)]);

        assert_eq!(filtered.len(), HISTORY_LIMIT);
        assert_eq!(filtered.first(), Some(&entry(6, "Item 6")));
        assert_eq!(filtered.last(), Some(&entry(17, "Item 17")));
        assert!(filtered.windows(2).all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn without_invoices_history_is_only_truncated() {
        let history: Vec<HistoryEntry> = (0..15).map(|i| entry(i, "Blender")).collect();

        let filtered = filter_history(&history, &[]);

        assert_eq!(filtered, history[3..].to_vec());
    }

    #[test]
    fn outcome_distinguishes_empty_history_from_fully_invoiced_history() {
        assert_eq!(HistoryOutcome::evaluate(&[], &[invoice(1)]), HistoryOutcome::NoHistory);

        let recent_only = vec![entry(5, "Range"), entry(6, "Oven Liners")];
        assert_eq!(
            HistoryOutcome::evaluate(&recent_only, &[invoice(5)]),
            HistoryOutcome::AllAfterCutoff
        );

        let mixed = vec![entry(1, "Range"), entry(6, "Oven Liners")];
        let outcome = HistoryOutcome::evaluate(&mixed, &[invoice(5)]);
        assert_eq!(outcome.entries(), &[entry(1, "Range")]);
    }
}
