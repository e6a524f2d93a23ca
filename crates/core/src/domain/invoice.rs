use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// A single historical purchase line. Snapshots are replaced wholesale on every
/// customer change and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub item: ProductId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub invoice_id: Option<String>,
    pub date: NaiveDate,
    pub items: Vec<ProductId>,
    pub total: Decimal,
}

impl InvoiceRecord {
    pub fn display_total(&self) -> String {
        format!("${:.2}", self.total.round_dp(2))
    }
}
