//! Raw response shapes and their validation into core types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use xsell_core::backend::NarrativeReply;
use xsell_core::{
    BackendError, CustomerDetails, CustomerId, CustomerSummary, HistoryEntry, InvoiceRecord,
    ProductId, SuggestionItem,
};

pub(crate) type WireResult<T> = Result<T, String>;

pub(crate) fn malformed(endpoint: &str, reason: impl Into<String>) -> BackendError {
    BackendError::MalformedResponse { endpoint: endpoint.to_string(), reason: reason.into() }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCustomer {
    id: String,
    name: String,
}

impl WireCustomer {
    pub(crate) fn validate(self) -> WireResult<CustomerSummary> {
        Ok(CustomerSummary { id: CustomerId(non_blank("id", self.id)?), name: self.name })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireCustomerDetails {
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

impl WireCustomerDetails {
    /// `{}` (or a body without a name) means the customer is unknown.
    pub(crate) fn validate(self) -> WireResult<Option<CustomerDetails>> {
        let Some(name) = self.name.filter(|name| !name.trim().is_empty()) else {
            return Ok(None);
        };

        Ok(Some(CustomerDetails {
            name,
            address: required("address", self.address)?,
            phone: required("phone", self.phone)?,
            email: required("email", self.email)?,
        }))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireInvoice {
    invoice_id: Option<String>,
    date: String,
    #[serde(default)]
    items: Vec<String>,
    total: f64,
}

impl WireInvoice {
    pub(crate) fn validate(self) -> WireResult<InvoiceRecord> {
        let total = Decimal::try_from(self.total)
            .map_err(|error| format!("invoice total `{}` is not a currency amount: {error}", self.total))?
            .round_dp(2);
        let items = self
            .items
            .into_iter()
            .map(|item| non_blank("invoice item", item).map(ProductId))
            .collect::<WireResult<Vec<_>>>()?;

        Ok(InvoiceRecord { invoice_id: self.invoice_id, date: parse_date(&self.date)?, items, total })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireHistoryEntry {
    date: String,
    item: String,
}

impl WireHistoryEntry {
    pub(crate) fn validate(self) -> WireResult<HistoryEntry> {
        Ok(HistoryEntry { date: parse_date(&self.date)?, item: ProductId(non_blank("item", self.item)?) })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRecentPurchase {
    recent_item: Option<String>,
}

impl WireRecentPurchase {
    pub(crate) fn validate(self) -> Option<ProductId> {
        self.recent_item.filter(|item| !item.trim().is_empty()).map(ProductId)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSuggestion {
    item: String,
    score: f64,
    probability: f64,
    support: f64,
    similarity: f64,
    room: Option<String>,
}

impl WireSuggestion {
    pub(crate) fn validate(self) -> WireResult<SuggestionItem> {
        let item = non_blank("item", self.item)?;
        unit_interval(&item, "score", self.score)?;
        unit_interval(&item, "probability", self.probability)?;
        if !self.support.is_finite() || self.support < 0.0 {
            return Err(format!("suggestion `{item}` has negative support {}", self.support));
        }
        if !self.similarity.is_finite() {
            return Err(format!("suggestion `{item}` has a non-finite similarity"));
        }

        Ok(SuggestionItem {
            item: ProductId(item),
            score: self.score,
            probability: self.probability,
            support: self.support,
            similarity: self.similarity,
            room: self.room.filter(|room| !room.trim().is_empty()),
        })
    }
}

/// Body of `/api/suggest` and `/api/additional_recs`.
#[derive(Debug, Deserialize)]
pub(crate) struct WireSuggestionList {
    #[serde(default)]
    suggestions: Option<Vec<WireSuggestion>>,
}

impl WireSuggestionList {
    pub(crate) fn validate(self) -> WireResult<Vec<SuggestionItem>> {
        self.suggestions.unwrap_or_default().into_iter().map(WireSuggestion::validate).collect()
    }
}

/// Body of the narrative endpoints: `{success, <text_field>}` or `{error}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireNarrative {
    success: Option<bool>,
    insights: Option<String>,
    explanation: Option<String>,
    error: Option<String>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum NarrativeField {
    Insights,
    Explanation,
}

impl WireNarrative {
    pub(crate) fn validate(self, field: NarrativeField) -> WireResult<NarrativeReply> {
        if let Some(error) = self.error {
            return Ok(NarrativeReply::from_error_message(error));
        }

        let text = match field {
            NarrativeField::Insights => self.insights,
            NarrativeField::Explanation => self.explanation,
        };
        match (self.success, text) {
            (Some(true), Some(text)) => Ok(NarrativeReply::Text { text }),
            (Some(true), None) => Err(format!("successful reply is missing `{}`", field.name())),
            _ => Err("reply has neither `success` nor `error`".to_string()),
        }
    }

    pub(crate) fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl NarrativeField {
    fn name(self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::Explanation => "explanation",
        }
    }
}

fn parse_date(raw: &str) -> WireResult<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| format!("`{raw}` is not a YYYY-MM-DD date"))
}

fn non_blank(field: &str, value: String) -> WireResult<String> {
    if value.trim().is_empty() {
        Err(format!("`{field}` must not be blank"))
    } else {
        Ok(value)
    }
}

fn required(field: &str, value: Option<String>) -> WireResult<String> {
    value.ok_or_else(|| format!("`{field}` is missing"))
}

fn unit_interval(item: &str, field: &str, value: f64) -> WireResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("suggestion `{item}` has {field} {value} outside [0, 1]"))
    }
}
