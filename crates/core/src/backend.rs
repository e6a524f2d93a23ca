//! Operations the dashboard consumes from its backend collaborator.
//!
//! Implementations validate every response before it reaches these types; a
//! response that does not fit is reported as [`BackendError::MalformedResponse`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::customer::{CustomerDetails, CustomerId, CustomerSummary};
use crate::domain::invoice::{HistoryEntry, InvoiceRecord};
use crate::domain::product::ProductId;
use crate::domain::suggestion::SuggestionItem;
use crate::errors::BackendError;

pub type BackendResult<T> = Result<T, BackendError>;

/// Reply from an optional narrative endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrativeReply {
    Text { text: String },
    /// The feature is not available or not configured on the backend.
    Unavailable { reason: String },
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    pub selected_products: Vec<ProductId>,
    pub recommendations: Vec<SuggestionItem>,
}

#[async_trait]
pub trait DashboardBackend: Send + Sync {
    async fn fetch_catalog(&self) -> BackendResult<Vec<ProductId>>;

    async fn fetch_customer_list(&self) -> BackendResult<Vec<CustomerSummary>>;

    /// `None` when the backend knows nothing about the customer.
    async fn fetch_customer_details(
        &self,
        customer: &CustomerId,
    ) -> BackendResult<Option<CustomerDetails>>;

    async fn fetch_customer_invoices(
        &self,
        customer: &CustomerId,
        limit: usize,
    ) -> BackendResult<Vec<InvoiceRecord>>;

    async fn fetch_customer_history(&self, customer: &CustomerId) -> BackendResult<Vec<HistoryEntry>>;

    async fn fetch_recent_purchase(&self, customer: &CustomerId) -> BackendResult<Option<ProductId>>;

    async fn fetch_suggestions(&self, item: &ProductId, k: usize)
        -> BackendResult<Vec<SuggestionItem>>;

    async fn fetch_supplemental_recommendations(
        &self,
        customer: &CustomerId,
    ) -> BackendResult<Vec<SuggestionItem>>;

    async fn fetch_customer_insight_text(&self, customer: &CustomerId)
        -> BackendResult<NarrativeReply>;

    async fn fetch_recommendation_explanation_text(
        &self,
        request: &ExplanationRequest,
    ) -> BackendResult<NarrativeReply>;
}

/// Whether an `{error}` message from a narrative endpoint is the
/// "not available / not configured" sentinel rather than a failure.
pub fn is_unavailable_sentinel(message: &str) -> bool {
    let normalized = message.to_ascii_lowercase();
    normalized.contains("not available")
        || normalized.contains("not configured")
        || normalized.contains("unavailable")
}

impl NarrativeReply {
    pub fn from_error_message(message: impl Into<String>) -> Self {
        let reason = message.into();
        if is_unavailable_sentinel(&reason) {
            Self::Unavailable { reason }
        } else {
            Self::Failed { reason }
        }
    }
}
