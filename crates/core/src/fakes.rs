//! In-memory backend used by the core's unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{BackendResult, DashboardBackend, ExplanationRequest, NarrativeReply};
use crate::domain::customer::{CustomerDetails, CustomerId, CustomerSummary};
use crate::domain::invoice::{HistoryEntry, InvoiceRecord};
use crate::domain::product::ProductId;
use crate::domain::suggestion::SuggestionItem;
use crate::errors::BackendError;

pub(crate) fn suggestion(item: &str, score: f64) -> SuggestionItem {
    SuggestionItem {
        item: ProductId::from(item),
        score,
        probability: 0.22,
        support: 0.04,
        similarity: 0.5,
        room: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    catalog: Vec<ProductId>,
    customers: Vec<CustomerSummary>,
    details: HashMap<String, CustomerDetails>,
    invoices: HashMap<String, Vec<InvoiceRecord>>,
    history: HashMap<String, Vec<HistoryEntry>>,
    history_error: Option<BackendError>,
    suggestions: HashMap<String, BackendResult<Vec<SuggestionItem>>>,
    delays: HashMap<String, Duration>,
    supplemental: Option<BackendResult<Vec<SuggestionItem>>>,
    insight: Option<BackendResult<NarrativeReply>>,
    explanation: Option<BackendResult<NarrativeReply>>,
    calls: Mutex<Vec<String>>,
    completions: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub(crate) fn with_catalog(mut self, items: &[&str]) -> Self {
        self.catalog = items.iter().copied().map(ProductId::from).collect();
        self
    }

    pub(crate) fn with_customer(mut self, id: &str, name: &str) -> Self {
        self.customers.push(CustomerSummary { id: CustomerId::new(id), name: name.to_string() });
        self.details.insert(
            id.to_string(),
            CustomerDetails {
                name: name.to_string(),
                address: "100 Oak St, Cleveland, OH 44101".to_string(),
                phone: "(216) 555-0100".to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            },
        );
        self
    }

    pub(crate) fn with_invoices(mut self, id: &str, invoices: Vec<InvoiceRecord>) -> Self {
        self.invoices.insert(id.to_string(), invoices);
        self
    }

    pub(crate) fn with_history(mut self, id: &str, history: Vec<HistoryEntry>) -> Self {
        self.history.insert(id.to_string(), history);
        self
    }

    pub(crate) fn with_history_error(mut self, error: BackendError) -> Self {
        self.history_error = Some(error);
        self
    }

    pub(crate) fn with_suggestions(mut self, item: &str, suggestions: Vec<SuggestionItem>) -> Self {
        self.suggestions.insert(item.to_string(), Ok(suggestions));
        self
    }

    pub(crate) fn with_suggestion_error(mut self, item: &str, error: BackendError) -> Self {
        self.suggestions.insert(item.to_string(), Err(error));
        self
    }

    pub(crate) fn with_delay(mut self, item: &str, delay: Duration) -> Self {
        self.delays.insert(item.to_string(), delay);
        self
    }

    pub(crate) fn with_supplemental(mut self, suggestions: Vec<SuggestionItem>) -> Self {
        self.supplemental = Some(Ok(suggestions));
        self
    }

    pub(crate) fn with_supplemental_error(mut self, error: BackendError) -> Self {
        self.supplemental = Some(Err(error));
        self
    }

    pub(crate) fn with_insight(mut self, reply: BackendResult<NarrativeReply>) -> Self {
        self.insight = Some(reply);
        self
    }

    pub(crate) fn with_explanation(mut self, reply: BackendResult<NarrativeReply>) -> Self {
        self.explanation = Some(reply);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn completion_order(&self) -> Vec<String> {
        self.completions.lock().expect("completions lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

fn not_configured() -> NarrativeReply {
    NarrativeReply::Unavailable { reason: "service not configured".to_string() }
}

#[async_trait]
impl DashboardBackend for FakeBackend {
    async fn fetch_catalog(&self) -> BackendResult<Vec<ProductId>> {
        self.record("catalog".to_string());
        Ok(self.catalog.clone())
    }

    async fn fetch_customer_list(&self) -> BackendResult<Vec<CustomerSummary>> {
        self.record("customers".to_string());
        Ok(self.customers.clone())
    }

    async fn fetch_customer_details(
        &self,
        customer: &CustomerId,
    ) -> BackendResult<Option<CustomerDetails>> {
        self.record(format!("details:{customer}"));
        Ok(self.details.get(customer.as_str()).cloned())
    }

    async fn fetch_customer_invoices(
        &self,
        customer: &CustomerId,
        limit: usize,
    ) -> BackendResult<Vec<InvoiceRecord>> {
        self.record(format!("invoices:{customer}:{limit}"));
        let mut invoices = self.invoices.get(customer.as_str()).cloned().unwrap_or_default();
        invoices.truncate(limit);
        Ok(invoices)
    }

    async fn fetch_customer_history(&self, customer: &CustomerId) -> BackendResult<Vec<HistoryEntry>> {
        self.record(format!("history:{customer}"));
        if let Some(error) = &self.history_error {
            return Err(error.clone());
        }
        Ok(self.history.get(customer.as_str()).cloned().unwrap_or_default())
    }

    async fn fetch_recent_purchase(&self, customer: &CustomerId) -> BackendResult<Option<ProductId>> {
        self.record(format!("recent:{customer}"));
        Ok(self
            .history
            .get(customer.as_str())
            .and_then(|entries| entries.last())
            .map(|entry| entry.item.clone()))
    }

    async fn fetch_suggestions(
        &self,
        item: &ProductId,
        k: usize,
    ) -> BackendResult<Vec<SuggestionItem>> {
        self.record(format!("suggest:{item}:{k}"));
        if let Some(delay) = self.delays.get(item.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        self.completions.lock().expect("completions lock").push(item.to_string());
        match self.suggestions.get(item.as_str()) {
            Some(Ok(suggestions)) => Ok(suggestions.iter().take(k).cloned().collect()),
            Some(Err(error)) => Err(error.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_supplemental_recommendations(
        &self,
        customer: &CustomerId,
    ) -> BackendResult<Vec<SuggestionItem>> {
        self.record(format!("supplemental:{customer}"));
        self.supplemental.clone().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_customer_insight_text(
        &self,
        customer: &CustomerId,
    ) -> BackendResult<NarrativeReply> {
        self.record(format!("insights:{customer}"));
        self.insight.clone().unwrap_or_else(|| Ok(not_configured()))
    }

    async fn fetch_recommendation_explanation_text(
        &self,
        request: &ExplanationRequest,
    ) -> BackendResult<NarrativeReply> {
        let products: Vec<&str> =
            request.selected_products.iter().map(ProductId::as_str).collect();
        self.record(format!("explanation:{}", products.join(",")));
        self.explanation.clone().unwrap_or_else(|| Ok(not_configured()))
    }
}
