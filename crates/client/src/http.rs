use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use xsell_core::backend::{BackendResult, NarrativeReply};
use xsell_core::config::BackendConfig;
use xsell_core::{
    BackendError, CustomerDetails, CustomerId, CustomerSummary, DashboardBackend,
    ExplanationRequest, HistoryEntry, InvoiceRecord, ProductId, SuggestionItem,
};

use crate::wire::{
    malformed, NarrativeField, WireCustomer, WireCustomerDetails, WireHistoryEntry, WireInvoice,
    WireNarrative, WireRecentPurchase, WireSuggestionList,
};

const CATALOG: &str = "/api/catalog_main";
const CUSTOMERS: &str = "/api/customers";
const CUSTOMER_DETAILS: &str = "/api/customer_details";
const CUSTOMER_INVOICES: &str = "/api/customer_invoices";
const CUSTOMER_HISTORY: &str = "/api/customer_history";
const RECENT_PURCHASE: &str = "/api/recent_purchase";
const SUGGEST: &str = "/api/suggest";
const ADDITIONAL_RECS: &str = "/api/additional_recs";
const CUSTOMER_INSIGHTS: &str = "/api/customer_insights";
const RECOMMENDATION_EXPLANATION: &str = "/api/recommendation_explanation";

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_token: Option<SecretString>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|error| BackendError::Transport(format!("failed to build http client: {error}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> BackendResult<(StatusCode, Vec<u8>)> {
        debug!(event_name = "client.request.sent", endpoint, "sending backend request");

        let response = self.authorize(request).send().await.map_err(|error| {
            warn!(event_name = "client.request.failed", endpoint, error = %error, "backend request failed");
            BackendError::Transport(format!("{endpoint}: {error}"))
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|error| {
            BackendError::Transport(format!("{endpoint}: failed to read body: {error}"))
        })?;

        debug!(
            event_name = "client.request.completed",
            endpoint,
            status = status.as_u16(),
            bytes = body.len(),
            "backend request completed"
        );
        Ok((status, body.to_vec()))
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> BackendResult<T> {
        let request = self.client.get(self.url(endpoint)).query(query);
        let (status, body) = self.send(endpoint, request).await?;
        if !status.is_success() {
            warn!(
                event_name = "client.request.rejected",
                endpoint,
                status = status.as_u16(),
                "backend returned an error status"
            );
            return Err(BackendError::Status { endpoint: endpoint.to_string(), status: status.as_u16() });
        }
        decode(endpoint, &body)
    }

    /// Narrative endpoints report failures as `{error}`, sometimes with a
    /// non-2xx status, so the body wins over the status when it parses.
    async fn narrative(
        &self,
        endpoint: &str,
        request: RequestBuilder,
        field: NarrativeField,
    ) -> BackendResult<NarrativeReply> {
        let (status, body) = self.send(endpoint, request).await?;
        match serde_json::from_slice::<WireNarrative>(&body) {
            Ok(reply) if status.is_success() || reply.has_error() => {
                reply.validate(field).map_err(|reason| malformed(endpoint, reason))
            }
            Err(error) if status.is_success() => Err(malformed(endpoint, error.to_string())),
            _ => Err(BackendError::Status { endpoint: endpoint.to_string(), status: status.as_u16() }),
        }
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> BackendResult<T> {
    serde_json::from_slice(body).map_err(|error| malformed(endpoint, error.to_string()))
}

fn validate_all<W, T>(
    endpoint: &str,
    rows: Vec<W>,
    validate: impl Fn(W) -> Result<T, String>,
) -> BackendResult<Vec<T>> {
    rows.into_iter()
        .map(validate)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| malformed(endpoint, reason))
}

fn customer_query(customer: &CustomerId) -> [(&'static str, String); 1] {
    [("customer_id", customer.as_str().to_string())]
}

#[async_trait]
impl DashboardBackend for HttpBackend {
    async fn fetch_catalog(&self) -> BackendResult<Vec<ProductId>> {
        let items: Vec<String> = self.get(CATALOG, &[]).await?;
        validate_all(CATALOG, items, |item| {
            if item.trim().is_empty() {
                Err("catalog contains a blank product".to_string())
            } else {
                Ok(ProductId(item))
            }
        })
    }

    async fn fetch_customer_list(&self) -> BackendResult<Vec<CustomerSummary>> {
        let rows: Vec<WireCustomer> = self.get(CUSTOMERS, &[]).await?;
        validate_all(CUSTOMERS, rows, WireCustomer::validate)
    }

    async fn fetch_customer_details(
        &self,
        customer: &CustomerId,
    ) -> BackendResult<Option<CustomerDetails>> {
        let details: WireCustomerDetails =
            self.get(CUSTOMER_DETAILS, &customer_query(customer)).await?;
        details.validate().map_err(|reason| malformed(CUSTOMER_DETAILS, reason))
    }

    async fn fetch_customer_invoices(
        &self,
        customer: &CustomerId,
        limit: usize,
    ) -> BackendResult<Vec<InvoiceRecord>> {
        let query = [("customer_id", customer.as_str().to_string()), ("limit", limit.to_string())];
        let rows: Vec<WireInvoice> = self.get(CUSTOMER_INVOICES, &query).await?;
        validate_all(CUSTOMER_INVOICES, rows, WireInvoice::validate)
    }

    async fn fetch_customer_history(&self, customer: &CustomerId) -> BackendResult<Vec<HistoryEntry>> {
        let rows: Vec<WireHistoryEntry> =
            self.get(CUSTOMER_HISTORY, &customer_query(customer)).await?;
        validate_all(CUSTOMER_HISTORY, rows, WireHistoryEntry::validate)
    }

    async fn fetch_recent_purchase(&self, customer: &CustomerId) -> BackendResult<Option<ProductId>> {
        let recent: WireRecentPurchase = self.get(RECENT_PURCHASE, &customer_query(customer)).await?;
        Ok(recent.validate())
    }

    async fn fetch_suggestions(
        &self,
        item: &ProductId,
        k: usize,
    ) -> BackendResult<Vec<SuggestionItem>> {
        let query = [("item", item.as_str().to_string()), ("k", k.to_string())];
        let list: WireSuggestionList = self.get(SUGGEST, &query).await?;
        list.validate().map_err(|reason| malformed(SUGGEST, reason))
    }

    async fn fetch_supplemental_recommendations(
        &self,
        customer: &CustomerId,
    ) -> BackendResult<Vec<SuggestionItem>> {
        let list: WireSuggestionList = self.get(ADDITIONAL_RECS, &customer_query(customer)).await?;
        list.validate().map_err(|reason| malformed(ADDITIONAL_RECS, reason))
    }

    async fn fetch_customer_insight_text(
        &self,
        customer: &CustomerId,
    ) -> BackendResult<NarrativeReply> {
        let request = self.client.get(self.url(CUSTOMER_INSIGHTS)).query(&customer_query(customer));
        self.narrative(CUSTOMER_INSIGHTS, request, NarrativeField::Insights).await
    }

    async fn fetch_recommendation_explanation_text(
        &self,
        request: &ExplanationRequest,
    ) -> BackendResult<NarrativeReply> {
        let builder = self.client.post(self.url(RECOMMENDATION_EXPLANATION)).json(request);
        self.narrative(RECOMMENDATION_EXPLANATION, builder, NarrativeField::Explanation).await
    }
}
