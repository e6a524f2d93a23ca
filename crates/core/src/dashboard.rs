//! Operator interactions driven against a [`DashboardBackend`].
//!
//! All mutable UI state lives in [`DashboardSession`], owned by the caller and
//! passed by reference into each interaction.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{DashboardBackend, ExplanationRequest, NarrativeReply};
use crate::domain::customer::{CustomerDetails, CustomerId, CustomerSummary};
use crate::domain::invoice::InvoiceRecord;
use crate::domain::product::ProductId;
use crate::domain::suggestion::SuggestionItem;
use crate::errors::{ApplicationError, BackendError, DomainError};
use crate::history::HistoryOutcome;
use crate::insights::{
    classify_customer_insights, classify_recommendation_explanation, InsightCard,
    RecommendationCard,
};
use crate::selection::{SelectionManager, SlotIndex};
use crate::suggestions::{AggregatedSuggestions, SuggestionAggregator};

/// Most recent invoices shown for a customer.
pub const INVOICE_DISPLAY_LIMIT: usize = 2;

/// Recommendations forwarded to the explanation endpoint.
pub const EXPLAINED_RECOMMENDATIONS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomerSnapshot {
    pub customer: CustomerId,
    pub details: Option<CustomerDetails>,
    pub invoices: Vec<InvoiceRecord>,
    pub history: HistoryOutcome,
}

#[derive(Clone, Debug, Default)]
pub struct DashboardSession {
    pub customer: Option<CustomerId>,
    pub selection: SelectionManager,
    pub catalog: Vec<ProductId>,
    pub snapshot: Option<CustomerSnapshot>,
    correlation_id: String,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self { correlation_id: Uuid::new_v4().to_string(), ..Self::default() }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Starts a new operator interaction and returns its correlation id.
    pub fn begin_interaction(&mut self) -> &str {
        self.correlation_id = Uuid::new_v4().to_string();
        &self.correlation_id
    }
}

/// Outcome of an optional page section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    /// The backend reports the feature as unavailable; the section is not shown.
    Hidden,
    /// Scoped error shown in place of the section.
    Failed(String),
}

impl<T> Section<T> {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }
}

pub struct Dashboard<B> {
    backend: B,
}

impl<B> Dashboard<B>
where
    B: DashboardBackend,
{
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn load_catalog(&self, session: &mut DashboardSession) -> Result<usize, ApplicationError> {
        let catalog = self.backend.fetch_catalog().await?;
        info!(
            event_name = "dashboard.catalog.loaded",
            correlation_id = session.correlation_id(),
            count = catalog.len(),
            "catalog loaded"
        );
        session.catalog = catalog;
        Ok(session.catalog.len())
    }

    pub async fn load_customers(
        &self,
        session: &DashboardSession,
    ) -> Result<Vec<CustomerSummary>, ApplicationError> {
        let customers = self.backend.fetch_customer_list().await?;
        info!(
            event_name = "dashboard.customers.loaded",
            correlation_id = session.correlation_id(),
            count = customers.len(),
            "customer list loaded"
        );
        Ok(customers)
    }

    /// Puts the customer's most recent purchase into the first empty slot.
    ///
    /// Returns the product when it was placed; a missing customer, an unknown
    /// recent item, a full selection or an already selected product leave the
    /// selection untouched.
    pub async fn prefill_from_recent_purchase(
        &self,
        session: &mut DashboardSession,
    ) -> Result<Option<ProductId>, ApplicationError> {
        let Some(customer) = session.customer.clone() else {
            return Ok(None);
        };
        let Some(recent) = self.backend.fetch_recent_purchase(&customer).await? else {
            return Ok(None);
        };

        let empty_slot = SlotIndex::all().into_iter().find(|index| session.selection.value(*index).is_none());
        let Some(index) = empty_slot else {
            return Ok(None);
        };
        if session.selection.selected_items().contains(&recent) {
            return Ok(None);
        }

        session.selection.select_slot(index, Some(recent.clone()));
        debug!(
            event_name = "dashboard.selection.prefilled",
            correlation_id = session.correlation_id(),
            customer_id = %customer,
            slot = index.get(),
            product = %recent,
            "selection prefilled from recent purchase"
        );
        Ok(Some(recent))
    }

    /// Switches the session to another customer (or none) and loads the
    /// customer's details, recent invoices and filtered history together.
    pub async fn select_customer<'s>(
        &self,
        session: &'s mut DashboardSession,
        customer: Option<CustomerId>,
    ) -> Result<Option<&'s CustomerSnapshot>, ApplicationError> {
        session.snapshot = None;
        session.customer = customer.clone();

        let Some(customer) = customer else {
            return Ok(None);
        };

        let (details, invoices, history) = futures::try_join!(
            self.backend.fetch_customer_details(&customer),
            self.backend.fetch_customer_invoices(&customer, INVOICE_DISPLAY_LIMIT),
            self.backend.fetch_customer_history(&customer),
        )
        .map_err(|error| {
            warn!(
                event_name = "dashboard.customer.load_failed",
                correlation_id = session.correlation_id(),
                customer_id = %customer,
                error = %error,
                "customer snapshot could not be loaded"
            );
            error
        })?;

        let history = HistoryOutcome::evaluate(&history, &invoices);
        info!(
            event_name = "dashboard.customer.selected",
            correlation_id = session.correlation_id(),
            customer_id = %customer,
            invoices = invoices.len(),
            history_entries = history.entries().len(),
            "customer snapshot loaded"
        );

        session.snapshot = Some(CustomerSnapshot { customer, details, invoices, history });
        Ok(session.snapshot.as_ref())
    }

    /// Suggestions for the filled slots, plus the customer's supplemental set.
    pub async fn suggest(
        &self,
        session: &DashboardSession,
    ) -> Result<AggregatedSuggestions, ApplicationError> {
        let selected = session.selection.selected_items();
        if selected.is_empty() {
            info!(
                event_name = "dashboard.suggestions.empty_selection",
                correlation_id = session.correlation_id(),
                "no products selected; nothing requested"
            );
            return Err(DomainError::EmptySelection.into());
        }

        info!(
            event_name = "dashboard.suggestions.requested",
            correlation_id = session.correlation_id(),
            items = selected.len(),
            has_customer = session.customer.is_some(),
            "requesting suggestions"
        );

        SuggestionAggregator::new(&self.backend)
            .aggregate(&selected, session.customer.as_ref(), session.correlation_id())
            .await
    }

    pub async fn customer_insights(&self, session: &DashboardSession) -> Section<Vec<InsightCard>> {
        let Some(customer) = session.customer.as_ref() else {
            return Section::Hidden;
        };

        let reply = self.backend.fetch_customer_insight_text(customer).await;
        narrative_section(session, "insights", reply, |text| classify_customer_insights(&text))
    }

    /// Explains why the given recommendations complement the selected items.
    pub async fn explain(
        &self,
        session: &DashboardSession,
        recommendations: &[SuggestionItem],
    ) -> Section<Vec<RecommendationCard>> {
        let request = ExplanationRequest {
            selected_products: session.selection.selected_items(),
            recommendations: recommendations.iter().take(EXPLAINED_RECOMMENDATIONS).cloned().collect(),
        };
        if request.selected_products.is_empty() {
            return Section::Hidden;
        }

        let reply = self.backend.fetch_recommendation_explanation_text(&request).await;
        narrative_section(session, "explanation", reply, |text| {
            classify_recommendation_explanation(&text)
        })
    }
}

fn narrative_section<T>(
    session: &DashboardSession,
    section: &'static str,
    reply: Result<NarrativeReply, BackendError>,
    classify: impl FnOnce(String) -> T,
) -> Section<T> {
    match reply {
        Ok(NarrativeReply::Text { text }) => Section::Ready(classify(text)),
        Ok(NarrativeReply::Unavailable { reason }) => {
            info!(
                event_name = "dashboard.narrative.hidden",
                correlation_id = session.correlation_id(),
                section,
                reason = %reason,
                "narrative section unavailable; hiding it"
            );
            Section::Hidden
        }
        Ok(NarrativeReply::Failed { reason }) => {
            warn!(
                event_name = "dashboard.narrative.failed",
                correlation_id = session.correlation_id(),
                section,
                reason = %reason,
                "narrative endpoint reported an error"
            );
            Section::Failed(reason)
        }
        Err(error) => {
            warn!(
                event_name = "dashboard.narrative.failed",
                correlation_id = session.correlation_id(),
                section,
                error = %error,
                "narrative request failed"
            );
            Section::Failed(error.to_string())
        }
    }
}
