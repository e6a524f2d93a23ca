use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::backend::DashboardBackend;
use crate::domain::customer::CustomerId;
use crate::domain::product::ProductId;
use crate::domain::suggestion::{SuggestionBatch, SuggestionColumn, SuggestionItem};
use crate::errors::{ApplicationError, BackendError, DomainError};

use super::SUGGESTIONS_PER_ITEM;

#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedSuggestions {
    /// One column per selected item, in selection order.
    pub per_item: SuggestionBatch,
    /// Customer-context suggestions; empty without a customer.
    pub supplemental: Vec<SuggestionItem>,
    /// Set when the supplemental request failed after per-item results arrived.
    pub supplemental_error: Option<BackendError>,
}

pub struct SuggestionAggregator<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B> SuggestionAggregator<'a, B>
where
    B: DashboardBackend + ?Sized,
{
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Fetches suggestions for every selected item concurrently, then the
    /// customer's supplemental set.
    ///
    /// Any per-item failure fails the whole call and no partial batch is
    /// returned; sibling requests still in flight are dropped unobserved.
    pub async fn aggregate(
        &self,
        selected: &[ProductId],
        customer: Option<&CustomerId>,
        correlation_id: &str,
    ) -> Result<AggregatedSuggestions, ApplicationError> {
        if selected.is_empty() {
            return Err(DomainError::EmptySelection.into());
        }

        let requests = selected.iter().map(|item| async move {
            let suggestions = self
                .backend
                .fetch_suggestions(item, SUGGESTIONS_PER_ITEM)
                .await
                .map_err(|error| {
                    warn!(
                        event_name = "suggestions.item.failed",
                        correlation_id,
                        item = %item,
                        error = %error,
                        "per-item suggestion request failed"
                    );
                    error
                })?;
            debug!(
                event_name = "suggestions.item.received",
                correlation_id,
                item = %item,
                count = suggestions.len(),
                "per-item suggestions received"
            );
            Ok::<_, BackendError>(SuggestionColumn { source: item.clone(), suggestions })
        });

        let per_item = SuggestionBatch::from_columns(try_join_all(requests).await?);

        let (supplemental, supplemental_error) = match customer {
            None => (Vec::new(), None),
            Some(customer) => match self.backend.fetch_supplemental_recommendations(customer).await {
                Ok(items) => (items, None),
                Err(error) => {
                    warn!(
                        event_name = "suggestions.supplemental.failed",
                        correlation_id,
                        customer_id = %customer,
                        error = %error,
                        "supplemental recommendations unavailable; keeping per-item results"
                    );
                    (Vec::new(), Some(error))
                }
            },
        };

        Ok(AggregatedSuggestions { per_item, supplemental, supplemental_error })
    }
}
