pub mod backend;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod errors;
pub mod history;
pub mod insights;
pub mod selection;
pub mod suggestions;

#[cfg(test)]
mod fakes;

pub use backend::{DashboardBackend, ExplanationRequest, NarrativeReply};
pub use dashboard::{CustomerSnapshot, Dashboard, DashboardSession, Section};
pub use domain::customer::{CustomerDetails, CustomerId, CustomerSummary};
pub use domain::invoice::{HistoryEntry, InvoiceRecord};
pub use domain::product::ProductId;
pub use domain::suggestion::{SuggestionBatch, SuggestionColumn, SuggestionItem};
pub use errors::{ApplicationError, BackendError, DomainError, InterfaceError};
pub use history::{filter_history, HistoryOutcome};
pub use insights::{
    classify_customer_insights, classify_recommendation_explanation, InsightCard, InsightCategory,
    RecommendationCard, RecommendationCategory,
};
pub use selection::{SelectionIndicator, SelectionManager, SlotIndex};
pub use suggestions::{AggregatedSuggestions, SuggestionAggregator};
