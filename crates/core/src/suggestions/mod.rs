//! Cross-sell suggestions for the products currently in the order.
//!
//! Per-item requests are launched together and awaited jointly; results are
//! mapped back to the slot that asked for them, whatever order they finish in.

mod aggregator;

pub use aggregator::{AggregatedSuggestions, SuggestionAggregator};

/// Result cap requested for every selected item.
pub const SUGGESTIONS_PER_ITEM: usize = 5;
