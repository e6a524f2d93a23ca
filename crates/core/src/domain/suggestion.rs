use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// A scored candidate returned by the backend. Immutable once received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub item: ProductId,
    /// Blended ranking score in `[0, 1]`.
    pub score: f64,
    /// Co-purchase confidence in `[0, 1]`.
    pub probability: f64,
    pub support: f64,
    pub similarity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

/// Suggestions for one originating slot item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestionColumn {
    pub source: ProductId,
    pub suggestions: Vec<SuggestionItem>,
}

/// Per-item suggestions kept in the caller's selection order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionBatch {
    columns: Vec<SuggestionColumn>,
}

impl SuggestionBatch {
    pub fn from_columns(columns: Vec<SuggestionColumn>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[SuggestionColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, source: &ProductId) -> Option<&[SuggestionItem]> {
        self.columns
            .iter()
            .find(|column| &column.source == source)
            .map(|column| column.suggestions.as_slice())
    }

    pub fn sources(&self) -> impl Iterator<Item = &ProductId> {
        self.columns.iter().map(|column| &column.source)
    }

    /// Every suggestion across all columns, first column first.
    pub fn flattened(&self) -> impl Iterator<Item = &SuggestionItem> {
        self.columns.iter().flat_map(|column| column.suggestions.iter())
    }
}
