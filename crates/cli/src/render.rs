//! Plain-text rendering of dashboard state for the terminal.

use xsell_core::selection::SLOT_COUNT;
use xsell_core::{
    CustomerDetails, CustomerSnapshot, CustomerSummary, HistoryOutcome, InsightCard,
    InvoiceRecord, ProductId, RecommendationCard, Section, SelectionManager, SlotIndex,
    SuggestionItem,
};

pub const SUPPLEMENTAL_TITLE: &str = "For their rooms";
pub const NO_HISTORY: &str = "No history found.";
pub const NO_PRIOR_PURCHASES: &str = "No purchases before the recent invoices.";
const BAR_CELLS: usize = 20;

pub fn customer_options(customers: &[CustomerSummary]) -> String {
    if customers.is_empty() {
        return "No customers found.".to_string();
    }
    customers.iter().map(CustomerSummary::option_label).collect::<Vec<_>>().join("\n")
}

/// One row per product with a marker for every slot: `*` selected there,
/// `-` held by another slot, `.` available.
pub fn catalog(products: &[ProductId], selection: &SelectionManager) -> String {
    let states = selection.compute_option_states(products);
    let width = products.iter().map(|product| product.as_str().chars().count()).max().unwrap_or(0);

    let mut lines = vec![format!("Selection: {}", selection.indicator().label())];
    for product in products {
        let markers = SlotIndex::all()
            .into_iter()
            .map(|index| {
                if selection.value(index) == Some(product) {
                    '*'
                } else if states.is_disabled(index, product) {
                    '-'
                } else {
                    '.'
                }
            })
            .collect::<String>();
        lines.push(format!("  {:<width$}  [{markers}]", product.as_str()));
    }
    lines.push(format!("Slots 1-{SLOT_COUNT}: * selected, - taken by another slot, . available"));
    lines.join("\n")
}

pub fn customer(snapshot: &CustomerSnapshot, insights: &Section<Vec<InsightCard>>) -> String {
    let mut lines = Vec::new();
    match &snapshot.details {
        Some(details) => lines.extend(details_block(details)),
        None => lines.push(format!("Customer {} has no details on file.", snapshot.customer)),
    }

    lines.push(String::new());
    lines.push("Recent invoices:".to_string());
    if snapshot.invoices.is_empty() {
        lines.push("  No recent invoices.".to_string());
    }
    for invoice in &snapshot.invoices {
        lines.extend(invoice_block(invoice));
    }

    lines.push(String::new());
    lines.push("Earlier purchases:".to_string());
    lines.extend(history_block(&snapshot.history));

    if let Some(block) = section_block("Customer insights", insights, |card| {
        format!("  {} {}: {}", card.icon, card.title, card.content)
    }) {
        lines.push(String::new());
        lines.extend(block);
    }

    lines.join("\n")
}

fn details_block(details: &CustomerDetails) -> Vec<String> {
    vec![details.name.clone(), details.address.clone(), format!("{} · {}", details.phone, details.email)]
}

fn invoice_block(invoice: &InvoiceRecord) -> Vec<String> {
    let mut lines = vec![format!("  {}", invoice.date)];
    lines.extend(invoice.items.iter().map(|item| format!("    - {item}")));
    lines.push(format!("    Total: {}", invoice.display_total()));
    lines
}

fn history_block(history: &HistoryOutcome) -> Vec<String> {
    match history {
        HistoryOutcome::NoHistory => vec![format!("  {NO_HISTORY}")],
        HistoryOutcome::AllAfterCutoff => vec![format!("  {NO_PRIOR_PURCHASES}")],
        HistoryOutcome::Entries(entries) => {
            entries.iter().map(|entry| format!("  {}: {}", entry.date, entry.item)).collect()
        }
    }
}

pub fn suggestion_column(title: &str, suggestions: &[SuggestionItem]) -> String {
    let mut lines = vec![format!("== {title} ==")];
    if suggestions.is_empty() {
        lines.push("  No suggestions".to_string());
    }
    for suggestion in suggestions {
        lines.push(format!(
            "  {}  Probability: {:.1}% | Score: {:.1}",
            suggestion.item,
            suggestion.probability * 100.0,
            suggestion.score * 100.0
        ));
        let room = suggestion.room.as_deref().map(|room| format!(" · Room: {room}")).unwrap_or_default();
        lines.push(format!(
            "    Support: {}, Similarity: {}{room}",
            suggestion.support, suggestion.similarity
        ));
        lines.push(format!("    {}", score_bar(suggestion.score)));
    }
    lines.join("\n")
}

/// Bar width is the score as a percentage, clamped to 5..=100.
pub fn score_bar_percent(score: f64) -> f64 {
    (score * 100.0).clamp(5.0, 100.0)
}

fn score_bar(score: f64) -> String {
    let percent = score_bar_percent(score);
    let filled = ((percent / 100.0) * BAR_CELLS as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_CELLS - filled))
}

pub fn explanation(section: &Section<Vec<RecommendationCard>>) -> Option<String> {
    section_block("Why these add-ons", section, |card| {
        format!("  {} {}: {}", card.icon, card.title, card.content)
    })
    .map(|lines| lines.join("\n"))
}

/// Hidden sections render nothing; failures render a one-line notice.
fn section_block<T>(
    heading: &str,
    section: &Section<Vec<T>>,
    line: impl Fn(&T) -> String,
) -> Option<Vec<String>> {
    match section {
        Section::Hidden => None,
        Section::Failed(reason) => {
            Some(vec![format!("{heading}:"), format!("  Could not load {}: {reason}", heading.to_lowercase())])
        }
        Section::Ready(cards) => {
            let mut lines = vec![format!("{heading}:")];
            lines.extend(cards.iter().map(line));
            Some(lines)
        }
    }
}
