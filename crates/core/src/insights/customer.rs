use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::rules::{first_match, KeywordRule};
use super::{strip_markup, truncate_sentences};

const MAX_SENTENCES: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Preferences,
    Opportunities,
    BuyingPatterns,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InsightCard {
    #[serde(rename = "type")]
    pub category: InsightCategory,
    pub icon: &'static str,
    pub title: &'static str,
    pub content: String,
}

const INSIGHT_RULES: &[KeywordRule<InsightCategory>] = &[
    KeywordRule {
        category: InsightCategory::Preferences,
        keywords: &["preference", "prefer", "likes", "favorite", "favourite", "brand", "tends to buy"],
        icon: "🎯",
        title: "Preferences",
    },
    KeywordRule {
        category: InsightCategory::Opportunities,
        keywords: &[
            "need",
            "opportunit",
            "accessor",
            "complementary",
            "could benefit",
            "may want",
            "might want",
            "upsell",
        ],
        icon: "💡",
        title: "Opportunities",
    },
    KeywordRule {
        category: InsightCategory::BuyingPatterns,
        keywords: &[
            "pattern",
            "behavior",
            "behaviour",
            "seasonal",
            "season",
            "buying",
            "purchas",
            "trend",
            "frequen",
        ],
        icon: "📈",
        title: "Buying Patterns",
    },
];

const PROFILE_RULE: KeywordRule<InsightCategory> = KeywordRule {
    category: InsightCategory::Preferences,
    keywords: &[],
    icon: "👤",
    title: "Customer Profile",
};

static ENUMERATION: OnceLock<Regex> = OnceLock::new();

/// `1.`, `2.Needs`, `2. **`, `**3.**` and similar list markers preceded by
/// whitespace. Decimals such as `4.5` also match and are dropped by
/// `enumerated_segments`.
fn enumeration_marker() -> &'static Regex {
    ENUMERATION.get_or_init(|| {
        Regex::new(r"(?:^|\s)(?:\*\*)?\d+\.(?:\*\*)?\s*(?:\*\*)?")
            .expect("enumeration pattern is valid")
    })
}

/// Splits numbered insight commentary into cards.
///
/// Text before the first list marker is ignored. When no card can be built the
/// whole input comes back verbatim as a single "Customer Profile" card.
pub fn classify_customer_insights(text: &str) -> Vec<InsightCard> {
    let cards: Vec<InsightCard> = enumerated_segments(text)
        .into_iter()
        .map(strip_markup)
        .filter(|segment| !segment.is_empty())
        .map(|segment| build_card(&segment))
        .collect();

    if cards.is_empty() {
        return vec![card_from_rule(&PROFILE_RULE, text.to_string())];
    }

    cards
}

fn enumerated_segments(text: &str) -> Vec<&str> {
    let markers: Vec<_> = enumeration_marker()
        .find_iter(text)
        .filter(|marker| !is_decimal_point(text, marker.as_str(), marker.end()))
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(position, marker)| {
            let end = markers.get(position + 1).map_or(text.len(), |next| next.start());
            &text[marker.end()..end]
        })
        .collect()
}

fn is_decimal_point(text: &str, marker: &str, end: usize) -> bool {
    marker.ends_with('.') && text[end..].starts_with(|ch: char| ch.is_ascii_digit())
}

fn build_card(segment: &str) -> InsightCard {
    let rule = first_match(INSIGHT_RULES, segment).unwrap_or(&PROFILE_RULE);

    let content = match segment.split_once(':') {
        Some((_, after)) if !after.trim().is_empty() => after.trim(),
        _ => segment,
    };

    card_from_rule(rule, truncate_sentences(content, MAX_SENTENCES))
}

fn card_from_rule(rule: &KeywordRule<InsightCategory>, content: String) -> InsightCard {
    InsightCard { category: rule.category, icon: rule.icon, title: rule.title, content }
}
