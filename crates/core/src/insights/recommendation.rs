use serde::Serialize;

use super::rules::{first_match, KeywordRule};
use super::strip_markup;

/// Cards shown before priority truncation kicks in.
pub const MAX_RECOMMENDATION_CARDS: usize = 3;

/// Sentences shorter than this (in characters, after trimming) are noise.
const MIN_SENTENCE_CHARS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Savings,
    Protection,
    Maintenance,
    Performance,
    Convenience,
    General,
}

impl RecommendationCategory {
    /// Display priority when cards overflow; lower sorts first.
    pub fn priority(self) -> u8 {
        match self {
            Self::Savings => 0,
            Self::Protection => 1,
            Self::Maintenance => 2,
            Self::Performance => 3,
            Self::Convenience => 4,
            Self::General => 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecommendationCard {
    #[serde(rename = "type")]
    pub category: RecommendationCategory,
    pub icon: &'static str,
    pub title: &'static str,
    pub content: String,
}

const RECOMMENDATION_RULES: &[KeywordRule<RecommendationCategory>] = &[
    KeywordRule {
        category: RecommendationCategory::Savings,
        keywords: &["save", "saving", "cost", "$", "money", "cheap", "budget", "price", "afford", "discount"],
        icon: "💰",
        title: "Cost Savings",
    },
    KeywordRule {
        category: RecommendationCategory::Protection,
        keywords: &["warranty", "protect", "coverage", "damage", "guarantee", "insur", "surge"],
        icon: "🛡️",
        title: "Protection Plan",
    },
    KeywordRule {
        category: RecommendationCategory::Maintenance,
        keywords: &[
            "maintenance",
            "maintain",
            "clean",
            "filter",
            "descal",
            "care",
            "lifespan",
            "extends the life",
            "last longer",
        ],
        icon: "🔧",
        title: "Maintenance & Care",
    },
    KeywordRule {
        category: RecommendationCategory::Performance,
        keywords: &["performance", "efficien", "energy", "optimal", "boost", "power", "faster"],
        icon: "⚡",
        title: "Better Performance",
    },
    KeywordRule {
        category: RecommendationCategory::Convenience,
        keywords: &["convenien", "time", "easy", "easier", "hassle", "quick", "effort"],
        icon: "⏱️",
        title: "Time Saver",
    },
];

const GENERAL_RULE: KeywordRule<RecommendationCategory> = KeywordRule {
    category: RecommendationCategory::General,
    keywords: &[],
    icon: "✨",
    title: "Smart Addition",
};

const FALLBACK_RULE: KeywordRule<RecommendationCategory> = KeywordRule {
    category: RecommendationCategory::General,
    keywords: &[],
    icon: "🛒",
    title: "Value Add-Ons",
};

/// Splits an add-on explanation into sentence cards.
///
/// More than [`MAX_RECOMMENDATION_CARDS`] cards are reordered by category
/// priority and cut. With no usable sentence the whole input is returned as a
/// single "Value Add-Ons" card.
pub fn classify_recommendation_explanation(text: &str) -> Vec<RecommendationCard> {
    let mut cards: Vec<RecommendationCard> = text
        .split_inclusive(['.', '!'])
        .map(strip_markup)
        .filter(|sentence| {
            sentence.trim_end_matches(['.', '!']).trim().chars().count() >= MIN_SENTENCE_CHARS
        })
        .map(|sentence| {
            let rule = first_match(RECOMMENDATION_RULES, &sentence).unwrap_or(&GENERAL_RULE);
            card_from_rule(rule, sentence)
        })
        .collect();

    if cards.is_empty() {
        return vec![card_from_rule(&FALLBACK_RULE, text.to_string())];
    }

    if cards.len() > MAX_RECOMMENDATION_CARDS {
        cards.sort_by_key(|card| card.category.priority());
        cards.truncate(MAX_RECOMMENDATION_CARDS);
    }

    cards
}

fn card_from_rule(rule: &KeywordRule<RecommendationCategory>, content: String) -> RecommendationCard {
    RecommendationCard { category: rule.category, icon: rule.icon, title: rule.title, content }
}
