//! Turns free-text commentary from the backend into short categorized cards.
//!
//! Both profiles are pure functions of their input: the same text always
//! yields the same cards.

mod customer;
mod recommendation;
mod rules;

pub use customer::{classify_customer_insights, InsightCard, InsightCategory};
pub use recommendation::{
    classify_recommendation_explanation, RecommendationCard, RecommendationCategory,
    MAX_RECOMMENDATION_CARDS,
};
pub use rules::KeywordRule;

/// Keeps the first `limit` terminated sentences when the text has more. The
/// result is always a prefix of `text`.
pub(crate) fn truncate_sentences(text: &str, limit: usize) -> String {
    let ends = sentence_ends(text);
    if ends.len() <= limit {
        return text.to_string();
    }

    let cut = limit.checked_sub(1).map_or(0, |last| ends[last]);
    text[..cut].trim().to_string()
}

/// Byte offsets just past each run of `.`, `!` or `?` that closes a non-blank
/// sentence. A `.` between two digits is a decimal point, not a terminator.
fn sentence_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut has_body = false;
    let mut previous: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        let decimal_point = ch == '.'
            && previous.is_some_and(|before| before.is_ascii_digit())
            && chars.peek().is_some_and(|(_, after)| after.is_ascii_digit());
        previous = Some(ch);
        if !is_terminator(ch) || decimal_point {
            has_body |= !ch.is_whitespace();
            continue;
        }

        let mut end = offset + ch.len_utf8();
        while let Some(&(next_offset, next)) = chars.peek() {
            if !is_terminator(next) {
                break;
            }
            end = next_offset + next.len_utf8();
            previous = Some(next);
            chars.next();
        }
        if has_body {
            ends.push(end);
        }
        has_body = false;
    }
    ends
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// Drops bold/italic asterisks and bullet glyphs around a fragment.
pub(crate) fn strip_markup(text: &str) -> String {
    let without_emphasis: String = text.chars().filter(|ch| *ch != '*').collect();
    without_emphasis.trim().trim_start_matches(['-', '•']).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::{strip_markup, truncate_sentences};

    #[test]
    fn truncation_keeps_two_sentences_only_when_more_exist() {
        assert_eq!(
            truncate_sentences("One thing. Two things! Three things? Four.", 2),
            "One thing. Two things!"
        );
        assert_eq!(truncate_sentences("One thing. Two things.", 2), "One thing. Two things.");
        assert_eq!(truncate_sentences("No terminator here", 2), "No terminator here");
    }

    #[test]
    fn decimals_do_not_end_sentences_and_text_is_kept_verbatim() {
        assert_eq!(
            truncate_sentences("A 4.5 cu ft washer. Second idea. Third idea.", 2),
            "A 4.5 cu ft washer. Second idea."
        );
        assert_eq!(
            truncate_sentences("Rated 4.8 stars. Priced at $12.99!", 2),
            "Rated 4.8 stars. Priced at $12.99!"
        );
        assert_eq!(truncate_sentences("Wait... Really?! Yes. No.", 2), "Wait... Really?!");
    }

    #[test]
    fn markup_is_removed_from_fragments() {
        assert_eq!(strip_markup("**Product Preferences:** Kitchen gear "), "Product Preferences: Kitchen gear");
        assert_eq!(strip_markup(" - Saves money."), "Saves money.");
    }
}
