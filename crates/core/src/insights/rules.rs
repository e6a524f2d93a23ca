/// One row of an ordered classification table. Tables are evaluated top to
/// bottom and the first row whose keywords hit wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeywordRule<C: 'static> {
    pub category: C,
    /// Lowercase substrings; any hit matches.
    pub keywords: &'static [&'static str],
    pub icon: &'static str,
    pub title: &'static str,
}

impl<C> KeywordRule<C> {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

pub(crate) fn first_match<'a, C>(
    rules: &'a [KeywordRule<C>],
    text: &str,
) -> Option<&'a KeywordRule<C>> {
    let lowered = text.to_lowercase();
    rules.iter().find(|rule| rule.matches(&lowered))
}
