//! Text helpers shared by the lexical analyzers.

use std::collections::{BTreeSet, HashMap};

/// Punctuation stripped from both ends of a keyword token.
pub const KEYWORD_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '{', '}', '\'', '"',
];

/// At most `max` characters of `s`, on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Text before the first `.`; the whole text if there is none.
pub fn first_sentence(s: &str) -> &str {
    s.split('.').next().unwrap_or("")
}

/// Lower-cased alphanumeric words, split on every other character.
pub fn words(s: &str) -> BTreeSet<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keyword tokens: lower-cased, whitespace-split, punctuation-trimmed,
/// longer than three characters and not a stop-word. Input order is kept.
pub fn keyword_tokens<'a>(
    text: &'a str,
    stopwords: &'a BTreeSet<String>,
) -> impl Iterator<Item = String> + 'a {
    text.split_whitespace().filter_map(move |raw| {
        let token = raw.to_lowercase();
        let token = token.trim_matches(KEYWORD_PUNCTUATION);
        (token.chars().count() > 3 && !stopwords.contains(token)).then(|| token.to_string())
    })
}

/// The `n` most frequent keywords across `texts`, ties broken by first occurrence.
pub fn top_keywords<'a, I>(texts: I, stopwords: &BTreeSet<String>, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    // token -> (count, first position)
    let mut stats: HashMap<String, (usize, usize)> = HashMap::new();
    let mut position = 0usize;
    for text in texts {
        for token in keyword_tokens(text, stopwords) {
            stats.entry(token).or_insert((0, position)).0 += 1;
            position += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = stats
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().take(n).map(|(token, _, _)| token).collect()
}

/// Jaccard index of two token sets; 0 when either is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn first_sentence_splits_on_period() {
        assert_eq!(first_sentence("One. Two."), "One");
        assert_eq!(first_sentence("no period"), "no period");
        assert_eq!(first_sentence(""), "");
    }

    #[test]
    fn words_split_on_non_alphanumerics() {
        let w = words("It's NOT true: nothing, no-one.");
        assert!(w.contains("not"));
        assert!(w.contains("no"));
        assert!(w.contains("nothing"));
        assert!(!w.contains("no-one"));
    }

    #[test]
    fn keyword_tokens_strip_and_filter() {
        let stopwords = stop(&["should"]);
        let tokens: Vec<_> = keyword_tokens("\"Bridge\" collapse, should (report)!", &stopwords).collect();
        assert_eq!(tokens, vec!["bridge", "collapse", "report"]);
    }

    #[test]
    fn top_keywords_rank_by_count_then_first_seen() {
        let stopwords = stop(&[]);
        let top = top_keywords(
            ["storm hits coast", "coast storm surge", "surge warning coast"],
            &stopwords,
            3,
        );
        assert_eq!(top, vec!["coast", "storm", "surge"]);
    }

    #[test]
    fn jaccard_of_disjoint_and_equal_sets() {
        let a = stop(&["x", "y"]);
        let b = stop(&["z"]);
        assert_eq!(jaccard(&a, &b), 0.0);
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&a, &BTreeSet::new()), 0.0);
    }
}
