//! Token-overlap similarity for short report descriptions.

use std::collections::BTreeSet;

/// Tokens shorter than this carry no signal ("on", "at", unit suffixes).
pub const MIN_TOKEN_LEN: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "him", "his", "how", "its", "may", "new", "now", "old",
    "see", "two", "who", "did", "get", "let", "say", "she", "too", "use", "this", "that", "with",
    "from", "they", "them", "then", "than", "there", "their", "been", "were", "will", "would",
    "could", "should", "about", "into", "over", "very", "also", "just", "some", "near", "here",
    "what", "when", "where", "which", "while", "please", "since", "still", "being",
];

/// Lowercase, split on anything non-alphanumeric, drop short tokens and stop words.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Shared tokens divided by the smaller token set. 0.0 if either side is empty.
pub fn overlap_ratio(a: &str, b: &str) -> f64 {
    token_overlap(&tokenize(a), &tokenize(b))
}

pub fn token_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / smaller as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_punctuation() {
        let tokens = tokenize("Huge POTHOLE, near-the bus-stop!");
        assert!(tokens.contains("huge"));
        assert!(tokens.contains("pothole"));
        assert!(tokens.contains("bus"));
        assert!(tokens.contains("stop"));
        assert!(!tokens.contains("near"));
        assert!(!tokens.contains("the"));
    }

    #[test]
    fn tokenize_drops_short_tokens() {
        let tokens = tokenize("a pi on MG rd");
        assert!(tokens.is_empty());
    }

    #[test]
    fn tokenize_keeps_digits() {
        let tokens = tokenize("Streetlight 402 broken");
        assert!(tokens.contains("402"));
    }

    #[test]
    fn overlap_identical_is_one() {
        assert_eq!(overlap_ratio("garbage pile on road", "garbage pile on road"), 1.0);
    }

    #[test]
    fn overlap_disjoint_is_zero() {
        assert_eq!(overlap_ratio("broken streetlight", "overflowing sewage drain"), 0.0);
    }

    #[test]
    fn overlap_uses_smaller_set() {
        // {garbage, dumped} vs {garbage, dumped, beside, school, gate}
        let r = overlap_ratio("garbage dumped", "garbage dumped beside the school gate");
        assert_eq!(r, 1.0);
    }

    #[test]
    fn overlap_partial() {
        // {water, pipe, leaking} vs {water, pipe, burst, flooding}
        let r = overlap_ratio("water pipe leaking", "water pipe burst flooding");
        assert!((r - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn overlap_empty_side_is_zero() {
        assert_eq!(overlap_ratio("", "pothole"), 0.0);
        assert_eq!(overlap_ratio("the and", "pothole"), 0.0);
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = "tree fallen across main road";
        let b = "fallen tree blocking road";
        assert_eq!(overlap_ratio(a, b), overlap_ratio(b, a));
    }
}
