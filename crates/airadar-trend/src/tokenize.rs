//! Title tokenization and Jaccard similarity.

use std::collections::HashSet;

/// Common English function words ignored when comparing titles.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "this", "that", "these", "those",
    "it", "its", "i", "we", "you", "he", "she", "they", "my", "your", "how", "what", "when",
    "where", "why", "not", "no", "new", "just", "about", "up", "out", "if", "so", "can", "all",
    "more", "also", "than", "very",
];

/// Reduce a title to its significant lowercase tokens.
///
/// Any run of characters that are neither letters nor digits separates tokens.
/// Tokens shorter than two characters and stopwords are dropped.
///
/// "Letter" means the Unicode `Alphabetic` property, so dependent vowel signs
/// in scripts such as Devanagari stay inside their word instead of splitting
/// it. Marks outside that property (a virama, for instance) still separate.
/// Token length is counted in `char`s.
#[must_use]
pub fn significant_tokens(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= 2 && !STOPWORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// `|a ∩ b| / |a ∪ b|`, or `0.0` when either set is empty.
#[must_use]
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    #[allow(clippy::cast_precision_loss)]
    let similarity = intersection as f64 / union as f64;
    similarity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        assert_eq!(
            significant_tokens("OpenAI releases GPT-5!"),
            tokens(&["openai", "releases", "gpt"])
        );
    }

    #[test]
    fn vowel_signs_stay_inside_their_word() {
        assert_eq!(
            significant_tokens("भारत समाचार"),
            tokens(&["भारत", "समाचार"])
        );
    }

    #[test]
    fn drops_stopwords_and_single_characters() {
        assert_eq!(
            significant_tokens("The state of AI: a look at what is new"),
            tokens(&["state", "ai", "look"])
        );
    }

    #[test]
    fn keeps_digits_as_tokens() {
        assert_eq!(
            significant_tokens("Llama 3 vs Llama 70b"),
            tokens(&["llama", "vs", "70b"])
        );
    }

    #[test]
    fn duplicate_words_collapse() {
        assert_eq!(significant_tokens("agents agents AGENTS").len(), 1);
    }

    #[test]
    fn non_ascii_letters_are_kept() {
        assert!(significant_tokens("Über große Modelle").contains("große"));
    }

    #[test]
    fn empty_and_stopword_only_titles_yield_no_tokens() {
        assert!(significant_tokens("").is_empty());
        assert!(significant_tokens("the and of a").is_empty());
        assert!(significant_tokens("--- !!! ...").is_empty());
    }

    #[test]
    fn jaccard_is_zero_when_either_set_is_empty() {
        let empty = HashSet::new();
        let some = tokens(&["gpt"]);
        assert!(jaccard_similarity(&empty, &empty).abs() < f64::EPSILON);
        assert!(jaccard_similarity(&empty, &some).abs() < f64::EPSILON);
        assert!(jaccard_similarity(&some, &empty).abs() < f64::EPSILON);
    }

    #[test]
    fn jaccard_of_identical_sets_is_one() {
        let a = tokens(&["openai", "gpt", "release"]);
        assert!((jaccard_similarity(&a, &a.clone()) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn jaccard_is_symmetric() {
        let a = tokens(&["openai", "releases", "gpt"]);
        let b = tokens(&["gpt", "launched", "openai"]);
        let c = tokens(&["weather", "forecast", "tuesday"]);
        for (x, y) in [(&a, &b), (&a, &c), (&b, &c)] {
            assert!((jaccard_similarity(x, y) - jaccard_similarity(y, x)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn jaccard_counts_shared_over_all_tokens() {
        let a = tokens(&["openai", "releases", "gpt"]);
        let b = tokens(&["gpt", "launched", "openai"]);
        // 2 shared of 4 distinct.
        assert!((jaccard_similarity(&a, &b) - 0.5).abs() < f64::EPSILON);
    }
}
