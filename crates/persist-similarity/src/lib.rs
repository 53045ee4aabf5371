//! Deterministic string helpers used to narrow similarity probes before the
//! expensive DB-side similarity predicate runs. See SPEC_FULL.md §4.A.

/// Returns the word covering character position `floor(len(trim(text)) / 5)`
/// when words are joined by single spaces. If that word has length < 2,
/// returns the next word instead. Returns `None` on empty input or if the
/// position falls past the last word's continuation.
pub fn first_after_fifth(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let fifth_index = trimmed.chars().count() / 5;
    let words: Vec<&str> = text.split_whitespace().collect();

    let mut current_index = 0usize;
    for (i, word) in words.iter().enumerate() {
        let next_index = current_index + word.chars().count();
        if current_index <= fifth_index && fifth_index < next_index {
            if word.chars().count() < 2 {
                return words.get(i + 1).copied();
            }
            return Some(word);
        }
        current_index = next_index + 1; // +1 for the joining space
    }

    None
}

/// True iff the first whitespace-delimited token has length <= 1.
pub fn is_first_word_short(text: &str) -> bool {
    match text.split_whitespace().next() {
        Some(first) => first.chars().count() <= 1,
        None => false,
    }
}

/// Trims whitespace and strips `< > : " / \ | ? *`.
pub fn sanitize(text: &str) -> String {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    text.trim().chars().filter(|c| !INVALID.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_after_fifth_matches_the_documented_example() {
        assert_eq!(
            first_after_fifth("avalanche: a pytorch library for deep continual learning"),
            Some("pytorch")
        );
    }

    #[test]
    fn first_after_fifth_skips_short_words() {
        // "a" at the boundary position is < 2 chars, so the next word is used.
        let text = "x a bcdefgh";
        // len = 11, trimmed len = 11, fifth_index = 2 -> falls in "a" (index 2..3)
        assert_eq!(first_after_fifth(text), Some("bcdefgh"));
    }

    #[test]
    fn first_after_fifth_empty_input() {
        assert_eq!(first_after_fifth(""), None);
        assert_eq!(first_after_fifth("   "), None);
    }

    #[test]
    fn is_first_word_short_true_for_single_char() {
        assert!(is_first_word_short("a deep dive"));
        assert!(!is_first_word_short("deep dive"));
        assert!(!is_first_word_short(""));
    }

    #[test]
    fn sanitize_strips_invalid_chars_and_trims() {
        assert_eq!(sanitize("  a<b>c:d\"e/f\\g|h?i*j  "), "abcdefghij");
    }
}
