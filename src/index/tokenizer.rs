//! Text tokenization and n-gram generation

/// Longest n-gram emitted as an index term
pub const MAX_NGRAM: usize = 3;

/// Lowercases `text` and splits it on every non-alphanumeric character
///
/// ```
/// use site_sift::index::tokenize;
///
/// assert_eq!(tokenize("Headache, and NAUSEA!"), vec!["headache", "and", "nausea"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds every contiguous run of 1 to `max_n` tokens, joined by a space
///
/// Runs are emitted by start position, then by length.
pub fn ngrams(tokens: &[String], max_n: usize) -> Vec<String> {
    let mut terms = Vec::with_capacity(tokens.len() * max_n);
    for start in 0..tokens.len() {
        for len in 1..=max_n {
            let end = start + len;
            if end > tokens.len() {
                break;
            }
            terms.push(tokens[start..end].join(" "));
        }
    }
    terms
}

/// Tokenizes `text` into unigram, bigram and trigram terms
pub fn terms(text: &str) -> Vec<String> {
    ngrams(&tokenize(text), MAX_NGRAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("After the medication, headache-and nausea."),
            vec!["after", "the", "medication", "headache", "and", "nausea"]
        );
    }

    #[test]
    fn test_tokenize_keeps_digits_and_single_chars() {
        assert_eq!(tokenize("a 1 b2"), vec!["a", "1", "b2"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" ,.;- ").is_empty());
    }

    #[test]
    fn test_ngram_order() {
        assert_eq!(
            terms("a b c"),
            vec!["a", "a b", "a b c", "b", "b c", "c"]
        );
    }

    #[test]
    fn test_short_input_ngrams() {
        assert_eq!(terms("solo"), vec!["solo"]);
        assert_eq!(terms("two words"), vec!["two", "two words", "words"]);
    }

    #[test]
    fn test_ngram_count() {
        let tokens = tokenize("one two three four five");
        // 5 unigrams + 4 bigrams + 3 trigrams
        assert_eq!(ngrams(&tokens, MAX_NGRAM).len(), 12);
    }
}
