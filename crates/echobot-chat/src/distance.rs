//! Levenshtein edit distance, the similarity primitive behind every match.

use crate::error::BotError;

/// Number of characters in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Minimum number of single-character insertions, deletions and
/// substitutions turning `a` into `b`.
///
/// Runs in O(n·m) time with two rolling rows sized to the shorter input.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let mut s: Vec<char> = a.chars().collect();
    let mut t: Vec<char> = b.chars().collect();

    if s.is_empty() {
        return t.len();
    }
    if t.is_empty() {
        return s.len();
    }
    if s.len() > t.len() {
        std::mem::swap(&mut s, &mut t);
    }

    let n = s.len();
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (j, &t_j) in t.iter().enumerate() {
        curr[0] = j + 1;
        for i in 1..=n {
            let cost = usize::from(s[i - 1] != t_j);
            curr[i] = (curr[i - 1] + 1).min(prev[i] + 1).min(prev[i - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// [`levenshtein`] for inputs that may be absent.
///
/// Fails with [`BotError::InvalidArgument`] if either side is `None`.
pub fn checked_levenshtein(a: Option<&str>, b: Option<&str>) -> Result<usize, BotError> {
    match (a, b) {
        (Some(a), Some(b)) => Ok(levenshtein(a, b)),
        _ => Err(BotError::InvalidArgument(
            "strings must not be null".to_string(),
        )),
    }
}

/// Whether `distance` is within `ratio` of `len` characters.
pub(crate) fn within(distance: usize, len: usize, ratio: f64) -> bool {
    // Ratios such as 1/3 are not exact in binary.
    distance as f64 <= len as f64 * ratio + 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        for s in ["", "a", "How are you?", "caf\u{00e9}"] {
            assert_eq!(levenshtein(s, s), 0);
        }
    }

    #[test]
    fn test_empty_side_is_length_of_other() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_classic_pairs() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("How are you?", "how are you"), 2);
        assert_eq!(levenshtein("gumbo", "gambol"), 2);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("kitten", "sitting"),
            ("", "xyz"),
            ("What's up?", "whats up"),
            ("short", "a much longer string"),
        ];
        for (a, b) in pairs {
            assert_eq!(levenshtein(a, b), levenshtein(b, a), "{} / {}", a, b);
        }
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(levenshtein("caf\u{00e9}", "cafe"), 1);
        assert_eq!(char_len("caf\u{00e9}"), 4);
    }

    #[test]
    fn test_checked_rejects_missing_input() {
        assert_eq!(checked_levenshtein(Some("ab"), Some("abc")).unwrap(), 1);
        assert!(matches!(
            checked_levenshtein(None, Some("abc")),
            Err(BotError::InvalidArgument(_))
        ));
        assert!(matches!(
            checked_levenshtein(Some("abc"), None),
            Err(BotError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_within_threshold() {
        assert!(within(3, 9, 1.0 / 3.0));
        assert!(!within(4, 9, 1.0 / 3.0));
        assert!(within(0, 0, 0.5));
    }
}
