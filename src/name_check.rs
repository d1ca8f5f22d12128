// WHY: display names with too few recognizable characters defeat reporting
// and lookups; this is a coverage threshold, not a ban - callers decide the
// consequence

use tracing::debug;

use crate::codepoint;

/// Allow-listed alphabet for display-name coverage checks, built once per
/// configuration from a base alphabet plus an optional extension set.
#[derive(Debug, Clone)]
pub struct AlphabetSet {
    members: Vec<u32>,
}

impl Default for AlphabetSet {
    fn default() -> Self {
        Self::new("abcdefghijklmnopqrstuvwxyz1234567890", "")
    }
}

impl AlphabetSet {
    pub fn new(alphabet: &str, extends: &str) -> Self {
        let mut members: Vec<u32> = codepoint::decompose(alphabet);
        members.extend(codepoint::decompose(extends));
        members.sort_unstable();
        members.dedup();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, code_point: u32) -> bool {
        self.members.binary_search(&code_point).is_ok()
    }

    /// Whether `name` carries at least `minimum` code points from this
    /// alphabet. With `minimum == 0` the check degrades to "at least one
    /// recognizable character".
    pub fn is_acceptable(&self, name: &str, minimum: usize) -> bool {
        let cleaned = name.trim().to_lowercase();
        let points = codepoint::decompose(&cleaned);

        if minimum > 0 {
            let mut seen = 0usize;
            for point in points {
                if self.contains(point) {
                    seen += 1;
                    if seen == minimum {
                        return true;
                    }
                }
            }
            debug!(name, seen, minimum, "name below coverage threshold");
            return false;
        }

        points.into_iter().any(|point| self.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_zero_needs_any_member() {
        let alphabet = AlphabetSet::default();
        assert!(alphabet.is_acceptable("x", 0));
        assert!(alphabet.is_acceptable("___x___", 0));
        assert!(!alphabet.is_acceptable("___", 0));
        assert!(!alphabet.is_acceptable("", 0));
    }

    #[test]
    fn test_minimum_count_threshold() {
        let alphabet = AlphabetSet::new("abcdefghijklmnopqrstuvwxyz", "");
        assert!(alphabet.is_acceptable("ab", 2));
        assert!(alphabet.is_acceptable("aaa", 2));
        assert!(!alphabet.is_acceptable("a__", 2));
        assert!(!alphabet.is_acceptable("", 2));
    }

    #[test]
    fn test_threshold_monotonicity() {
        let alphabet = AlphabetSet::new("abcdefghijklmnopqrstuvwxyz", "");
        let name = "ab-cd"; // four members
        for k in 1..=4 {
            assert!(alphabet.is_acceptable(name, k), "should pass at k={k}");
        }
        assert!(!alphabet.is_acceptable(name, 5));
    }

    #[test]
    fn test_digits_only_name_rejected_without_digit_alphabet() {
        let letters_only = AlphabetSet::new("abcdefghijklmnopqrstuvwxyz", "");
        assert!(!letters_only.is_acceptable("12345", 1));

        let extended = AlphabetSet::new("abcdefghijklmnopqrstuvwxyz", "1234567890");
        assert!(extended.is_acceptable("12345", 1));
    }

    #[test]
    fn test_lowercases_before_counting() {
        let alphabet = AlphabetSet::new("abcdefghijklmnopqrstuvwxyz", "");
        assert!(alphabet.is_acceptable("ABC", 3));
    }

    #[test]
    fn test_extension_set_deduplicates() {
        let alphabet = AlphabetSet::new("abc", "bcd");
        assert_eq!(alphabet.len(), 4);
        assert!(alphabet.contains('d' as u32));
    }
}
