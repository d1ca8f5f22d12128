// WHY: standalone normalization producing the immutable views the classifier
// matches against; the separator and ignore sets come from configuration

use tracing::debug;

use crate::codepoint;

/// A non-ASCII code point surfaced for audit display, paired with its
/// lowercase-hex form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub code: String,
    pub character: char,
}

/// Immutable derived views of one input string.
///
/// `dense` is always a subsequence of `clean`, which is a subsequence of the
/// lowercased, trimmed input.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    /// Original input, untouched.
    pub raw: String,
    /// Lowercased/trimmed input with ignore points removed, separators kept.
    pub clean: String,
    /// `clean` with separators also removed; the primary classification surface.
    pub dense: String,
    /// The subsequence of code points classified as separators.
    pub separators: Vec<char>,
    /// Code points at or above U+0100, for diagnostics.
    pub anomalies: Vec<Anomaly>,
    /// True when the input alternates letter/separator throughout, the
    /// letter-spacing evasion shape.
    pub spaced_out: bool,
}

/// Builds [`NormalizedText`] views from configured code-point sets.
#[derive(Debug, Clone)]
pub struct Normalizer {
    separators: Vec<char>,
    ignore_points: Vec<char>,
}

impl Default for Normalizer {
    fn default() -> Self {
        // Deployment defaults: space-like characters count as separators and
        // the regex metacharacter/punctuation set is discarded entirely
        Self {
            separators: vec!['\u{c}', '\t', '\n', '\r', ' ', '\u{b}', '\0'],
            ignore_points: vec![
                '!', '@', '#', '%', '&', ';', '+', '*', '?', '^', '$', '.', '[', ']', '{', '}',
                '(', ')', '|', '/', '\\', ',', '\u{c}', '\t', '\n', '\r', '\u{b}', '\0',
            ],
        }
    }
}

impl Normalizer {
    /// Create a normalizer from explicit separator and ignore sets. The
    /// ignore set is conventionally a superset of the separators; a code
    /// point in both sets is excluded from `dense` either way.
    pub fn new(separators: Vec<char>, ignore_points: Vec<char>) -> Self {
        Self {
            separators,
            ignore_points,
        }
    }

    pub fn is_separator(&self, ch: char) -> bool {
        self.separators.contains(&ch)
    }

    /// Produce all derived views of `raw` in a single pass.
    ///
    /// Idempotent on its own `dense` output: dense text contains no separator
    /// or ignorable code points, so a second pass returns it unchanged. Input
    /// consisting entirely of ignorable code points yields empty views, never
    /// an error.
    pub fn normalize(&self, raw: &str) -> NormalizedText {
        let lowered = raw.trim().to_lowercase();

        let mut clean = String::with_capacity(lowered.len());
        let mut dense = String::with_capacity(lowered.len());
        let mut separators = Vec::new();
        let mut anomalies = Vec::new();

        for ch in lowered.chars() {
            let is_separator = self.is_separator(ch);
            if is_separator {
                separators.push(ch);
            }
            if (ch as u32) >= 0x100 {
                anomalies.push(Anomaly {
                    code: codepoint::encode_hex(ch as u32),
                    character: ch,
                });
            }
            if !self.ignore_points.contains(&ch) {
                clean.push(ch);
                if !is_separator {
                    dense.push(ch);
                }
            }
        }

        let spaced_out = self.is_letter_spaced(&lowered);

        if !anomalies.is_empty() {
            debug!(count = anomalies.len(), "non-ASCII code points in input");
        }

        NormalizedText {
            raw: raw.to_string(),
            clean,
            dense,
            separators,
            anomalies,
            spaced_out,
        }
    }

    /// Alternating-separator shape: every odd position is a separator and no
    /// even position is. "a b c" is spaced out, "ab cd" is not.
    fn is_letter_spaced(&self, lowered: &str) -> bool {
        let mut count = 0usize;
        for (idx, ch) in lowered.chars().enumerate() {
            count += 1;
            let separator = self.is_separator(ch);
            if (idx % 2 == 1) != separator {
                return false;
            }
        }
        count >= 3
    }
}
