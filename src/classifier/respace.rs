// WHY: letter-spacing evasion ("w o r d", "a-b-c") survives the dense view's
// punctuation stripping only as separated single letters; this module rebuilds
// the contiguous token those letters spell

/// Trim-and-collapse view of raw text.
///
/// Alphanumeric code points are kept. A run of two or more consecutive
/// delimiters (whitespace or punctuation) is an intentional word break and is
/// deleted outright; a single delimiter is a candidate evasion marker and
/// becomes one space. "a-b-c" despaces to "a b c".
pub fn despace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = 0usize;
    for ch in text.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if pending == 1 && !out.is_empty() {
                out.push(' ');
            }
            pending = 0;
            out.push(ch);
        } else {
            pending += 1;
        }
    }
    out
}

/// Recover contiguous tokens from single-character runs in despaced text.
///
/// A run of two or more single-character tokens separated by single spaces is
/// joined into one candidate token; recovered tokens across distinct runs are
/// space-joined. "a b c" recombines to "abc". Heuristic, not lossless: a
/// legitimately spaced single-letter sentence recombines too, so category
/// patterns must anchor on sufficiently specific substrings.
pub fn recombine(despaced: &str) -> String {
    let mut recovered: Vec<String> = Vec::new();
    let mut run = String::new();
    let mut run_len = 0usize;

    for token in despaced.split(' ').filter(|t| !t.is_empty()) {
        if token.chars().count() == 1 {
            run.push_str(token);
            run_len += 1;
        } else {
            if run_len >= 2 {
                recovered.push(std::mem::take(&mut run));
            } else {
                run.clear();
            }
            run_len = 0;
        }
    }
    if run_len >= 2 {
        recovered.push(run);
    }

    recovered.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_despace_single_delimiters_become_spaces() {
        assert_eq!(despace("a-b-c"), "a b c");
        assert_eq!(despace("n.i.c.e"), "n i c e");
        assert_eq!(despace("w o r d"), "w o r d");
    }

    #[test]
    fn test_despace_delimiter_runs_are_word_breaks() {
        assert_eq!(despace("hello  world"), "helloworld");
        assert_eq!(despace("a - b"), "ab");
        assert_eq!(despace("tabs\t\t\there"), "tabshere");
    }

    #[test]
    fn test_despace_lowercases_and_trims() {
        assert_eq!(despace("  A-B-C  "), "a b c");
        assert_eq!(despace("-edge-"), "edge");
    }

    #[test]
    fn test_despace_empty() {
        assert_eq!(despace(""), "");
        assert_eq!(despace("  ...  "), "");
    }

    #[test]
    fn test_recombine_single_char_runs() {
        assert_eq!(recombine("a b c"), "abc");
        assert_eq!(recombine("w o r d"), "word");
    }

    #[test]
    fn test_recombine_mixed_tokens() {
        // Only the single-letter run is recovered; surrounding words are not
        assert_eq!(recombine("stop w o r d now"), "word");
        assert_eq!(recombine("x y then a b c"), "xy abc");
    }

    #[test]
    fn test_recombine_requires_a_run() {
        assert_eq!(recombine("plain words here"), "");
        assert_eq!(recombine("a"), "");
        assert_eq!(recombine(""), "");
    }

    #[test]
    fn test_despace_then_recombine() {
        assert_eq!(recombine(&despace("n-i-c-e")), "nice");
        assert_eq!(recombine(&despace("b i g  deal")), "bi");
    }
}
