// WHY: narrower, session-specific matcher that embeds the subject's own name
// to catch direct insults; compiled once per subject, never per message

use anyhow::{Context, Result};
use regex_automata::meta::Regex;
use regex_syntax::escape;
use tracing::debug;

/// Dismissive/insulting lead-ins that turn a mention into an insult.
const LEAD_INS: &str = "stfu|asshole|ahole|shit|bitche*";

/// Generic targets: staff, the team, pronouns, or a short trailing tail.
const ROLE_WORDS: &str = r"admin|team(mates*)?|you|u\W|the(ir|re|y)|\w(e|im|er)";

/// Per-subject toxicity matcher, independent of the category table.
///
/// The subject name and every profanity entry are escaped as literals before
/// compilation, so a hostile display name cannot inject pattern syntax.
pub struct ToxicityMatcher {
    pattern: Regex,
    word_scan: Option<Regex>,
}

impl ToxicityMatcher {
    /// Build the matcher for one subject and a caller-supplied profanity
    /// list. Compile failures are construction-time errors.
    pub fn new(subject: &str, profanity: &[String]) -> Result<Self> {
        let mut targets: Vec<String> = Vec::new();
        let subject_lit = escape(&subject.trim().to_lowercase());
        if !subject_lit.is_empty() {
            targets.push(subject_lit);
        }
        targets.push(ROLE_WORDS.to_string());

        let words: Vec<String> = profanity
            .iter()
            .map(|w| escape(&w.trim().to_lowercase()))
            .filter(|w| !w.is_empty())
            .collect();

        let mut pattern = format!("({LEAD_INS})s*({})", targets.join("|"));
        if !words.is_empty() {
            pattern.push('|');
            pattern.push_str(&words.join("|"));
        }

        debug!(subject, words = words.len(), "compiling toxicity pattern");
        let pattern = Regex::new(&pattern)
            .with_context(|| format!("invalid toxicity pattern for subject {subject:?}"))?;

        let word_scan = if words.is_empty() {
            None
        } else {
            let scan = format!(r"\b(?:{})\b", words.join("|"));
            Some(
                Regex::new(&scan)
                    .with_context(|| "invalid word-boundary profanity pattern".to_string())?,
            )
        };

        Ok(Self { pattern, word_scan })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text.to_lowercase().as_str())
    }

    /// All matched substrings. Zero matches is an empty vector, never an
    /// error.
    pub fn find_matches(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        self.pattern
            .find_iter(&haystack)
            .map(|m| haystack[m.range()].to_string())
            .collect()
    }

    /// Profanity-list entries present in `text` as whole words.
    pub fn contained_words(&self, text: &str) -> Vec<String> {
        let Some(scan) = &self.word_scan else {
            return Vec::new();
        };
        let haystack = text.to_lowercase();
        scan.find_iter(&haystack)
            .map(|m| haystack[m.range()].to_string())
            .collect()
    }
}
