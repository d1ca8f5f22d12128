// WHY: ordered first-match classification over the normalized views, with the
// fixed evaluation order exemption -> symbol special case -> category table

use anyhow::{Context, Result};
use regex_automata::meta::Regex;
use tracing::debug;

pub mod normalizer;
pub mod respace;
pub mod toxicity;

pub use normalizer::{Anomaly, NormalizedText, Normalizer};
pub use toxicity::ToxicityMatcher;

/// A named detection rule: label plus compiled pattern.
pub struct Category {
    label: String,
    pattern: Regex,
}

impl Category {
    /// Compile one category rule. Invalid pattern syntax is a
    /// construction-time error, surfaced before any classification call.
    pub fn new(label: impl Into<String>, pattern: &str) -> Result<Self> {
        let label = label.into();
        let pattern = Regex::new(pattern)
            .with_context(|| format!("invalid pattern for category {label:?}"))?;
        Ok(Self { label, pattern })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn first_match<'h>(&self, haystack: &'h str) -> Option<&'h str> {
        self.pattern.find(haystack).map(|m| &haystack[m.range()])
    }
}

/// Ordered category rules.
///
/// Table order is the tie-break: when two patterns both match, the entry
/// listed earlier wins, regardless of pattern specificity. This is a
/// configuration contract, not an implementation accident.
#[derive(Default)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Build a table from `(label, pattern)` pairs, preserving pair order.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut categories = Vec::new();
        for (label, pattern) in pairs {
            categories.push(Category::new(label, pattern)?);
        }
        Ok(Self { categories })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.label.as_str())
    }

    fn first_match(&self, haystack: &str) -> Option<(String, String)> {
        for category in &self.categories {
            if let Some(matched) = category.first_match(haystack) {
                return Some((category.label.clone(), matched.to_string()));
            }
        }
        None
    }
}

/// The outcome of a positive classification: which category matched, what
/// substring triggered it, and the normalized views it was derived from.
#[derive(Debug, Clone)]
pub struct Classification {
    pub category: String,
    pub matched: String,
    pub source: NormalizedText,
}

/// Evasion-resistant first-match classifier.
///
/// Stateless and lock-free after construction; shareable across threads.
pub struct Classifier {
    normalizer: Normalizer,
    table: CategoryTable,
    exemption: Option<Regex>,
    symbol: Option<Category>,
}

impl Classifier {
    pub fn new(normalizer: Normalizer, table: CategoryTable) -> Self {
        Self {
            normalizer,
            table,
            exemption: None,
            symbol: None,
        }
    }

    /// Whitelist pattern tested against raw input; a match suppresses
    /// classification on the evasion path unconditionally.
    pub fn with_exemption(mut self, pattern: &str) -> Result<Self> {
        let exemption =
            Regex::new(pattern).with_context(|| "invalid exemption pattern".to_string())?;
        self.exemption = Some(exemption);
        Ok(self)
    }

    /// Symbol-based special case tested before the table on the evasion
    /// path. Single-symbol matches are unambiguous and bypass table order.
    pub fn with_symbol_category(mut self, label: impl Into<String>, pattern: &str) -> Result<Self> {
        self.symbol = Some(Category::new(label, pattern)?);
        Ok(self)
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Primary path: first table match against the dense view.
    ///
    /// Empty dense text is trivially non-matching, never an error.
    pub fn classify(&self, text: &str) -> Option<Classification> {
        let source = self.normalizer.normalize(text);
        if source.dense.is_empty() {
            return None;
        }
        let (category, matched) = self.table.first_match(&source.dense)?;
        debug!(%category, %matched, "dense-view match");
        Some(Classification {
            category,
            matched,
            source,
        })
    }

    /// Secondary evasion path over the despaced view and its recombination
    /// candidate.
    ///
    /// Evaluation order is fixed: exemption override on the raw input, then
    /// the symbol special case on the space-collapsed despaced text, then the
    /// category table on the recombination candidate and on the despaced text
    /// itself.
    pub fn classify_despaced(&self, text: &str) -> Option<Classification> {
        if let Some(exemption) = &self.exemption {
            if exemption.is_match(text) {
                debug!("exemption matched raw input, suppressing classification");
                return None;
            }
        }

        let source = self.normalizer.normalize(text);
        let despaced = respace::despace(text);

        if let Some(symbol) = &self.symbol {
            let collapsed: String = despaced.chars().filter(|ch| *ch != ' ').collect();
            if let Some(matched) = symbol.first_match(&collapsed) {
                debug!(category = symbol.label(), "symbol special-case match");
                return Some(Classification {
                    category: symbol.label.clone(),
                    matched: matched.to_string(),
                    source,
                });
            }
        }

        let candidate = respace::recombine(&despaced);
        if !candidate.is_empty() {
            if let Some((category, matched)) = self.table.first_match(&candidate) {
                debug!(%category, %matched, "recombined-candidate match");
                return Some(Classification {
                    category,
                    matched,
                    source,
                });
            }
        }

        if despaced.is_empty() {
            return None;
        }
        let (category, matched) = self.table.first_match(&despaced)?;
        debug!(%category, %matched, "despaced-view match");
        Some(Classification {
            category,
            matched,
            source,
        })
    }
}
