// WHY: patterns compile once at load time and never per message; a malformed
// pattern aborts the load before any classification call is served

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::classifier::{Category, CategoryTable, Classifier, Normalizer, ToxicityMatcher};
use crate::name_check::AlphabetSet;

/// On-disk filter configuration (TOML).
///
/// The order of `[[categories]]` entries in the file is the match precedence
/// order. An empty file deserializes to a working, permissive filter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Ordered category rules; first match wins.
    pub categories: Vec<CategoryConfig>,
    /// Whitelist pattern suppressing classification on the evasion path.
    pub exemption: Option<String>,
    /// Symbol-based special case evaluated before the table.
    pub symbol: Option<CategoryConfig>,
    pub normalizer: NormalizerConfig,
    pub names: NameRules,
    /// Plain word list for the auxiliary toxicity matcher.
    pub profanity: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            exemption: None,
            symbol: None,
            normalizer: NormalizerConfig::default(),
            names: NameRules::default(),
            profanity: Vec::new(),
        }
    }
}

/// One `label = pattern` rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub label: String,
    pub pattern: String,
}

/// Code-point sets for the normalizer. Defaults mirror the original
/// deployment: space-like characters are separators, punctuation and control
/// characters are ignored outright.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    pub line_breaks: Vec<char>,
    pub ignore_points: Vec<char>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            line_breaks: vec!['\u{c}', '\t', '\n', '\r', ' ', '\u{b}', '\0'],
            ignore_points: vec![
                '!', '@', '#', '%', '&', ';', '+', '*', '?', '^', '$', '.', '[', ']', '{', '}',
                '(', ')', '|', '/', '\\', ',', '\u{c}', '\t', '\n', '\r', '\u{b}', '\0',
            ],
        }
    }
}

/// Display-name coverage rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NameRules {
    pub alphabet: String,
    pub extends: String,
    pub minimum: usize,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            alphabet: "abcdefghijklmnopqrstuvwxyz1234567890".to_string(),
            extends: String::new(),
            minimum: 0,
        }
    }
}

impl FilterConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse filter configuration")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read filter configuration {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    /// Compile into a ready-to-serve engine. Fails fast on any invalid
    /// pattern.
    pub fn compile(&self) -> Result<FilterEngine> {
        let normalizer = Normalizer::new(
            self.normalizer.line_breaks.clone(),
            self.normalizer.ignore_points.clone(),
        );

        let mut categories = Vec::with_capacity(self.categories.len());
        for entry in &self.categories {
            categories.push(Category::new(entry.label.clone(), &entry.pattern)?);
        }

        let mut classifier = Classifier::new(normalizer, CategoryTable::new(categories));
        if let Some(exemption) = &self.exemption {
            classifier = classifier.with_exemption(exemption)?;
        }
        if let Some(symbol) = &self.symbol {
            classifier = classifier.with_symbol_category(symbol.label.clone(), &symbol.pattern)?;
        }

        let alphabet = AlphabetSet::new(&self.names.alphabet, &self.names.extends);

        info!(
            categories = self.categories.len(),
            profanity = self.profanity.len(),
            name_minimum = self.names.minimum,
            "filter configuration compiled"
        );

        Ok(FilterEngine {
            classifier,
            alphabet,
            name_minimum: self.names.minimum,
            profanity: self.profanity.clone(),
        })
    }
}

/// A compiled configuration: classifier, name rules, and the profanity list
/// for per-subject toxicity matchers. Immutable and shareable once built.
pub struct FilterEngine {
    pub classifier: Classifier,
    pub alphabet: AlphabetSet,
    pub name_minimum: usize,
    pub profanity: Vec<String>,
}

impl std::fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEngine")
            .field("name_minimum", &self.name_minimum)
            .field("profanity", &self.profanity)
            .finish_non_exhaustive()
    }
}

impl FilterEngine {
    /// Build the session-specific toxicity matcher for one subject name.
    pub fn toxicity_for(&self, subject: &str) -> Result<ToxicityMatcher> {
        ToxicityMatcher::new(subject, &self.profanity)
    }
}
