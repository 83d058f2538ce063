//! Lyric text analysis: annotation stripping, tokenisation and a small
//! lexicon-based sentiment analyzer.
//!
//! The analyzer averages the polarity and subjectivity of every lexicon word
//! found in the text. A preceding intensifier ("very", "trop", ...) scales the
//! next lexicon word; a preceding negation flips and halves its polarity.
//! Text without any lexicon word scores `(0.0, 0.0)`.

use crate::types::{LyricOrigin, LyricSignal};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Section markers such as `[Verse 1]` or `[Refrain : Angèle]`.
static ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());

/// Polarity and subjectivity of a text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    /// -1.0 to 1.0
    pub polarity: f64,
    /// 0.0 to 1.0
    pub subjectivity: f64,
}

/// Anything able to score a text.
pub trait SentimentAnalyzer {
    fn analyze(&self, text: &str) -> Sentiment;
}

// (word, polarity, subjectivity)
const LEXICON: &[(&str, f64, f64)] = &[
    // English
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("love", 0.5, 0.6),
    ("loved", 0.7, 0.8),
    ("lovely", 0.5, 0.75),
    ("happy", 0.8, 1.0),
    ("beautiful", 0.85, 1.0),
    ("sweet", 0.35, 0.65),
    ("perfect", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("wonderful", 1.0, 1.0),
    ("free", 0.4, 0.8),
    ("bright", 0.7, 0.75),
    ("warm", 0.6, 0.6),
    ("fun", 0.3, 0.2),
    ("smile", 0.3, 0.1),
    ("shine", 0.4, 0.6),
    ("alive", 0.1, 0.4),
    ("hope", 0.3, 0.5),
    ("nice", 0.6, 1.0),
    ("sad", -0.5, 1.0),
    ("bad", -0.7, 0.67),
    ("hate", -0.8, 0.9),
    ("lonely", -0.5, 1.0),
    ("alone", -0.3, 0.6),
    ("dark", -0.15, 0.4),
    ("cold", -0.6, 1.0),
    ("broken", -0.4, 0.4),
    ("wrong", -0.5, 0.9),
    ("dead", -0.2, 0.4),
    ("tired", -0.4, 0.7),
    ("angry", -0.5, 1.0),
    ("crazy", -0.6, 0.9),
    ("pain", -0.4, 0.6),
    ("cry", -0.4, 0.7),
    ("tears", -0.4, 0.7),
    ("afraid", -0.6, 0.9),
    ("hurt", -0.5, 0.8),
    ("empty", -0.1, 0.5),
    ("worst", -1.0, 1.0),
    // French
    ("heureux", 0.8, 1.0),
    ("heureuse", 0.8, 1.0),
    ("bonheur", 0.8, 0.9),
    ("joie", 0.8, 0.9),
    ("beau", 0.85, 1.0),
    ("belle", 0.85, 1.0),
    ("magnifique", 1.0, 1.0),
    ("parfait", 1.0, 1.0),
    ("amour", 0.5, 0.6),
    ("aime", 0.5, 0.6),
    ("doux", 0.35, 0.65),
    ("douce", 0.35, 0.65),
    ("libre", 0.4, 0.8),
    ("rire", 0.4, 0.5),
    ("espoir", 0.3, 0.5),
    ("triste", -0.5, 1.0),
    ("mal", -0.7, 0.67),
    ("peur", -0.6, 0.9),
    ("seul", -0.4, 0.7),
    ("seule", -0.4, 0.7),
    ("larmes", -0.4, 0.7),
    ("pleure", -0.4, 0.7),
    ("haine", -0.8, 0.9),
    ("mort", -0.2, 0.4),
    ("sombre", -0.3, 0.5),
    ("froid", -0.6, 1.0),
    ("fou", -0.4, 0.9),
    ("folle", -0.4, 0.9),
    ("vide", -0.1, 0.5),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("too", 1.3),
    ("extremely", 1.5),
    ("très", 1.3),
    ("trop", 1.3),
    ("tellement", 1.3),
    ("vraiment", 1.3),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "can't", "won't", "ain't", "isn't",
    "pas", "jamais", "plus", "rien",
];

/// How many tokens a negation keeps affecting.
const NEGATION_SPAN: usize = 3;

/// Lexicon-based analyzer covering common English and French lyric vocabulary.
///
/// # Examples
///
/// ```rust
/// use atelier_lucide::sentiment::{LexiconAnalyzer, SentimentAnalyzer};
///
/// let analyzer = LexiconAnalyzer::new();
/// let happy = analyzer.analyze("What a beautiful day");
/// let sad = analyzer.analyze("I am so sad and lonely");
/// assert!(happy.polarity > 0.0);
/// assert!(sad.polarity < 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    lexicon: HashMap<&'static str, (f64, f64)>,
    intensifiers: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().map(|(w, p, s)| (*w, (*p, *s))).collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Sentiment {
        let mut scores: Vec<(f64, f64)> = Vec::new();
        let mut intensity = 1.0;
        let mut negation_left = 0usize;

        for token in sentiment_tokens(text) {
            if let Some(factor) = self.intensifiers.get(token.as_str()) {
                intensity *= factor;
                continue;
            }
            if self.negations.contains(token.as_str()) || token.ends_with("n't") {
                negation_left = NEGATION_SPAN;
                continue;
            }

            if let Some((polarity, subjectivity)) = self.lexicon.get(token.as_str()) {
                let mut polarity = polarity * intensity;
                if negation_left > 0 {
                    polarity *= -0.5;
                }
                scores.push((polarity, (subjectivity * intensity).min(1.0)));
                negation_left = 0;
            } else {
                negation_left = negation_left.saturating_sub(1);
            }
            intensity = 1.0;
        }

        if scores.is_empty() {
            return Sentiment {
                polarity: 0.0,
                subjectivity: 0.0,
            };
        }

        let n = scores.len() as f64;
        let polarity = scores.iter().map(|(p, _)| p).sum::<f64>() / n;
        let subjectivity = scores.iter().map(|(_, s)| s).sum::<f64>() / n;

        Sentiment {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }
}

/// Lower-cased words, apostrophes kept so that contractions stay whole.
fn sentiment_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('’', "'").to_lowercase())
}

/// Remove `[Section]` markers and trim surrounding whitespace.
pub fn strip_annotations(raw: &str) -> String {
    ANNOTATION.replace_all(raw, "").trim().to_string()
}

/// Case-folded word tokens split on whitespace and punctuation.
///
/// Only purely alphabetic tokens are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && t.chars().all(char::is_alphabetic))
        .map(str::to_lowercase)
        .collect()
}

/// Number of distinct tokens of `text`.
pub fn unique_token_count(text: &str) -> usize {
    tokenize(text).into_iter().collect::<HashSet<_>>().len()
}

/// Build the lyric signal of a raw lyrics text.
///
/// Returns `None` when nothing is left once annotations are removed.
pub fn analyze_lyrics(
    raw: &str,
    origin: LyricOrigin,
    analyzer: &dyn SentimentAnalyzer,
    preview_lines: usize,
) -> Option<LyricSignal> {
    let cleaned = strip_annotations(raw);
    if cleaned.is_empty() {
        return None;
    }

    let sentiment = analyzer.analyze(&cleaned);
    Some(LyricSignal {
        polarity: sentiment.polarity,
        subjectivity: sentiment.subjectivity,
        unique_tokens: unique_token_count(&cleaned),
        origin,
        preview: cleaned
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(preview_lines)
            .map(str::to_string)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_annotations() {
        let raw = "[Couplet 1]\nJe suis là\n[Refrain : Angèle]\nBalance ton quoi";
        assert_eq!(strip_annotations(raw), "Je suis là\n\nBalance ton quoi");
    }

    #[test]
    fn test_unique_tokens_are_case_folded() {
        assert_eq!(unique_token_count("Love, love LOVE! me do"), 3);
        assert_eq!(unique_token_count("track 22 and more"), 3);
        assert_eq!(unique_token_count(""), 0);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let analyzer = LexiconAnalyzer::new();
        let plain = analyzer.analyze("I am happy");
        let negated = analyzer.analyze("I am not happy");
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
        assert!((negated.polarity + plain.polarity * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_intensifier_scales() {
        let analyzer = LexiconAnalyzer::new();
        let plain = analyzer.analyze("sad");
        let intense = analyzer.analyze("very sad");
        assert!(intense.polarity < plain.polarity);
        assert!(intense.polarity >= -1.0);
    }

    #[test]
    fn test_neutral_text() {
        let sentiment = LexiconAnalyzer::new().analyze("la la la");
        assert_eq!(sentiment.polarity, 0.0);
        assert_eq!(sentiment.subjectivity, 0.0);
    }

    #[test]
    fn test_analyze_lyrics_rejects_annotation_only_text() {
        let analyzer = LexiconAnalyzer::new();
        assert!(analyze_lyrics("[Instrumental]", LyricOrigin::Manual, &analyzer, 15).is_none());

        let signal =
            analyze_lyrics("[Intro]\nOh happy day\n\nhappy", LyricOrigin::Manual, &analyzer, 15)
                .unwrap();
        assert_eq!(signal.unique_tokens, 3);
        assert_eq!(signal.preview, vec!["Oh happy day", "happy"]);
        assert!(signal.polarity > 0.0);
    }
}
