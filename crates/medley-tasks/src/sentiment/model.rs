//! Embedded lexicon sentiment model
//!
//! A weighted-valence scorer over an embedded word list, with negation and
//! intensifier handling. Loaded once at startup and shared read-only across
//! requests; prediction takes no locks. The trait seam is where a heavier
//! model would plug in.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use medley_core::types::SentimentLabel;

/// Valence table, AFINN-style scores in -5.0..=5.0.
const VALENCE: &[(&str, f32)] = &[
    ("abandoned", -2.0),
    ("abysmal", -4.0),
    ("admire", 3.0),
    ("adorable", 3.0),
    ("adore", 3.0),
    ("amazing", 4.0),
    ("angry", -3.0),
    ("annoyed", -2.0),
    ("annoying", -2.0),
    ("appalling", -4.0),
    ("atrocious", -4.0),
    ("awesome", 4.0),
    ("awful", -3.0),
    ("bad", -3.0),
    ("beautiful", 3.0),
    ("best", 3.0),
    ("better", 2.0),
    ("bless", 2.0),
    ("boring", -2.0),
    ("brilliant", 4.0),
    ("broken", -2.0),
    ("calm", 2.0),
    ("celebrate", 3.0),
    ("charming", 3.0),
    ("cheerful", 3.0),
    ("comfortable", 2.0),
    ("confused", -2.0),
    ("crap", -3.0),
    ("crashed", -2.0),
    ("cried", -2.0),
    ("damaged", -3.0),
    ("dead", -3.0),
    ("defective", -3.0),
    ("delight", 3.0),
    ("delighted", 3.0),
    ("delightful", 3.0),
    ("depressed", -3.0),
    ("despair", -3.0),
    ("destroyed", -3.0),
    ("disappointed", -2.0),
    ("disappointing", -2.0),
    ("disaster", -3.0),
    ("disgusting", -3.0),
    ("dreadful", -3.0),
    ("dull", -2.0),
    ("elegant", 2.0),
    ("embarrassing", -2.0),
    ("enjoy", 2.0),
    ("enjoyed", 2.0),
    ("excellent", 3.0),
    ("excited", 3.0),
    ("exciting", 3.0),
    ("fail", -2.0),
    ("failed", -2.0),
    ("failure", -2.0),
    ("fantastic", 4.0),
    ("fascinating", 3.0),
    ("favorite", 2.0),
    ("fear", -2.0),
    ("flawless", 3.0),
    ("fraud", -4.0),
    ("frustrated", -2.0),
    ("frustrating", -2.0),
    ("fun", 3.0),
    ("garbage", -3.0),
    ("glad", 3.0),
    ("good", 3.0),
    ("gorgeous", 3.0),
    ("great", 3.0),
    ("happy", 3.0),
    ("hate", -3.0),
    ("hated", -3.0),
    ("helpful", 2.0),
    ("hideous", -3.0),
    ("hope", 2.0),
    ("hopeless", -2.0),
    ("horrible", -3.0),
    ("hurt", -2.0),
    ("impressed", 3.0),
    ("impressive", 3.0),
    ("incredible", 4.0),
    ("inferior", -2.0),
    ("innovative", 2.0),
    ("inspiring", 3.0),
    ("joy", 3.0),
    ("lose", -3.0),
    ("loss", -3.0),
    ("love", 3.0),
    ("loved", 3.0),
    ("lovely", 3.0),
    ("loves", 3.0),
    ("mediocre", -2.0),
    ("mess", -2.0),
    ("miserable", -3.0),
    ("nice", 3.0),
    ("outstanding", 5.0),
    ("pain", -2.0),
    ("painful", -2.0),
    ("perfect", 3.0),
    ("pleasant", 3.0),
    ("pleased", 3.0),
    ("poor", -2.0),
    ("problem", -2.0),
    ("problems", -2.0),
    ("recommend", 2.0),
    ("recommended", 2.0),
    ("regret", -2.0),
    ("reliable", 2.0),
    ("remarkable", 2.0),
    ("rubbish", -2.0),
    ("sad", -2.0),
    ("scam", -4.0),
    ("scared", -2.0),
    ("slow", -2.0),
    ("smooth", 2.0),
    ("solid", 2.0),
    ("stunning", 4.0),
    ("stupid", -2.0),
    ("succeed", 3.0),
    ("success", 2.0),
    ("superb", 5.0),
    ("terrible", -3.0),
    ("terrific", 4.0),
    ("thrilled", 5.0),
    ("trust", 1.0),
    ("ugly", -3.0),
    ("unhappy", -2.0),
    ("unreliable", -2.0),
    ("unusable", -3.0),
    ("useful", 2.0),
    ("useless", -2.0),
    ("waste", -1.0),
    ("wasted", -2.0),
    ("win", 4.0),
    ("wonderful", 4.0),
    ("worse", -3.0),
    ("worst", -3.0),
    ("worthless", -2.0),
    ("wrong", -2.0),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "cannot", "cant", "dont", "doesnt", "didnt", "isnt",
    "wasnt", "wont", "wouldnt", "shouldnt", "couldnt", "hardly", "barely",
];

const INTENSIFIERS: &[(&str, f32)] = &[
    ("absolutely", 1.4),
    ("completely", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("quite", 1.1),
    ("really", 1.3),
    ("slightly", 0.7),
    ("so", 1.2),
    ("somewhat", 0.8),
    ("totally", 1.3),
    ("truly", 1.3),
    ("utterly", 1.4),
    ("very", 1.3),
];

/// Negated terms keep a dampened, flipped weight.
const NEGATION_FACTOR: f32 = -0.74;
/// Normalization constant; larger values need more signal for the same
/// confidence.
const NORMALIZATION_ALPHA: f32 = 15.0;

/// Inference failures.
#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("sentiment inference failed: {0}")]
    Inference(String),
}

/// One polarity verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentPrediction {
    pub label: SentimentLabel,
    /// In 0.5..=1.0; 0.5 means no signal either way.
    pub confidence: f32,
    /// Raw signed score before normalization.
    pub score: f32,
}

/// Local sentiment model seam.
pub trait SentimentModel: Send + Sync {
    /// Stable identifier reported in logs and health output.
    fn id(&self) -> &str;

    fn predict(&self, text: &str) -> Result<SentimentPrediction, SentimentError>;
}

/// The embedded lexicon scorer.
pub struct LexiconSentimentModel {
    valence: HashMap<&'static str, f32>,
    negations: HashSet<&'static str>,
    intensifiers: HashMap<&'static str, f32>,
}

impl LexiconSentimentModel {
    /// Build the lookup tables from the embedded lists. Called once at
    /// startup; the resulting model is immutable.
    pub fn load() -> Self {
        Self {
            valence: VALENCE.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|t| !t.is_empty())
            .map(|t| t.replace('\'', "").to_lowercase())
            .collect()
    }
}

impl Default for LexiconSentimentModel {
    fn default() -> Self {
        Self::load()
    }
}

impl SentimentModel for LexiconSentimentModel {
    fn id(&self) -> &str {
        "lexicon-v1"
    }

    fn predict(&self, text: &str) -> Result<SentimentPrediction, SentimentError> {
        let tokens = Self::tokenize(text);
        let mut score = 0.0f32;
        for (index, token) in tokens.iter().enumerate() {
            let Some(&valence) = self.valence.get(token.as_str()) else {
                continue;
            };
            let mut weight = valence;
            if index > 0 {
                if let Some(&factor) = self.intensifiers.get(tokens[index - 1].as_str()) {
                    weight *= factor;
                }
            }
            let negated = tokens[index.saturating_sub(2)..index]
                .iter()
                .any(|t| self.negations.contains(t.as_str()));
            if negated {
                weight *= NEGATION_FACTOR;
            }
            score += weight;
        }

        let normalized = score / (score * score + NORMALIZATION_ALPHA).sqrt();
        let label = if score >= 0.0 {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };
        let confidence = 0.5 + normalized.abs() * 0.5;
        Ok(SentimentPrediction {
            label,
            confidence: confidence.min(1.0),
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predict(text: &str) -> SentimentPrediction {
        LexiconSentimentModel::load().predict(text).unwrap()
    }

    #[test]
    fn positive_text_scores_positive_with_high_confidence() {
        let prediction = predict("I love this product, it changed my life!");
        assert_eq!(prediction.label, SentimentLabel::Positive);
        assert!(prediction.confidence > 0.5);
        assert!(prediction.score > 0.0);
    }

    #[test]
    fn negative_text_scores_negative() {
        let prediction = predict("This was a terrible, disappointing waste of money.");
        assert_eq!(prediction.label, SentimentLabel::Negative);
        assert!(prediction.confidence > 0.6);
    }

    #[test]
    fn negation_flips_polarity() {
        let plain = predict("the interface is good");
        assert_eq!(plain.label, SentimentLabel::Positive);
        let negated = predict("the interface is not good");
        assert_eq!(negated.label, SentimentLabel::Negative);
    }

    #[test]
    fn intensifiers_raise_confidence() {
        let plain = predict("the support was helpful");
        let intense = predict("the support was extremely helpful");
        assert!(intense.confidence > plain.confidence);
    }

    #[test]
    fn neutral_text_sits_at_the_floor() {
        let prediction = predict("the meeting is at three on tuesday");
        assert_eq!(prediction.score, 0.0);
        assert_eq!(prediction.confidence, 0.5);
    }

    #[test]
    fn punctuation_and_case_do_not_matter() {
        let a = predict("GREAT product!!!");
        let b = predict("great product");
        assert_eq!(a.label, b.label);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn confidence_stays_in_range_for_extreme_input() {
        let gushing = "amazing wonderful fantastic incredible outstanding superb ".repeat(20);
        let prediction = predict(&gushing);
        assert_eq!(prediction.label, SentimentLabel::Positive);
        assert!(prediction.confidence <= 1.0);
        assert!(prediction.confidence > 0.9);
    }
}
