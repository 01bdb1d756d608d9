use vader_sentiment::SentimentIntensityAnalyzer;

use crate::app::ports::SentimentScorer;

/// Lexicon-based scorer using the VADER rule set.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn compound(&self, sentence: &str) -> f64 {
        self.analyzer
            .polarity_scores(sentence)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}
