//! Text cleanup and the rule-based review summary used by the exporter.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

use crate::app::ports::SentimentScorer;
use crate::constants::NIL;

/// Sentences scoring at or above this are pros.
pub const PRO_THRESHOLD: f64 = 0.1;
/// Sentences scoring at or below this are cons.
pub const CON_THRESHOLD: f64 = -0.1;
/// Sentences kept per side.
pub const MAX_POINTS: usize = 3;

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s*").unwrap());
static REVIEW_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?\-()]").unwrap());

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip everything but word characters, whitespace and basic punctuation
/// from each review and join the survivors with ` | `.
pub fn clean_reviews_text(reviews: &[String]) -> String {
    let cleaned: Vec<String> = reviews
        .iter()
        .map(|r| collapse_whitespace(&REVIEW_DISALLOWED.replace_all(r, "")))
        .filter(|r| !r.is_empty())
        .collect();

    if cleaned.is_empty() {
        NIL.to_string()
    } else {
        cleaned.join(" | ")
    }
}

/// Sentences of every review as scraped, trimmed, empties dropped.
pub fn split_sentences(reviews: &[String]) -> Vec<String> {
    reviews
        .iter()
        .flat_map(|review| SENTENCE_SPLIT.split(review))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Narrative label for a recommendation percentage.
pub fn format_recommendation(percent: Option<f64>) -> String {
    let Some(pct) = percent else {
        return "none".to_string();
    };
    let label = match pct {
        p if p >= 85.0 => "Highly recommended",
        p if p >= 70.0 => "Recommended",
        p if p >= 50.0 => "Average recommendation",
        p if p >= 40.0 => "Moderate caution",
        _ => "Not recommended",
    };
    format!("{:.1}% — {}", pct, label)
}

fn join_or_none(points: &[String]) -> String {
    if points.is_empty() {
        "none".to_string()
    } else {
        points.join("; ")
    }
}

/// Sentence-level sentiment summary of a doctor's reviews.
///
/// The top sentences above/below the thresholds become pros/cons. Any con
/// pulls a recommendation outside 40..=60 (or a missing one) to 50.
pub fn generate_pros_cons_summary(
    reviews: &[String],
    recommendation: Option<u32>,
    scorer: &dyn SentimentScorer,
) -> String {
    let recommendation = recommendation.map(f64::from);

    if reviews.is_empty() {
        return format!(
            "PROS: none || CONS: none || RECOMMENDATION: {}",
            format_recommendation(recommendation)
        );
    }

    let scored: Vec<(String, f64)> = split_sentences(reviews)
        .into_iter()
        .map(|s| {
            let score = scorer.compound(&s);
            (s, score)
        })
        .collect();

    let mut by_best = scored.clone();
    by_best.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    let pros: Vec<String> = by_best
        .into_iter()
        .filter(|(_, score)| *score >= PRO_THRESHOLD)
        .take(MAX_POINTS)
        .map(|(s, _)| s)
        .collect();

    let mut by_worst = scored;
    by_worst.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    let cons: Vec<String> = by_worst
        .into_iter()
        .filter(|(_, score)| *score <= CON_THRESHOLD)
        .take(MAX_POINTS)
        .map(|(s, _)| s)
        .collect();

    if pros.is_empty() && cons.is_empty() {
        return "No recommendations available.".to_string();
    }

    let recommendation = if cons.is_empty() {
        recommendation
    } else {
        match recommendation {
            Some(pct) if (40.0..=60.0).contains(&pct) => Some(pct),
            _ => Some(50.0),
        }
    };

    format!(
        "PROS: {} || CONS: {} || RECOMMENDATION: {}",
        join_or_none(&pros),
        join_or_none(&cons),
        format_recommendation(recommendation)
    )
}

/// Keep phone numbers as `+91XXXXXXXXXX` text so spreadsheets do not turn them into floats.
pub fn format_contact_number(number: Option<&str>) -> String {
    let Some(number) = number.map(str::trim).filter(|n| !n.is_empty()) else {
        return String::new();
    };

    if number.starts_with("+91") && number.len() == 13 {
        return number.to_string();
    }
    if number.len() == 10 && number.chars().all(|c| c.is_ascii_digit()) {
        return format!("+91{}", number);
    }
    number.to_string()
}

pub fn format_rating(rating: Option<&str>) -> String {
    match rating.map(str::trim) {
        None | Some("") | Some("NIL") => "not available".to_string(),
        Some(r) if r.parse::<f64>().map_or(false, |v| v == 0.0) => "not available".to_string(),
        Some(r) => r.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scores sentences by marker words so tests do not depend on a lexicon.
    struct KeywordScorer;

    impl SentimentScorer for KeywordScorer {
        fn compound(&self, sentence: &str) -> f64 {
            let s = sentence.to_lowercase();
            if s.contains("excellent") {
                0.9
            } else if s.contains("good") {
                0.5
            } else if s.contains("fine") {
                0.2
            } else if s.contains("okay") {
                0.05
            } else if s.contains("terrible") {
                -0.8
            } else if s.contains("slow") {
                -0.3
            } else {
                0.0
            }
        }
    }

    fn reviews(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences(&reviews(&[
            "Great doctor. Very kind!  Would return?",
            "...",
            "Single",
        ]));
        assert_eq!(sentences, vec!["Great doctor", "Very kind", "Would return", "Single"]);
    }

    #[test]
    fn test_sentences_keep_scraped_text() {
        let sentences =
            split_sentences(&reviews(&["Happy withDoctor friendliness. **Explained well**"]));
        assert_eq!(sentences, vec!["Happy withDoctor friendliness", "**Explained well**"]);
    }

    #[test]
    fn test_no_reviews() {
        let summary = generate_pros_cons_summary(&[], Some(92), &KeywordScorer);
        assert_eq!(
            summary,
            "PROS: none || CONS: none || RECOMMENDATION: 92.0% — Highly recommended"
        );
        let summary = generate_pros_cons_summary(&[], None, &KeywordScorer);
        assert_eq!(summary, "PROS: none || CONS: none || RECOMMENDATION: none");
    }

    #[test]
    fn test_pros_only_keeps_recommendation() {
        let summary = generate_pros_cons_summary(
            &reviews(&["Good listener. Excellent diagnosis. Clinic is fine. Parking okay."]),
            Some(88),
            &KeywordScorer,
        );
        assert_eq!(
            summary,
            "PROS: Excellent diagnosis; Good listener; Clinic is fine || CONS: none || RECOMMENDATION: 88.0% — Highly recommended"
        );
    }

    #[test]
    fn test_top_three_per_side() {
        let summary = generate_pros_cons_summary(
            &reviews(&[
                "Excellent one. Good two. Good three. Fine four.",
                "Terrible wait. Slow billing. Slow reports. Slow lift.",
            ]),
            Some(95),
            &KeywordScorer,
        );
        assert!(summary.starts_with("PROS: Excellent one; Good two; Good three || "));
        assert!(summary.contains("CONS: Terrible wait; Slow billing; Slow reports || "));
        assert!(!summary.contains("Fine four"));
        assert!(!summary.contains("Slow lift"));
    }

    #[test]
    fn test_cons_pull_recommendation_to_fifty() {
        let summary = generate_pros_cons_summary(
            &reviews(&["Terrible experience"]),
            Some(95),
            &KeywordScorer,
        );
        assert_eq!(
            summary,
            "PROS: none || CONS: Terrible experience || RECOMMENDATION: 50.0% — Average recommendation"
        );

        let summary = generate_pros_cons_summary(
            &reviews(&["Slow staff"]),
            Some(20),
            &KeywordScorer,
        );
        assert!(summary.ends_with("RECOMMENDATION: 50.0% — Average recommendation"));

        let summary = generate_pros_cons_summary(
            &reviews(&["Slow staff"]),
            None,
            &KeywordScorer,
        );
        assert!(summary.ends_with("RECOMMENDATION: 50.0% — Average recommendation"));
    }

    #[test]
    fn test_cons_leave_midrange_recommendation() {
        let summary = generate_pros_cons_summary(
            &reviews(&["Slow staff"]),
            Some(45),
            &KeywordScorer,
        );
        assert!(summary.ends_with("RECOMMENDATION: 45.0% — Moderate caution"));
    }

    #[test]
    fn test_neutral_reviews() {
        let summary = generate_pros_cons_summary(
            &reviews(&["Visited on Monday. Parking okay."]),
            Some(80),
            &KeywordScorer,
        );
        assert_eq!(summary, "No recommendations available.");
    }

    #[test]
    fn test_format_recommendation_bands() {
        assert_eq!(format_recommendation(None), "none");
        assert_eq!(format_recommendation(Some(85.0)), "85.0% — Highly recommended");
        assert_eq!(format_recommendation(Some(70.0)), "70.0% — Recommended");
        assert_eq!(format_recommendation(Some(50.0)), "50.0% — Average recommendation");
        assert_eq!(format_recommendation(Some(40.0)), "40.0% — Moderate caution");
        assert_eq!(format_recommendation(Some(39.5)), "39.5% — Not recommended");
    }

    #[test]
    fn test_clean_reviews_text() {
        assert_eq!(
            clean_reviews_text(&reviews(&[
                "Very   good ★★★ doctor!",
                "#@$",
                "Explained (clearly), thanks.",
            ])),
            "Very good doctor! | Explained (clearly), thanks."
        );
        assert_eq!(clean_reviews_text(&[]), "NIL");
        assert_eq!(clean_reviews_text(&reviews(&["***"])), "NIL");
    }

    #[test]
    fn test_format_contact_number() {
        assert_eq!(format_contact_number(None), "");
        assert_eq!(format_contact_number(Some("  ")), "");
        assert_eq!(format_contact_number(Some("+919876543210")), "+919876543210");
        assert_eq!(format_contact_number(Some("9876543210")), "+919876543210");
        assert_eq!(format_contact_number(Some("020-2612 3456")), "020-2612 3456");
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(None), "not available");
        assert_eq!(format_rating(Some("")), "not available");
        assert_eq!(format_rating(Some("NIL")), "not available");
        assert_eq!(format_rating(Some("0")), "not available");
        assert_eq!(format_rating(Some("4.5")), "4.5");
    }
}
