//! Approximate string matching for mapping free-text clinic names onto a
//! canonical list.
//!
//! Scores are 0..=100. The weighted ratio picks the best of several views of
//! the two strings (whole string, best substring window, sorted tokens, token
//! sets) and discounts the looser views, so an exact match always scores 100
//! and a name that merely contains a canonical name scores in the 90s.

use std::collections::BTreeSet;

/// Lowercase, turn anything that is not alphanumeric into a space, collapse runs.
pub fn default_process(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-string similarity.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best similarity between the shorter string and any equally long window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };
    let short_len = short.chars().count();
    if short_len == 0 {
        return 0.0;
    }

    let long_chars: Vec<char> = long.chars().collect();
    if long_chars.len() == short_len {
        return ratio(short, long);
    }

    let mut best = 0.0_f64;
    for start in 0..=(long_chars.len() - short_len) {
        let window: String = long_chars[start..start + short_len].iter().collect();
        best = best.max(ratio(short, &window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_with(a: &str, b: &str, scorer: fn(&str, &str) -> f64) -> f64 {
    scorer(&sorted_tokens(a), &sorted_tokens(b))
}

fn token_set_with(a: &str, b: &str, scorer: fn(&str, &str) -> f64) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection = set_a.intersection(&set_b).copied().collect::<Vec<_>>().join(" ");
    let only_a = set_a.difference(&set_b).copied().collect::<Vec<_>>().join(" ");
    let only_b = set_b.difference(&set_a).copied().collect::<Vec<_>>().join(" ");

    let combined_a = format!("{} {}", intersection, only_a).trim().to_string();
    let combined_b = format!("{} {}", intersection, only_b).trim().to_string();

    scorer(&intersection, &combined_a)
        .max(scorer(&intersection, &combined_b))
        .max(scorer(&combined_a, &combined_b))
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    token_sort_with(a, b, ratio)
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    token_set_with(a, b, ratio)
}

/// Weighted combination of the ratios above on pre-processed input.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let a = default_process(a);
    let b = default_process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    const UNBASE_SCALE: f64 = 0.95;
    let base = ratio(&a, &b);
    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let best = if len_ratio < 1.5 {
        base.max(token_sort_ratio(&a, &b) * UNBASE_SCALE)
            .max(token_set_ratio(&a, &b) * UNBASE_SCALE)
    } else {
        let partial_scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
        base.max(partial_ratio(&a, &b) * partial_scale)
            .max(token_sort_with(&a, &b, partial_ratio) * UNBASE_SCALE * partial_scale)
            .max(token_set_with(&a, &b, partial_ratio) * UNBASE_SCALE * partial_scale)
    };

    best.round().clamp(0.0, 100.0) as u8
}

/// Best-scoring choice for `query`. Ties keep the earlier choice.
pub fn extract_one<'a, S: AsRef<str>>(query: &str, choices: &'a [S]) -> Option<(&'a str, u8)> {
    let mut best: Option<(&'a str, u8)> = None;
    for choice in choices {
        let score = weighted_ratio(query, choice.as_ref());
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((choice.as_ref(), score));
        }
    }
    best
}

/// Map a clinic name onto its canonical spelling when the match is close
/// enough; otherwise keep the scraped name.
pub fn standardize<S: AsRef<str>>(name: Option<&str>, canonical: &[S], threshold: u8) -> Option<String> {
    let name = name.map(str::trim).filter(|n| !n.is_empty())?;
    match extract_one(name, canonical) {
        Some((matched, score)) if score >= threshold => Some(matched.to_string()),
        _ => Some(name.to_string()),
    }
}
