use crate::constants::UNCATEGORIZED;

/// Primary specialty categories and the keywords that identify them.
/// Order matters: the first category with a matching keyword wins.
pub const SPECIALTY_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "Cardiology",
        &[
            "cardiologist",
            "heart specialist",
            "interventional cardiology",
            "cardiac surgery",
            "cardiothoracic",
            "heart failure",
        ],
    ),
    (
        "Dermatology",
        &[
            "dermatologist",
            "skin specialist",
            "cosmetic dermatologist",
            "dermatopathologist",
            "trichologist",
            "venereologist",
        ],
    ),
    (
        "Neurology",
        &[
            "neurologist",
            "brain specialist",
            "nervous system",
            "epileptologist",
            "neurophysiologist",
        ],
    ),
    (
        "Oncology",
        &[
            "oncologist",
            "cancer specialist",
            "medical oncologist",
            "radiation oncologist",
            "surgical oncologist",
            "hemato-oncologist",
        ],
    ),
    (
        "General Surgery",
        &["general surgeon", "laparoscopic surgeon", "trauma surgeon"],
    ),
    (
        "Orthopedics",
        &[
            "orthopedist",
            "orthopaedic",
            "bone specialist",
            "joint specialist",
            "spine surgeon",
            "sports medicine",
        ],
    ),
    (
        "Neurosurgery",
        &["neurosurgeon", "brain surgeon", "spine surgeon"],
    ),
    (
        "Pediatrics",
        &[
            "pediatrician",
            "child health",
            "neonatologist",
            "pediatric subspecialist",
        ],
    ),
    (
        "Obstetrics/Gynecology",
        &[
            "obstetrician",
            "gynecologist",
            "gynaecologist",
            "women's health",
            "fertility specialist",
            "maternal-fetal medicine",
            "ivf",
        ],
    ),
    (
        "Psychiatry",
        &[
            "psychiatrist",
            "mental health",
            "child psychiatrist",
            "addiction specialist",
            "psychotherapist",
        ],
    ),
];

/// Identify the primary specialty from a raw specialty string by keyword
/// containment. Returns `Uncategorized` when nothing matches.
pub fn classify_specialty(raw: Option<&str>) -> &'static str {
    let lower = match raw {
        Some(s) if !s.trim().is_empty() => s.to_lowercase(),
        _ => return UNCATEGORIZED,
    };

    SPECIALTY_TAXONOMY
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(UNCATEGORIZED)
}
