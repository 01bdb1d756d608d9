use crate::constants::{PRACTO_HOST, PRACTO_SOURCE};
use crate::types::ListingSource;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;

static DOCTOR_CARD: Lazy<Selector> = Lazy::new(|| Selector::parse("div.info-section").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static DOCTOR_NAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"h2[data-qa-id="doctor_name"]"#).unwrap());

pub struct PractoSource {
    base_url: String,
}

impl PractoSource {
    /// `base_url` is the city root, e.g. `https://www.practo.com/pune`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn absolute(href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", PRACTO_HOST, href)
        } else {
            format!("{}/{}", PRACTO_HOST, href)
        }
    }
}

impl ListingSource for PractoSource {
    fn name(&self) -> &'static str {
        PRACTO_SOURCE
    }

    fn search_url(&self, specialty: &str, page: u32) -> String {
        format!("{}/{}?page={}", self.base_url, specialty, page)
    }

    fn parse_profile_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for card in document.select(&DOCTOR_CARD) {
            // The profile anchor wraps the doctor-name heading; other anchors in the card are ignored.
            let Some(anchor) = card.select(&ANCHOR).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if anchor.select(&DOCTOR_NAME).next().is_none() {
                continue;
            }

            let url = Self::absolute(href.trim());
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }

        links
    }
}
