//! Profile page extraction.
//!
//! Listing sites serve more than one profile layout, so most fields are
//! looked up through an ordered chain of selectors and the first hit wins.
//! Fields are extracted independently: a missing or malformed field becomes
//! `None` without affecting the rest of the record.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::{RatingsAndReviews, RawRecord};

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

fn chain(css: &[&str]) -> Vec<Selector> {
    css.iter().map(|c| sel(c)).collect()
}

static NAME_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    chain(&[r#"h1.u-title[data-qa-id="doctor-name"]"#, "h1.c-profile__title"])
});
static CLINIC_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    chain(&[
        "a.c-profile--clinic__name",
        "p.u-bold.u-d-inline-block.u-valign--middle",
        r#"p[data-qa-id="doctor_clinic_name"]"#,
    ])
});
static ADDRESS_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    chain(&[
        r#"p[data-qa-id="clinic-address"]"#,
        r#"p[data-qa-id="practice-address"]"#,
    ])
});

static QUALIFICATION_CONTAINER: Lazy<Selector> = Lazy::new(|| sel("div.c-profile--qualification"));
static PROFILE_DETAILS: Lazy<Selector> = Lazy::new(|| sel("h2.c-profile__details"));
static FLEX_CONTAINER: Lazy<Selector> = Lazy::new(|| sel("div.u-d-flex"));
static LARGE_FONT: Lazy<Selector> = Lazy::new(|| sel("p.u-large-font"));
static EXPERIENCE: Lazy<Selector> = Lazy::new(|| sel(r#"span[data-qa-id="years_of_experience"]"#));
static RECOMMENDATION: Lazy<Selector> = Lazy::new(|| sel(r#"div[data-qa-id="doctor-recommendation"]"#));
static SPAN: Lazy<Selector> = Lazy::new(|| sel("span"));
static FEEDBACK_TAB: Lazy<Selector> = Lazy::new(|| sel(r#"li[data-qa-id="feedback-tab"]"#));
static STAR_RATING: Lazy<Selector> = Lazy::new(|| sel("div.common__star-rating"));
static STAR_RATING_VALUE: Lazy<Selector> = Lazy::new(|| sel("span.common__star-rating__value"));
static FEEDBACK_CONTENT: Lazy<Selector> = Lazy::new(|| sel("p.feedback__content"));
static TEL_LINK: Lazy<Selector> = Lazy::new(|| sel(r#"a[href^="tel:"]"#));
static MAILTO_LINK: Lazy<Selector> = Lazy::new(|| sel(r#"a[href^="mailto:"]"#));
static CLINIC_ITEM: Lazy<Selector> = Lazy::new(|| sel("div.c-profile--clinic--item"));

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());
static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").unwrap());
static PARENTHESIZED_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)\)").unwrap());
static INDIAN_PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+91\d{10}").unwrap());
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

const EXPERIENCE_MARKER: &str = "Years Experience Overall";

/// Text of an element with every text node trimmed and joined by single spaces.
fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn capture_number<T: std::str::FromStr>(re: &Regex, text: &str) -> Option<T> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

pub struct ProfileScraper<'a> {
    html: &'a str,
    document: Html,
}

impl<'a> ProfileScraper<'a> {
    pub fn new(html: &'a str) -> Self {
        Self {
            html,
            document: Html::parse_document(html),
        }
    }

    fn find_first(&self, selectors: &[Selector]) -> Option<ElementRef<'_>> {
        selectors
            .iter()
            .find_map(|selector| self.document.select(selector).next())
    }

    fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }

    /// True when the page carries the clinic section every real profile has.
    pub fn has_profile_content(&self) -> bool {
        self.select_first(&CLINIC_ITEM).is_some()
    }

    pub fn extract_data(&self, source_url: &str) -> RawRecord {
        RawRecord {
            doctor_name: self.extract_doctor_name(),
            specialty: self.extract_specialty(),
            years_of_experience: self.extract_experience(),
            recommendation_percent: self.extract_recommendation(),
            clinic_name: self.extract_clinic_name(),
            address: self.extract_address(),
            ratings_and_reviews: self.extract_reviews_and_ratings(),
            contact_number: self.extract_contact_number(),
            contact_email: self.extract_contact_email(),
            source_url: source_url.to_string(),
        }
    }

    pub fn extract_doctor_name(&self) -> Option<String> {
        self.find_first(&NAME_SELECTORS).and_then(element_text)
    }

    pub fn extract_specialty(&self) -> Option<String> {
        if let Some(container) = self.select_first(&QUALIFICATION_CONTAINER) {
            return container.select(&PROFILE_DETAILS).next().and_then(element_text);
        }

        // Older layout
        let container = self.select_first(&FLEX_CONTAINER)?;
        container.select(&LARGE_FONT).next().and_then(element_text)
    }

    pub fn extract_experience(&self) -> Option<u32> {
        if let Some(years) = self
            .select_first(&EXPERIENCE)
            .and_then(element_text)
            .and_then(|text| capture_number(&FIRST_NUMBER, &text))
        {
            return Some(years);
        }

        // Combined "Specialty · N Years Experience Overall" heading
        self.document
            .select(&PROFILE_DETAILS)
            .filter_map(element_text)
            .filter(|text| text.contains(EXPERIENCE_MARKER))
            .find_map(|text| capture_number(&FIRST_NUMBER, &text))
    }

    pub fn extract_recommendation(&self) -> Option<u32> {
        let container = self.select_first(&RECOMMENDATION)?;
        let text = container.select(&SPAN).next().and_then(element_text)?;
        capture_number(&PERCENT, &text)
    }

    pub fn extract_clinic_name(&self) -> Option<String> {
        self.find_first(&CLINIC_SELECTORS).and_then(element_text)
    }

    pub fn extract_address(&self) -> Option<String> {
        self.find_first(&ADDRESS_SELECTORS).and_then(element_text)
    }

    pub fn extract_reviews_and_ratings(&self) -> RatingsAndReviews {
        let total_reviews = self
            .select_first(&FEEDBACK_TAB)
            .and_then(element_text)
            .and_then(|text| capture_number(&PARENTHESIZED_COUNT, &text))
            .unwrap_or(0);

        let overall_rating = self
            .select_first(&STAR_RATING)
            .and_then(|container| container.select(&STAR_RATING_VALUE).next())
            .and_then(element_text);

        let reviews_summary = self
            .document
            .select(&FEEDBACK_CONTENT)
            .filter_map(element_text)
            .collect();

        RatingsAndReviews {
            total_reviews,
            overall_rating,
            reviews_summary,
        }
    }

    /// Phone number from a `tel:` link, else the first `+91` number anywhere in the raw HTML.
    pub fn extract_contact_number(&self) -> Option<String> {
        let from_link = self
            .select_first(&TEL_LINK)
            .and_then(|a| a.value().attr("href"))
            .map(|href| {
                href.trim_start_matches("tel:")
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '+')
                    .collect::<String>()
            })
            .filter(|number| !number.is_empty());

        from_link.or_else(|| INDIAN_PHONE.find(self.html).map(|m| m.as_str().to_string()))
    }

    /// Email from a `mailto:` link, else the first address in the visible text.
    pub fn extract_contact_email(&self) -> Option<String> {
        let from_link = self
            .select_first(&MAILTO_LINK)
            .and_then(|a| a.value().attr("href"))
            .map(|href| {
                let address = href.trim_start_matches("mailto:");
                address.split('?').next().unwrap_or(address).trim().to_string()
            })
            .filter(|address| EMAIL.is_match(address));

        from_link.or_else(|| {
            let text = self.document.root_element().text().collect::<Vec<_>>().join(" ");
            EMAIL.find(&text).map(|m| m.as_str().to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODERN_LAYOUT: &str = r#"
        <html><body>
          <h1 class="u-title" data-qa-id="doctor-name">Dr. Asha Kulkarni</h1>
          <div class="c-profile--qualification">
            <h2 class="c-profile__details">Cardiologist</h2>
          </div>
          <span data-qa-id="years_of_experience">18 Years Experience</span>
          <div data-qa-id="doctor-recommendation"><span>96% (120 votes)</span></div>
          <div class="c-profile--clinic--item">
            <a class="c-profile--clinic__name" href="/clinic/ruby">Ruby Hall Clinic</a>
            <p data-qa-id="clinic-address">40, Sassoon Road,
               Sangamvadi, Pune 411001</p>
            <a href="tel:+91 98765 43210">Call</a>
          </div>
          <ul><li data-qa-id="feedback-tab">Stories (42)</li></ul>
          <div class="common__star-rating"><span class="common__star-rating__value">4.5</span></div>
          <p class="feedback__content">Very caring doctor.</p>
          <p class="feedback__content">  Explained everything clearly!  </p>
          <a href="mailto:clinic@rubyhall.example?subject=Hi">Mail</a>
        </body></html>
    "#;

    const LEGACY_LAYOUT: &str = r#"
        <html><body>
          <h1 class="c-profile__title">Dr. Vivek Rao</h1>
          <div class="u-d-flex"><p class="u-large-font">Orthopedist</p></div>
          <h2 class="c-profile__details">Orthopedist</h2>
          <h2 class="c-profile__details">22 Years Experience Overall (15 years as specialist)</h2>
          <p class="u-bold u-d-inline-block u-valign--middle">Noble Hospital</p>
          <p data-qa-id="practice-address">Hadapsar, Pune</p>
          <p>Reach us at +919812345678 or front.desk@noble.example</p>
        </body></html>
    "#;

    #[test]
    fn test_modern_layout() {
        let record = ProfileScraper::new(MODERN_LAYOUT).extract_data("https://example.com/dr-asha");

        assert_eq!(record.doctor_name.as_deref(), Some("Dr. Asha Kulkarni"));
        assert_eq!(record.specialty.as_deref(), Some("Cardiologist"));
        assert_eq!(record.years_of_experience, Some(18));
        assert_eq!(record.recommendation_percent, Some(96));
        assert_eq!(record.clinic_name.as_deref(), Some("Ruby Hall Clinic"));
        let address = record.address.as_deref().unwrap();
        assert!(address.starts_with("40, Sassoon Road,"));
        assert!(address.ends_with("Sangamvadi, Pune 411001"));
        assert_eq!(record.ratings_and_reviews.total_reviews, 42);
        assert_eq!(record.ratings_and_reviews.overall_rating.as_deref(), Some("4.5"));
        assert_eq!(
            record.ratings_and_reviews.reviews_summary,
            vec!["Very caring doctor.", "Explained everything clearly!"]
        );
        assert_eq!(record.contact_number.as_deref(), Some("+919876543210"));
        assert_eq!(record.contact_email.as_deref(), Some("clinic@rubyhall.example"));
        assert_eq!(record.source_url, "https://example.com/dr-asha");
    }

    #[test]
    fn test_legacy_layout_fallbacks() {
        let scraper = ProfileScraper::new(LEGACY_LAYOUT);
        let record = scraper.extract_data("https://example.com/dr-vivek");

        assert_eq!(record.doctor_name.as_deref(), Some("Dr. Vivek Rao"));
        assert_eq!(record.specialty.as_deref(), Some("Orthopedist"));
        assert_eq!(record.years_of_experience, Some(22));
        assert_eq!(record.clinic_name.as_deref(), Some("Noble Hospital"));
        assert_eq!(record.address.as_deref(), Some("Hadapsar, Pune"));
        assert_eq!(record.contact_number.as_deref(), Some("+919812345678"));
        assert_eq!(record.contact_email.as_deref(), Some("front.desk@noble.example"));
        assert_eq!(record.recommendation_percent, None);
        assert!(!scraper.has_profile_content());
    }

    #[test]
    fn test_contact_number_found_in_markup() {
        let scraper = ProfileScraper::new(
            r#"<html><body>
              <button data-phone="+919822001122">Call clinic</button>
              <script>var support = "+919800000000";</script>
            </body></html>"#,
        );
        assert_eq!(scraper.extract_contact_number().as_deref(), Some("+919822001122"));
    }

    #[test]
    fn test_empty_page_degrades_per_field() {
        let scraper = ProfileScraper::new("<html><body><p>Not found</p></body></html>");
        let record = scraper.extract_data("https://example.com/missing");

        assert_eq!(record.doctor_name, None);
        assert_eq!(record.specialty, None);
        assert_eq!(record.years_of_experience, None);
        assert_eq!(record.clinic_name, None);
        assert_eq!(record.address, None);
        assert_eq!(record.contact_number, None);
        assert_eq!(record.contact_email, None);
        assert_eq!(record.ratings_and_reviews, RatingsAndReviews::default());
    }

    #[test]
    fn test_qualification_container_takes_priority() {
        let html = r#"
            <div class="c-profile--qualification"><span>no heading</span></div>
            <div class="u-d-flex"><p class="u-large-font">Dermatologist</p></div>
        "#;
        assert_eq!(ProfileScraper::new(html).extract_specialty(), None);
    }

    #[test]
    fn test_recommendation_without_percent() {
        let html = r#"<div data-qa-id="doctor-recommendation"><span>New doctor</span></div>"#;
        assert_eq!(ProfileScraper::new(html).extract_recommendation(), None);
    }

    #[test]
    fn test_has_profile_content() {
        assert!(ProfileScraper::new(MODERN_LAYOUT).has_profile_content());
    }
}
