//! File persistence between pipeline stages: the discovered URL list as a
//! one-column CSV and scraped/processed records as pretty JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;

/// One row of the URL list. Extra columns written by other tools are ignored.
#[derive(Debug, Serialize, Deserialize)]
struct UrlRow {
    url: String,
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write the URL list with a `url` header row.
pub fn write_urls(path: &Path, urls: &[String]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    // serialize() only emits the header once a row exists
    writer.write_record(["url"])?;
    for url in urls {
        writer.write_record([url.as_str()])?;
    }
    writer.flush()?;
    info!("Saved {} URLs to {}", urls.len(), path.display());
    Ok(())
}

/// Read the `url` column of a CSV file. Blank values are skipped.
pub fn read_urls(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut urls = Vec::new();
    for row in reader.deserialize::<UrlRow>() {
        let row = row?;
        if !row.url.is_empty() {
            urls.push(row.url);
        }
    }
    debug!("Loaded {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

pub fn write_json<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json)?;
    info!("Saved {} records to {}", items.len(), path.display());
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    let items: Vec<T> = serde_json::from_str(&content)?;
    debug!("Loaded {} records from {}", items.len(), path.display());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScraperError;
    use crate::types::{RawRecord, ScrapeResult, ScrapeStatus};
    use serde_json::json;

    #[test]
    fn test_urls_written_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("urls.csv");
        let urls = vec![
            "https://www.practo.com/pune/doctor/a".to_string(),
            "https://www.practo.com/pune/doctor/b?x=1,2".to_string(),
        ];

        write_urls(&path, &urls).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "url\nhttps://www.practo.com/pune/doctor/a\n\"https://www.practo.com/pune/doctor/b?x=1,2\"\n"
        );
        assert_eq!(read_urls(&path).unwrap(), urls);
    }

    #[test]
    fn test_embedded_newline_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        let urls = vec!["https://x/a\nb".to_string(), "https://x/\"quoted\"".to_string()];

        write_urls(&path, &urls).unwrap();
        assert_eq!(read_urls(&path).unwrap(), urls);
    }

    #[test]
    fn test_read_urls_by_header_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        std::fs::write(
            &path,
            "source,url\npracto,https://example.com/a\npracto,https://example.com/b\n",
        )
        .unwrap();
        assert_eq!(
            read_urls(&path).unwrap(),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_read_urls_rejects_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        std::fs::write(&path, "link\nhttps://example.com/a\n").unwrap();
        assert!(matches!(read_urls(&path), Err(ScraperError::Csv(_))));
    }

    #[test]
    fn test_read_urls_skips_blank_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        std::fs::write(&path, "url\n\nhttps://example.com/a\n  \n").unwrap();
        assert_eq!(read_urls(&path).unwrap(), vec!["https://example.com/a"]);
    }

    #[test]
    fn test_empty_url_list_reloads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        write_urls(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "url\n");
        assert!(read_urls(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_json_scrape_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.json");
        let body = json!([
            {
                "url": "https://www.practo.com/pune/doctor/a",
                "status": "scraped",
                "raw_data": {
                    "doctor_name": "Dr. A",
                    "specialty": null,
                    "years_of_experience": 12,
                    "recommendation_percent": null,
                    "clinic_name": null,
                    "address": "Baner, Pune",
                    "ratings_and_reviews": {"total_reviews": 0, "overall_rating": null, "reviews_summary": []},
                    "contact_number": null,
                    "contact_email": null,
                    "source_url": "https://www.practo.com/pune/doctor/a"
                }
            },
            {"url": "https://www.practo.com/pune/doctor/b", "status": "fetch_failed", "raw_data": null}
        ]);
        std::fs::write(&path, body.to_string()).unwrap();

        let results: Vec<ScrapeResult> = read_json(&path).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, ScrapeStatus::Scraped);
        assert_eq!(
            results[0].raw_data.as_ref().and_then(|r| r.years_of_experience),
            Some(12)
        );
        assert_eq!(results[1].status, ScrapeStatus::FetchFailed);
    }

    #[test]
    fn test_write_json_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.json");
        let records = vec![RawRecord {
            doctor_name: Some("Dr. B".to_string()),
            source_url: "https://example.com/b".to_string(),
            ..RawRecord::default()
        }];
        write_json(&path, &records).unwrap();
        let loaded: Vec<RawRecord> = read_json(&path).unwrap();
        assert_eq!(loaded, records);
    }
}
