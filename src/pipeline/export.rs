use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::app::ports::SentimentScorer;
use crate::constants::{EXPORT_SHEET_NAME, NIL};
use crate::error::Result;
use crate::pipeline::processing::summary::{
    clean_reviews_text, format_contact_number, format_rating, generate_pros_cons_summary,
};
use crate::types::ProcessedRecord;

/// Column headers, in sheet order.
pub const HEADERS: [&str; 10] = [
    "Complete Address",
    "Doctor Name",
    "Specialty",
    "Clinic/Hospital",
    "Years of Experience",
    "Contact Number",
    "Contact Email",
    "Ratings",
    "Reviews",
    "Summary of Pros and Cons (Summary of reviews), and recommendation",
];

const YEARS_COLUMN: usize = 4;
const CONTACT_COLUMN: usize = 5;
const MAX_COLUMN_WIDTH: usize = 50;

/// One spreadsheet row
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub complete_address: String,
    pub doctor_name: String,
    pub specialty: String,
    pub clinic_hospital: String,
    pub years_of_experience: Option<u32>,
    pub contact_number: String,
    pub contact_email: String,
    pub ratings: String,
    pub reviews: String,
    pub summary: String,
}

impl ExportRow {
    pub fn from_record(record: &ProcessedRecord, scorer: &dyn SentimentScorer) -> Self {
        let complete_address = format!("{} {}", record.complete_address, record.locality)
            .trim()
            .to_string();

        let reviews = if record.review_count == 0 || record.reviews_summary.is_empty() {
            NIL.to_string()
        } else {
            clean_reviews_text(&record.reviews_summary)
        };

        Self {
            complete_address,
            doctor_name: record.doctor_name.clone().unwrap_or_default(),
            specialty: record.specialty_raw.clone().unwrap_or_default(),
            clinic_hospital: record.clinic_hospital_standardized.clone().unwrap_or_default(),
            years_of_experience: record.years_of_experience,
            contact_number: format_contact_number(record.contact_number.as_deref()),
            contact_email: record.contact_email.clone().unwrap_or_default(),
            ratings: format_rating(record.ratings.as_deref()),
            reviews,
            summary: generate_pros_cons_summary(
                &record.reviews_summary,
                record.recommendation_percent,
                scorer,
            ),
        }
    }

    /// Cell text in column order. Years of experience is blank when unknown.
    pub fn cells(&self) -> [String; 10] {
        [
            self.complete_address.clone(),
            self.doctor_name.clone(),
            self.specialty.clone(),
            self.clinic_hospital.clone(),
            self.years_of_experience.map(|y| y.to_string()).unwrap_or_default(),
            self.contact_number.clone(),
            self.contact_email.clone(),
            self.ratings.clone(),
            self.reviews.clone(),
            self.summary.clone(),
        ]
    }
}

/// Convert records to rows, keeping only the first `limit` when set.
pub fn build_rows(
    records: &[ProcessedRecord],
    limit: Option<usize>,
    scorer: &dyn SentimentScorer,
) -> Vec<ExportRow> {
    let take = limit.unwrap_or(records.len());
    if take < records.len() {
        info!("Processing first {} records for testing...", take);
    }
    records
        .iter()
        .take(take)
        .map(|record| ExportRow::from_record(record, scorer))
        .collect()
}

/// Widest cell in each column plus padding, capped for readability.
pub fn column_widths(rows: &[ExportRow]) -> [usize; 10] {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells().iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths.map(|w| (w + 2).min(MAX_COLUMN_WIDTH))
}

#[instrument(skip(rows), fields(row_count = rows.len()))]
pub fn write_workbook(rows: &[ExportRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let text_format = Format::new().set_num_format("@");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let excel_row = (index + 1) as u32;
        for (col, cell) in row.cells().into_iter().enumerate() {
            match col {
                YEARS_COLUMN => {
                    if let Some(years) = row.years_of_experience {
                        worksheet.write_number(excel_row, col as u16, years)?;
                    }
                }
                // Phone numbers stay text so they are not shown as floats.
                CONTACT_COLUMN => {
                    worksheet.write_string_with_format(excel_row, col as u16, cell, &text_format)?;
                }
                _ => {
                    worksheet.write_string(excel_row, col as u16, cell)?;
                }
            }
        }
    }

    for (col, width) in column_widths(rows).iter().enumerate() {
        worksheet.set_column_width(col as u16, *width as f64)?;
    }

    workbook.save(path)?;
    info!("Excel exported successfully to: {}", path.display());
    info!("Total records exported: {}", rows.len());
    Ok(())
}
