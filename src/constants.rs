/// Listing source names to ensure consistency across the codebase

// User-friendly source names (used in CLI)
pub const PRACTO_SOURCE: &str = "practo";

/// Host prepended to relative profile links found on Practo listing pages.
pub const PRACTO_HOST: &str = "https://www.practo.com";

/// Category used when no taxonomy keyword matches.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Worksheet the exporter writes into.
pub const EXPORT_SHEET_NAME: &str = "Doctor Data";

/// Placeholder for absent review text.
pub const NIL: &str = "NIL";

/// Get all supported source names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![PRACTO_SOURCE]
}
