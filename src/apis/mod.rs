pub mod practo;

use crate::config::Config;
use crate::constants::PRACTO_SOURCE;
use crate::types::ListingSource;

/// Build a listing source by its CLI name.
pub fn create_source(name: &str, config: &Config) -> Option<Box<dyn ListingSource>> {
    match name {
        PRACTO_SOURCE => Some(Box::new(practo::PractoSource::new(config.practo_base_url()))),
        _ => None,
    }
}
