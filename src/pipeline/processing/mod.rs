pub mod fuzzy;
pub mod geo;
pub mod processor;
pub mod profile;
pub mod sentiment;
pub mod summary;
pub mod taxonomy;
