//! HTML parsers for profile pages
//!
//! Pure functions over page markup, no I/O.

pub mod listing;

pub use listing::{ListingExtractor, Selectors, parse_listing};
