//! Helpers shared by the service and delivery layers.
//!
//! - [`code_generator`] - Short hash generation and validation
//! - [`url_normalizer`] - Target URL validation and canonicalization

pub mod code_generator;
pub mod url_normalizer;
