//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod link;
pub mod qr;
pub mod redirect;
pub mod responses;
pub mod stats;

pub use health::health_handler;
pub use link::{create_link_handler, link_clicks_handler, link_status_handler};
pub use qr::qr_handler;
pub use redirect::redirect_handler;
pub use stats::metrics_handler;
