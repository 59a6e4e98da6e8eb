//! Business logic services for the application layer.

pub mod link_service;
pub mod redirect_gate;
pub mod stats_service;

pub use link_service::{CreatedLink, LinkService, LinkStatusView, QrLookup};
pub use redirect_gate::RedirectGate;
pub use stats_service::{StatsService, SystemInfo};
