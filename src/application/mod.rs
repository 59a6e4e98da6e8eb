//! Application layer: services, quota accounting and background workers.
//!
//! This layer orchestrates domain operations by coordinating repository
//! calls, validation and business rules. Services consume the domain ports
//! and provide a clean API for HTTP handlers.
//!
//! # Components
//!
//! - [`services::LinkService`] - Link creation, status and QR lookup
//! - [`services::RedirectGate`] - Redirect admission control
//! - [`services::StatsService`] - Click history and metrics
//! - [`redirect_budget::RedirectBudget`] - Per-link token buckets
//! - [`dispatcher::VerificationDispatcher`] - Verification task queues
//! - [`workers`] - Reachability probe, QR worker, pending sweep

pub mod dispatcher;
pub mod redirect_budget;
pub mod services;
pub mod workers;
