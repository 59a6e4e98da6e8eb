//! Domain layer: entities, value objects and the ports the core depends on.
//!
//! # Architecture
//!
//! - [`entities`] - Short links, their status enums, clicks
//! - [`repositories`] - Storage traits (registry, clicks, QR images)
//! - [`probe`] / [`qr`] - Network check and QR codec ports
//! - [`task`] - Verification work units queued at creation
//! - [`outcome`] - Redirect gate decisions
//! - [`click_event`] / [`click_worker`] - Asynchronous click recording
//!
//! The domain layer has no dependency on infrastructure or delivery code.
//!
//! # Link Activation Flow
//!
//! 1. A link is created with reachability `Pending`
//! 2. [`task::VerificationTask`]s are published to the dispatcher
//! 3. Workers write terminal statuses back through [`repositories::LinkRegistry`]
//! 4. The redirect gate admits requests only for `Reachable` links with quota left

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod outcome;
pub mod probe;
pub mod qr;
pub mod repositories;
pub mod task;

pub use outcome::RedirectOutcome;
pub use task::{TaskKind, VerificationTask};
