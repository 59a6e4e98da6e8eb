//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contracts; implementations live in
//! `crate::infrastructure`. Mock implementations are generated via `mockall`
//! for unit tests.
//!
//! - [`LinkRegistry`] - Short links and their verification state
//! - [`ClickRepository`] - Admitted redirects
//! - [`QrStore`] - Rendered QR images

pub mod click_repository;
pub mod link_registry;
pub mod qr_store;

pub use click_repository::ClickRepository;
pub use link_registry::LinkRegistry;
pub use qr_store::QrStore;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_registry::MockLinkRegistry;
#[cfg(test)]
pub use qr_store::MockQrStore;
