//! In-process adapters.
//!
//! Used when `DATABASE_URL` / `QR_STORAGE_DIR` are not configured and by
//! integration tests.

mod click_repository;
mod link_registry;
mod qr_store;

pub use click_repository::MemoryClickRepository;
pub use link_registry::MemoryLinkRegistry;
pub use qr_store::MemoryQrStore;
