//! Infrastructure layer for external integrations.
//!
//! Implements the ports defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repositories
//! - [`memory`] - In-process repositories for storage-less runs and tests
//! - [`qr`] - SVG rendering and QR image storage
//! - [`http_check`] - `reqwest` reachability check

pub mod http_check;
pub mod memory;
pub mod persistence;
pub mod qr;
