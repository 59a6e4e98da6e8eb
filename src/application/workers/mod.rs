//! Background consumers of the verification dispatcher.
//!
//! - [`ReachabilityProbe`] - liveness check with bounded retries
//! - [`QrWorker`] - QR rendering and storage
//! - [`PendingSweep`] - periodic recovery of links stuck in `Pending`

pub mod pending_sweep;
pub mod qr_worker;
pub mod reachability_probe;

pub use pending_sweep::PendingSweep;
pub use qr_worker::QrWorker;
pub use reachability_probe::{ProbePolicy, ReachabilityProbe};
