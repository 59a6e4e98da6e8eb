//! Core domain entities.
//!
//! - [`ShortLink`] - A shortened URL with its reachability and QR state
//! - [`Click`] - An admitted redirect recorded for analytics
//!
//! Creation inputs use separate structs (`NewShortLink`, `NewClick`).

pub mod click;
pub mod link;

pub use click::{Click, NewClick};
pub use link::{NewShortLink, QrStatus, Reachability, ShortLink, UnknownStatus};
