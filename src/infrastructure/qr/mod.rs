//! QR rendering and image storage adapters.

mod fs_store;
mod svg_encoder;

pub use fs_store::FsQrStore;
pub use svg_encoder::SvgQrEncoder;
