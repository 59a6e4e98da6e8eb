//! Port for the QR image codec.

/// Rendering failure, e.g. data too long for the largest QR version.
#[derive(Debug, thiserror::Error)]
#[error("failed to render QR code: {0}")]
pub struct QrError(pub String);

/// Turns a URL into image bytes.
///
/// Rendering must be deterministic: the same input always yields the same
/// bytes.
pub trait QrEncoder: Send + Sync {
    fn render(&self, data: &str) -> Result<Vec<u8>, QrError>;

    /// MIME type of the produced bytes.
    fn content_type(&self) -> &'static str;
}
