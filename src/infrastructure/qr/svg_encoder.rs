use qrcode::QrCode;
use qrcode::render::svg;

use crate::domain::qr::{QrEncoder, QrError};

/// Renders QR codes as black-on-white SVG documents.
#[derive(Debug, Clone)]
pub struct SvgQrEncoder {
    min_size: u32,
}

impl Default for SvgQrEncoder {
    fn default() -> Self {
        Self { min_size: 200 }
    }
}

impl SvgQrEncoder {
    pub fn new(min_size: u32) -> Self {
        Self { min_size }
    }
}

impl QrEncoder for SvgQrEncoder {
    fn render(&self, data: &str) -> Result<Vec<u8>, QrError> {
        let code = QrCode::new(data.as_bytes()).map_err(|e| QrError(e.to_string()))?;

        let image = code
            .render()
            .min_dimensions(self.min_size, self.min_size)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();

        Ok(image.into_bytes())
    }

    fn content_type(&self) -> &'static str {
        "image/svg+xml"
    }
}
