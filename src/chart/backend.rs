//! Drawing backend wrapper that survives missing system fonts.
//!
//! Headless machines often have no font that the text renderer can load. Text
//! is then skipped and its size estimated, so the lines still get drawn and
//! the chart still gets saved.

use std::panic;

use log::warn;
use plotters_backend::{BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind};

/// Rough glyph advance relative to the font size, used when no font can be loaded.
const FALLBACK_GLYPH_WIDTH: f64 = 0.6;

pub struct TextTolerantBackend<DB> {
    inner: DB,
    text_warned: bool,
}

impl<DB> TextTolerantBackend<DB> {
    pub fn new(inner: DB) -> Self {
        Self { inner, text_warned: false }
    }
}

impl<DB: DrawingBackend> DrawingBackend for TextTolerantBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(&mut self, point: BackendCoord, color: BackendColor) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(&mut self, from: BackendCoord, to: BackendCoord, style: &S) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(&mut self, path: I, style: &S) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn blit_bitmap(&mut self, pos: BackendCoord, (iw, ih): (u32, u32), src: &[u8]) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(&mut self, text: &str, style: &TStyle, pos: BackendCoord) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| self.inner.draw_text(text, style, pos)));
        match result {
            Ok(Err(DrawingErrorKind::FontError(e))) => {
                self.warn_once(&e.to_string());
                Ok(())
            }
            Ok(other) => other,
            Err(_) => {
                self.warn_once("text renderer panicked");
                Ok(())
            }
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(&self, text: &str, style: &TStyle) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| self.inner.estimate_text_size(text, style)));
        match result {
            Ok(Err(DrawingErrorKind::FontError(_))) | Err(_) => Ok(fallback_text_size(text, style.size())),
            Ok(other) => other,
        }
    }
}

impl<DB> TextTolerantBackend<DB> {
    fn warn_once(&mut self, reason: &str) {
        if !self.text_warned {
            warn!("Chart text skipped, no usable font: {}", reason);
            self.text_warned = true;
        }
    }
}

fn fallback_text_size(text: &str, font_size: f64) -> (u32, u32) {
    let width = text.chars().count() as f64 * font_size * FALLBACK_GLYPH_WIDTH;
    (width.ceil() as u32, font_size.ceil() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_text_size_scales_with_length() {
        assert_eq!(fallback_text_size("", 10.0), (0, 10));
        assert_eq!(fallback_text_size("loss", 10.0), (24, 10));
        assert_eq!(fallback_text_size("lr", 15.0), (18, 15));
    }
}
