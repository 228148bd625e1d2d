//! Backend adapter that survives missing system fonts.
//!
//! `plotters`' bitmap text path needs a usable system font, and headless
//! environments often have none; the font machinery then errors or panics.
//! This adapter delegates everything to the wrapped backend and, when text
//! drawing fails, rasterizes the glyphs the chart actually needs for its
//! dates and percentages (digits, `-`, `%`, `.`) with a built-in 5x7 pixel
//! font. Characters outside that set advance the cursor and draw nothing.

use plotters_backend::{
    text_anchor::{HPos, VPos},
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};
use std::panic;

const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
const GLYPH_ADVANCE: i32 = GLYPH_WIDTH + 1;

/// Wraps a `DrawingBackend`, falling back to a pixel font when the inner
/// backend cannot draw text.
pub struct TextSafeBackend<DB> {
    inner: DB,
}

impl<DB> TextSafeBackend<DB> {
    pub fn new(inner: DB) -> Self {
        Self { inner }
    }
}

/// 5x7 bitmap rows, most significant of the low five bits leftmost.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '%' => [0x19, 0x19, 0x02, 0x04, 0x08, 0x13, 0x13],
        _ => return None,
    };
    Some(rows)
}

fn scale_for(size: f64) -> i32 {
    (size / 10.0).round().max(1.0) as i32
}

impl<DB: DrawingBackend> DrawingBackend for TextSafeBackend<DB> {
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

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
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

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
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

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        (iw, ih): (u32, u32),
        src: &[u8],
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let attempt = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.draw_text(text, style, pos)
        }));
        match attempt {
            Ok(Ok(())) => Ok(()),
            Ok(Err(DrawingErrorKind::FontError(_))) | Err(_) => {
                self.draw_text_fallback(text, style, pos)
            }
            Ok(Err(other)) => Err(other),
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        let attempt = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.estimate_text_size(text, style)
        }));
        match attempt {
            Ok(Ok(size)) => Ok(size),
            Ok(Err(DrawingErrorKind::FontError(_))) | Err(_) => Ok(fallback_size(text, style)),
            Ok(Err(other)) => Err(other),
        }
    }
}

fn fallback_size<TStyle: BackendTextStyle>(text: &str, style: &TStyle) -> (u32, u32) {
    let scale = scale_for(style.size());
    let width = text.chars().count() as i32 * GLYPH_ADVANCE * scale;
    ((width.max(0)) as u32, ((GLYPH_HEIGHT + 1) * scale) as u32)
}

impl<DB: DrawingBackend> TextSafeBackend<DB> {
    fn draw_text_fallback<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let color = style.color();
        if color.alpha == 0.0 || text.trim().is_empty() {
            return Ok(());
        }

        let scale = scale_for(style.size());
        let width = text.chars().count() as i32 * GLYPH_ADVANCE * scale;
        let height = GLYPH_HEIGHT * scale;

        let dx = match style.anchor().h_pos {
            HPos::Left => 0,
            HPos::Right => -width,
            HPos::Center => -width / 2,
        };
        let dy = match style.anchor().v_pos {
            VPos::Top => 0,
            VPos::Bottom => -height,
            VPos::Center => -height / 2,
        };

        let mut cursor_x = pos.0 + dx;
        let top_y = pos.1 + dy;
        for ch in text.chars() {
            if let Some(rows) = glyph(ch) {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..GLYPH_WIDTH {
                        let shift = (GLYPH_WIDTH - 1 - col) as u32;
                        if (u32::from(*bits) >> shift) & 1 == 1 {
                            self.fill_block(
                                cursor_x + col * scale,
                                top_y + row as i32 * scale,
                                scale,
                                &color,
                            )?;
                        }
                    }
                }
            }
            cursor_x += GLYPH_ADVANCE * scale;
        }
        Ok(())
    }

    fn fill_block(
        &mut self,
        x: i32,
        y: i32,
        scale: i32,
        color: &BackendColor,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        for dx in 0..scale {
            for dy in 0..scale {
                self.inner.draw_pixel((x + dx, y + dy), color.clone())?;
            }
        }
        Ok(())
    }
}
