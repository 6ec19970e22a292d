use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

use crate::canvas::Canvas;

/// Pixel width of `s` in `font`, straight from the backend's metrics for
/// that exact string.
pub(crate) fn text_width(font: &'static MonoFont<'static>, s: &str) -> i32 {
    let style = MonoTextStyle::new(font, BinaryColor::On);
    Text::with_baseline(s, Point::zero(), style, Baseline::Top)
        .bounding_box()
        .size
        .width as i32
}

/// Draw with the top-left corner at (x, y).
pub(crate) fn draw_text(
    canvas: &mut Canvas,
    s: &str,
    x: i32,
    y: i32,
    font: &'static MonoFont<'static>,
) {
    let style = MonoTextStyle::new(font, BinaryColor::On);
    canvas.draw(&Text::with_baseline(s, Point::new(x, y), style, Baseline::Top));
}

/// Draw centered on `center_x`: start = center − width / 2.
pub(crate) fn draw_text_centered(
    canvas: &mut Canvas,
    s: &str,
    center_x: i32,
    y: i32,
    font: &'static MonoFont<'static>,
) {
    let x = center_x - text_width(font, s) / 2;
    draw_text(canvas, s, x, y, font);
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mono_font::ascii::FONT_6X10;

    #[test]
    fn width_scales_with_string_length() {
        let one = text_width(&FONT_6X10, "A");
        let five = text_width(&FONT_6X10, "AAAAA");
        assert_eq!(five, one * 5);
    }

    #[test]
    fn centered_text_is_symmetric_around_the_anchor() {
        let mut canvas = Canvas::new();
        draw_text_centered(&mut canvas, "HI", 400, 100, &FONT_6X10);

        let width = text_width(&FONT_6X10, "HI");
        let start = 400 - width / 2;
        let mut leftmost = None;
        let mut rightmost = None;
        for x in 0..800 {
            for y in 95..115 {
                if canvas.is_ink(x, y) {
                    leftmost.get_or_insert(x);
                    rightmost = Some(x);
                }
            }
        }
        assert!(leftmost.unwrap() >= start);
        assert!(rightmost.unwrap() < start + width);
    }
}
