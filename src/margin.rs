// src/margin.rs - Margin width auto-sizing

use crate::engine::{TextEngine, TextStyle};

pub const ICON_MARGIN_WIDTH: u32 = 16;
pub const FOLD_MARGIN_WIDTH: u32 = 16;

/// Digits needed to render the largest line number in the document.
pub fn line_number_digits(line_count: usize) -> u32 {
    line_count.max(1).ilog10() + 1
}

/// Width of the line-number margin: one padding cell plus a `'9'` per digit,
/// measured in the line-number style. Wide enough for every line number the
/// document can currently produce.
pub fn line_margin_width<E: TextEngine + ?Sized>(engine: &E) -> u32 {
    let digits = line_number_digits(engine.line_count()) as usize;
    let probe = format!("_{}", "9".repeat(digits));
    engine.measure_text(TextStyle::LineNumber, &probe)
}
