//! Plain-text views of dice statistics and roll history for terminals.

use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::{
    dice::DiceSpec,
    session::History,
    statistics::{distribution::Distribution, stats::Stats},
};

const BAR: char = '█';

pub fn percentage(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// One line per outcome, ascending. Bars are scaled so the most likely
/// outcome spans `width` cells.
pub fn histogram(distribution: &Distribution, width: usize) -> String {
    let highest = distribution.highest_probability();
    let label_width = distribution
        .outcomes()
        .map(|o| o.to_string().width())
        .max()
        .unwrap_or(0);

    let mut buf = String::new();
    for (outcome, probability) in distribution.iter() {
        let fraction = if highest > 0.0 {
            probability / highest
        } else {
            0.0
        };
        let bar: String = std::iter::repeat_n(BAR, (fraction * width as f64).round() as usize)
            .collect();
        let label = outcome.to_string();
        writeln!(
            buf,
            "{}{} │{} {}",
            " ".repeat(label_width.saturating_sub(label.width())),
            label,
            pad_cells(&bar, width),
            percentage(probability)
        )
        .ok();
    }
    buf
}

pub fn stats_summary(spec: &DiceSpec, stats: &Stats) -> String {
    format!(
        "{}: {} to {}, mean {:.2}, std dev {:.2}",
        spec,
        stats.lower_bound,
        stats.upper_bound,
        stats.mean(),
        stats.std_dev()
    )
}

/// Deterministic color for a label, so the same notation always shows up in
/// the same color.
pub fn label_color(label: &str) -> (u8, u8, u8) {
    use std::hash::{Hash, Hasher};
    let mut hasher = rustc_hash::FxHasher::default();
    label.hash(&mut hasher);
    let hash = hasher.finish();

    let hue = (hash % 360) as f64;
    let saturation = 0.5 + ((hash >> 16) % 40) as f64 / 100.0;
    let lightness = 0.45 + ((hash >> 32) % 20) as f64 / 100.0;
    hsl_to_rgb(hue, saturation, lightness)
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

fn colorize(text: &str, (r, g, b): (u8, u8, u8)) -> String {
    format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
}

/// `Dice | Result | Chance` table, newest roll first.
pub fn history_table(history: &History, color: bool) -> String {
    const HEADERS: [&str; 3] = ["Dice", "Result", "Chance"];

    let rows: Vec<[String; 3]> = history
        .iter()
        .map(|record| {
            [
                record.raw.clone(),
                record.outcome.to_string(),
                percentage(record.probability),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.width());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut buf = String::new();
    writeln!(
        buf,
        "{}  {}  {}",
        pad_cells(HEADERS[0], widths[0]),
        pad_cells(HEADERS[1], widths[1]),
        HEADERS[2]
    )
    .ok();
    for [dice, result, chance] in &rows {
        let dice_cell = pad_cells(dice, widths[0]);
        let dice_cell = if color {
            colorize(&dice_cell, label_color(dice))
        } else {
            dice_cell
        };
        writeln!(
            buf,
            "{}  {}  {}",
            dice_cell,
            pad_cells(result, widths[1]),
            chance
        )
        .ok();
    }
    buf
}

fn pad_cells(s: &str, field_cells: usize) -> String {
    let w = s.width();
    let pad = field_cells.saturating_sub(w);
    format!("{s}{}", " ".repeat(pad))
}
