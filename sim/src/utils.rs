use anstyle::{AnsiColor, Color, Style};

use crate::framework::Scalar;

const fn fg(c: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(c)))
}

pub const GRN: Style = fg(AnsiColor::Green);
pub const GRNB: Style = fg(AnsiColor::Green).bold();
pub const YLW: Style = fg(AnsiColor::Yellow);
pub const GRAY: Style = fg(AnsiColor::BrightBlack);
pub const BOLD: Style = Style::new().bold();

/// Parse a numeric literal of a stimulus file or the command line. Accepts
/// decimal and `0x` hex, both optionally negative.
pub fn parse_literal(s: &str) -> Option<Scalar> {
    if let Ok(r) = s.parse() {
        return Some(r);
    }
    let (neg, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let hex = digits.strip_prefix("0x")?;
    // full 32-bit patterns such as 0xffffffff are accepted
    let v = u32::from_str_radix(hex, 16).ok()? as Scalar;
    Some(if neg { v.wrapping_neg() } else { v })
}

/// Parse a comma separated list of literals, e.g. `1,2,3`.
pub fn parse_list(s: &str) -> Option<Vec<Scalar>> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(parse_literal)
        .collect()
}
