//! Hex color parsing and tint helpers for render output.

/// Parse a "#RRGGBB" (or "RRGGBB") hex color.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}

/// Format RGB components as "#RRGGBB".
pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Blend a color toward white by `factor` in `[0, 1]`.
///
/// Unparseable colors are returned unchanged.
pub fn lighten(color: &str, factor: f32) -> String {
    let Some((r, g, b)) = parse_hex(color) else {
        return color.to_string();
    };
    let factor = factor.clamp(0.0, 1.0);
    let mix = |c: u8| c.saturating_add(((255.0 - f32::from(c)) * factor).round() as u8);
    to_hex(mix(r), mix(g), mix(b))
}

/// Blend a color toward black by `factor` in `[0, 1]`.
pub fn darken(color: &str, factor: f32) -> String {
    let Some((r, g, b)) = parse_hex(color) else {
        return color.to_string();
    };
    let factor = factor.clamp(0.0, 1.0);
    let mix = |c: u8| (f32::from(c) * (1.0 - factor)).round() as u8;
    to_hex(mix(r), mix(g), mix(b))
}
