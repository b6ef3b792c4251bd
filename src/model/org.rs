use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A team owning tasks. The team color drives task bar colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl Team {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// A topic tasks can be grouped under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl Topic {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Parse a `#RRGGBB` hex color from the document. Anything malformed maps to
/// the neutral slate used for unassigned bars.
pub fn parse_hex_color(s: &str) -> Color32 {
    let fallback = Color32::from_rgb(0x94, 0xA3, 0xB8);
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return fallback;
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color32::from_rgb(r, g, b),
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#3B82F6"), Color32::from_rgb(0x3B, 0x82, 0xF6));
        assert_eq!(parse_hex_color("ec4899"), Color32::from_rgb(0xEC, 0x48, 0x99));
    }

    #[test]
    fn malformed_colors_fall_back() {
        let fallback = Color32::from_rgb(0x94, 0xA3, 0xB8);
        assert_eq!(parse_hex_color(""), fallback);
        assert_eq!(parse_hex_color("#12"), fallback);
        assert_eq!(parse_hex_color("#zzzzzz"), fallback);
    }
}
