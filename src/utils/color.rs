use eframe::egui::Color32;

use crate::compliance::Severity;
use crate::upload::StatusKind;

pub trait ColorExt {
    fn parse_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Color32::from_rgb(r, g, b))
    }
}

fn hex(value: &str) -> Color32 {
    Color32::parse_hex(value).unwrap_or(Color32::GRAY)
}

pub fn accent() -> Color32 {
    hex("#a855f7")
}

pub fn status_color(kind: StatusKind) -> Color32 {
    match kind {
        StatusKind::Pending => hex("#facc15"),
        StatusKind::Uploading => hex("#60a5fa"),
        StatusKind::Success => hex("#4ade80"),
        StatusKind::Error => hex("#f87171"),
    }
}

pub fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Critical => hex("#ef4444"),
        Severity::High => hex("#f97316"),
        Severity::Medium => hex("#eab308"),
        Severity::Low => hex("#22c55e"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_or_without_hash() {
        assert_eq!(Color32::parse_hex("#ff8000"), Some(Color32::from_rgb(255, 128, 0)));
        assert_eq!(Color32::parse_hex("00ff00"), Some(Color32::from_rgb(0, 255, 0)));
        assert_eq!(Color32::parse_hex("#fff"), None);
        assert_eq!(Color32::parse_hex("#gg0000"), None);
        assert_eq!(Color32::parse_hex("aé123"), None);
    }
}
