use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb`, `rrggbb` or one of the matplotlib single-letter and
    /// basic color names (`k`, `r`, `b`, `black`, `red`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        let named = match s.trim().to_ascii_lowercase().as_str() {
            "k" | "black" => Some(Self::BLACK),
            "w" | "white" => Some(Self::WHITE),
            "r" | "red" => Some(Self::RED),
            "b" | "blue" => Some(Self::BLUE),
            "g" | "green" => Some(Self::rgb(0, 128, 0)),
            "gray" | "grey" => Some(Self::rgb(128, 128, 128)),
            _ => None,
        };
        if named.is_some() {
            return named;
        }
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub const fn with_alpha(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    pub fn to_svg_fill(&self) -> String {
        if (self.a - 1.0).abs() < 1e-6 {
            self.to_hex()
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation between two colors (for colormaps).
    pub fn lerp(a: Color, b: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f64 * (1.0 - t) + y as f64 * t).round() as u8;
        Color { r: mix(a.r, b.r), g: mix(a.g, b.g), b: mix(a.b, b.b), a: a.a * (1.0 - t) + b.a * t }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_fill())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s:?}")))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// --- Palettes ---

/// ROOT's first line colors: kBlack, kRed, kBlue, kGreen+2, kMagenta, kOrange+7.
pub const ROOT_LINES: &[&str] = &["#000000", "#ff0000", "#0000ff", "#00cc00", "#ff00ff", "#ff6600"];

/// matplotlib's "tab10" cycle.
pub const TABLEAU10: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub fn palette_colors(name: &str) -> Vec<Color> {
    let strs = match name {
        "tableau10" => TABLEAU10,
        _ => ROOT_LINES,
    };
    strs.iter().filter_map(|s| Color::parse(s)).collect()
}

// --- Sequential colormaps for 2-D histograms ---

const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

/// ROOT's kBird palette.
const BIRD: [(u8, u8, u8); 9] = [
    (53, 42, 135),
    (15, 92, 221),
    (20, 129, 214),
    (6, 164, 202),
    (46, 183, 164),
    (135, 191, 119),
    (209, 187, 89),
    (254, 200, 50),
    (249, 251, 14),
];

/// Named sequential colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Viridis,
    Bird,
}

impl Colormap {
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "bird" | "kbird" => Self::Bird,
            _ => Self::Viridis,
        }
    }

    /// Color at `t` in `[0, 1]`.
    pub fn at(self, t: f64) -> Color {
        let stops = match self {
            Self::Viridis => &VIRIDIS,
            Self::Bird => &BIRD,
        };
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (stops.len() - 1) as f64;
        let i = (pos.floor() as usize).min(stops.len() - 2);
        let (a, b) = (stops[i], stops[i + 1]);
        Color::lerp(Color::rgb(a.0, a.1, a.2), Color::rgb(b.0, b.1, b.2), pos - i as f64)
    }
}
