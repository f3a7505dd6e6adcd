//! Color palettes for the dark and light appearance
//!
//! # Usage
//!
//! ```rust
//! use app_state::ThemeMode;
//! use app_ui::theme::palette_for;
//!
//! let palette = palette_for(ThemeMode::Dark);
//! assert_eq!(palette.background, "#0D1B2A");
//! ```

use app_state::ThemeMode;
use serde::{Deserialize, Serialize};

// =============================================================================
// Color Types
// =============================================================================

/// A color as a hex string (`"#0D1B2A"`) or a CSS `rgba(...)` value
pub type Color = String;

/// Parse a hex color string to RGB components
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() < 6 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}

/// `rgba(r, g, b, alpha)` of a hex color
pub fn with_alpha(hex: &str, alpha: f32) -> Option<Color> {
    let (r, g, b) = parse_hex_color(hex)?;
    Some(format!("rgba({r}, {g}, {b}, {alpha})"))
}

// =============================================================================
// Brand Colors
// =============================================================================

/// Okul Koçu brand colors
pub mod brand {
    /// Dark navy, the dark background
    pub const DARK_BLUE: &str = "#0D1B2A";

    /// Yellow, the dark accent and text color
    pub const YELLOW: &str = "#FFD60A";

    /// Pale blue of the light appearance
    pub const LIGHT_BLUE: &str = "#E8F4FD";

    /// Darker yellow, the light accent
    pub const DARK_YELLOW: &str = "#E6C200";

    /// White
    pub const WHITE: &str = "#FFFFFF";

    /// Light background grey
    pub const LIGHT_GREY: &str = "#F5F5F5";
}

// =============================================================================
// Theme Palette
// =============================================================================

/// Semantic colors of one appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePalette {
    /// Appearance this palette belongs to
    pub mode: ThemeMode,
    /// Header and primary surfaces
    pub primary: Color,
    /// Buttons and highlights
    pub accent: Color,
    /// Screen background
    pub background: Color,
    /// Body text
    pub text: Color,
    /// Card fill
    pub card: Color,
    /// Card and divider borders
    pub border: Color,
    /// Input field fill
    pub input: Color,
    /// Input field text
    pub input_text: Color,
}

impl ThemePalette {
    /// Dark appearance: navy background, yellow text
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            primary: brand::DARK_BLUE.into(),
            accent: brand::YELLOW.into(),
            background: brand::DARK_BLUE.into(),
            text: brand::YELLOW.into(),
            card: "rgba(255, 214, 10, 0.1)".into(),
            border: "rgba(255, 214, 10, 0.2)".into(),
            input: brand::WHITE.into(),
            input_text: brand::DARK_BLUE.into(),
        }
    }

    /// Light appearance: grey background, navy text
    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            primary: brand::WHITE.into(),
            accent: brand::DARK_YELLOW.into(),
            background: brand::LIGHT_GREY.into(),
            text: brand::DARK_BLUE.into(),
            card: "rgba(13, 27, 42, 0.05)".into(),
            border: "rgba(13, 27, 42, 0.1)".into(),
            input: brand::WHITE.into(),
            input_text: brand::DARK_BLUE.into(),
        }
    }

    /// Whether this is the dark palette
    pub fn is_dark(&self) -> bool {
        self.mode.is_dark()
    }
}

/// Palette for a theme mode
pub fn palette_for(mode: ThemeMode) -> ThemePalette {
    match mode {
        ThemeMode::Dark => ThemePalette::dark(),
        ThemeMode::Light => ThemePalette::light(),
    }
}
