//! Color palettes for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Tier;
use crate::theme::Theme;

pub const DARK_GREEN: Color = Color::Rgb(0, 120, 0);
pub const GOLD: Color = Color::Rgb(255, 215, 0);
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);

/// Colors for one theme. Derived from the theme value on every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub focus: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub alert_bg: Color,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                bg: Color::Reset,
                fg: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                focus: GOLD,
                header_bg: DARK_PURPLE,
                header_fg: Color::White,
                highlight_bg: Color::Gray,
                highlight_fg: Color::Black,
                alert_bg: DARK_RED,
                high: Color::Red,
                medium: GOLD,
                low: Color::Green,
            },
            Theme::Light => Palette {
                bg: Color::Rgb(245, 245, 245),
                fg: Color::Rgb(20, 20, 20),
                muted: Color::Gray,
                accent: Color::Blue,
                focus: DARK_PURPLE,
                header_bg: Color::Rgb(200, 200, 220),
                header_fg: Color::Rgb(20, 20, 20),
                highlight_bg: DARK_PURPLE,
                highlight_fg: Color::White,
                alert_bg: Color::Rgb(255, 205, 205),
                high: Color::Red,
                medium: Color::Rgb(180, 140, 0),
                low: DARK_GREEN,
            },
        }
    }

    /// High is red, medium yellow, low green.
    pub fn tier(&self, tier: Tier) -> Color {
        match tier {
            Tier::High => self.high,
            Tier::Medium => self.medium,
            Tier::Low => self.low,
        }
    }
}
