use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Light/dark colour scheme for the TUI.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

/// Colours used by the TUI for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub accent: Color,
    pub done: Color,
    pub pending: Color,
    pub highlight: Color,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: Color::White,
                text: Color::Black,
                accent: Color::Blue,
                done: Color::Green,
                pending: Color::Magenta,
                highlight: Color::Gray,
            },
            Theme::Dark => Palette {
                background: Color::Black,
                text: Color::White,
                accent: Color::Cyan,
                done: Color::Green,
                pending: Color::Yellow,
                highlight: Color::DarkGray,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_is_identity() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
    }

    #[test]
    fn palettes_differ_between_themes() {
        assert_ne!(Theme::Light.palette(), Theme::Dark.palette());
    }
}
