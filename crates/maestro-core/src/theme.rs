//! Everforest theme for the Maestro terminal UI.
//!
//! Two variants, dark and light, switchable at runtime. Widgets never pick
//! colours themselves; they ask the theme for the style of an [`Element`].

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThemeVariant {
    #[default]
    EverforestDark,
    EverforestLight,
}

#[derive(Debug, Clone)]
struct Palette {
    background: Color,
    foreground: Color,
    accent: Color,
    error: Color,
    info: Color,
    border: Color,
    selection: Color,
    warning: Color,
}

/// UI element kinds that carry their own style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    /// Plain text
    Text,
    /// Page title and block titles
    Title,
    /// Unfocused borders
    Border,
    /// Selected picker entry
    Highlight,
    /// Focused button or field
    Active,
    /// Hints and placeholders
    Inactive,
    /// Answer text and status while working
    Info,
    /// Validation messages
    Warning,
    /// Failure banner
    Error,
    Background,
}

#[derive(Debug, Clone)]
pub struct Theme {
    variant: ThemeVariant,
    colors: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeVariant::default())
    }
}

impl Theme {
    pub fn new(variant: ThemeVariant) -> Self {
        let colors = match variant {
            ThemeVariant::EverforestDark => Palette {
                background: Color::Rgb(45, 53, 59),    // #2d353b
                foreground: Color::Rgb(211, 198, 170), // #d3c6aa
                accent: Color::Rgb(167, 192, 128),     // #a7c080
                error: Color::Rgb(230, 126, 128),      // #e67e80
                info: Color::Rgb(127, 187, 179),       // #7fbbb3
                border: Color::Rgb(116, 125, 135),     // #747d87
                selection: Color::Rgb(64, 72, 78),     // #40484e
                warning: Color::Rgb(219, 188, 127),    // #dbbc7f
            },
            ThemeVariant::EverforestLight => Palette {
                background: Color::Rgb(253, 246, 227), // #fdf6e3
                foreground: Color::Rgb(92, 106, 114),  // #5c6a72
                accent: Color::Rgb(141, 161, 1),       // #8da101
                error: Color::Rgb(248, 85, 82),        // #f85552
                info: Color::Rgb(53, 167, 124),        // #35a77c
                border: Color::Rgb(150, 160, 170),     // #96a0aa
                selection: Color::Rgb(243, 236, 217),  // #f3ecd9
                warning: Color::Rgb(207, 131, 44),     // #cf832c
            },
        };

        Self { variant, colors }
    }

    pub fn variant(&self) -> ThemeVariant {
        self.variant
    }

    /// Switch between the dark and light variants.
    pub fn toggle(&mut self) {
        let next = match self.variant {
            ThemeVariant::EverforestDark => ThemeVariant::EverforestLight,
            ThemeVariant::EverforestLight => ThemeVariant::EverforestDark,
        };
        *self = Self::new(next);
    }

    pub fn style(&self, element: Element) -> Style {
        let base = Style::default().bg(self.colors.background);
        match element {
            Element::Text | Element::Background => base.fg(self.colors.foreground),
            Element::Title => base.fg(self.colors.accent).add_modifier(Modifier::BOLD),
            Element::Border => base.fg(self.colors.border),
            Element::Highlight => Style::default()
                .fg(self.colors.foreground)
                .bg(self.colors.selection)
                .add_modifier(Modifier::BOLD),
            Element::Active => Style::default()
                .fg(self.colors.accent)
                .bg(self.colors.selection)
                .add_modifier(Modifier::BOLD),
            Element::Inactive => base.fg(self.colors.border),
            Element::Info => base.fg(self.colors.info),
            Element::Warning => base.fg(self.colors.warning),
            Element::Error => base.fg(self.colors.error).add_modifier(Modifier::BOLD),
        }
    }

    /// Border style for a block, accent-coloured when it has focus.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            self.style(Element::Title)
        } else {
            self.style(Element::Border)
        }
    }
}
