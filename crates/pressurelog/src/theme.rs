//! Light/dark theme preference.
//!
//! The preference lives in local storage under [`THEME_KEY`] as the raw
//! string `light` or `dark`.

use std::fmt;

use crossterm::style::Color;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::render::Category;
use crate::storage::LocalStorage;

/// Storage key of the theme preference.
pub const THEME_KEY: &str = "theme";

/// The two display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light mode.
    #[default]
    Light,
    /// Dark mode.
    Dark,
}

impl Theme {
    /// Read a stored value. Anything other than `dark` is light.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// The value written to storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Toggle icon: a moon while light (dark is available), a sun while dark.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "🌙",
            Self::Dark => "☀️",
        }
    }

    /// Colors used when this theme is applied.
    #[must_use]
    pub fn palette(self) -> Palette {
        match self {
            Self::Light => Palette {
                high: Color::DarkRed,
                elevated: Color::DarkYellow,
                normal: Color::DarkGreen,
                muted: Color::DarkGrey,
                accent: Color::DarkBlue,
            },
            Self::Dark => Palette {
                high: Color::Red,
                elevated: Color::Yellow,
                normal: Color::Green,
                muted: Color::Grey,
                accent: Color::Cyan,
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Cards in the high category.
    pub high: Color,
    /// Cards in the elevated category.
    pub elevated: Color,
    /// Cards in the normal category.
    pub normal: Color,
    /// Secondary text.
    pub muted: Color,
    /// Headings and focus markers.
    pub accent: Color,
}

impl Palette {
    /// Color for a card category.
    #[must_use]
    pub fn category(&self, category: Category) -> Color {
        match category {
            Category::High => self.high,
            Category::Elevated => self.elevated,
            Category::Normal => self.normal,
        }
    }
}

/// Tracks the applied theme and persists changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeController {
    applied: Theme,
}

impl ThemeController {
    /// Load and apply the stored preference, defaulting to light.
    #[must_use]
    pub fn load(storage: &LocalStorage) -> Self {
        let applied = match storage.get_item(THEME_KEY) {
            Ok(Some(value)) => Theme::from_stored(&value),
            Ok(None) => Theme::Light,
            Err(e) => {
                warn!("Ignoring stored theme: {}", e);
                Theme::Light
            }
        };
        debug!("Applied {} theme", applied);
        Self { applied }
    }

    /// The applied theme.
    #[must_use]
    pub fn current(&self) -> Theme {
        self.applied
    }

    /// Icon of the toggle control.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        self.applied.icon()
    }

    /// Palette of the applied theme.
    #[must_use]
    pub fn palette(&self) -> Palette {
        self.applied.palette()
    }

    /// Flip the applied theme and persist the new preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be written.
    pub fn toggle(&mut self, storage: &LocalStorage) -> Result<Theme> {
        let next = self.applied.toggled();
        storage.set_item(THEME_KEY, next.as_str())?;
        debug!("Switched theme {} -> {}", self.applied, next);
        self.applied = next;
        Ok(next)
    }
}
