//! Persisted display preferences
//!
//! A single dark-mode flag, stored as JSON next to the session file. A
//! missing or unreadable file means light mode.

use crate::error::Result;
use colored::{Color, ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PREFERENCES_FILE: &str = "preferences.json";

/// User display preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,
}

impl Preferences {
    /// Default location of the preferences file
    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::auth::store::data_dir()?.join(PREFERENCES_FILE))
    }

    /// Read preferences from `path`
    ///
    /// Never fails: a missing file yields the defaults and a corrupt one is
    /// logged and ignored.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Write preferences to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!("Saved preferences to {}", path.display());
        Ok(())
    }

    /// Flip the dark-mode flag and return the new value
    pub fn toggle(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    pub fn theme_name(&self) -> &'static str {
        if self.dark_mode {
            "dark"
        } else {
            "light"
        }
    }

    pub fn palette(&self) -> Palette {
        if self.dark_mode {
            Palette::DARK
        } else {
            Palette::LIGHT
        }
    }
}

/// Terminal colors for transcript rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub user: Color,
    pub assistant: Color,
    pub context: Color,
    pub error: Color,
    pub heading: Color,
}

impl Palette {
    pub const LIGHT: Self = Self {
        user: Color::Blue,
        assistant: Color::Black,
        context: Color::Magenta,
        error: Color::Red,
        heading: Color::Blue,
    };

    pub const DARK: Self = Self {
        user: Color::BrightCyan,
        assistant: Color::BrightWhite,
        context: Color::BrightBlue,
        error: Color::BrightRed,
        heading: Color::BrightMagenta,
    };

    pub fn user(&self, text: &str) -> ColoredString {
        text.color(self.user)
    }

    pub fn assistant(&self, text: &str) -> ColoredString {
        text.color(self.assistant)
    }

    pub fn context(&self, text: &str) -> ColoredString {
        text.color(self.context).italic()
    }

    pub fn error(&self, text: &str) -> ColoredString {
        text.color(self.error)
    }

    pub fn heading(&self, text: &str) -> ColoredString {
        text.color(self.heading).bold()
    }
}
