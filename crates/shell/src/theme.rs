//! Dark mode and window themes.

use std::fmt;
use std::str::FromStr;

use common::{ShellError, ShellResult};

use crate::engine::{EngineView, PageScript};

/// Id of the `<style>` element carrying the dark-mode CSS.
pub const DARK_MODE_STYLE_ID: &str = "dark-mode-style";

/// CSS injected into pages while dark mode is on.
pub const DARK_MODE_CSS: &str = "html, body {
    background-color: #121212 !important;
    color: #e0e0e0 !important;
}
a { color: #bb86fc !important; }
header, footer, nav, section { background-color: #1e1e1e !important; }";

/// Color in RGB format.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Window background of the blue theme.
    pub const LIGHT_BLUE: Color = Color::rgb(0xe6, 0xf3, 0xff);

    /// Parse `#rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Theme selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Blue,
    Custom,
}

impl FromStr for Theme {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Theme::Default),
            "dark" => Ok(Theme::Dark),
            "blue" => Ok(Theme::Blue),
            "custom" => Ok(Theme::Custom),
            other => Err(ShellError::user_input(format!("unknown theme: {other}"))),
        }
    }
}

/// Owns the dark-mode flag and the window background.
///
/// Dark mode is one flag for the whole session, not per tab. Page CSS only
/// ever goes through a single style element per page, and the window
/// background is chrome state that page CSS never touches.
#[derive(Clone, Debug, Default)]
pub struct AppearanceManager {
    dark_mode: bool,
    theme: Theme,
    /// Last window theme picked, never `Theme::Dark`.
    window_theme: Theme,
    window_background: Option<Color>,
}

impl AppearanceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn window_background(&self) -> Option<Color> {
        self.window_background
    }

    /// The style script matching the current flag. Empty CSS when off.
    pub fn dark_mode_script(&self) -> PageScript {
        PageScript::UpsertStyle {
            element_id: DARK_MODE_STYLE_ID.to_string(),
            css: if self.dark_mode { DARK_MODE_CSS.to_string() } else { String::new() },
        }
    }

    /// Set the flag and apply it to `view`.
    pub fn set_dark_mode(&mut self, enabled: bool, view: &mut dyn EngineView) -> ShellResult<()> {
        self.dark_mode = enabled;
        if !enabled && self.theme == Theme::Dark {
            self.theme = self.window_theme;
        }
        tracing::info!(enabled, "dark mode");
        self.apply(view)
    }

    /// Flip the flag and apply it to `view`. Returns the new flag.
    pub fn toggle_dark_mode(&mut self, view: &mut dyn EngineView) -> ShellResult<bool> {
        let enabled = !self.dark_mode;
        self.set_dark_mode(enabled, view)?;
        Ok(enabled)
    }

    /// Write the current dark-mode CSS into the page.
    pub fn apply(&self, view: &mut dyn EngineView) -> ShellResult<()> {
        view.run_script(&self.dark_mode_script())
    }

    /// Select a theme. `color` is the picked color for [`Theme::Custom`].
    ///
    /// Returns false when nothing changed (custom color picker dismissed).
    pub fn set_theme(
        &mut self,
        theme: Theme,
        color: Option<&str>,
        view: &mut dyn EngineView,
    ) -> ShellResult<bool> {
        match theme {
            Theme::Default => self.window_background = None,
            Theme::Dark => {
                if self.toggle_dark_mode(view)? {
                    self.theme = Theme::Dark;
                }
                return Ok(true);
            }
            Theme::Blue => self.window_background = Some(Color::LIGHT_BLUE),
            Theme::Custom => {
                let Some(color) = color else {
                    return Ok(false);
                };
                let color = Color::from_hex(color.trim())
                    .ok_or_else(|| ShellError::user_input(format!("invalid color: {color}")))?;
                self.window_background = Some(color);
            }
        }

        self.theme = theme;
        self.window_theme = theme;
        Ok(true)
    }
}
