//! Terminal display configuration, loaded from `pacer.toml` in the platform
//! config directory. This covers only how the instance draws itself (glyphs
//! and the light/dark chrome palettes); everything the user configures at
//! runtime lives in the session and travels with the configuration document.

use crate::session::Theme;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use ratatui::style::Color;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub icons: Icons,
    pub light: Palette,
    #[serde(default = "default_dark")]
    pub dark: Palette,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            icons: Icons::default(),
            light: Palette::default(),
            dark: default_dark(),
        }
    }
}

impl DisplayConfig {
    pub fn palette(&self, theme: Theme) -> &Palette {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Palette {
    #[serde(deserialize_with = "hex_to_color")]
    pub background: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub foreground: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub muted: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub panel: Color,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Icons {
    pub play: String,
    pub pause: String,
    pub stop: String,
    pub select: String,
    pub swatch: String,
    pub current: String,
    pub input_cursor: String,
    pub header_left: String,
    pub header_right: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::Rgb(248, 250, 252),
            foreground: Color::Rgb(15, 23, 42),
            muted: Color::Rgb(148, 163, 184),
            panel: Color::Rgb(226, 232, 240),
        }
    }
}

fn default_dark() -> Palette {
    Palette {
        background: Color::Rgb(2, 6, 23),
        foreground: Color::Rgb(226, 232, 240),
        muted: Color::Rgb(100, 116, 139),
        panel: Color::Rgb(30, 41, 59),
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            play: "▶".to_string(),
            pause: "⏸".to_string(),
            stop: "■".to_string(),
            select: "▸".to_string(),
            swatch: "●".to_string(),
            current: "◆".to_string(),
            input_cursor: "▊".to_string(),
            header_left: "⟪ ".to_string(),
            header_right: " ⟫".to_string(),
        }
    }
}

/// `#rrggbb` to a terminal color. Session colors (phase colors, primary,
/// accent) go through here at draw time; anything unparseable renders muted
/// instead of failing.
pub fn parse_hex(s: &str) -> Option<Color> {
    if !s.is_ascii() || !s.starts_with('#') || s.len() != 7 {
        return None;
    }
    let r = u8::from_str_radix(&s[1..3], 16).ok()?;
    let g = u8::from_str_radix(&s[3..5], 16).ok()?;
    let b = u8::from_str_radix(&s[5..7], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn hex_to_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    parse_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid hex color format"))
}

pub fn load_config() -> Result<DisplayConfig> {
    match ProjectDirs::from("com", "pacer", "pacer") {
        Some(proj_dirs) => {
            let path = proj_dirs.config_dir().join("pacer.toml");
            if path.exists() {
                let config_str = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file at {:?}", path))?;
                toml::from_str(&config_str)
                    .with_context(|| format!("Failed to parse config file at {:?}", path))
            } else {
                Ok(DisplayConfig::default())
            }
        }
        None => Ok(DisplayConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex("#f59e0b"), Some(Color::Rgb(0xf5, 0x9e, 0x0b)));
        assert_eq!(parse_hex("f59e0b"), None);
        assert_eq!(parse_hex("#f59e0"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn rejects_multibyte_input_without_panicking() {
        // 7 bytes but not 7 ASCII chars; byte-slicing this would split 'é'
        assert_eq!(parse_hex("#aéxyz"), None);
        assert_eq!(parse_hex("désert"), None);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config: DisplayConfig =
            toml::from_str("[icons]\nplay = \">\"\n\n[dark]\nbackground = \"#000000\"\n").unwrap();
        assert_eq!(config.icons.play, ">");
        assert_eq!(config.dark.background, Color::Rgb(0, 0, 0));
        assert_eq!(config.icons.pause, Icons::default().pause);
        assert_eq!(config.light, Palette::default());
    }
}
