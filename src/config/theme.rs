use crate::config::model::DEFAULT_THEME;
use crate::foundation::color::Color;
use crate::foundation::error::{StoryError, StoryResult};
use std::collections::BTreeMap;

/// One stop of a linear gradient.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    /// Position in `[0, 1]`.
    pub offset: f64,
    /// Stop color.
    pub color: Color,
}

/// Palette shared by every element of a video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Theme name.
    pub name: String,
    /// Flat fill behind everything.
    pub background: Color,
    /// Stops of the animated background gradient.
    pub gradient: Vec<GradientStop>,
    /// Base gradient angle in degrees.
    pub gradient_angle_deg: f64,
    /// Title text.
    pub text_primary: Color,
    /// Subtitle panel fill.
    pub subtitle_bg: Color,
    /// Subtitle text.
    pub subtitle_text: Color,
    /// Theme accent.
    pub accent: Color,
    /// Watermark text.
    pub watermark: Color,
    /// Name badge fill.
    pub name_badge_bg: Color,
    /// Name badge text.
    pub name_badge_text: Color,
}

/// Read-only theme lookup, built once per run.
#[derive(Clone, Debug)]
pub struct ThemeTable {
    themes: BTreeMap<String, Theme>,
    fallback: Theme,
}

impl ThemeTable {
    /// The four stock themes: `zkagi-brand`, `pawpad`, `dark`, `light`.
    pub fn builtin() -> StoryResult<Self> {
        let themes = [
            theme(
                "zkagi-brand",
                ["#0a0a1a", "#1a0a2e", "#0a1a2e"],
                [
                    "#0a0a1a",
                    "#FFFFFF",
                    "rgba(10,10,26,0.85)",
                    "#FFFFFF",
                    "#7C3AED",
                    "rgba(124,58,237,0.3)",
                    "rgba(124,58,237,0.2)",
                    "#A78BFA",
                ],
            )?,
            theme(
                "pawpad",
                ["#0f172a", "#1e1b4b", "#0c4a6e"],
                [
                    "#0f172a",
                    "#FFFFFF",
                    "rgba(15,23,42,0.85)",
                    "#FFFFFF",
                    "#06B6D4",
                    "rgba(6,182,212,0.3)",
                    "rgba(6,182,212,0.2)",
                    "#38BDF8",
                ],
            )?,
            theme(
                "dark",
                ["#111111", "#1a1a2e", "#1a1a2e"],
                [
                    "#111111",
                    "#FFFFFF",
                    "rgba(0,0,0,0.8)",
                    "#FFFFFF",
                    "#8B5CF6",
                    "rgba(139,92,246,0.2)",
                    "rgba(255,255,255,0.1)",
                    "#D1D5DB",
                ],
            )?,
            theme(
                "light",
                ["#FAFAFA", "#E0E7FF", "#E0E7FF"],
                [
                    "#FAFAFA",
                    "#111827",
                    "rgba(255,255,255,0.9)",
                    "#111827",
                    "#7C3AED",
                    "rgba(124,58,237,0.15)",
                    "rgba(124,58,237,0.1)",
                    "#7C3AED",
                ],
            )?,
        ];
        let fallback = themes[0].clone();
        Ok(Self {
            themes: themes.into_iter().map(|t| (t.name.clone(), t)).collect(),
            fallback,
        })
    }

    /// Register or replace a theme. Replacing `zkagi-brand` also replaces the fallback.
    pub fn insert(&mut self, theme: Theme) {
        if theme.name == DEFAULT_THEME {
            self.fallback = theme.clone();
        }
        self.themes.insert(theme.name.clone(), theme);
    }

    /// Look up `name`, falling back to `zkagi-brand` when unknown.
    ///
    /// The boolean is `true` when the fallback was used.
    pub fn resolve(&self, name: &str) -> (&Theme, bool) {
        match self.themes.get(name) {
            Some(t) => (t, false),
            None => (&self.fallback, true),
        }
    }

    /// Look up `name` with fallback.
    pub fn get(&self, name: &str) -> &Theme {
        self.resolve(name).0
    }

    /// Names of every registered theme.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }
}

fn theme(name: &str, gradient: [&str; 3], colors: [&str; 8]) -> StoryResult<Theme> {
    let parse = |s: &str| {
        Color::parse(s).map_err(|e| StoryError::configuration(format!("theme '{name}': {e}")))
    };
    let [
        background,
        text_primary,
        subtitle_bg,
        subtitle_text,
        accent,
        watermark,
        badge_bg,
        badge_text,
    ] = colors;
    Ok(Theme {
        name: name.to_owned(),
        background: parse(background)?,
        gradient: vec![
            GradientStop {
                offset: 0.0,
                color: parse(gradient[0])?,
            },
            GradientStop {
                offset: 0.5,
                color: parse(gradient[1])?,
            },
            GradientStop {
                offset: 1.0,
                color: parse(gradient[2])?,
            },
        ],
        gradient_angle_deg: 135.0,
        text_primary: parse(text_primary)?,
        subtitle_bg: parse(subtitle_bg)?,
        subtitle_text: parse(subtitle_text)?,
        accent: parse(accent)?,
        watermark: parse(watermark)?,
        name_badge_bg: parse(badge_bg)?,
        name_badge_text: parse(badge_text)?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/config/theme.rs"]
mod tests;
