//! Static visual configuration for the UI rendering layer.
//!
//! - [`Theme`]: immutable color, font and radius configuration
//! - [`ThemeProvider`]: a shared theme paired with its default color scheme
//! - [`ColorSchemeScript`]: pre-hydration marker that applies the color scheme
//!
//! # Example
//!
//! ```rust
//! use frontend_kit::theme::{ColorScheme, ThemeProvider};
//!
//! let provider = ThemeProvider::new();
//! assert_eq!(provider.default_color_scheme(), ColorScheme::Auto);
//! assert_eq!(provider.theme().default_radius_value(), "0.5rem");
//!
//! let head = provider.head_markup();
//! assert!(head.contains("--radius-md: 0.5rem;"));
//! ```

mod script;

pub use script::{COLOR_SCHEME_ATTRIBUTE, COLOR_SCHEME_STORAGE_KEY, ColorSchemeScript};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Number of shades in a color scale.
pub const SHADES: usize = 10;

const PRIMARY_SHADES: [&str; SHADES] = [
    "#e5f4ff", "#cde2ff", "#9bc2ff", "#64a0ff", "#3984fe", "#1d72fe", "#0969ff", "#0058e4",
    "#004ecc", "#0043b5",
];

const FONT_SANS: &str = r#"var(--font-sans, system-ui, -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif)"#;
const FONT_MONO: &str =
    r#"var(--font-mono, ui-monospace, SFMono-Regular, "SF Mono", Menlo, Consolas, monospace)"#;

/// Light/dark preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
    /// Follow `prefers-color-scheme`.
    #[default]
    Auto,
}

impl ColorScheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ten shades of one color, lightest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorScale([String; SHADES]);

impl ColorScale {
    #[must_use]
    pub fn new(shades: [&str; SHADES]) -> Self {
        Self(shades.map(str::to_string))
    }

    /// Shade at `index`, `None` past the last shade.
    #[must_use]
    pub fn shade(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Radius scale key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RadiusKey {
    Xs,
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

impl RadiusKey {
    pub const ALL: [Self; 5] = [Self::Xs, Self::Sm, Self::Md, Self::Lg, Self::Xl];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadiusScale {
    pub xs: String,
    pub sm: String,
    pub md: String,
    pub lg: String,
    pub xl: String,
}

impl RadiusScale {
    #[must_use]
    pub fn get(&self, key: RadiusKey) -> &str {
        match key {
            RadiusKey::Xs => &self.xs,
            RadiusKey::Sm => &self.sm,
            RadiusKey::Md => &self.md,
            RadiusKey::Lg => &self.lg,
            RadiusKey::Xl => &self.xl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Headings {
    pub font_family: String,
    pub font_weight: String,
}

/// Immutable theme object handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    primary_color: String,
    colors: BTreeMap<String, ColorScale>,
    font_family: String,
    font_family_monospace: String,
    headings: Headings,
    radius: RadiusScale,
    default_radius: RadiusKey,
    respect_reduced_motion: bool,
}

impl Theme {
    /// The application theme.
    #[must_use]
    pub fn app_default() -> Self {
        let mut colors = BTreeMap::new();
        colors.insert("primary".to_string(), ColorScale::new(PRIMARY_SHADES));

        Self {
            primary_color: "primary".to_string(),
            colors,
            font_family: FONT_SANS.to_string(),
            font_family_monospace: FONT_MONO.to_string(),
            headings: Headings {
                font_family: FONT_SANS.to_string(),
                font_weight: "600".to_string(),
            },
            radius: RadiusScale {
                xs: "0.25rem".to_string(),
                sm: "0.375rem".to_string(),
                md: "0.5rem".to_string(),
                lg: "0.75rem".to_string(),
                xl: "1rem".to_string(),
            },
            default_radius: RadiusKey::Md,
            respect_reduced_motion: true,
        }
    }

    #[must_use]
    pub fn primary_color(&self) -> &str {
        &self.primary_color
    }

    /// Scale registered under `name`.
    #[must_use]
    pub fn color(&self, name: &str) -> Option<&ColorScale> {
        self.colors.get(name)
    }

    /// Scale of the primary color.
    #[must_use]
    pub fn primary_scale(&self) -> Option<&ColorScale> {
        self.color(&self.primary_color)
    }

    #[must_use]
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    #[must_use]
    pub fn font_family_monospace(&self) -> &str {
        &self.font_family_monospace
    }

    #[must_use]
    pub fn headings(&self) -> &Headings {
        &self.headings
    }

    #[must_use]
    pub fn radius(&self) -> &RadiusScale {
        &self.radius
    }

    #[must_use]
    pub fn default_radius(&self) -> RadiusKey {
        self.default_radius
    }

    #[must_use]
    pub fn default_radius_value(&self) -> &str {
        self.radius.get(self.default_radius)
    }

    #[must_use]
    pub fn respect_reduced_motion(&self) -> bool {
        self.respect_reduced_motion
    }

    /// Theme object as JSON, keys in camelCase.
    pub fn to_json(&self) -> serde_json::Value {
        // Every field is a string, bool or map of strings.
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Render the theme as CSS custom properties on `:root`.
    #[must_use]
    pub fn css_variables(&self) -> String {
        let mut css = String::from(":root {\n");

        for (name, scale) in &self.colors {
            for (i, shade) in scale.iter().enumerate() {
                let _ = writeln!(css, "  --color-{name}-{i}: {shade};");
            }
        }
        let _ = writeln!(css, "  --font-family: {};", self.font_family);
        let _ = writeln!(css, "  --font-family-monospace: {};", self.font_family_monospace);
        let _ = writeln!(css, "  --font-family-headings: {};", self.headings.font_family);
        let _ = writeln!(css, "  --heading-font-weight: {};", self.headings.font_weight);
        for key in RadiusKey::ALL {
            let _ = writeln!(css, "  --radius-{}: {};", key.as_str(), self.radius.get(key));
        }
        let _ = writeln!(css, "  --radius-default: {};", self.default_radius_value());
        css.push_str("}\n");

        if self.respect_reduced_motion {
            css.push_str(
                "@media (prefers-reduced-motion: reduce) {\n  \
                 *, *::before, *::after { transition-duration: 0ms !important; animation-duration: 0ms !important; }\n}\n",
            );
        }

        css
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::app_default()
    }
}

/// Supplies the theme and color scheme to the rendering layer at mount time.
#[derive(Debug, Clone)]
pub struct ThemeProvider {
    theme: Arc<Theme>,
    default_color_scheme: ColorScheme,
}

impl ThemeProvider {
    /// Provider for the application theme with an `auto` color scheme.
    #[must_use]
    pub fn new() -> Self {
        Self::with_theme(Theme::app_default(), ColorScheme::Auto)
    }

    #[must_use]
    pub fn with_theme(theme: Theme, default_color_scheme: ColorScheme) -> Self {
        Self {
            theme: Arc::new(theme),
            default_color_scheme,
        }
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Shared handle to the theme.
    #[must_use]
    pub fn shared_theme(&self) -> Arc<Theme> {
        Arc::clone(&self.theme)
    }

    #[must_use]
    pub fn default_color_scheme(&self) -> ColorScheme {
        self.default_color_scheme
    }

    #[must_use]
    pub fn color_scheme_script(&self) -> ColorSchemeScript {
        ColorSchemeScript::new(self.default_color_scheme)
    }

    /// `<style>` with the theme variables followed by the color scheme script,
    /// for the server-rendered `<head>`.
    #[must_use]
    pub fn head_markup(&self) -> String {
        format!(
            "<style data-theme-variables>\n{}</style>\n{}",
            self.theme.css_variables(),
            self.color_scheme_script()
        )
    }
}

impl Default for ThemeProvider {
    fn default() -> Self {
        Self::new()
    }
}
