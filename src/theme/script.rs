//! Pre-hydration color scheme marker.

use super::ColorScheme;
use std::fmt;

/// `localStorage` key holding the user's chosen scheme.
pub const COLOR_SCHEME_STORAGE_KEY: &str = "color-scheme-value";

/// Attribute set on `<html>` with the resolved scheme (`light` or `dark`).
pub const COLOR_SCHEME_ATTRIBUTE: &str = "data-color-scheme";

/// Inline `<script>` for the server-rendered `<head>`.
///
/// Runs before hydration: takes the stored scheme if valid, else the default,
/// resolves `auto` via `prefers-color-scheme`, then sets
/// [`COLOR_SCHEME_ATTRIBUTE`] on the document element so the first paint
/// already uses the right palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSchemeScript {
    default_scheme: ColorScheme,
}

impl ColorSchemeScript {
    #[must_use]
    pub fn new(default_scheme: ColorScheme) -> Self {
        Self { default_scheme }
    }

    #[must_use]
    pub fn default_scheme(&self) -> ColorScheme {
        self.default_scheme
    }

    /// Script body without the surrounding tag.
    #[must_use]
    pub fn source(&self) -> String {
        format!(
            r#"try{{var d="{default}";var s=window.localStorage.getItem("{key}");var c=(s==="light"||s==="dark"||s==="auto")?s:d;var r=c==="auto"?(window.matchMedia("(prefers-color-scheme: dark)").matches?"dark":"light"):c;document.documentElement.setAttribute("{attr}",r);}}catch(e){{}}"#,
            default = self.default_scheme,
            key = COLOR_SCHEME_STORAGE_KEY,
            attr = COLOR_SCHEME_ATTRIBUTE,
        )
    }
}

impl Default for ColorSchemeScript {
    fn default() -> Self {
        Self::new(ColorScheme::Auto)
    }
}

impl fmt::Display for ColorSchemeScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<script data-color-scheme-script>{}</script>", self.source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_defaults_to_auto() {
        let script = ColorSchemeScript::default().to_string();

        assert!(script.starts_with("<script data-color-scheme-script>"));
        assert!(script.ends_with("</script>"));
        assert!(script.contains(r#"var d="auto""#));
        assert!(script.contains("prefers-color-scheme: dark"));
        assert!(script.contains(r#"setAttribute("data-color-scheme",r)"#));
        assert!(script.contains(r#"getItem("color-scheme-value")"#));
    }

    #[test]
    fn test_script_embeds_fixed_default() {
        let script = ColorSchemeScript::new(ColorScheme::Light);
        assert_eq!(script.default_scheme(), ColorScheme::Light);
        assert!(script.source().contains(r#"var d="light""#));
    }
}
