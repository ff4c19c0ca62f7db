//! Theme lookup by id.

use std::collections::BTreeMap;
use std::sync::Arc;

use brochure_core::{DataSnapshot, Element, PageTemplate};

use crate::classic::ClassicTheme;
use crate::error::{LayoutError, LayoutResult};
use crate::modern::ModernTheme;
use crate::theme::{generate, GenerateOptions, Theme};

/// Id of the theme used when none is specified.
pub const DEFAULT_THEME: &str = "classic";

/// Summary of a registered theme.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ThemeInfo {
    /// Theme id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
}

/// Registered themes, keyed by id.
#[derive(Clone, Default)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, Arc<dyn Theme>>,
}

impl std::fmt::Debug for ThemeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeRegistry")
            .field("themes", &self.themes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ThemeRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in themes.
    #[must_use]
    pub fn builtin() -> Self {
        let mut themes: BTreeMap<String, Arc<dyn Theme>> = BTreeMap::new();
        for theme in [
            Arc::new(ClassicTheme::new()) as Arc<dyn Theme>,
            Arc::new(ModernTheme::new()),
        ] {
            themes.insert(theme.id().to_string(), theme);
        }
        Self { themes }
    }

    /// Add a theme.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTheme` if the id is taken.
    pub fn register(&mut self, theme: Arc<dyn Theme>) -> LayoutResult<()> {
        let id = theme.id().to_string();
        if self.themes.contains_key(&id) {
            return Err(LayoutError::DuplicateTheme(id));
        }
        tracing::debug!(theme = %id, "Registered theme");
        self.themes.insert(id, theme);
        Ok(())
    }

    /// Look up a theme.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTheme` if no theme has this id.
    pub fn get(&self, id: &str) -> LayoutResult<&dyn Theme> {
        self.themes
            .get(id)
            .map(AsRef::as_ref)
            .ok_or_else(|| LayoutError::UnknownTheme(id.to_string()))
    }

    /// Whether a theme id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.themes.contains_key(id)
    }

    /// Registered ids in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.themes.keys().map(String::as_str).collect()
    }

    /// Summaries of all registered themes.
    #[must_use]
    pub fn list(&self) -> Vec<ThemeInfo> {
        self.themes
            .values()
            .map(|t| ThemeInfo {
                id: t.id().to_string(),
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Generate a page with the theme named `theme_id`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTheme` if no theme has this id.
    pub fn generate(
        &self,
        theme_id: &str,
        template: PageTemplate,
        snapshot: &DataSnapshot,
        options: &GenerateOptions,
    ) -> LayoutResult<Vec<Element>> {
        let theme = self.get(theme_id)?;
        Ok(generate(template, snapshot, theme, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_themes() {
        let registry = ThemeRegistry::builtin();
        assert_eq!(registry.ids(), ["classic", "modern"]);
        assert!(registry.contains(DEFAULT_THEME));
        assert_eq!(registry.get("modern").map(|t| t.name()).ok(), Some("Modern"));
    }

    #[test]
    fn test_unknown_and_duplicate() {
        let mut registry = ThemeRegistry::builtin();
        assert!(matches!(
            registry.get("retro"),
            Err(LayoutError::UnknownTheme(id)) if id == "retro"
        ));
        assert!(matches!(
            registry.register(Arc::new(ClassicTheme::new())),
            Err(LayoutError::DuplicateTheme(_))
        ));
    }
}
