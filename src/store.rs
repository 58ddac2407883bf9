//! Best-effort key-value persistence for theme, language and favorites.
//!
//! Each key is one file in the store directory. Nothing here returns an
//! error: failed reads fall back to defaults and failed writes are logged,
//! leaving the in-memory value authoritative for the rest of the session.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::preferences::Language;
use crate::recipe::Recipe;

pub const THEME_KEY: &str = "theme";
pub const LANGUAGE_KEY: &str = "language";
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Terminal preference from `COLORFGBG`, light when unknown.
    pub fn system_default() -> Self {
        match std::env::var("COLORFGBG").ok().and_then(|v| colorfgbg_is_dark(&v)) {
            Some(true) => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); ANSI backgrounds 0-6
/// and 8 are dark.
fn colorfgbg_is_dark(value: &str) -> Option<bool> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(background, 0..=6 | 8))
}

#[derive(Debug, Clone)]
pub struct LocalPreferenceStore {
    root: Option<PathBuf>,
}

impl LocalPreferenceStore {
    /// Uses `root` when it exists or can be created, otherwise memory only.
    pub fn open(root: Option<PathBuf>) -> Self {
        let root = root.and_then(|dir| match fs::create_dir_all(&dir) {
            Ok(()) => Some(dir),
            Err(err) => {
                warn!("Local storage unavailable at {:?}: {}", dir, err);
                None
            }
        });
        Self { root }
    }

    pub fn memory_only() -> Self {
        Self { root: None }
    }

    pub fn is_persistent(&self) -> bool {
        self.root.is_some()
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let file_name = if key == FAVORITES_KEY {
            format!("{}.json", key)
        } else {
            key.to_string()
        };
        self.root.as_ref().map(|root| root.join(file_name))
    }

    pub fn read_raw(&self, key: &str) -> Option<String> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("Local storage read of '{}' failed: {}", key, err);
                None
            }
        }
    }

    /// Returns whether the value reached storage.
    pub fn write_raw(&self, key: &str, value: &str) -> bool {
        let Some(path) = self.path_for(key) else {
            debug!("No local storage; '{}' kept in memory only", key);
            return false;
        };
        match fs::write(&path, value) {
            Ok(()) => true,
            Err(err) => {
                warn!("Local storage write of '{}' failed: {}", key, err);
                false
            }
        }
    }

    pub fn load_theme(&self) -> Theme {
        self.read_raw(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(Theme::system_default)
    }

    pub fn save_theme(&self, theme: Theme) -> bool {
        self.write_raw(THEME_KEY, theme.as_str())
    }

    pub fn load_language(&self) -> Language {
        self.read_raw(LANGUAGE_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn save_language(&self, language: Language) -> bool {
        self.write_raw(LANGUAGE_KEY, language.code())
    }

    pub fn load_favorites(&self) -> Vec<Recipe> {
        let Some(raw) = self.read_raw(FAVORITES_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("Stored favorites are unreadable, starting empty: {}", err);
            Vec::new()
        })
    }

    pub fn save_favorites(&self, favorites: &[Recipe]) -> bool {
        match serde_json::to_string(favorites) {
            Ok(json) => self.write_raw(FAVORITES_KEY, &json),
            Err(err) => {
                warn!("Could not serialize favorites: {}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::tests::recipe_json;
    use tempfile::tempdir;

    fn recipe(id: &str) -> Recipe {
        serde_json::from_value(recipe_json(id, id)).unwrap()
    }

    #[test]
    fn defaults_when_nothing_stored() {
        let dir = tempdir().unwrap();
        let store = LocalPreferenceStore::open(Some(dir.path().to_path_buf()));
        assert!(store.is_persistent());
        assert_eq!(store.load_language(), Language::En);
        assert_eq!(store.load_theme(), Theme::system_default());
        assert!(store.load_favorites().is_empty());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let store = LocalPreferenceStore::open(Some(dir.path().to_path_buf()));
        assert!(store.save_theme(Theme::Dark));
        assert!(store.save_language(Language::Fr));
        assert!(store.save_favorites(&[recipe("a"), recipe("b")]));

        let reopened = LocalPreferenceStore::open(Some(dir.path().to_path_buf()));
        assert_eq!(reopened.load_theme(), Theme::Dark);
        assert_eq!(reopened.load_language(), Language::Fr);
        let favorites = reopened.load_favorites();
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[1], recipe("b"));
        assert!(dir.path().join("favorites.json").exists());
        assert_eq!(fs::read_to_string(dir.path().join("theme")).unwrap(), "dark");
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("language"), "klingon").unwrap();
        fs::write(dir.path().join("theme"), "neon").unwrap();
        fs::write(dir.path().join("favorites.json"), "{not json").unwrap();

        let store = LocalPreferenceStore::open(Some(dir.path().to_path_buf()));
        assert_eq!(store.load_language(), Language::En);
        assert_eq!(store.load_theme(), Theme::system_default());
        assert!(store.load_favorites().is_empty());
    }

    #[test]
    fn memory_only_store_never_fails() {
        let store = LocalPreferenceStore::memory_only();
        assert!(!store.save_theme(Theme::Dark));
        assert!(!store.save_favorites(&[recipe("a")]));
        assert!(store.load_favorites().is_empty());
    }

    #[test]
    fn unusable_directory_degrades_to_memory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, "x").unwrap();
        let store = LocalPreferenceStore::open(Some(file));
        assert!(!store.is_persistent());
        assert!(!store.save_language(Language::Fr));
    }

    #[test]
    fn colorfgbg_parsing() {
        assert_eq!(colorfgbg_is_dark("15;0"), Some(true));
        assert_eq!(colorfgbg_is_dark("0;15"), Some(false));
        assert_eq!(colorfgbg_is_dark("15;default;8"), Some(true));
        assert_eq!(colorfgbg_is_dark("garbage"), None);
    }

    #[test]
    fn theme_parses_and_toggles() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
