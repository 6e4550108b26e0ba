use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::modules::navigation::Location;
use crate::modules::shortcuts::Action;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SearchEngine {
    GeminiSpace,
    Kennedy,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::GeminiSpace
    }
}

impl SearchEngine {
    pub fn query_url(&self, query: &str) -> String {
        let q = urlencoding::encode(query);
        match self {
            Self::GeminiSpace => format!("gemini://geminispace.info/search?{}", q),
            Self::Kennedy => format!("gemini://kennedy.gemi.dev/search?{}", q),
        }
    }
}

/// Ordered list of bookmarked locations as the user entered them.
///
/// Entries are kept as raw strings so a hand-edited settings file with a
/// broken entry still loads; validity is checked on lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Favourites {
    entries: Vec<String>,
}

impl Favourites {
    /// Location stored at `row`, or `None` if the row is missing or invalid.
    pub fn get(&self, row: usize) -> Option<Location> {
        let raw = self.entries.get(row)?;
        match Location::parse(raw) {
            Ok(location) => Some(location),
            Err(e) => {
                log::debug!("[Favourites] Row {} is not a valid location: {}", row, e);
                None
            }
        }
    }

    /// Appends `location` unless it is already present.
    pub fn add(&mut self, location: &Location) -> bool {
        if self.contains(location) {
            return false;
        }
        self.entries.push(location.to_string());
        true
    }

    pub fn remove(&mut self, row: usize) -> Option<String> {
        (row < self.entries.len()).then(|| self.entries.remove(row))
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.entries.iter().any(|e| e == location.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl FromIterator<String> for Favourites {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// Page presentation preferences, kept with the rest of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentStyle {
    pub theme: Theme,
    pub text_font: String,
    pub preformatted_font: String,
    pub font_size: u16,
    pub margin: u16,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            text_font: "sans-serif".to_string(),
            preformatted_font: "monospace".to_string(),
            font_size: 12,
            margin: 55,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub search_engine: SearchEngine,
    pub favourites: Favourites,
    pub style: DocumentStyle,
    /// Key sequence overrides applied on top of the default keymap.
    pub shortcuts: BTreeMap<String, Action>,
}

/// Where settings live between sessions. Loaded once when a session opens and
/// saved once when it closes.
pub trait SettingsStore {
    fn load(&self) -> Result<Settings, StoreError>;
    fn save(&self, settings: &Settings) -> Result<(), StoreError>;
}

/// Pretty-printed JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/tabshell/settings.json`, falling back to the working
    /// directory when the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabshell")
            .join("settings.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Settings, StoreError> {
        if !self.path.exists() {
            log::info!("[Settings] No settings at {:?}, using defaults", self.path);
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let tmp_path = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(settings)?;

        // Write to tmp, then rename, so a crash never leaves a half-written file.
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;

        log::info!("[Settings] Saved to {:?}", self.path);
        Ok(())
    }
}

/// Store that keeps settings in memory only; used for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: RefCell<Settings>,
}

impl MemoryStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RefCell::new(settings),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.settings.borrow().clone()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings, StoreError> {
        Ok(self.settings.borrow().clone())
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        *self.settings.borrow_mut() = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[test]
    fn test_favourites_get_skips_invalid_rows() {
        let favourites: Favourites = vec![
            "gemini://example.com/".to_string(),
            "not a location".to_string(),
        ]
        .into_iter()
        .collect();

        assert_eq!(favourites.get(0), Some(loc("gemini://example.com/")));
        assert_eq!(favourites.get(1), None);
        assert_eq!(favourites.get(2), None);
    }

    #[test]
    fn test_favourites_add_dedupes() {
        let mut favourites = Favourites::default();
        assert!(favourites.add(&loc("gemini://example.com/")));
        assert!(!favourites.add(&loc("gemini://example.com/")));
        assert!(favourites.add(&loc("gemini://other.org/")));
        assert_eq!(favourites.len(), 2);

        assert_eq!(favourites.remove(0).as_deref(), Some("gemini://example.com/"));
        assert_eq!(favourites.remove(5), None);
        assert_eq!(favourites.iter().collect::<Vec<_>>(), vec!["gemini://other.org/"]);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_save_then_load_keeps_favourites_and_style() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("settings.json"));

        let mut settings = Settings::default();
        settings.favourites.add(&loc("gemini://example.com/"));
        settings.style.theme = Theme::Light;
        settings.style.font_size = 16;
        settings.search_engine = SearchEngine::Kennedy;

        store.save(&settings).unwrap();
        assert!(!store.path().with_extension("tmp").exists());
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "favourites": ["gemini://example.com/"] }"#).unwrap();

        let settings = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(settings.favourites.len(), 1);
        assert_eq!(settings.style, DocumentStyle::default());
        assert_eq!(settings.search_engine, SearchEngine::GeminiSpace);
    }

    #[test]
    fn test_shortcut_overrides_use_action_names() {
        let settings: Settings =
            serde_json::from_str(r#"{ "shortcuts": { "Ctrl+N": "new-tab", "F6": "refresh" } }"#).unwrap();
        assert_eq!(settings.shortcuts.get("Ctrl+N"), Some(&Action::NewTab));
        assert_eq!(settings.shortcuts.get("F6"), Some(&Action::Refresh));
        assert!(serde_json::from_str::<Settings>(r#"{ "shortcuts": { "F6": "reload" } }"#).is_err());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::default();
        let mut settings = store.load().unwrap();
        settings.favourites.add(&loc("gemini://example.com/"));
        store.save(&settings).unwrap();
        assert_eq!(store.snapshot().favourites.len(), 1);
    }
}
