// Editor settings
// Loaded from ~/.config/auditgrid/settings.json

use auditgrid_core::FillMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    // History
    #[serde(rename = "history.capacity")]
    pub history_capacity: usize,

    // Grid
    #[serde(rename = "grid.defaultColumnWidth")]
    pub default_column_width: f32,

    #[serde(rename = "grid.minColumnWidth")]
    pub min_column_width: f32,

    #[serde(rename = "grid.newColumnLabel")]
    pub new_column_label: String,

    // Drag-fill
    #[serde(rename = "fill.mode")]
    pub fill_mode: FillMode,

    // Audit
    #[serde(rename = "audit.keyField")]
    pub key_field: String,

    #[serde(rename = "audit.warnUnresolved")]
    pub warn_unresolved: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            default_column_width: 120.0,
            min_column_width: 40.0,
            new_column_label: "New Column".to_string(),
            fill_mode: FillMode::Rectangular,
            key_field: "po_number".to_string(),
            warn_unresolved: true,
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Undo history (snapshots kept per editing session)
    "history.capacity": 50,

    // Grid layout
    "grid.defaultColumnWidth": 120,
    "grid.minColumnWidth": 40,
    "grid.newColumnLabel": "New Column",

    // Drag-fill: "rectangular" or "column"
    "fill.mode": "rectangular",

    // Field-mapping name of the duplicate key column
    "audit.keyField": "po_number",
    "audit.warnUnresolved": true
}
"#;

impl EditorSettings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("auditgrid")
            .join("settings.json")
    }

    /// Load settings from the user config dir, writing a commented default
    /// file on first run.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            if let Err(e) = write_default_file(&path) {
                log::warn!("could not write default settings to {}: {e}", path.display());
            }
            return Self::default();
        }
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("error parsing {}: {e}; using default settings", path.display());
                Self::default()
            }),
            Err(e) => {
                log::warn!("error reading {}: {e}; using default settings", path.display());
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring `//` comment lines.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut settings: Self = serde_json::from_str(&cleaned)?;
        settings.normalize();
        Ok(settings)
    }

    /// Save current settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    fn normalize(&mut self) {
        if self.history_capacity == 0 {
            self.history_capacity = 1;
        }
        if !(self.min_column_width.is_finite() && self.min_column_width > 0.0) {
            self.min_column_width = Self::default().min_column_width;
        }
        if !self.default_column_width.is_finite() {
            self.default_column_width = Self::default().default_column_width;
        }
        self.default_column_width = self.default_column_width.max(self.min_column_width);
    }
}

fn write_default_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_FILE)
}
