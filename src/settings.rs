// src/settings.rs - Persisted key/value configuration

use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::{Table, Value};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The editor's persisted configuration: a flat key/value table read at
/// startup and written back on change. Missing keys fall back to their
/// defaults, so a partial or empty file is always valid. Owned by the
/// application for the life of the process; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: Table,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self { values: content.parse::<Table>()? })
    }

    pub fn store(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, toml::to_string(&self.values)?)?;
        Ok(())
    }

    /// Platform config location, e.g. `~/.config/scrivo/settings.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scrivo").join("settings.toml"))
    }

    fn bool_value(&self, key: &str, default: bool) -> bool {
        self.values.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    fn int_value(&self, key: &str, default: u32) -> u32 {
        self.values
            .get(key)
            .and_then(Value::as_integer)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(default)
    }

    fn string_value(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn show_tool_bar(&self) -> bool {
        self.bool_value("toolbar.visible", true)
    }

    pub fn set_show_tool_bar(&mut self, show: bool) {
        self.set("toolbar.visible", Value::Boolean(show));
    }

    pub fn show_status_bar(&self) -> bool {
        self.bool_value("statusbar.visible", true)
    }

    pub fn set_show_status_bar(&mut self, show: bool) {
        self.set("statusbar.visible", Value::Boolean(show));
    }

    pub fn fullscreen(&self) -> bool {
        self.bool_value("full.screen", false)
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.set("full.screen", Value::Boolean(fullscreen));
    }

    pub fn view_whitespace(&self) -> bool {
        self.bool_value("view.whitespace", true)
    }

    pub fn set_view_whitespace(&mut self, view: bool) {
        self.set("view.whitespace", Value::Boolean(view));
    }

    pub fn view_indentation_guides(&self) -> bool {
        self.bool_value("view.indentation.guides", true)
    }

    pub fn set_view_indentation_guides(&mut self, view: bool) {
        self.set("view.indentation.guides", Value::Boolean(view));
    }

    pub fn caret_line_visible(&self) -> bool {
        self.bool_value("view.caret.line", true)
    }

    pub fn set_caret_line_visible(&mut self, visible: bool) {
        self.set("view.caret.line", Value::Boolean(visible));
    }

    pub fn line_margin_visible(&self) -> bool {
        self.bool_value("line.margin.visible", true)
    }

    pub fn set_line_margin_visible(&mut self, visible: bool) {
        self.set("line.margin.visible", Value::Boolean(visible));
    }

    pub fn track_line_margin_width(&self) -> bool {
        self.bool_value("line.margin.track", true)
    }

    pub fn set_track_line_margin_width(&mut self, track: bool) {
        self.set("line.margin.track", Value::Boolean(track));
    }

    pub fn icon_margin_visible(&self) -> bool {
        self.bool_value("icon.margin.visible", false)
    }

    pub fn set_icon_margin_visible(&mut self, visible: bool) {
        self.set("icon.margin.visible", Value::Boolean(visible));
    }

    pub fn fold_margin_visible(&self) -> bool {
        self.bool_value("fold.margin.visible", true)
    }

    pub fn set_fold_margin_visible(&mut self, visible: bool) {
        self.set("fold.margin.visible", Value::Boolean(visible));
    }

    pub fn wrap_lines(&self) -> bool {
        self.bool_value("wrap", false)
    }

    pub fn set_wrap_lines(&mut self, wrap: bool) {
        self.set("wrap", Value::Boolean(wrap));
    }

    pub fn tab_width(&self) -> u32 {
        self.int_value("tab.size", 4)
    }

    pub fn set_tab_width(&mut self, width: u32) {
        self.set("tab.size", Value::Integer(width.into()));
    }

    pub fn indentation_width(&self) -> u32 {
        self.int_value("indent.size", 4)
    }

    pub fn set_indentation_width(&mut self, width: u32) {
        self.set("indent.size", Value::Integer(width.into()));
    }

    pub fn use_tabs(&self) -> bool {
        self.bool_value("use.tabs", false)
    }

    pub fn set_use_tabs(&mut self, use_tabs: bool) {
        self.set("use.tabs", Value::Boolean(use_tabs));
    }

    pub fn font(&self) -> String {
        self.string_value("font.default", "Monospace 10")
    }

    pub fn set_font(&mut self, font: &str) {
        self.set("font.default", Value::String(font.to_string()));
    }

    pub fn color_scheme(&self) -> String {
        self.string_value("color.scheme", "Default")
    }

    pub fn set_color_scheme(&mut self, name: &str) {
        self.set("color.scheme", Value::String(name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::new();
        assert!(settings.show_tool_bar());
        assert!(settings.show_status_bar());
        assert!(!settings.fullscreen());
        assert!(settings.line_margin_visible());
        assert!(!settings.icon_margin_visible());
        assert!(settings.fold_margin_visible());
        assert_eq!(settings.tab_width(), 4);
        assert!(!settings.use_tabs());
        assert_eq!(settings.color_scheme(), "Default");
    }

    #[test]
    fn test_set_and_get() {
        let mut settings = Settings::new();
        settings.set_show_tool_bar(false);
        settings.set_tab_width(8);
        settings.set_color_scheme("Zenburn");
        assert!(!settings.show_tool_bar());
        assert_eq!(settings.tab_width(), 8);
        assert_eq!(settings.color_scheme(), "Zenburn");
    }

    #[test]
    fn test_store_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");

        let mut settings = Settings::new();
        settings.set_fullscreen(true);
        settings.set_font("Consolas 11");
        settings.set_indentation_width(2);
        settings.store(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert!(loaded.fullscreen());
        assert_eq!(loaded.font(), "Consolas 11");
        assert_eq!(loaded.indentation_width(), 2);
        // Untouched keys still fall back to defaults.
        assert!(loaded.show_status_bar());
    }

    #[test]
    fn test_mistyped_value_falls_back_to_default() {
        let mut settings = Settings::new();
        settings.set("tab.size", Value::String("wide".to_string()));
        assert_eq!(settings.tab_width(), 4);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "not = = toml").unwrap();
        assert!(matches!(Settings::load(&path), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_default_path_ends_with_settings_file() {
        if let Some(path) = Settings::default_path() {
            assert!(path.ends_with("scrivo/settings.toml"));
        }
    }
}
