// src/buffer.rs - Document lifecycle around a TextEngine

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::engine::{EngineEvent, Margin, SearchFlags, TextEngine};
use crate::language::{LanguageDescriptor, LanguageRegistry};
use crate::margin::{self, FOLD_MARGIN_WIDTH, ICON_MARGIN_WIDTH};
use crate::search::{self, SearchOutcome};
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Save was requested with neither a stored nor a supplied path. The
    /// caller must obtain one (interactively) and retry.
    #[error("no file path to save to")]
    NoPath,
}

/// Text codec used when bytes cross the file boundary. Changing it never
/// touches the in-memory text; it takes effect on the next open or save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Latin1,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Latin1 => "ISO-8859-1",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Some(Encoding::Utf8),
            "UTF-16LE" | "UTF16LE" => Some(Encoding::Utf16Le),
            "UTF-16BE" | "UTF16BE" => Some(Encoding::Utf16Be),
            "ISO-8859-1" | "LATIN-1" | "LATIN1" => Some(Encoding::Latin1),
            _ => None,
        }
    }

    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            Encoding::Utf16Be => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Encoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Encoding::Latin1 => text
                .chars()
                .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
                .collect(),
        }
    }
}

/// Outward notifications, drained by the owning window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferEvent {
    FileInfoChanged(Option<PathBuf>),
    EncodingChanged(Encoding),
    ModifiedChanged(bool),
}

/// One open document: its engine, file identity, encoding and the derived
/// UI-affecting state (margins, active language). Exclusively owned by a
/// single window; never shared.
pub struct Buffer<E: TextEngine> {
    engine: E,
    registry: LanguageRegistry,
    file_path: Option<PathBuf>,
    encoding: Encoding,
    active_language: Option<LanguageDescriptor>,
    line_margin_visible: bool,
    icon_margin_visible: bool,
    fold_margin_visible: bool,
    /// Digit count the line margin was last measured for; the margin is only
    /// re-measured when this changes, not on every line-count notification.
    line_margin_digits: u32,
    events: Vec<BufferEvent>,
}

impl<E: TextEngine> Buffer<E> {
    pub fn new(engine: E) -> Self {
        Self::with_registry(engine, LanguageRegistry::builtin())
    }

    pub fn with_registry(engine: E, registry: LanguageRegistry) -> Self {
        let mut buffer = Self {
            engine,
            registry,
            file_path: None,
            encoding: Encoding::default(),
            active_language: None,
            line_margin_visible: false,
            icon_margin_visible: false,
            fold_margin_visible: false,
            line_margin_digits: 0,
            events: Vec::new(),
        };
        buffer.set_line_margin_visible(true);
        buffer.set_icon_margin_visible(false);
        buffer.set_fold_margin_visible(true);
        buffer
    }

    /// Loads a file into the buffer: decodes with the current encoding,
    /// replaces the text, resets undo history and the save point, and
    /// re-runs language selection for the new name.
    pub fn open(&mut self, path: &Path) -> Result<(), BufferError> {
        let bytes = fs::read(path)?;
        let text = self.encoding.decode(&bytes);
        self.engine.set_text(&text);
        self.set_file_info(Some(path.to_path_buf()));
        self.engine.empty_undo_buffer();
        self.engine.set_save_point();
        info!(
            "opened {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            self.encoding.name()
        );
        self.pump_engine_events();
        Ok(())
    }

    /// Writes the document out. With no explicit path the stored one is
    /// used; with neither, fails before touching the filesystem. Moves the
    /// save point but, unlike [`Buffer::open`], keeps undo history.
    pub fn save(&mut self, path: Option<&Path>) -> Result<(), BufferError> {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => self.file_path.clone().ok_or(BufferError::NoPath)?,
        };
        let bytes = self.encoding.encode(&self.engine.get_text());
        fs::write(&target, bytes)?;
        info!("saved {} ({})", target.display(), self.encoding.name());
        self.set_file_info(Some(target));
        self.engine.set_save_point();
        self.pump_engine_events();
        Ok(())
    }

    /// Back to the empty/untitled state. Encoding is kept.
    pub fn clear(&mut self) {
        self.engine.clear_all();
        self.set_file_info(None);
        self.engine.set_save_point();
        self.pump_engine_events();
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: Encoding) {
        if self.encoding != encoding {
            self.encoding = encoding;
            self.events.push(BufferEvent::EncodingChanged(encoding));
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn active_language(&self) -> Option<&LanguageDescriptor> {
        self.active_language.as_ref()
    }

    /// Computed from the engine's save-point distance on every call; never
    /// cached here, so it cannot drift from the true editor state.
    pub fn is_modified(&self) -> bool {
        self.engine.is_modified()
    }

    pub fn find(
        &mut self,
        text: &str,
        flags: SearchFlags,
        forward: bool,
        wrap: bool,
    ) -> SearchOutcome {
        search::find_in(&mut self.engine, text, flags, forward, wrap)
    }

    pub fn line_margin_visible(&self) -> bool {
        self.line_margin_visible
    }

    pub fn set_line_margin_visible(&mut self, visible: bool) {
        self.line_margin_visible = visible;
        if visible {
            self.line_margin_digits = margin::line_number_digits(self.engine.line_count());
            let width = margin::line_margin_width(&self.engine);
            self.engine.set_margin_width(Margin::Line, width);
        } else {
            self.engine.set_margin_width(Margin::Line, 0);
        }
    }

    pub fn icon_margin_visible(&self) -> bool {
        self.icon_margin_visible
    }

    pub fn set_icon_margin_visible(&mut self, visible: bool) {
        self.icon_margin_visible = visible;
        let width = if visible { ICON_MARGIN_WIDTH } else { 0 };
        self.engine.set_margin_width(Margin::Icon, width);
    }

    pub fn fold_margin_visible(&self) -> bool {
        self.fold_margin_visible
    }

    pub fn set_fold_margin_visible(&mut self, visible: bool) {
        self.fold_margin_visible = visible;
        let width = if visible { FOLD_MARGIN_WIDTH } else { 0 };
        self.engine.set_margin_width(Margin::Fold, width);
    }

    /// Applies the persisted margin toggles.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_line_margin_visible(settings.line_margin_visible());
        self.set_icon_margin_visible(settings.icon_margin_visible());
        self.set_fold_margin_visible(settings.fold_margin_visible());
    }

    /// Drains the engine's queued notifications and reacts: line-count
    /// changes resize the number margin, fold-margin clicks toggle the fold
    /// at the clicked line, save-point changes surface as modified-flag
    /// events. Buffer operations pump internally; hosts that drive the
    /// engine directly call this afterwards.
    pub fn pump_engine_events(&mut self) {
        for event in self.engine.take_events() {
            match event {
                EngineEvent::LinesAdded(_) => self.refresh_line_margin(),
                EngineEvent::MarginClicked { position, margin: Margin::Fold } => {
                    let line = self.engine.line_from_position(position);
                    self.engine.toggle_fold(line);
                }
                EngineEvent::MarginClicked { .. } => {}
                EngineEvent::SavePointChanged { dirty } => {
                    self.events.push(BufferEvent::ModifiedChanged(dirty));
                }
            }
        }
    }

    /// Drains the buffer's own outward notifications.
    pub fn take_events(&mut self) -> Vec<BufferEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Records the new file identity and reconfigures the lexer for it.
    /// A path equal to the current one is a no-op, which both avoids a
    /// redundant lexer reset and breaks the notify-reconfigure-notify cycle.
    fn set_file_info(&mut self, path: Option<PathBuf>) {
        if self.file_path == path {
            return;
        }
        self.file_path = path;
        self.setup_lexer();
        self.events
            .push(BufferEvent::FileInfoChanged(self.file_path.clone()));
    }

    fn setup_lexer(&mut self) {
        let file_name = self
            .file_path
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .unwrap_or("");
        let language = self.registry.select_language(file_name).cloned();
        match language.as_ref().and_then(|lang| lang.lexer.as_deref()) {
            Some(lexer) => {
                let keywords = language
                    .as_ref()
                    .map(|lang| lang.keywords.clone())
                    .unwrap_or_default();
                self.engine.set_lexer(Some(lexer));
                self.engine.set_keywords(&keywords);
                self.engine.set_folding_enabled(true);
            }
            None => {
                self.engine.set_lexer(None);
                self.engine.set_keywords("");
                self.engine.set_folding_enabled(false);
            }
        }
        self.active_language = language;
    }

    fn refresh_line_margin(&mut self) {
        if !self.line_margin_visible {
            return;
        }
        let digits = margin::line_number_digits(self.engine.line_count());
        if digits != self.line_margin_digits {
            self.line_margin_digits = digits;
            let width = margin::line_margin_width(&self.engine);
            self.engine.set_margin_width(Margin::Line, width);
        }
    }
}

impl<E: TextEngine + Default> Default for Buffer<E> {
    fn default() -> Self {
        Self::new(E::default())
    }
}

#[cfg(test)]
use crate::engine::RopeEngine;

#[test]
fn test_open_save_roundtrip() {
    use tempfile::NamedTempFile;
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(temp_file.path(), "hello\nworld\n").unwrap();

    let mut buffer = Buffer::new(RopeEngine::new());
    buffer.open(temp_file.path()).unwrap();
    assert_eq!(buffer.engine().get_text(), "hello\nworld\n");
    assert!(!buffer.is_modified());

    buffer.save(None).unwrap();
    let content = fs::read_to_string(temp_file.path()).unwrap();
    assert_eq!(content, "hello\nworld\n");
}

#[test]
fn test_save_without_any_path_fails() {
    let mut buffer = Buffer::new(RopeEngine::new());
    buffer.engine_mut().insert_text(0, "unsaved");
    assert!(matches!(buffer.save(None), Err(BufferError::NoPath)));
}

#[test]
fn test_clear_keeps_encoding() {
    let mut buffer = Buffer::new(RopeEngine::new());
    buffer.set_encoding(Encoding::Latin1);
    buffer.engine_mut().insert_text(0, "text");
    buffer.clear();
    assert!(buffer.file_path().is_none());
    assert_eq!(buffer.engine().get_text(), "");
    assert!(!buffer.is_modified());
    assert_eq!(buffer.encoding(), Encoding::Latin1);
}

#[test]
fn test_encoding_change_is_signalled_once() {
    let mut buffer = Buffer::new(RopeEngine::new());
    buffer.set_encoding(Encoding::Utf16Le);
    buffer.set_encoding(Encoding::Utf16Le);
    let events: Vec<_> = buffer
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, BufferEvent::EncodingChanged(_)))
        .collect();
    assert_eq!(events, vec![BufferEvent::EncodingChanged(Encoding::Utf16Le)]);
}

#[test]
fn test_encoding_names_roundtrip() {
    for encoding in [Encoding::Utf8, Encoding::Utf16Le, Encoding::Utf16Be, Encoding::Latin1] {
        assert_eq!(Encoding::from_name(encoding.name()), Some(encoding));
    }
    assert_eq!(Encoding::from_name("latin1"), Some(Encoding::Latin1));
    assert_eq!(Encoding::from_name("EBCDIC"), None);
}

#[test]
fn test_encoding_latin1_and_utf16_roundtrip() {
    let text = "caf\u{e9}";
    assert_eq!(Encoding::Latin1.decode(&Encoding::Latin1.encode(text)), text);
    assert_eq!(Encoding::Utf16Le.decode(&Encoding::Utf16Le.encode(text)), text);
    assert_eq!(Encoding::Utf16Be.decode(&Encoding::Utf16Be.encode(text)), text);
    // Characters outside Latin-1 degrade to '?'.
    assert_eq!(Encoding::Latin1.encode("\u{4e16}"), b"?");
}
