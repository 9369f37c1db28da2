// src/engine/mod.rs - The edit-widget capability the buffer drives

pub mod rope;

pub use rope::RopeEngine;

/// A contiguous character range, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// The three fixed-purpose vertical strips alongside the text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Margin {
    Line,
    Icon,
    Fold,
}

/// Style a probe string is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Default,
    LineNumber,
}

/// Qualifiers for the engine's search primitive. All three combine with
/// AND semantics; `regex` changes how the pattern itself is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFlags {
    pub match_case: bool,
    pub whole_word: bool,
    pub regex: bool,
}

/// Notifications the engine queues while a mutation runs. They are drained
/// synchronously via [`TextEngine::take_events`] before control returns to
/// whoever triggered the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Line count changed by this delta (negative when lines were removed).
    LinesAdded(i64),
    MarginClicked { position: usize, margin: Margin },
    SavePointChanged { dirty: bool },
}

/// The native edit widget, seen from the buffer's side: text storage, undo
/// and save-point bookkeeping, lexer configuration, a ranged search
/// primitive, and view operations. One buffer is the only writer of its
/// engine.
pub trait TextEngine {
    /// Replaces the whole document. Undoable; callers that want a fresh
    /// history follow up with [`TextEngine::empty_undo_buffer`].
    fn set_text(&mut self, text: &str);
    fn get_text(&self) -> String;
    fn clear_all(&mut self);
    fn text_length(&self) -> usize;
    fn line_count(&self) -> usize;
    fn line_from_position(&self, position: usize) -> usize;

    fn undo(&mut self);
    fn redo(&mut self);
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
    fn empty_undo_buffer(&mut self);
    fn set_save_point(&mut self);
    /// Whether the document has moved away from the last save point. This is
    /// the single source of truth for the modified flag.
    fn is_modified(&self) -> bool;

    fn current_pos(&self) -> usize;
    fn set_current_pos(&mut self, position: usize);
    fn selection(&self) -> Option<Span>;
    fn set_selection(&mut self, span: Span);
    fn scroll_into_view(&mut self, span: Span);

    /// `None` disables highlighting (plain-text mode).
    fn set_lexer(&mut self, lexer: Option<&str>);
    fn set_keywords(&mut self, keywords: &str);
    fn set_folding_enabled(&mut self, enabled: bool);
    fn toggle_fold(&mut self, line: usize);

    /// Searches for `pattern` inside the target range. `start > end` scans
    /// the range backward and returns the match nearest `start`. The match
    /// must lie entirely within the range.
    fn search_in(
        &mut self,
        start: usize,
        end: usize,
        pattern: &str,
        flags: SearchFlags,
    ) -> Option<Span>;

    fn set_margin_width(&mut self, margin: Margin, width: u32);
    fn measure_text(&self, style: TextStyle, text: &str) -> u32;

    /// Drains pending notifications, in emission order.
    fn take_events(&mut self) -> Vec<EngineEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len() {
        assert_eq!(Span::new(2, 5).len(), 3);
        assert_eq!(Span::new(5, 5).len(), 0);
        assert!(Span::new(3, 3).is_empty());
        assert!(!Span::new(0, 1).is_empty());
    }

    #[test]
    fn test_search_flags_default() {
        let flags = SearchFlags::default();
        assert!(!flags.match_case);
        assert!(!flags.whole_word);
        assert!(!flags.regex);
    }
}
