// src/engine/rope.rs - Headless reference engine backed by a rope

use std::collections::HashSet;

use log::warn;
use regex::{Regex, RegexBuilder};
use ropey::Rope;

use super::{EngineEvent, Margin, SearchFlags, Span, TextEngine, TextStyle};

/// Width of one character cell in the headless measurement model.
const CELL_WIDTH: u32 = 8;

/// One step in the undo history. Undoing re-inserts `removed` in place of
/// `inserted`; redoing does the opposite.
#[derive(Debug)]
struct EditOp {
    pos: usize,
    removed: String,
    inserted: String,
}

/// In-memory [`TextEngine`] on a rope. It keeps a real undo/redo stack so the
/// save-point distance (and with it the modified flag) behaves like a native
/// widget's, including the save point becoming unreachable once the redo
/// branch that contained it is discarded.
#[derive(Debug)]
pub struct RopeEngine {
    rope: Rope,
    cursor: usize,
    selection: Option<Span>,
    undo_stack: Vec<EditOp>,
    redo_stack: Vec<EditOp>,
    /// Undo depth at which the document matches the file on disk. `None`
    /// means no reachable save point exists.
    save_depth: Option<usize>,
    lexer: Option<String>,
    keywords: String,
    folding_enabled: bool,
    folded_lines: HashSet<usize>,
    margin_widths: [u32; 3],
    last_scroll: Option<Span>,
    events: Vec<EngineEvent>,
}

impl RopeEngine {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            cursor: 0,
            selection: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            save_depth: Some(0),
            lexer: None,
            keywords: String::new(),
            folding_enabled: false,
            folded_lines: HashSet::new(),
            margin_widths: [0; 3],
            last_scroll: None,
            events: Vec::new(),
        }
    }

    /// Inserts `text` at a character position, as if typed in the widget.
    pub fn insert_text(&mut self, pos: usize, text: &str) {
        self.splice(pos, 0, text);
    }

    /// Removes the characters in `start..end`.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        let start = start.min(self.rope.len_chars());
        let end = end.min(self.rope.len_chars());
        if start < end {
            self.splice(start, end - start, "");
        }
    }

    /// Widget-side entry point: the host reports a margin click and the
    /// owning buffer reacts when it drains events.
    pub fn click_margin(&mut self, position: usize, margin: Margin) {
        self.events.push(EngineEvent::MarginClicked { position, margin });
    }

    pub fn margin_width(&self, margin: Margin) -> u32 {
        self.margin_widths[margin_index(margin)]
    }

    pub fn lexer(&self) -> Option<&str> {
        self.lexer.as_deref()
    }

    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    pub fn folding_enabled(&self) -> bool {
        self.folding_enabled
    }

    pub fn is_fold_collapsed(&self, line: usize) -> bool {
        self.folded_lines.contains(&line)
    }

    pub fn last_scroll(&self) -> Option<Span> {
        self.last_scroll
    }

    /// Applies one edit, records it for undo and queues the resulting
    /// notifications.
    fn splice(&mut self, pos: usize, remove: usize, insert: &str) {
        let pos = pos.min(self.rope.len_chars());
        let end = (pos + remove).min(self.rope.len_chars());
        let was_dirty = self.is_modified();
        let lines_before = self.rope.len_lines() as i64;

        let removed = self.rope.slice(pos..end).to_string();
        self.rope.remove(pos..end);
        self.rope.insert(pos, insert);

        // A new edit discards the redo branch; a save point recorded inside
        // that branch can no longer be reached.
        if let Some(depth) = self.save_depth
            && depth > self.undo_stack.len()
        {
            self.save_depth = None;
        }
        self.redo_stack.clear();
        self.undo_stack.push(EditOp {
            pos,
            removed,
            inserted: insert.to_string(),
        });

        self.cursor = (pos + insert.chars().count()).min(self.rope.len_chars());
        self.selection = None;
        self.queue_edit_events(lines_before, was_dirty);
    }

    fn queue_edit_events(&mut self, lines_before: i64, was_dirty: bool) {
        let delta = self.rope.len_lines() as i64 - lines_before;
        if delta != 0 {
            self.events.push(EngineEvent::LinesAdded(delta));
        }
        let dirty = self.is_modified();
        if dirty != was_dirty {
            self.events.push(EngineEvent::SavePointChanged { dirty });
        }
    }

    fn build_pattern(pattern: &str, flags: SearchFlags) -> Option<Regex> {
        let mut source = if flags.regex {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };
        if flags.whole_word {
            source = format!(r"\b(?:{})\b", source);
        }
        match RegexBuilder::new(&source)
            .case_insensitive(!flags.match_case)
            .build()
        {
            Ok(re) => Some(re),
            Err(err) => {
                warn!("rejected search pattern {:?}: {}", pattern, err);
                None
            }
        }
    }
}

impl Default for RopeEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn margin_index(margin: Margin) -> usize {
    match margin {
        Margin::Line => 0,
        Margin::Icon => 1,
        Margin::Fold => 2,
    }
}

impl TextEngine for RopeEngine {
    fn set_text(&mut self, text: &str) {
        self.splice(0, self.rope.len_chars(), text);
        self.cursor = 0;
    }

    fn get_text(&self) -> String {
        self.rope.to_string()
    }

    fn clear_all(&mut self) {
        self.splice(0, self.rope.len_chars(), "");
    }

    fn text_length(&self) -> usize {
        self.rope.len_chars()
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_from_position(&self, position: usize) -> usize {
        self.rope.char_to_line(position.min(self.rope.len_chars()))
    }

    fn undo(&mut self) {
        let was_dirty = self.is_modified();
        let lines_before = self.rope.len_lines() as i64;
        let Some(op) = self.undo_stack.pop() else {
            return;
        };

        let inserted_len = op.inserted.chars().count();
        self.rope.remove(op.pos..op.pos + inserted_len);
        self.rope.insert(op.pos, &op.removed);
        self.cursor = (op.pos + op.removed.chars().count()).min(self.rope.len_chars());
        self.selection = None;

        self.redo_stack.push(op);
        self.queue_edit_events(lines_before, was_dirty);
    }

    fn redo(&mut self) {
        let was_dirty = self.is_modified();
        let lines_before = self.rope.len_lines() as i64;
        let Some(op) = self.redo_stack.pop() else {
            return;
        };

        let removed_len = op.removed.chars().count();
        self.rope.remove(op.pos..op.pos + removed_len);
        self.rope.insert(op.pos, &op.inserted);
        self.cursor = (op.pos + op.inserted.chars().count()).min(self.rope.len_chars());
        self.selection = None;

        self.undo_stack.push(op);
        self.queue_edit_events(lines_before, was_dirty);
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn empty_undo_buffer(&mut self) {
        let dirty = self.is_modified();
        self.undo_stack.clear();
        self.redo_stack.clear();
        // Cleanliness survives; a dirty document stays dirty until the next
        // explicit save point.
        self.save_depth = if dirty { None } else { Some(0) };
    }

    fn set_save_point(&mut self) {
        let was_dirty = self.is_modified();
        self.save_depth = Some(self.undo_stack.len());
        if was_dirty {
            self.events.push(EngineEvent::SavePointChanged { dirty: false });
        }
    }

    fn is_modified(&self) -> bool {
        self.save_depth != Some(self.undo_stack.len())
    }

    fn current_pos(&self) -> usize {
        self.cursor
    }

    fn set_current_pos(&mut self, position: usize) {
        self.cursor = position.min(self.rope.len_chars());
    }

    fn selection(&self) -> Option<Span> {
        self.selection
    }

    fn set_selection(&mut self, span: Span) {
        self.selection = Some(span);
        self.cursor = span.end.min(self.rope.len_chars());
    }

    fn scroll_into_view(&mut self, span: Span) {
        self.last_scroll = Some(span);
    }

    fn set_lexer(&mut self, lexer: Option<&str>) {
        self.lexer = lexer.map(str::to_string);
    }

    fn set_keywords(&mut self, keywords: &str) {
        self.keywords = keywords.to_string();
    }

    fn set_folding_enabled(&mut self, enabled: bool) {
        self.folding_enabled = enabled;
        if !enabled {
            self.folded_lines.clear();
        }
    }

    fn toggle_fold(&mut self, line: usize) {
        if !self.folding_enabled {
            return;
        }
        if !self.folded_lines.remove(&line) {
            self.folded_lines.insert(line);
        }
    }

    fn search_in(
        &mut self,
        start: usize,
        end: usize,
        pattern: &str,
        flags: SearchFlags,
    ) -> Option<Span> {
        let backward = start > end;
        let (lo, hi) = if backward { (end, start) } else { (start, end) };
        let lo = lo.min(self.rope.len_chars());
        let hi = hi.min(self.rope.len_chars());

        let haystack = self.rope.slice(lo..hi).to_string();
        let re = Self::build_pattern(pattern, flags)?;
        let hit = if backward {
            re.find_iter(&haystack).last()
        } else {
            re.find(&haystack)
        }?;

        // Regex offsets are byte positions in the slice; the engine speaks
        // character positions.
        let match_start = lo + haystack[..hit.start()].chars().count();
        let match_len = haystack[hit.start()..hit.end()].chars().count();
        Some(Span::new(match_start, match_start + match_len))
    }

    fn set_margin_width(&mut self, margin: Margin, width: u32) {
        self.margin_widths[margin_index(margin)] = width;
    }

    fn measure_text(&self, _style: TextStyle, text: &str) -> u32 {
        text.chars().count() as u32 * CELL_WIDTH
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(text: &str) -> RopeEngine {
        let mut engine = RopeEngine::new();
        engine.set_text(text);
        engine.empty_undo_buffer();
        engine.set_save_point();
        engine.take_events();
        engine
    }

    #[test]
    fn test_insert_delete_roundtrip() {
        let mut engine = RopeEngine::new();
        engine.insert_text(0, "hello world");
        engine.delete_range(5, 11);
        assert_eq!(engine.get_text(), "hello");
        assert_eq!(engine.text_length(), 5);
    }

    #[test]
    fn test_undo_redo_restores_text() {
        let mut engine = engine_with("abc");
        engine.insert_text(3, "def");
        assert_eq!(engine.get_text(), "abcdef");

        engine.undo();
        assert_eq!(engine.get_text(), "abc");
        assert!(engine.can_redo());

        engine.redo();
        assert_eq!(engine.get_text(), "abcdef");
    }

    #[test]
    fn test_save_point_distance_drives_modified() {
        let mut engine = engine_with("abc");
        assert!(!engine.is_modified());

        engine.insert_text(0, "x");
        assert!(engine.is_modified());

        engine.undo();
        assert!(!engine.is_modified());

        engine.redo();
        assert!(engine.is_modified());

        engine.set_save_point();
        assert!(!engine.is_modified());
    }

    #[test]
    fn test_save_point_unreachable_after_divergent_edit() {
        let mut engine = engine_with("abc");
        engine.insert_text(3, "1");
        engine.set_save_point();
        engine.undo();
        // Editing here discards the redo branch holding the save point.
        engine.insert_text(3, "2");
        assert!(engine.is_modified());
        engine.undo();
        assert!(engine.is_modified());
    }

    #[test]
    fn test_dirty_transitions_are_notified() {
        let mut engine = engine_with("abc");
        engine.insert_text(0, "x");
        engine.insert_text(0, "y");
        let dirty_events: Vec<_> = engine
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, EngineEvent::SavePointChanged { .. }))
            .collect();
        // Only the clean-to-dirty transition is reported, not every edit.
        assert_eq!(dirty_events, vec![EngineEvent::SavePointChanged { dirty: true }]);

        engine.set_save_point();
        assert_eq!(
            engine.take_events(),
            vec![EngineEvent::SavePointChanged { dirty: false }]
        );
    }

    #[test]
    fn test_lines_added_delta() {
        let mut engine = engine_with("one");
        engine.insert_text(3, "\ntwo\nthree");
        let events = engine.take_events();
        assert!(events.contains(&EngineEvent::LinesAdded(2)));

        engine.delete_range(3, 13);
        let events = engine.take_events();
        assert!(events.contains(&EngineEvent::LinesAdded(-2)));
    }

    #[test]
    fn test_search_forward_and_backward() {
        let mut engine = engine_with("abc abc abc");
        let flags = SearchFlags::default();

        let hit = engine.search_in(0, 11, "abc", flags).unwrap();
        assert_eq!(hit, Span::new(0, 3));

        // Backward: start > end, match nearest the start of the scan.
        let hit = engine.search_in(11, 0, "abc", flags).unwrap();
        assert_eq!(hit, Span::new(8, 11));

        // Restricted range excludes the last occurrence.
        let hit = engine.search_in(7, 0, "abc", flags).unwrap();
        assert_eq!(hit, Span::new(4, 7));
    }

    #[test]
    fn test_search_flags() {
        let mut engine = engine_with("Concatenate the cat");
        let len = engine.text_length();

        let insensitive = SearchFlags::default();
        assert_eq!(
            engine.search_in(0, len, "cat", insensitive),
            Some(Span::new(3, 6))
        );

        let cased = SearchFlags { match_case: true, ..Default::default() };
        assert_eq!(engine.search_in(0, len, "Cat", cased), None);

        let word = SearchFlags { whole_word: true, ..Default::default() };
        assert_eq!(engine.search_in(0, len, "cat", word), Some(Span::new(16, 19)));

        let re = SearchFlags { regex: true, ..Default::default() };
        assert_eq!(engine.search_in(0, len, "c.t$", re), Some(Span::new(16, 19)));
    }

    #[test]
    fn test_invalid_regex_is_a_miss() {
        let mut engine = engine_with("anything");
        let flags = SearchFlags { regex: true, ..Default::default() };
        assert_eq!(engine.search_in(0, 8, "(", flags), None);
    }

    #[test]
    fn test_search_positions_are_char_offsets() {
        let mut engine = engine_with("héllo wörld wörld");
        let len = engine.text_length();
        let hit = engine.search_in(len, 0, "wörld", SearchFlags::default()).unwrap();
        assert_eq!(hit, Span::new(12, 17));
    }

    #[test]
    fn test_fold_toggle_requires_folding() {
        let mut engine = engine_with("a\nb\nc");
        engine.toggle_fold(1);
        assert!(!engine.is_fold_collapsed(1));

        engine.set_folding_enabled(true);
        engine.toggle_fold(1);
        assert!(engine.is_fold_collapsed(1));
        engine.toggle_fold(1);
        assert!(!engine.is_fold_collapsed(1));
    }

    #[test]
    fn test_measure_text_is_per_cell() {
        let engine = RopeEngine::new();
        assert_eq!(engine.measure_text(TextStyle::LineNumber, "_99"), 3 * CELL_WIDTH);
    }
}
