// src/search.rs - Wrap-around document search

use crate::engine::{SearchFlags, TextEngine};

/// Outcome of a find: whether a match was selected, and whether the search
/// had to continue past the document boundary to look for one. A miss is a
/// normal result, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub found: bool,
    pub wrapped: bool,
}

/// Searches from the cursor toward the document edge, optionally wrapping
/// around to cover the rest. On success the match is selected and scrolled
/// into view.
pub fn find_in<E: TextEngine>(
    engine: &mut E,
    text: &str,
    flags: SearchFlags,
    forward: bool,
    wrap: bool,
) -> SearchOutcome {
    if text.is_empty() {
        return SearchOutcome { found: false, wrapped: false };
    }

    let pos = engine.current_pos();
    let length = engine.text_length();
    // Backward scans start one position before the cursor so the match
    // sitting under the cursor is not immediately found again.
    let (start, end) = if forward {
        (pos, length)
    } else {
        (pos.saturating_sub(1), 0)
    };

    let mut wrapped = false;
    let mut hit = engine.search_in(start, end, text, flags);
    if hit.is_none() && wrap {
        // Retry over the complementary range. The wrap flag reports that the
        // boundary was crossed, whether or not this attempt succeeds.
        let (start, end) = if forward {
            (0, pos)
        } else {
            (length, pos.saturating_sub(1))
        };
        hit = engine.search_in(start, end, text, flags);
        wrapped = true;
    }

    if let Some(span) = hit {
        engine.set_selection(span);
        engine.scroll_into_view(span);
    }
    SearchOutcome { found: hit.is_some(), wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RopeEngine, Span};

    fn engine_with(text: &str) -> RopeEngine {
        let mut engine = RopeEngine::new();
        engine.set_text(text);
        engine
    }

    #[test]
    fn test_empty_pattern_is_a_miss_with_no_side_effects() {
        let mut engine = engine_with("anything");
        let outcome = find_in(&mut engine, "", SearchFlags::default(), true, true);
        assert_eq!(outcome, SearchOutcome { found: false, wrapped: false });
        assert!(engine.selection().is_none());
        assert!(engine.last_scroll().is_none());
    }

    #[test]
    fn test_forward_find_selects_and_scrolls() {
        let mut engine = engine_with("say hello twice: hello");
        let outcome = find_in(&mut engine, "hello", SearchFlags::default(), true, false);
        assert_eq!(outcome, SearchOutcome { found: true, wrapped: false });
        assert_eq!(engine.selection(), Some(Span::new(4, 9)));
        assert_eq!(engine.last_scroll(), Some(Span::new(4, 9)));
    }
}
