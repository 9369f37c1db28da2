// tests/common/mod.rs - Shared helpers for integration tests

use scrivo::buffer::Buffer;
use scrivo::engine::{RopeEngine, TextEngine};

/// Buffer pre-loaded with `text`, clean, cursor at the start, with all
/// pending notifications already drained.
#[allow(dead_code)]
pub fn buffer_with_text(text: &str) -> Buffer<RopeEngine> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut buffer = Buffer::new(RopeEngine::new());
    buffer.engine_mut().set_text(text);
    buffer.engine_mut().empty_undo_buffer();
    buffer.engine_mut().set_save_point();
    buffer.pump_engine_events();
    buffer.take_events();
    buffer
}
