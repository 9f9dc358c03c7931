//! High-level editor model: the reference host for the insert core.
//!
//! `EditorModel` owns one `Buffer`, one `View` (caret plus virtual-space
//! offset) and the host-side state the insert core observes through the
//! `host` traits: help overlays, mouse buttons, the overwrite option and the
//! text-change tracker.
//!
//! Core invariants (must hold after every public call):
//! * The caret's real position is always a valid position in the buffer.
//! * `virtual_spaces > 0` only while the caret sits at the end of its line.
//! * Edits are rejected (no-op) while `read_only` is set; callers check
//!   `is_read_only` first and report the failure.

use core_state::{TextChange, TextChangeTracker};
use core_text::{Buffer, Position};
use tracing::trace;

pub mod host;
pub use host::{
    DisplayWindowBroker, EditorOptions, InsertHost, MouseState, TextChangeTracking, TextSpan,
    TextView,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Stable identifier for a `View`.
pub struct ViewId(pub usize);

#[derive(Debug, Clone)]
pub struct View {
    pub id: ViewId,
    pub cursor: Position,
    pub virtual_spaces: usize,
}

impl View {
    pub fn new(id: ViewId, cursor: Position) -> Self {
        Self {
            id,
            cursor,
            virtual_spaces: 0,
        }
    }
}

/// Help overlays a host may show (completion list, quick info, signature help).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayWindows {
    pub completion: bool,
    pub quick_info: bool,
    pub signature_help: bool,
    /// Number of `dismiss_display_windows` calls that closed something.
    pub dismissals: u32,
}

pub struct EditorModel {
    buffer: Buffer,
    view: View,
    read_only: bool,
    overwrite: bool,
    left_button_pressed: bool,
    displays: DisplayWindows,
    changes: TextChangeTracker,
}

impl EditorModel {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            view: View::new(ViewId(0), Position::origin()),
            read_only: false,
            overwrite: false,
            left_button_pressed: false,
            displays: DisplayWindows::default(),
            changes: TextChangeTracker::new(),
        }
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Place the caret past the end of `line` by `spaces` virtual columns.
    pub fn set_virtual_caret(&mut self, line: usize, spaces: usize) {
        let line = line.min(self.buffer.line_count().saturating_sub(1));
        self.view.cursor = Position::new(line, self.buffer.line_byte_len(line));
        self.view.virtual_spaces = spaces;
    }

    pub fn displays(&self) -> &DisplayWindows {
        &self.displays
    }

    pub fn displays_mut(&mut self) -> &mut DisplayWindows {
        &mut self.displays
    }

    /// Simulate a left click: the button goes down and the caret moves to `pos`.
    pub fn click(&mut self, pos: Position) {
        self.left_button_pressed = true;
        self.move_caret(pos);
    }

    pub fn release_left_button(&mut self) {
        self.left_button_pressed = false;
    }

    pub fn changes(&self) -> &TextChangeTracker {
        &self.changes
    }

    /// Move the caret keeping it inside the buffer.
    fn place_caret(&mut self, pos: Position) {
        self.view.cursor = self.buffer.clamp(pos);
        self.view.virtual_spaces = 0;
    }
}

impl TextView for EditorModel {
    fn caret(&self) -> Position {
        self.view.cursor
    }

    fn virtual_spaces(&self) -> usize {
        self.view.virtual_spaces
    }

    fn move_caret(&mut self, pos: Position) {
        self.place_caret(pos);
        trace!(target: "model.view", line = self.view.cursor.line, byte = self.view.cursor.byte, "move_caret");
    }

    fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    fn line_text(&self, line: usize) -> String {
        self.buffer.line_content(line)
    }

    fn is_char_boundary(&self, pos: Position) -> bool {
        self.buffer.is_char_boundary(pos)
    }

    fn text(&self) -> String {
        self.buffer.text()
    }

    fn offset_of(&self, pos: Position) -> usize {
        self.buffer.offset_of(pos)
    }

    fn position_of(&self, offset: usize) -> Position {
        self.buffer.position_of(offset)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn insert_text(&mut self, pos: Position, text: &str) -> Position {
        if self.read_only {
            return pos;
        }
        let mut end = pos;
        self.buffer.insert_str(&mut end, text);
        trace!(target: "model.buffer", op = "insert", len = text.len(), "edit");
        end
    }

    fn delete_text(&mut self, span: TextSpan) -> String {
        if self.read_only {
            return String::new();
        }
        let removed = self.buffer.delete_bytes(span.start, span.end);
        trace!(target: "model.buffer", op = "delete", len = removed.len(), "edit");
        removed
    }

    fn replace_text(&mut self, span: TextSpan, text: &str) -> TextSpan {
        if self.read_only {
            return span;
        }
        self.buffer.replace_bytes(span.start, span.end, text);
        trace!(target: "model.buffer", op = "replace", removed = span.len(), inserted = text.len(), "edit");
        TextSpan::with_len(span.start, text.len())
    }
}

impl DisplayWindowBroker for EditorModel {
    fn is_completion_active(&self) -> bool {
        self.displays.completion
    }

    fn is_quick_info_active(&self) -> bool {
        self.displays.quick_info
    }

    fn is_signature_help_active(&self) -> bool {
        self.displays.signature_help
    }

    fn dismiss_display_windows(&mut self) {
        if self.any_display_window_active() {
            self.displays.dismissals += 1;
        }
        self.displays.completion = false;
        self.displays.quick_info = false;
        self.displays.signature_help = false;
    }
}

impl MouseState for EditorModel {
    fn is_left_button_pressed(&self) -> bool {
        self.left_button_pressed
    }
}

impl EditorOptions for EditorModel {
    fn overwrite(&self) -> bool {
        self.overwrite
    }

    fn set_overwrite(&mut self, enabled: bool) {
        self.overwrite = enabled;
    }
}

impl TextChangeTracking for EditorModel {
    fn record_change(&mut self, change: TextChange) {
        self.changes.record(change);
    }

    fn complete_change(&mut self) {
        self.changes.complete_change();
    }

    fn current_change(&self) -> Option<&TextChange> {
        self.changes.current_change()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn model(text: &str) -> EditorModel {
        EditorModel::new(Buffer::from_str("t", text).unwrap())
    }

    #[test]
    fn move_caret_clamps_and_clears_virtual_space() {
        let mut m = model("ab\ncd");
        m.set_virtual_caret(0, 4);
        assert!(m.is_in_virtual_space());
        assert_eq!(m.caret(), Position::new(0, 2));
        m.move_caret(Position::new(5, 9));
        assert_eq!(m.caret(), Position::new(1, 2));
        assert_eq!(m.virtual_spaces(), 0);
    }

    #[test]
    fn replace_text_reports_new_span() {
        let mut m = model("cat dog");
        let span = m.replace_text(TextSpan::new(4, 7), "tree");
        assert_eq!(span, TextSpan::new(4, 8));
        assert_eq!(m.text(), "cat tree");
    }

    #[test]
    fn read_only_rejects_edits() {
        let mut m = model("abc");
        m.set_read_only(true);
        let end = m.insert_text(Position::new(0, 1), "x");
        assert_eq!(end, Position::new(0, 1));
        assert_eq!(m.delete_text(TextSpan::new(0, 1)), "");
        assert_eq!(m.text(), "abc");
    }

    #[test]
    fn dismiss_counts_only_when_something_was_open() {
        let mut m = model("");
        m.dismiss_display_windows();
        assert_eq!(m.displays().dismissals, 0);
        m.displays_mut().quick_info = true;
        assert!(m.any_display_window_active());
        m.dismiss_display_windows();
        assert!(!m.any_display_window_active());
        assert_eq!(m.displays().dismissals, 1);
    }

    #[test]
    fn click_presses_button_and_moves_caret() {
        let mut m = model("hello");
        m.click(Position::new(0, 3));
        assert!(m.is_left_button_pressed());
        assert_eq!(m.caret(), Position::new(0, 3));
        m.release_left_button();
        assert!(!m.is_left_button_pressed());
    }
}
