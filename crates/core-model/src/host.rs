//! Host seams consumed by the insert core.
//!
//! The insert-mode dispatcher never touches a concrete editor. Everything it
//! needs from its environment goes through the traits below, bundled as
//! `InsertHost`. `EditorModel` implements all of them for tests and the replay
//! binary; an embedding editor implements them over its own buffer and view.

use core_state::TextChange;
use core_text::Position;

/// Half-open absolute byte range `[start, end)` over the whole buffer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    pub fn with_len(start: usize, len: usize) -> Self {
        Self::new(start, start + len)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Buffer + caret facility.
pub trait TextView {
    fn caret(&self) -> Position;
    /// Columns of virtual space the caret sits beyond its real position
    /// (0 when the caret is on real text).
    fn virtual_spaces(&self) -> usize;
    fn is_in_virtual_space(&self) -> bool {
        self.virtual_spaces() > 0
    }
    /// Place the caret on a real position; clears any virtual space.
    fn move_caret(&mut self, pos: Position);

    fn line_count(&self) -> usize;
    /// Line contents without the line break.
    fn line_text(&self, line: usize) -> String;
    /// True when `pos` lies on an existing line at a UTF-8 character boundary.
    fn is_char_boundary(&self, pos: Position) -> bool;
    fn text(&self) -> String;
    fn offset_of(&self, pos: Position) -> usize;
    fn position_of(&self, offset: usize) -> Position;

    fn is_read_only(&self) -> bool;
    /// Insert `text` at `pos` and return the position just past it.
    fn insert_text(&mut self, pos: Position, text: &str) -> Position;
    /// Remove the span and return the removed text.
    fn delete_text(&mut self, span: TextSpan) -> String;
    /// Replace the span; returns the span now covering `text`.
    fn replace_text(&mut self, span: TextSpan, text: &str) -> TextSpan;
}

/// Broker over help overlays that the host may show on top of the text.
pub trait DisplayWindowBroker {
    fn is_completion_active(&self) -> bool;
    fn is_quick_info_active(&self) -> bool;
    fn is_signature_help_active(&self) -> bool;
    fn dismiss_display_windows(&mut self);

    fn any_display_window_active(&self) -> bool {
        self.is_completion_active() || self.is_quick_info_active() || self.is_signature_help_active()
    }
}

pub trait MouseState {
    fn is_left_button_pressed(&self) -> bool;
}

pub trait EditorOptions {
    fn overwrite(&self) -> bool;
    fn set_overwrite(&mut self, enabled: bool);
}

/// Text-change tracker collaborator.
pub trait TextChangeTracking {
    /// Feed an applied edit into the in-flight change.
    fn record_change(&mut self, change: TextChange);
    fn complete_change(&mut self);
    fn current_change(&self) -> Option<&TextChange>;
}

/// Everything the insert core needs from its host.
pub trait InsertHost:
    TextView + DisplayWindowBroker + MouseState + EditorOptions + TextChangeTracking
{
}

impl<T> InsertHost for T where
    T: TextView + DisplayWindowBroker + MouseState + EditorOptions + TextChangeTracking
{
}
