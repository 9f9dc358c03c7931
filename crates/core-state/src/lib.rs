//! Mode identity and text-change tracking shared by the insert core and its host.
//!
//! * `ModeKind` / `ModeArgument` are the vocabulary every mode uses when asking
//!   the host to switch modes. Only Insert and Replace are implemented in this
//!   workspace; the remaining kinds exist so switch requests can name them.
//! * `change::TextChangeTracker` accumulates the text typed during an insert
//!   session into a reduced `TextChange` descriptor. The host records each
//!   applied edit; the insert core force-completes the in-flight change when
//!   the caret is moved by the user rather than by an edit.

pub mod change;
pub use change::{TextChange, TextChangeTracker};

/// Editing modes a switch request can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    /// Normal command/navigation mode.
    Normal,
    /// Insert text mode.
    Insert,
    /// Replace (overwrite) text mode.
    Replace,
    VisualCharacter,
    VisualLine,
    VisualBlock,
    CommandLine,
}

impl ModeKind {
    /// Name shown in a status line (`-- INSERT --`).
    pub fn display_name(self) -> &'static str {
        match self {
            ModeKind::Normal => "NORMAL",
            ModeKind::Insert => "INSERT",
            ModeKind::Replace => "REPLACE",
            ModeKind::VisualCharacter => "VISUAL",
            ModeKind::VisualLine => "VISUAL LINE",
            ModeKind::VisualBlock => "VISUAL BLOCK",
            ModeKind::CommandLine => "COMMAND",
        }
    }
}

/// Extra data carried by a mode switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeArgument {
    #[default]
    None,
    /// The mode is being entered on behalf of a one-time command issued from
    /// `ModeKind`; leaving it must return there instead of Normal.
    OneTimeCommandReturn(ModeKind),
}
