//! Outcome vocabulary shared by the runner and the dispatcher.

use core_state::{ModeArgument, ModeKind};
use thiserror::Error;

/// Why an insert command could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("buffer is read-only")]
    ReadOnly,
    #[error("nothing to delete")]
    NothingToDelete,
    #[error("caret is outside the buffer")]
    InvalidCaret,
}

/// Mode change requested by a completed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeSwitch {
    #[default]
    NoSwitch,
    SwitchMode(ModeKind),
    SwitchModeWithArgument(ModeKind, ModeArgument),
    SwitchPreviousMode,
    /// Run a single Normal-mode command, then come back.
    SwitchModeOneTimeCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Completed(ModeSwitch),
    Error(CommandError),
}

impl CommandResult {
    pub fn completed() -> Self {
        CommandResult::Completed(ModeSwitch::NoSwitch)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CommandResult::Error(_))
    }
}

impl From<Result<(), CommandError>> for CommandResult {
    fn from(result: Result<(), CommandError>) -> Self {
        match result {
            Ok(()) => CommandResult::completed(),
            Err(err) => CommandResult::Error(err),
        }
    }
}

/// Result of feeding one key to the insert dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    Processed,
    /// The key was consumed and the host must not forward it anywhere else.
    ProcessedAndHandledInput,
    SwitchMode(ModeKind),
    SwitchModeWithArgument(ModeKind, ModeArgument),
    SwitchPreviousMode,
    SwitchModeOneTimeCommand,
    NotHandled,
    Error(CommandError),
}

impl ProcessResult {
    pub fn is_handled(&self) -> bool {
        !matches!(self, ProcessResult::NotHandled)
    }

    pub fn is_any_switch(&self) -> bool {
        matches!(
            self,
            ProcessResult::SwitchMode(_)
                | ProcessResult::SwitchModeWithArgument(..)
                | ProcessResult::SwitchPreviousMode
                | ProcessResult::SwitchModeOneTimeCommand
        )
    }
}

impl From<ModeSwitch> for ProcessResult {
    fn from(switch: ModeSwitch) -> Self {
        match switch {
            ModeSwitch::NoSwitch => ProcessResult::Processed,
            ModeSwitch::SwitchMode(kind) => ProcessResult::SwitchMode(kind),
            ModeSwitch::SwitchModeWithArgument(kind, arg) => {
                ProcessResult::SwitchModeWithArgument(kind, arg)
            }
            ModeSwitch::SwitchPreviousMode => ProcessResult::SwitchPreviousMode,
            ModeSwitch::SwitchModeOneTimeCommand => ProcessResult::SwitchModeOneTimeCommand,
        }
    }
}

impl From<CommandResult> for ProcessResult {
    fn from(result: CommandResult) -> Self {
        match result {
            CommandResult::Completed(switch) => switch.into(),
            CommandResult::Error(err) => ProcessResult::Error(err),
        }
    }
}
