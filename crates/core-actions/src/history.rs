//! `CommandRan` notifications and a bounded history observer.
//!
//! The dispatcher raises one `CommandRan` per executed insert command, whether
//! it succeeded or failed. `CommandHistory` keeps the most recent events and
//! the last repeatable edit run: consecutive successful edits of a combinable
//! kind fold together, caret motion closes the run.

use crate::command::InsertCommand;
use crate::result::CommandResult;
use core_events::KeyInput;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRan {
    pub key: KeyInput,
    pub command: InsertCommand,
    pub result: CommandResult,
}

/// Observer trait for executed insert commands.
pub trait CommandRanObserver {
    fn on_command_ran(&self, event: &CommandRan);
}

impl<T: CommandRanObserver + ?Sized> CommandRanObserver for Rc<T> {
    fn on_command_ran(&self, event: &CommandRan) {
        (**self).on_command_ran(event)
    }
}

const HISTORY_MAX: usize = 100;

#[derive(Debug, Default)]
struct HistoryState {
    events: VecDeque<CommandRan>,
    last_repeatable: Option<InsertCommand>,
    run_open: bool,
}

#[derive(Debug, Default)]
pub struct CommandHistory {
    state: RefCell<HistoryState>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first (at most the last 100).
    pub fn events(&self) -> Vec<CommandRan> {
        self.state.borrow().events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().events.is_empty()
    }

    /// The edit a repeat command would replay.
    pub fn last_repeatable(&self) -> Option<InsertCommand> {
        self.state.borrow().last_repeatable.clone()
    }
}

impl CommandRanObserver for CommandHistory {
    fn on_command_ran(&self, event: &CommandRan) {
        let mut state = self.state.borrow_mut();
        if state.events.len() == HISTORY_MAX {
            state.events.pop_front();
        }
        state.events.push_back(event.clone());
        if event.result.is_error() {
            return;
        }
        if !event.command.edits_text() {
            state.run_open = false;
            return;
        }
        let command = event.command.clone();
        let previous = state.last_repeatable.take();
        let next = match previous {
            Some(previous) if state.run_open => previous.combine(command.clone()).unwrap_or(command),
            _ => command,
        };
        state.last_repeatable = Some(next);
        state.run_open = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Direction;
    use crate::result::CommandError;
    use pretty_assertions::assert_eq;

    fn ran(command: InsertCommand, result: CommandResult) -> CommandRan {
        CommandRan {
            key: KeyInput::char('x'),
            command,
            result,
        }
    }

    #[test]
    fn typed_run_becomes_one_repeatable_command() {
        let history = CommandHistory::new();
        for c in "ab".chars() {
            history.on_command_ran(&ran(InsertCommand::DirectInsert(c), CommandResult::completed()));
        }
        assert_eq!(history.len(), 2);
        assert_eq!(
            history.last_repeatable().and_then(|c| c.inserted_text()),
            Some("ab".to_string())
        );
    }

    #[test]
    fn motion_closes_run_and_errors_are_only_logged() {
        let history = CommandHistory::new();
        history.on_command_ran(&ran(InsertCommand::DirectInsert('a'), CommandResult::completed()));
        history.on_command_ran(&ran(
            InsertCommand::MoveCaret(Direction::Right),
            CommandResult::completed(),
        ));
        history.on_command_ran(&ran(InsertCommand::DirectInsert('b'), CommandResult::completed()));
        history.on_command_ran(&ran(
            InsertCommand::DeleteLeft,
            CommandResult::Error(CommandError::NothingToDelete),
        ));
        assert_eq!(history.last_repeatable(), Some(InsertCommand::DirectInsert('b')));
        assert_eq!(history.events().last().map(|e| e.result.is_error()), Some(true));
    }

    #[test]
    fn history_is_bounded() {
        let history = CommandHistory::new();
        for _ in 0..(HISTORY_MAX + 5) {
            history.on_command_ran(&ran(InsertCommand::DeleteRight, CommandResult::completed()));
        }
        assert_eq!(history.len(), HISTORY_MAX);
    }
}
