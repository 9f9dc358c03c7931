//! Key replay over an in-memory editor model.

use core_actions::{
    BufferCommandRunner, CommandHistory, InsertKind, InsertMode, ListCompletionFactory,
    ProcessResult,
};
use core_config::Config;
use core_events::KeyInput;
use core_model::{EditorModel, TextChangeTracking, TextView};
use core_state::{ModeArgument, ModeKind};
use core_text::{Buffer, Position};
use std::fmt::Write as _;
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Keys fed before the replay stopped.
    pub processed: usize,
    pub errors: usize,
    pub not_handled: usize,
    /// Mode switch that ended the replay early.
    pub switch: Option<ProcessResult>,
}

pub struct Replay {
    model: EditorModel,
    mode: InsertMode,
    history: Rc<CommandHistory>,
}

impl Replay {
    pub fn new(buffer: Buffer, config: &Config, replace: bool) -> Self {
        let kind = if replace {
            InsertKind::Replace
        } else {
            InsertKind::Insert
        };
        let runner = BufferCommandRunner::new(config.insert().clone());
        let mut mode = InsertMode::new(kind, Box::new(runner));
        if config.completion_enabled() {
            mode = mode.with_word_completion(Box::new(ListCompletionFactory::new()));
        }
        let history = Rc::new(CommandHistory::new());
        mode.subscribe_command_ran(Box::new(history.clone()));
        Self {
            model: EditorModel::new(buffer),
            mode,
            history,
        }
    }

    pub fn place_caret(&mut self, line: usize, byte: usize) {
        self.model.move_caret(Position::new(line, byte));
    }

    /// Enter the mode, feed `keys` until one of them switches modes, then
    /// leave the mode.
    pub fn run(&mut self, keys: &[KeyInput]) -> ReplayOutcome {
        self.mode.on_enter(ModeArgument::None, &mut self.model);
        let mut outcome = ReplayOutcome::default();
        for key in keys {
            let result = self.mode.process(*key, &mut self.model);
            outcome.processed += 1;
            match result {
                ProcessResult::NotHandled => {
                    outcome.not_handled += 1;
                    warn!(target: "runtime", key = %key, "key_not_handled");
                }
                ProcessResult::Error(err) => {
                    outcome.errors += 1;
                    debug!(target: "runtime", key = %key, error = %err, "command_error");
                }
                switch if switch.is_any_switch() => {
                    outcome.switch = Some(switch);
                    break;
                }
                _ => {}
            }
        }
        self.mode.on_leave(&mut self.model);
        info!(
            target: "runtime",
            processed = outcome.processed,
            total = keys.len(),
            errors = outcome.errors,
            not_handled = outcome.not_handled,
            "replay_complete"
        );
        outcome
    }

    pub fn text(&self) -> String {
        self.model.text()
    }

    /// Human-readable report for stderr.
    pub fn summary(&self, outcome: &ReplayOutcome, total_keys: usize) -> String {
        let final_mode = match outcome.switch {
            Some(ProcessResult::SwitchMode(kind))
            | Some(ProcessResult::SwitchModeWithArgument(kind, _)) => kind.display_name().to_string(),
            Some(ProcessResult::SwitchModeOneTimeCommand) => {
                format!("{} (one command)", ModeKind::Normal.display_name())
            }
            Some(ProcessResult::SwitchPreviousMode) => "previous".to_string(),
            _ => self.mode.mode_kind().display_name().to_string(),
        };
        let caret = self.model.caret();
        let mut out = String::new();
        let _ = writeln!(out, "mode: {final_mode}");
        let _ = writeln!(out, "keys: {}/{total_keys}", outcome.processed);
        let _ = writeln!(out, "caret: {}:{}", caret.line + 1, caret.byte);
        if outcome.errors > 0 || outcome.not_handled > 0 {
            let _ = writeln!(
                out,
                "errors: {} not handled: {}",
                outcome.errors, outcome.not_handled
            );
        }
        match self.history.last_repeatable() {
            Some(command) => {
                let _ = writeln!(out, "last repeatable: {command}");
            }
            None => {
                let _ = writeln!(out, "last repeatable: none");
            }
        }
        let change = self
            .model
            .changes()
            .last_change()
            .or_else(|| self.model.current_change());
        match change {
            Some(change) => {
                let _ = writeln!(out, "text change: {change:?}");
            }
            None => {
                let _ = writeln!(out, "text change: none");
            }
        }
        out
    }
}
